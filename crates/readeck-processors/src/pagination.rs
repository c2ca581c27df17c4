//! `FindContentPage` / `GoToNextPage` (spec.md §4.F item 8): resolves a
//! next-page link — from the matched site config, when one applies — and,
//! if found and not already visited, appends a new `Drop` and empties the
//! current one's content (`ResetContent`), so the main loop picks up the
//! newly appended drop in its own right as it advances.
//!
//! This must be `ResetContent`, not `ResetPosition`: the latter is reserved
//! for URL-rewrite restarts and is bounded by the shared `maxReset` counter,
//! which a normal multi-page article would blow through long before hitting
//! the actual pagination bound, `Extractor::MAX_DROPS`.

use async_trait::async_trait;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

use crate::site_config::SiteConfigCache;

pub struct GoToNextPage {
    cache: SiteConfigCache,
}

impl GoToNextPage {
    pub fn new(cache: SiteConfigCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Processor for GoToNextPage {
    fn name(&self) -> &'static str {
        "go-to-next-page"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let Some(config) = self.cache.get(index) else {
            return ProcessorOutcome::Continue;
        };
        let Some(dom) = msg.dom.as_ref() else {
            return ProcessorOutcome::Continue;
        };
        let Some(href) = readeck_siteconfig::find_next_page(&config, dom) else {
            return ProcessorOutcome::Continue;
        };
        let Some(base_url) = extractor.drop_at(index).map(|d| d.url.clone()) else {
            return ProcessorOutcome::Continue;
        };
        let Ok(next_url) = base_url.join(&href) else {
            return ProcessorOutcome::Continue;
        };

        if extractor.visited.is_present(&next_url) {
            return ProcessorOutcome::Continue;
        }

        extractor.add_drop(next_url);
        msg.reset_content();
        if let Some(drop) = extractor.drop_at_mut(index) {
            drop.body.clear();
        }

        ProcessorOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_dom::Dom;
    use readeck_fetch::SafeClient;
    use readeck_types::SiteConfig;
    use std::sync::Arc;
    use url::Url;

    #[tokio::test]
    async fn discovered_next_page_is_appended_and_resets_content() {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        let mut extractor = Extractor::new(Url::parse("https://example.com/a").unwrap(), client);
        extractor.drop_at_mut(0).unwrap().body = b"stale body".to_vec();

        let cache = SiteConfigCache::new();
        cache.set(
            0,
            SiteConfig {
                next_page_selector: vec!["a.next".into()],
                ..Default::default()
            },
        );

        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(r#"<html><body><a class="next" href="/b">next</a></body></html>"#));

        GoToNextPage::new(cache).run(&mut msg, &mut extractor).await;

        assert_eq!(extractor.drops().len(), 2);
        assert_eq!(extractor.drops()[1].url.as_str(), "https://example.com/b");
        assert!(msg.dom.is_none());
        assert!(extractor.drop_at(0).unwrap().body.is_empty());
        assert!(!msg.is_canceled());
    }

    #[tokio::test]
    async fn pagination_does_not_trip_the_redirect_reset_counter() {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        let mut extractor = Extractor::new(Url::parse("https://example.com/a").unwrap(), client);

        let cache = SiteConfigCache::new();
        cache.set(
            0,
            SiteConfig {
                next_page_selector: vec!["a.next".into()],
                ..Default::default()
            },
        );

        let mut msg = ProcessMessage::new(Step::Dom, 100);
        for _ in 0..20 {
            msg.dom = Some(Dom::parse(r#"<html><body><a class="next" href="/b">next</a></body></html>"#));
            GoToNextPage::new(cache.clone()).run(&mut msg, &mut extractor).await;
        }
        assert!(!msg.is_canceled());
    }

    #[tokio::test]
    async fn already_visited_next_page_is_not_re_appended() {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        let mut extractor = Extractor::new(Url::parse("https://example.com/a").unwrap(), client);
        extractor.visited.add(&Url::parse("https://example.com/b").unwrap());

        let cache = SiteConfigCache::new();
        cache.set(
            0,
            SiteConfig {
                next_page_selector: vec!["a.next".into()],
                ..Default::default()
            },
        );

        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(r#"<html><body><a class="next" href="/b">next</a></body></html>"#));

        GoToNextPage::new(cache).run(&mut msg, &mut extractor).await;
        assert_eq!(extractor.drops().len(), 1);
    }
}
