//! `ExtractBody` + `StripTags` (spec.md §4.F item 9): when a site config
//! matched, narrows the document to its `body_selector` nodes via
//! `readeck_siteconfig::apply_selectors`; either way, strips a fixed
//! blacklist of forbidden elements everywhere. `iframe` is deliberately not
//! in the blacklist — `ConvertVideoEmbeds` (item 10) still needs to see it.

use async_trait::async_trait;
use readeck_dom::Dom;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

use crate::site_config::SiteConfigCache;

const FORBIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "object", "embed", "applet"];

pub struct ExtractBody {
    cache: SiteConfigCache,
}

impl ExtractBody {
    pub fn new(cache: SiteConfigCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Processor for ExtractBody {
    fn name(&self) -> &'static str {
        "extract-body"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Dom {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };

        if let Some(config) = self.cache.get(index) {
            if let (Some(dom), Some(drop)) = (msg.dom.as_mut(), extractor.drop_at_mut(index)) {
                readeck_siteconfig::apply_selectors(&config, dom, drop);
                narrow_body_to_selectors(dom, &config.body_selector);
            }
        }

        if let Some(dom) = msg.dom.as_mut() {
            strip_forbidden_tags(dom);
        }

        ProcessorOutcome::Continue
    }
}

/// Replaces `<body>`'s children with the nodes matched by `selectors`, so
/// later steps (`Readability`, `WrapTables`, `CleanDom`) operate on the
/// site-config-selected content rather than the whole page.
fn narrow_body_to_selectors(dom: &mut Dom, selectors: &[String]) {
    if selectors.is_empty() {
        return;
    }
    let mut matched = Vec::new();
    for selector in selectors {
        matched.extend(dom.select(selector));
    }
    if matched.is_empty() {
        return;
    }
    let Some(body) = dom.find_all_tags(&["body"]).into_iter().next() else {
        return;
    };
    for child in dom.children(body) {
        dom.detach_from_parent(child);
    }
    for node in matched {
        dom.detach_from_parent(node);
        dom.append_child(body, node);
    }
}

fn strip_forbidden_tags(dom: &mut Dom) {
    for id in dom.find_all_tags(FORBIDDEN_TAGS) {
        dom.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_fetch::SafeClient;
    use readeck_types::SiteConfig;
    use std::sync::Arc;
    use url::Url;

    fn extractor() -> Extractor {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        Extractor::new(Url::parse("https://example.com").unwrap(), client)
    }

    #[tokio::test]
    async fn narrows_body_to_site_config_selector() {
        let mut extractor = extractor();
        let cache = SiteConfigCache::new();
        cache.set(
            0,
            SiteConfig {
                body_selector: vec![".content".into()],
                ..Default::default()
            },
        );

        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(
            r#"<html><body><nav>menu</nav><div class="content"><p>article</p></div></body></html>"#,
        ));

        ExtractBody::new(cache).run(&mut msg, &mut extractor).await;

        let html = msg.dom.unwrap().to_html();
        assert!(html.contains("article"));
        assert!(!html.contains("menu"));
    }

    #[tokio::test]
    async fn strips_forbidden_tags_but_keeps_iframe() {
        let mut extractor = extractor();
        let cache = SiteConfigCache::new();
        let mut msg = ProcessMessage::new(Step::Dom, 100);
        msg.dom = Some(Dom::parse(
            r#"<html><body><script>evil()</script><iframe src="https://example.com"></iframe><p>text</p></body></html>"#,
        ));

        ExtractBody::new(cache).run(&mut msg, &mut extractor).await;

        let html = msg.dom.unwrap().to_html();
        assert!(!html.contains("evil()"));
        assert!(html.contains("<iframe"));
        assert!(html.contains("text"));
    }
}
