//! `ReplaceStrings` (spec.md §4.F item 2): rewrites the raw response body
//! before DOM parsing. Because `Extractor::run` always (re)parses the body
//! fresh after `Step::Body` finishes, mutating `drop.body` here is all that
//! "forces a re-parse" means — there is no separate re-parse call to make.

use async_trait::async_trait;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};

use crate::site_config::SiteConfigCache;

pub struct ReplaceStrings {
    cache: SiteConfigCache,
}

impl ReplaceStrings {
    pub fn new(cache: SiteConfigCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Processor for ReplaceStrings {
    fn name(&self) -> &'static str {
        "replace-strings"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Body {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let Some(config) = self.cache.get(index) else {
            return ProcessorOutcome::Continue;
        };
        if config.string_replacements.is_empty() {
            return ProcessorOutcome::Continue;
        }
        let Some(drop) = extractor.drop_at_mut(index) else {
            return ProcessorOutcome::Continue;
        };
        if !drop.is_html() {
            return ProcessorOutcome::Continue;
        }
        let body = String::from_utf8_lossy(&drop.body).into_owned();
        let replaced = readeck_siteconfig::apply_string_replacements(&body, &config.string_replacements);
        drop.body = replaced.into_bytes();
        ProcessorOutcome::Continue
    }
}
