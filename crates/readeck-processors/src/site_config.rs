//! `LoadSiteConfig` / `LoadScripts`: the first pipeline step (spec.md §4.F
//! item 1), attaching matching per-host rules before any content work runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use readeck_engine::{Extractor, ProcessMessage, Processor, ProcessorOutcome, Step};
use readeck_siteconfig::SiteConfigRegistry;
use readeck_types::SiteConfig;

/// Per-drop-index cache of the matched site config, populated by
/// `LoadSiteConfig` at `Step::Start` and read by every later processor that
/// needs to know whether this page has a site config (`ReplaceStrings`,
/// `ExtractBody`, `FindContentPage`). A shared cache (rather than a field on
/// `ProcessMessage`) keeps `readeck-engine` free of a dependency on
/// `readeck-siteconfig`'s matching logic.
#[derive(Clone, Default)]
pub struct SiteConfigCache(Arc<Mutex<HashMap<usize, SiteConfig>>>);

impl SiteConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, index: usize, config: SiteConfig) {
        self.0.lock().unwrap().insert(index, config);
    }

    pub fn get(&self, index: usize) -> Option<SiteConfig> {
        self.0.lock().unwrap().get(&index).cloned()
    }
}

/// Looks up the current drop's host in the compiled registry and, on a
/// match, records it in the shared [`SiteConfigCache`] for later steps.
pub struct LoadSiteConfig {
    registry: Arc<SiteConfigRegistry>,
    cache: SiteConfigCache,
}

impl LoadSiteConfig {
    pub fn new(registry: Arc<SiteConfigRegistry>, cache: SiteConfigCache) -> Self {
        Self { registry, cache }
    }
}

#[async_trait]
impl Processor for LoadSiteConfig {
    fn name(&self) -> &'static str {
        "load-site-config"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Start {
            return ProcessorOutcome::Continue;
        }
        let Ok(index) = usize::try_from(msg.position().max(0)) else {
            return ProcessorOutcome::Continue;
        };
        let Some(drop) = extractor.drop_at(index) else {
            return ProcessorOutcome::Continue;
        };
        let Some(host) = drop.url.host_str() else {
            return ProcessorOutcome::Continue;
        };
        if let Some(config) = self.registry.lookup(host) {
            self.cache.set(index, config.clone());
        }
        ProcessorOutcome::Continue
    }
}

/// Discovers `.js` content scripts under the configured roots. No script
/// interpreter exists in this workspace (see `readeck-siteconfig::hooks`),
/// so this processor only logs what it found; a host embedding a real
/// engine would replace this with one that also populates a
/// `ContentScriptRegistry` and dispatches its hooks.
pub struct LoadScripts {
    roots: Vec<PathBuf>,
}

impl LoadScripts {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

#[async_trait]
impl Processor for LoadScripts {
    fn name(&self) -> &'static str {
        "load-scripts"
    }

    async fn run(&self, msg: &mut ProcessMessage, extractor: &mut Extractor) -> ProcessorOutcome {
        if msg.step() != Step::Start || msg.position() != 0 {
            return ProcessorOutcome::Continue;
        }
        let found = readeck_siteconfig::discover_scripts(&self.roots);
        if !found.is_empty() {
            extractor.log(format!("discovered {} content script(s)", found.len()));
        }
        ProcessorOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readeck_config::SiteConfigRoot;
    use readeck_fetch::SafeClient;
    use url::Url;

    fn extractor() -> Extractor {
        let client = Arc::new(SafeClient::new(Arc::new(readeck_config::ExtractorConfig::default())).unwrap());
        Extractor::new(Url::parse("https://example.com/a").unwrap(), client)
    }

    #[tokio::test]
    async fn matching_host_populates_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("example.json"), r#"{"hosts": ["*.example.com", "example.com"]}"#).unwrap();
        let registry = SiteConfigRegistry::load(&[SiteConfigRoot {
            name: "t".into(),
            src: dir.path().to_path_buf(),
        }])
        .unwrap();

        let cache = SiteConfigCache::new();
        let processor = LoadSiteConfig::new(Arc::new(registry), cache.clone());
        let mut extractor = extractor();
        let mut msg = ProcessMessage::new(Step::Start, 100);

        processor.run(&mut msg, &mut extractor).await;
        assert!(cache.get(0).is_some());
    }
}
