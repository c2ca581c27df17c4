//! The per-extraction resource cache (spec.md §3 `CachedResources`, §4.A
//! "Cache hook"). Entries are consulted by the client before any socket is
//! opened and are rewindable on every read, matching the original's
//! `cacheEntry` (a `bytes.Reader` wrapper whose `Close` rewinds it).

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;

/// One cached HTTP response: status 200 is implied (spec.md §4.A: "return
/// the cached response (status 200, stored headers, body reader)").
#[derive(Debug, Clone)]
pub struct CachedResource {
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl CachedResource {
    pub fn new(headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }
}

/// Map URL → cached response, written only before `Run` and read
/// concurrently (but never mutated) by the Archiver's subresource workers
/// thereafter (spec.md §5).
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: RwLock<HashMap<String, CachedResource>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, entry: CachedResource) {
        self.entries.write().unwrap().insert(url.into(), entry);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.read().unwrap().contains_key(url)
    }

    /// Returns a fresh, independently-rewound clone of the cached body on
    /// every call — there is no shared cursor to advance, so repeated reads
    /// of the same cached URL (e.g. re-fetched across pages) always observe
    /// the whole body, mirroring the original's `Close`-rewinds-the-reader
    /// semantics.
    pub fn get(&self, url: &str) -> Option<CachedResource> {
        self.entries.read().unwrap().get(url).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_entries_are_rewindable_on_every_read() {
        let cache = ResourceCache::new();
        cache.insert(
            "https://example.com/a.png",
            CachedResource::new(HashMap::new(), Bytes::from_static(b"hello")),
        );

        let first = cache.get("https://example.com/a.png").unwrap();
        let second = cache.get("https://example.com/a.png").unwrap();
        assert_eq!(first.body, second.body);
        assert_eq!(&first.body[..], b"hello");
    }

    #[test]
    fn missing_entries_return_none() {
        let cache = ResourceCache::new();
        assert!(cache.get("https://example.com/missing").is_none());
        assert!(!cache.contains("https://example.com/missing"));
    }
}
