//! Resource collection: every subresource the Archiver fetches lands here as
//! `./_resources/<hash>.<ext>`, matching spec.md §6's Archive file layout.
//! This is the Archiver's built-in `URLProcessor`: "typically stores the
//! bytes and returns `./_resources/<hash>.<ext>`" (spec.md GLOSSARY).

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use sha1::{Digest, Sha1};

/// One stored asset, keyed by its generated resource path.
#[derive(Debug, Clone)]
pub struct ArchivedResource {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Collects fetched subresources under stable, content-addressed names.
/// Shared (read+write) across the Archiver's concurrent subresource workers
/// — the only piece of writable shared state besides the event channel
/// (spec.md §5), guarded by a plain mutex since inserts are infrequent
/// relative to the network round-trip that precedes them.
#[derive(Debug, Default)]
pub struct ResourceStore {
    entries: Mutex<HashMap<String, ArchivedResource>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` and returns the relative path the rewritten HTML
    /// should reference (`./_resources/<hash>.<ext>`).
    pub fn store(&self, original_url: &str, content_type: &str, bytes: Bytes) -> String {
        let hash = hex_sha1_prefix(original_url);
        let ext = extension_for(content_type);
        let path = format!("./_resources/{hash}.{ext}");
        self.entries.lock().unwrap().insert(
            path.clone(),
            ArchivedResource {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        path
    }

    pub fn into_inner(self) -> HashMap<String, ArchivedResource> {
        self.entries.into_inner().unwrap()
    }
}

fn hex_sha1_prefix(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..10])
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type.split(';').next().unwrap_or_default().trim() {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "text/css" => "css",
        "font/woff2" => "woff2",
        "font/woff" => "woff",
        "font/ttf" | "application/font-sfnt" => "ttf",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_url_and_type_produce_a_stable_path() {
        let store = ResourceStore::new();
        let a = store.store("https://example.com/a.png", "image/png", Bytes::from_static(b"x"));
        let b = store.store("https://example.com/a.png", "image/png", Bytes::from_static(b"y"));
        assert_eq!(a, b);
        assert!(a.starts_with("./_resources/"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn unknown_content_type_falls_back_to_bin() {
        let store = ResourceStore::new();
        let path = store.store("https://example.com/x", "application/weird", Bytes::new());
        assert!(path.ends_with(".bin"));
    }
}
