use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Final state a bookmark lands in after a `TaskRunner` completes an
/// extraction (spec.md §7: "the `TaskRunner` translates the presence of a
/// fatal error into `Bookmark.State = Error`").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkState {
    Loading,
    Loaded,
    Error,
}

/// The subset of bookmark metadata the extraction core needs to read or
/// write. The real type (with labels, collections, users, full-text index
/// entries, ...) lives outside this core — spec.md §1 names persistent
/// storage as an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub url: Url,
    pub state: BookmarkState,
    pub title: String,
    pub is_archived: bool,
    pub is_marked: bool,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Opaque persistence boundary: read the bookmark's URL, write back
/// extracted metadata, and store archive bytes. Concrete implementations
/// live outside this core (e.g. a SQL-backed store).
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Bookmark>;

    /// Persists the result of a completed (successful or failed) extraction.
    async fn update(&self, bookmark: &Bookmark) -> anyhow::Result<()>;

    /// Writes one archive file (`index.html`, a `_resources/...` asset, or
    /// `manifest.json`) under the bookmark's archive directory.
    async fn write_archive_file(&self, id: &str, path: &str, bytes: &[u8]) -> anyhow::Result<()>;
}
