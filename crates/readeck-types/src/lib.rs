//! # readeck-types
//!
//! Shared data model and port traits for the readeck content-extraction and
//! archival core. This crate exists to break circular dependencies between
//! `readeck-engine`, `readeck-fetch`, `readeck-archiver` and
//! `readeck-processors`: every crate that needs to name `Drop`, `Picture`,
//! `DocumentType` or one of the error enums depends on this crate instead of
//! on each other.
//!
//! ## Organization
//!
//! - `drop`: the `Drop` (one fetched page) and `Picture` types
//! - `error`: leaf error enums for the fetch/extract/archive stages
//! - `siteconfig`: the per-host rule data model (matching logic lives in
//!   `readeck-siteconfig`)
//! - `ports`: trait boundaries for the external collaborators (`BookmarkStore`,
//!   `TaskRunner`, `LogSink`) that this core never implements itself
//! - `slug`: the `Slug` text-to-URL-fragment utility

pub mod drop;
pub mod error;
pub mod ports;
pub mod siteconfig;
pub mod slug;

pub use drop::{DocumentType, Drop, Picture, TextDirection, UrlList};
pub use error::{ArchiveError, ExtractError, FetchError};
pub use siteconfig::{ContentScriptHooks, SiteConfig, SiteConfigTest, StringReplacement};
pub use slug::slug;
