//! # readeck-fetch
//!
//! The Safe HTTP Client (spec.md §4.A): outbound fetches for the page itself
//! and every subresource the Archiver discovers, with a deterministic
//! browser-like network profile, an SSRF guard that runs before any socket
//! opens, pluggable proxy dispatch, and a transparent per-URL cache
//! pre-empt so deterministic tests never touch the network.
//!
//! One [`SafeClient`] is built per extraction (spec.md §3: the cookie jar
//! "persists only for the lifetime of one Extractor").

mod cache;
mod client;
mod headers;
mod proxy;
mod ssrf;

pub use cache::{CachedResource, ResourceCache};
pub use client::{FetchResponse, SafeClient};
pub use ssrf::{check_denied, resolve_host};

pub use readeck_types::FetchError;
