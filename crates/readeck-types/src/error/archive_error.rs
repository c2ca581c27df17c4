use thiserror::Error;

/// Errors surfaced by the Archiver (spec.md §4.C). Per-node fetch failures
/// are swallowed by the archiver itself and reported through the event
/// channel instead (`ArchiveEvent::Error`); this enum covers the handful of
/// failures that abort the whole `Archive` call.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("cannot parse input html: {0}")]
    Parse(String),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Internal marker used by subresource handlers to mean "do not fetch
    /// this, it's not an http(s) URL, a data: URL, or otherwise
    /// intentionally unsupported" — never surfaced as a fatal error.
    #[error("skipped url")]
    SkippedUrl,
}
