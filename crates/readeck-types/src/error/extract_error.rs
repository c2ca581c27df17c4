use thiserror::Error;

use super::FetchError;

/// Errors fatal to an extraction run (spec.md §7: "Fatal to the extraction").
/// Recoverable per-resource and per-drop failures are not represented here —
/// they are logged into `Extractor::errors` and do not stop the run.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot load initial url: {0}")]
    InitialLoad(#[source] FetchError),

    #[error("cannot parse dom of the sole page: {0}")]
    DomParse(String),

    #[error("extraction canceled: {reason}")]
    Canceled { reason: String },

    #[error("invalid starting url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
