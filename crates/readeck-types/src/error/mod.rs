//! Leaf error enums for the three extraction stages, following the taxonomy
//! in spec.md §7 (fatal to extraction / recoverable per resource / recoverable
//! per drop / validation).

mod archive_error;
mod extract_error;
mod fetch_error;

pub use archive_error::ArchiveError;
pub use extract_error::ExtractError;
pub use fetch_error::FetchError;
