//! # readeck-image
//!
//! The image manipulation pipeline (spec.md §4.B): decode subresource bytes,
//! resize/fit/grayscale/re-encode them for the offline archive, the way the
//! Archiver downsizes and dithers embedded pictures before writing them next
//! to the saved HTML.

mod error;
mod gray16;
mod pipeline;

pub use error::ImageError;
pub use pipeline::{Compression, Picture};

pub(crate) use gray16::GRAY16_PALETTE;
