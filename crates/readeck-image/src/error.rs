use thiserror::Error;

/// Errors raised while decoding, transforming or re-encoding an image
/// (spec.md §4.B). Every variant is recoverable per-resource: a failed
/// image never aborts the whole extraction (see `ArchiveError`).
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("no decoder registered for content type {content_type}")]
    UnsupportedFormat { content_type: String },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unknown output format {format}")]
    UnknownOutputFormat { format: String },

    #[error("cannot fit a {width}x{height} image into a zero-sized box")]
    ZeroSizedTarget { width: u32, height: u32 },

    #[error("image too large: {width}x{height} exceeds the 30 megapixel decode limit")]
    ImageTooLarge { width: u32, height: u32 },
}
