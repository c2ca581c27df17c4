//! The `Picture` type: decode, resize, grayscale and re-encode (spec.md
//! §4.B), ported from the `Image` interface in `pkg/img/img.go`.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageFormat};

use crate::error::ImageError;
use crate::gray16::dither_to_gray16;

/// PNG compression effort, mirroring the original's `ImageCompression`
/// (`CompressionFast` / `CompressionBest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Fast,
    Best,
}

/// Images decoding to more than this many pixels are rejected outright
/// (spec.md §4.B decompression-bomb guard): a crafted PNG can claim an
/// enormous width/height while weighing a few kilobytes on the wire.
const MAX_PIXELS: u64 = 30_000_000;

/// One decoded image, carried through a chain of in-place transforms before
/// being encoded for the archive (spec.md §4.B `Pipeline`/`ImageFilter`).
pub struct Picture {
    image: DynamicImage,
    format: ImageFormat,
    quality: u8,
    compression: Compression,
}

impl Picture {
    /// Decodes `bytes` using the format implied by `content_type`
    /// (`New` in the original — the handler registry collapses to
    /// `image`'s own format table since it natively covers every type
    /// spec.md §4.B lists).
    pub fn decode(content_type: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let format = ImageFormat::from_mime_type(content_type).ok_or_else(|| {
            ImageError::UnsupportedFormat {
                content_type: content_type.to_string(),
            }
        })?;
        let image = image::load_from_memory_with_format(bytes, format)?;
        let (width, height) = (image.width(), image.height());
        if width as u64 * height as u64 > MAX_PIXELS {
            return Err(ImageError::ImageTooLarge { width, height });
        }
        Ok(Self {
            image,
            format,
            quality: 85,
            compression: Compression::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Ico => "image/x-icon",
            _ => "application/octet-stream",
        }
    }

    /// Changes the output format (`SetFormat`); the name is matched
    /// case-insensitively against `image`'s format table.
    pub fn set_format(&mut self, name: &str) -> Result<(), ImageError> {
        let normalized = name.trim().to_ascii_lowercase();
        self.format = match normalized.as_str() {
            "jpeg" | "jpg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "gif" => ImageFormat::Gif,
            "webp" => ImageFormat::WebP,
            "bmp" => ImageFormat::Bmp,
            "tiff" => ImageFormat::Tiff,
            "ico" => ImageFormat::Ico,
            other => {
                return Err(ImageError::UnknownOutputFormat {
                    format: other.to_string(),
                })
            }
        };
        Ok(())
    }

    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.min(100);
    }

    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    /// Resizes to exactly `width x height`, distorting the aspect ratio if
    /// needed — callers that want aspect-locked scaling call [`Picture::fit`]
    /// first.
    ///
    /// The original specifies a box filter; `image`'s `FilterType` has no
    /// such variant, so `Triangle` is used as the closest available
    /// approximation (see DESIGN.md's `readeck-image` Open Question
    /// resolution).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = self.image.resize_exact(
            width.max(1),
            height.max(1),
            image::imageops::FilterType::Triangle,
        );
    }

    /// Aspect-locked downscale to fit within `w x h`, ported verbatim from
    /// `Fit` in `pkg/img/img.go`: a no-op when the image already fits inside
    /// the target box.
    pub fn fit(&mut self, w: u32, h: u32) -> Result<(), ImageError> {
        if w == 0 || h == 0 {
            return Err(ImageError::ZeroSizedTarget {
                width: w,
                height: h,
            });
        }
        let (ow, oh) = (self.width(), self.height());
        if w > ow && h > oh {
            return Ok(());
        }

        let src_aspect = ow as f64 / oh as f64;
        let max_aspect = w as f64 / h as f64;

        let (nw, nh) = if src_aspect > max_aspect {
            (w, (w as f64 / src_aspect) as u32)
        } else {
            (((h as f64) * src_aspect) as u32, h)
        };

        self.resize(nw.max(1), nh.max(1));
        Ok(())
    }

    pub fn grayscale(&mut self) {
        self.image = DynamicImage::ImageLuma8(self.image.to_luma8());
    }

    /// Reduces the image to the 16-level dithered palette (spec.md §4.B
    /// `Gray16`), used when archiving for grayscale e-reader displays.
    pub fn gray16(&mut self) {
        let rgba = self.image.to_rgba8();
        self.image = DynamicImage::ImageRgba8(dither_to_gray16(&rgba));
    }

    /// Strips any embedded metadata by re-encoding through a fresh buffer,
    /// matching `Clean`'s "drop EXIF/ICC chunks" behavior in the original.
    pub fn clean(&mut self) -> Result<(), ImageError> {
        let bytes = self.encode()?;
        self.image = image::load_from_memory_with_format(&bytes, self.format)?;
        Ok(())
    }

    /// Encodes the current image state in `self.format`.
    pub fn encode(&self) -> Result<Vec<u8>, ImageError> {
        let mut buf = Cursor::new(Vec::new());
        match self.format {
            ImageFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut buf, self.quality).write_image(
                    self.image.to_rgb8().as_raw(),
                    self.width(),
                    self.height(),
                    image::ExtendedColorType::Rgb8,
                )?;
            }
            ImageFormat::Png => {
                let compression = match self.compression {
                    Compression::Fast => CompressionType::Fast,
                    Compression::Best => CompressionType::Best,
                };
                PngEncoder::new_with_quality(&mut buf, compression, PngFilterType::Adaptive)
                    .write_image(
                        self.image.to_rgba8().as_raw(),
                        self.width(),
                        self.height(),
                        image::ExtendedColorType::Rgba8,
                    )?;
            }
            other => {
                self.image.write_to(&mut buf, other)?;
            }
        }
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgba([(x * 10) as u8, (y * 10) as u8, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decode_reports_dimensions_and_content_type() {
        let bytes = sample_png(20, 10);
        let pic = Picture::decode("image/png", &bytes).unwrap();
        assert_eq!((pic.width(), pic.height()), (20, 10));
        assert_eq!(pic.content_type(), "image/png");
    }

    #[test]
    fn decode_rejects_images_above_the_pixel_cap() {
        let bytes = sample_png(6000, 6000);
        assert!(matches!(
            Picture::decode("image/png", &bytes),
            Err(ImageError::ImageTooLarge { width: 6000, height: 6000 })
        ));
    }

    #[test]
    fn fit_is_noop_when_already_within_bounds() {
        let bytes = sample_png(10, 10);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        pic.fit(100, 100).unwrap();
        assert_eq!((pic.width(), pic.height()), (10, 10));
    }

    #[test]
    fn fit_preserves_aspect_ratio_when_shrinking() {
        let bytes = sample_png(200, 100);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        pic.fit(50, 50).unwrap();
        assert_eq!(pic.width(), 50);
        assert_eq!(pic.height(), 25);
    }

    #[test]
    fn fit_rejects_zero_sized_target() {
        let bytes = sample_png(10, 10);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        assert!(matches!(pic.fit(0, 10), Err(ImageError::ZeroSizedTarget { .. })));
    }

    #[test]
    fn set_format_accepts_known_aliases_and_rejects_unknown() {
        let bytes = sample_png(4, 4);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        pic.set_format("JPG").unwrap();
        assert_eq!(pic.format(), ImageFormat::Jpeg);
        assert!(pic.set_format("not-a-format").is_err());
    }

    #[test]
    fn grayscale_then_encode_round_trips() {
        let bytes = sample_png(8, 8);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        pic.grayscale();
        let encoded = pic.encode().unwrap();
        assert!(!encoded.is_empty());
    }

    #[test]
    fn gray16_output_only_uses_palette_levels() {
        let bytes = sample_png(16, 16);
        let mut pic = Picture::decode("image/png", &bytes).unwrap();
        pic.gray16();
        for pixel in pic.image.to_rgba8().pixels() {
            assert!(crate::GRAY16_PALETTE.contains(&pixel[0]));
        }
    }
}
