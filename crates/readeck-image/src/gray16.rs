//! The 16-level black & white palette (ported from `Gray16Palette` in
//! `pkg/img/img.go`), used by [`crate::pipeline::Picture::gray16`] to dither
//! an image down to a 4-bit grayscale depth suitable for e-readers.

use image::{Luma, Pixel, RgbaImage};

/// Sixteen evenly-spaced gray levels, `0x00` through `0xff` in steps of
/// `0x11` — identical to the original's `color.RGBA` table.
pub(crate) const GRAY16_PALETTE: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

/// Nearest palette entry for a single luma value.
fn nearest(level: u8) -> u8 {
    GRAY16_PALETTE
        .iter()
        .copied()
        .min_by_key(|candidate| (*candidate as i16 - level as i16).unsigned_abs())
        .unwrap_or(0)
}

/// Converts `rgba` to grayscale and dithers it onto the 16-level palette
/// using Floyd–Steinberg error diffusion, matching the visual result of the
/// original's `draw.FloydSteinberg` + `Gray16Palette` pass.
pub(crate) fn dither_to_gray16(rgba: &RgbaImage) -> RgbaImage {
    let (width, height) = rgba.dimensions();
    let mut luma: Vec<f32> = rgba
        .pixels()
        .map(|p| {
            let Luma([l]) = p.to_luma();
            l as f32
        })
        .collect();

    let idx = |x: u32, y: u32| (y * width + x) as usize;

    for y in 0..height {
        for x in 0..width {
            let old = luma[idx(x, y)].clamp(0.0, 255.0);
            let new = nearest(old.round() as u8);
            let error = old - new as f32;
            luma[idx(x, y)] = new as f32;

            let mut spread = |dx: i64, dy: i64, weight: f32| {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as u32) < width && (ny as u32) < height {
                    let i = idx(nx as u32, ny as u32);
                    luma[i] += error * weight;
                }
            };
            spread(1, 0, 7.0 / 16.0);
            spread(-1, 1, 3.0 / 16.0);
            spread(0, 1, 5.0 / 16.0);
            spread(1, 1, 1.0 / 16.0);
        }
    }

    let mut out = RgbaImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let level = nearest(luma[idx(x, y)].clamp(0.0, 255.0).round() as u8);
            out.put_pixel(x, y, image::Rgba([level, level, level, 255]));
        }
    }
    out
}
