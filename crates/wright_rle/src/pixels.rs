//! Pixel planes: one byte per pixel, row-major, before run-length reduction.
//!
//! Planes come in two shapes. An unpadded plane has `width` pixels per row;
//! a padded plane has the device row width and zero pixels past `width`.

use crate::color::pack_argb8;
use crate::RasterImage;

/// 0/1 ink plane of `image`, one entry per pixel.
pub fn mono_plane(image: &RasterImage, ink: impl Fn([u8; 4]) -> bool) -> Vec<u8> {
    image.rgba_pixels().map(|px| u8::from(ink(px))).collect()
}

/// Packed ARGB8 plane of `image`.
pub fn argb8_plane(image: &RasterImage) -> Vec<u8> {
    image.rgba_pixels().map(pack_argb8).collect()
}

/// Replaces every ARGB8 value with its index in `palette`.
///
/// Values missing from the palette map to index 0; palettes built by
/// [`crate::color::extract_palette`] over the same plane hold them all.
pub fn palette_indices(plane: &[u8], palette: &[u8]) -> Vec<u8> {
    let mut lookup = [0u8; 256];
    for (idx, &color) in palette.iter().enumerate() {
        lookup[color as usize] = idx as u8;
    }
    plane.iter().map(|&v| lookup[v as usize]).collect()
}

/// Extends every row of an unpadded plane to `padded_width` with zeros.
pub fn pad_rows(plane: &[u8], width: usize, height: usize, padded_width: usize) -> Vec<u8> {
    if width == padded_width {
        return plane.to_vec();
    }
    let mut padded = vec![0u8; padded_width * height];
    if width > 0 {
        for (src, dst) in plane
            .chunks_exact(width)
            .zip(padded.chunks_exact_mut(padded_width))
        {
            dst[..width].copy_from_slice(src);
        }
    }
    padded
}

/// Drops the padding columns of a padded plane.
pub fn crop_rows(padded: &[u8], padded_width: usize, width: usize, height: usize) -> Vec<u8> {
    if width == padded_width {
        return padded[..width * height].to_vec();
    }
    let mut plane = Vec::with_capacity(width * height);
    if padded_width > 0 {
        for row in padded.chunks_exact(padded_width).take(height) {
            plane.extend_from_slice(&row[..width]);
        }
    }
    plane
}

/// XORs a padded 0/1 plane with a 1x1 checkerboard, toggling pixels where
/// `x ^ y` is odd.
///
/// Only the whole bytes covering `width` are touched, so stride padding
/// stays zero. Applying it twice restores the plane.
pub fn unscreen(padded: &mut [u8], padded_width: usize, width: usize) {
    if padded_width == 0 {
        return;
    }
    let span = (width.div_ceil(8) * 8).min(padded_width);
    for (y, row) in padded.chunks_exact_mut(padded_width).enumerate() {
        for x in ((y + 1) & 1..span).step_by(2) {
            row[x] ^= 1;
        }
    }
}
