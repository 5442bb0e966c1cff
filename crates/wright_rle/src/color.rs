//! Color quantization and classification for the color container formats.
//!
//! Every channel, alpha included, is reduced to 2 bits. A quantized pixel
//! therefore fits one byte, the packed ARGB8 form `aarrggbb` the device
//! uses for both 8-bit pixels and palette entries.

use log::debug;

use crate::{Result, RleError, PALETTE_MAX};

/// Packed ARGB8 of opaque black.
pub const ARGB8_OPAQUE_BLACK: u8 = 0xc0;
/// Packed ARGB8 of opaque white.
pub const ARGB8_OPAQUE_WHITE: u8 = 0xff;

/// Channel value of each 2-bit level.
pub const LEVEL_VALUE: [u8; 4] = [0, 85, 170, 255];

/// 2-bit level of every 8-bit channel value: its top two bits, so each
/// level covers a block of 64 values.
pub const QUANT_LEVEL: [u8; 256] = build_quant_table();

const fn build_quant_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut v = 0;
    while v < 256 {
        table[v] = (v >> 6) as u8;
        v += 1;
    }
    table
}

/// Packs an RGBA pixel into ARGB8.
///
/// Color hidden under an alpha of exactly 0 is dropped, so every fully
/// transparent pixel packs to 0.
pub fn pack_argb8(rgba: [u8; 4]) -> u8 {
    if rgba[3] == 0 {
        return 0;
    }
    let [r, g, b, a] = rgba.map(|c| QUANT_LEVEL[c as usize]);
    (a << 6) | (r << 4) | (g << 2) | b
}

/// Expands an ARGB8 byte back to RGBA.
pub fn unpack_argb8(value: u8) -> [u8; 4] {
    let level = |shift: u8| LEVEL_VALUE[((value >> shift) & 0x03) as usize];
    [level(4), level(2), level(0), level(6)]
}

/// Reduces an RGBA pixel to what a color container can store.
#[inline]
pub fn quantize(rgba: [u8; 4]) -> [u8; 4] {
    unpack_argb8(pack_argb8(rgba))
}

/// Whether a pixel is drawn as white ink in a monochrome bitmap.
///
/// Uses ITU-R 601 luma with a mid-gray threshold; transparent pixels are
/// black.
pub fn is_light(rgba: [u8; 4]) -> bool {
    let [r, g, b, a] = rgba.map(u32::from);
    if a == 0 {
        return false;
    }
    (r * 299 + g * 587 + b * 114) / 1000 >= 128
}

/// Collects the distinct ARGB8 colors in order of first appearance.
///
/// Gives up as soon as a 17th color shows up.
pub fn extract_palette(packed: &[u8]) -> Result<Vec<u8>> {
    let mut seen = [false; 256];
    let mut palette = Vec::with_capacity(PALETTE_MAX);

    for &value in packed {
        if seen[value as usize] {
            continue;
        }
        if palette.len() == PALETTE_MAX {
            return Err(RleError::UnsupportedPaletteSize(PALETTE_MAX + 1));
        }
        seen[value as usize] = true;
        palette.push(value);
    }
    Ok(palette)
}

/// How a color sprite will be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorClass {
    /// Only opaque black and white: stored as a monochrome bitmap
    Mono,
    /// At most 16 colors, stored as indices into this palette
    Palette(Vec<u8>),
    /// Too many colors for a palette: every pixel carries its ARGB8 value
    Packed,
}

/// Picks the cheapest representation for a stream of ARGB8 pixels.
pub fn classify(packed: &[u8]) -> ColorClass {
    match extract_palette(packed) {
        Ok(palette)
            if palette.len() <= 2
                && palette
                    .iter()
                    .all(|&c| c == ARGB8_OPAQUE_BLACK || c == ARGB8_OPAQUE_WHITE) =>
        {
            ColorClass::Mono
        }
        Ok(palette) => ColorClass::Palette(palette),
        Err(e) => {
            debug!("{e}, using packed 8-bit pixels");
            ColorClass::Packed
        }
    }
}
