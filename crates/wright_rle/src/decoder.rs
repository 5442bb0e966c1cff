//! Sprite decoder, the exact inverse of the encoder.
//!
//! Follows the device decoder step for step: the run lengths rebuild the
//! padded bitmap, values and palette turn it into colors, and the padding
//! columns are cropped off last.

use log::{debug, trace};

use crate::chunks::{unpack_chunks, unpack_fixed};
use crate::color::unpack_argb8;
use crate::format::{ContainerHeader, PixelFormat};
use crate::pixels::{crop_rows, unscreen};
use crate::runs::{expand_mono_runs, expand_value_runs};
use crate::{RasterImage, Result, RleError};

/// RGBA of a clear monochrome pixel.
pub const MONO_BLACK: [u8; 4] = [0, 0, 0, 255];
/// RGBA of a set monochrome pixel.
pub const MONO_WHITE: [u8; 4] = [255, 255, 255, 255];

/// Decodes a complete container into an RGBA image of the declared size.
///
/// Monochrome containers decode to opaque black and white. Color containers
/// decode to the 2-bit-per-channel colors they store, so an image made of
/// such colors survives a round trip unchanged.
///
/// # Example
///
/// ```rust
/// use wright_rle::decode;
///
/// // 2x1 monochrome, chunk width 8: phantom black + 1 black, then 1 white,
/// // then the 30 padding pixels
/// let data = [2, 1, 8, 0, 11, 0, 11, 0, 2, 1, 30];
/// let image = decode(&data)?;
/// assert_eq!(image.pixel(0, 0), [0, 0, 0, 255]);
/// assert_eq!(image.pixel(1, 0), [255, 255, 255, 255]);
/// # Ok::<(), wright_rle::RleError>(())
/// ```
///
/// # Errors
///
/// Returns [`RleError::MalformedContainer`] if:
/// - the header is short, has an unknown format or chunk width, or its
///   region offsets are out of order or past the end of `data`
/// - the runs do not cover exactly the padded bitmap
/// - the values region is not exactly one value per run
/// - the palette is larger than the format allows or a pixel indexes past it
#[must_use = "this returns the decoded RasterImage"]
pub fn decode(data: &[u8]) -> Result<RasterImage> {
    let header = ContainerHeader::parse(data)?;
    let width = header.width as usize;
    let height = header.height as usize;
    let padded_width = header.padded_width();
    let total = padded_width * height;

    let runs = unpack_chunks(&data[header.rle_range()], header.chunk_spec.width)?;
    trace!("{} runs for {total} pixels", runs.len());

    let mut pixels = Vec::with_capacity(width * height * 4);
    match header.format {
        PixelFormat::Mono1Bit => {
            let mut plane = expand_mono_runs(&runs, total)?;
            if header.chunk_spec.unscreen {
                unscreen(&mut plane, padded_width, width);
            }
            for bit in crop_rows(&plane, padded_width, width, height) {
                let color = if bit != 0 { MONO_WHITE } else { MONO_BLACK };
                pixels.extend_from_slice(&color);
            }
        }
        format => {
            if header.chunk_spec.unscreen {
                debug!("ignoring unscreen flag on a {format} container");
            }
            let vn = format.bits_per_pixel();
            let value_bytes = &data[header.values_range()];
            let expected_bytes = (runs.len() * vn as usize).div_ceil(8);
            if value_bytes.len() != expected_bytes {
                return Err(RleError::MalformedContainer(format!(
                    "{} value bytes for {} runs, expected {expected_bytes}",
                    value_bytes.len(),
                    runs.len()
                )));
            }
            let values = unpack_fixed(value_bytes, vn, runs.len());
            let plane = expand_value_runs(&values, &runs, total)?;
            let plane = crop_rows(&plane, padded_width, width, height);

            if format.has_palette() {
                let palette = &data[header.palette_range(data.len())];
                if palette.len() > format.palette_capacity() {
                    return Err(RleError::MalformedContainer(format!(
                        "{} palette entries for {format}",
                        palette.len()
                    )));
                }
                for index in plane {
                    let color = palette.get(index as usize).ok_or_else(|| {
                        RleError::MalformedContainer(format!(
                            "palette index {index} past {} entries",
                            palette.len()
                        ))
                    })?;
                    pixels.extend_from_slice(&unpack_argb8(*color));
                }
            } else {
                for value in plane {
                    pixels.extend_from_slice(&unpack_argb8(value));
                }
            }
        }
    }

    RasterImage::from_rgba(pixels, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::{pack_chunks, pack_fixed};
    use crate::format::ChunkSpec;

    fn container(
        width: u8,
        height: u8,
        spec: ChunkSpec,
        format: PixelFormat,
        rle: &[u8],
        values: &[u8],
        palette: &[u8],
    ) -> Vec<u8> {
        let rle_end = (8 + rle.len()) as u16;
        let header = ContainerHeader {
            width,
            height,
            chunk_spec: spec,
            format,
            rle_end,
            values_end: rle_end + values.len() as u16,
        };
        let mut data = Vec::new();
        header.write(&mut data);
        data.extend_from_slice(rle);
        data.extend_from_slice(values);
        data.extend_from_slice(palette);
        data
    }

    #[test]
    fn test_decode_mono() {
        // 16x1: 5 black, 5 white, 6 black, then 16 padding pixels
        let rle = pack_chunks(&[6, 5, 22], 4).unwrap();
        let data = container(
            16,
            1,
            ChunkSpec::new(4, false),
            PixelFormat::Mono1Bit,
            &rle,
            &[],
            &[],
        );
        let image = decode(&data).unwrap();
        assert_eq!((image.width, image.height), (16, 1));
        for x in 0..16 {
            let expected = if (5..10).contains(&x) { MONO_WHITE } else { MONO_BLACK };
            assert_eq!(image.pixel(x, 0), expected, "x={x}");
        }
    }

    #[test]
    fn test_decode_applies_unscreen() {
        // an all-black stream with the flag set decodes to a checkerboard
        let rle = pack_chunks(&[33], 8).unwrap();
        let data = container(
            2,
            1,
            ChunkSpec::new(8, true),
            PixelFormat::Mono1Bit,
            &rle,
            &[],
            &[],
        );
        let image = decode(&data).unwrap();
        assert_eq!(image.pixel(0, 0), MONO_BLACK);
        assert_eq!(image.pixel(1, 0), MONO_WHITE);
    }

    #[test]
    fn test_decode_palette() {
        // 3x1 palette 2-bit: indices 2, 2, 1 plus one padding index 0
        let rle = pack_chunks(&[2, 1, 1], 2).unwrap();
        let values = pack_fixed(&[2, 1, 0], 2);
        let palette = [0xc0, 0xf0, 0xcc];
        let data = container(
            3,
            1,
            ChunkSpec::new(2, false),
            PixelFormat::Palette2Bit,
            &rle,
            &values,
            &palette,
        );
        let image = decode(&data).unwrap();
        assert_eq!(image.pixel(0, 0), [0, 255, 0, 255]);
        assert_eq!(image.pixel(1, 0), [0, 255, 0, 255]);
        assert_eq!(image.pixel(2, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_packed() {
        let rle = pack_chunks(&[1, 2], 1).unwrap();
        let values = [0xf0, 0x40];
        let data = container(
            3,
            1,
            ChunkSpec::new(1, false),
            PixelFormat::Packed8Bit,
            &rle,
            &values,
            &[],
        );
        let image = decode(&data).unwrap();
        assert_eq!(image.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(image.pixel(2, 0), [0, 0, 0, 85]);
    }

    #[test]
    fn test_decode_rejects_short_runs() {
        let rle = pack_chunks(&[6, 5], 4).unwrap();
        let data = container(
            16,
            1,
            ChunkSpec::new(4, false),
            PixelFormat::Mono1Bit,
            &rle,
            &[],
            &[],
        );
        assert!(matches!(decode(&data), Err(RleError::MalformedContainer(_))));
    }

    #[test]
    fn test_decode_rejects_missing_values() {
        let rle = pack_chunks(&[1, 2], 1).unwrap();
        let data = container(
            3,
            1,
            ChunkSpec::new(1, false),
            PixelFormat::Packed8Bit,
            &rle,
            &[0xf0],
            &[],
        );
        assert!(matches!(decode(&data), Err(RleError::MalformedContainer(_))));
    }

    #[test]
    fn test_decode_rejects_extra_values() {
        // two runs of 1-bit indices fit one byte; a second byte is padding
        let rle = pack_chunks(&[3, 5], 1).unwrap();
        let data = container(
            2,
            1,
            ChunkSpec::new(1, false),
            PixelFormat::Palette1Bit,
            &rle,
            &[0b0100_0000, 0],
            &[0xc0, 0xff],
        );
        assert!(matches!(decode(&data), Err(RleError::MalformedContainer(_))));

        let mut trimmed = data.clone();
        trimmed.remove(8 + rle.len() + 1);
        let end = (8 + rle.len() + 1) as u16;
        trimmed[6..8].copy_from_slice(&end.to_le_bytes());
        let image = decode(&trimmed).unwrap();
        assert_eq!(image.pixel(0, 0), MONO_BLACK);
        assert_eq!(image.pixel(1, 0), MONO_BLACK);
    }

    #[test]
    fn test_decode_rejects_palette_index_out_of_range() {
        let rle = pack_chunks(&[8], 1).unwrap();
        let values = pack_fixed(&[1], 1);
        let data = container(
            2,
            1,
            ChunkSpec::new(1, false),
            PixelFormat::Palette1Bit,
            &rle,
            &values,
            &[0xc0],
        );
        assert!(matches!(decode(&data), Err(RleError::MalformedContainer(_))));
    }

    #[test]
    fn test_decode_rejects_oversized_palette() {
        let rle = pack_chunks(&[8], 1).unwrap();
        let values = pack_fixed(&[0], 1);
        let data = container(
            2,
            1,
            ChunkSpec::new(1, false),
            PixelFormat::Palette1Bit,
            &rle,
            &values,
            &[0xc0, 0xff, 0xf0],
        );
        assert!(matches!(decode(&data), Err(RleError::MalformedContainer(_))));
    }
}
