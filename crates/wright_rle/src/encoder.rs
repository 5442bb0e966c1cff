//! Sprite encoder: classifies the image, reduces it to runs, searches the
//! chunk widths for the smallest stream and checks that stream against the
//! decoder before building the container.

use log::{debug, info};

use crate::chunks::{
    check_chunk_width, pack_chunks, pack_fixed, unpack_chunks, unpack_fixed, CHUNK_WIDTHS,
};
use crate::color::{classify, is_light, ColorClass, ARGB8_OPAQUE_WHITE};
use crate::format::{ChunkSpec, ContainerHeader, PixelFormat};
use crate::pixels::{argb8_plane, mono_plane, pad_rows, palette_indices, unscreen};
use crate::runs::{expand_mono_runs, expand_value_runs, mono_runs, value_runs};
use crate::{RasterImage, Result, RleError, HEADER_SIZE, MAX_DIMENSION};

/// Which family of container the caller wants for a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// 1-bit black and white, for displays without color
    Monochrome,
    /// Palette or packed 8-bit ARGB, whichever the image needs
    Color,
}

impl Variant {
    /// Resource naming convention of the watch-face build: files tagged
    /// `~color` get the color variant, all others are monochrome.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("~color") {
            Self::Color
        } else {
            Self::Monochrome
        }
    }
}

/// Options for the sprite encoder.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Also try the checkerboard-unscreened stream for monochrome sprites.
    /// Dithered artwork often shrinks dramatically this way.
    pub allow_unscreen: bool,

    /// Use this RLE chunk width (1, 2, 4 or 8) instead of searching for the
    /// smallest one.
    pub chunk_width: Option<u8>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            allow_unscreen: true,
            chunk_width: None,
        }
    }
}

/// A finished container and the parameters chosen for it.
#[derive(Clone, Debug)]
pub struct EncodedSprite {
    /// Container bytes, header included
    pub data: Vec<u8>,
    pub format: PixelFormat,
    pub chunk_spec: ChunkSpec,
    pub width: usize,
    pub height: usize,
}

impl EncodedSprite {
    /// Size of the uncompressed device bitmap the container unpacks into.
    pub fn raw_size(&self) -> usize {
        self.format.row_stride(self.width) * self.height
    }
}

/// Encode a sprite with default options.
///
/// # Example
/// ```
/// use wright_rle::{encode, PixelFormat, RasterImage, Variant};
///
/// let image = RasterImage::from_rgba(vec![255, 0, 0, 255, 0, 0, 255, 255], 2, 1)?;
/// let sprite = encode(&image, Variant::Color)?;
/// assert_eq!(sprite.format, PixelFormat::Palette1Bit);
/// # Ok::<(), wright_rle::RleError>(())
/// ```
#[inline]
#[must_use = "this returns the encoded sprite"]
pub fn encode(image: &RasterImage, variant: Variant) -> Result<EncodedSprite> {
    encode_with_options(image, variant, &EncodeOptions::default())
}

/// Encode a sprite into a run-length container.
///
/// # Errors
///
/// Returns an error if:
/// - width or height exceed 255, or the pixel buffer doesn't match them
/// - `opts.chunk_width` is not 1, 2, 4 or 8
/// - a region would end past byte 65535
/// - the chosen stream fails to decode back to its source, which is a codec
///   bug; no container is produced in that case
#[must_use = "this returns the encoded sprite"]
pub fn encode_with_options(
    image: &RasterImage,
    variant: Variant,
    opts: &EncodeOptions,
) -> Result<EncodedSprite> {
    let (width, height) = (image.width, image.height);
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RleError::InvalidDimensions { width, height });
    }
    let expected = width * height * 4;
    if image.pixels.len() != expected {
        return Err(RleError::BufferSizeMismatch {
            expected,
            actual: image.pixels.len(),
        });
    }
    if let Some(n) = opts.chunk_width {
        check_chunk_width(n)?;
    }

    let sprite = match variant {
        Variant::Monochrome => encode_mono(image, &mono_plane(image, is_light), opts)?,
        Variant::Color => {
            let argb8 = argb8_plane(image);
            match classify(&argb8) {
                ColorClass::Mono => {
                    let plane: Vec<u8> = argb8
                        .iter()
                        .map(|&v| u8::from(v == ARGB8_OPAQUE_WHITE))
                        .collect();
                    encode_mono(image, &plane, opts)?
                }
                ColorClass::Palette(palette) => {
                    let format = PixelFormat::for_palette_size(palette.len())?;
                    let indices = palette_indices(&argb8, &palette);
                    encode_values(image, format, &indices, &palette, opts)?
                }
                ColorClass::Packed => {
                    encode_values(image, PixelFormat::Packed8Bit, &argb8, &[], opts)?
                }
            }
        }
    };

    info!(
        "{}x{} {} sprite, chunk {}: {} vs. {} bytes",
        width,
        height,
        sprite.format,
        sprite.chunk_spec,
        sprite.data.len(),
        sprite.raw_size()
    );
    Ok(sprite)
}

fn chunk_widths(opts: &EncodeOptions) -> Vec<u8> {
    match opts.chunk_width {
        Some(n) => vec![n],
        None => CHUNK_WIDTHS.to_vec(),
    }
}

/// Packs every candidate and keeps the first of the smallest, then checks
/// that it unpacks to exactly the runs it was made from.
fn smallest_rle<'r>(
    candidates: &[(ChunkSpec, &'r [u64])],
) -> Result<(ChunkSpec, &'r [u64], Vec<u8>)> {
    let mut best: Option<(ChunkSpec, &'r [u64], Vec<u8>)> = None;
    for &(spec, runs) in candidates {
        let packed = pack_chunks(runs, spec.width)?;
        debug!("chunk {spec}: {} bytes", packed.len());
        if best.as_ref().map_or(true, |(_, _, b)| packed.len() < b.len()) {
            best = Some((spec, runs, packed));
        }
    }
    let (spec, runs, packed) =
        best.ok_or_else(|| RleError::EncodeIntegrity("no chunk width to try".to_string()))?;

    let verify = unpack_chunks(&packed, spec.width).map_err(integrity)?;
    if verify != runs {
        return Err(RleError::EncodeIntegrity(format!(
            "chunk {spec} unpacked {} runs, expected {}",
            verify.len(),
            runs.len()
        )));
    }
    Ok((spec, runs, packed))
}

fn region_end(offset: usize) -> Result<u16> {
    u16::try_from(offset).map_err(|_| RleError::ContainerTooLarge(offset))
}

fn integrity(err: RleError) -> RleError {
    match err {
        RleError::MalformedContainer(msg) => RleError::EncodeIntegrity(msg),
        other => other,
    }
}

fn encode_mono(image: &RasterImage, plane: &[u8], opts: &EncodeOptions) -> Result<EncodedSprite> {
    let format = PixelFormat::Mono1Bit;
    let (width, height) = (image.width, image.height);
    let padded_width = format.padded_width(width);

    let normal = pad_rows(plane, width, height, padded_width);
    let normal_runs = mono_runs(&normal);

    let screened = opts.allow_unscreen.then(|| {
        let mut screened = normal.clone();
        unscreen(&mut screened, padded_width, width);
        screened
    });
    let screened_runs = screened.as_deref().map(mono_runs).unwrap_or_default();

    let mut candidates: Vec<(ChunkSpec, &[u64])> = chunk_widths(opts)
        .into_iter()
        .map(|n| (ChunkSpec::new(n, false), normal_runs.as_slice()))
        .collect();
    if opts.allow_unscreen {
        let n = opts.chunk_width.unwrap_or(1);
        candidates.push((ChunkSpec::new(n, true), screened_runs.as_slice()));
    }

    let (chunk_spec, runs, rle) = smallest_rle(&candidates)?;
    let source = match &screened {
        Some(screened) if chunk_spec.unscreen => screened,
        _ => &normal,
    };
    let pixels = expand_mono_runs(runs, source.len()).map_err(integrity)?;
    if &pixels != source {
        return Err(RleError::EncodeIntegrity(
            "monochrome runs do not rebuild the bitmap".to_string(),
        ));
    }

    let end = region_end(HEADER_SIZE + rle.len())?;
    let header = ContainerHeader {
        width: width as u8,
        height: height as u8,
        chunk_spec,
        format,
        rle_end: end,
        values_end: end,
    };

    let mut data = Vec::with_capacity(HEADER_SIZE + rle.len());
    header.write(&mut data);
    data.extend_from_slice(&rle);

    Ok(EncodedSprite {
        data,
        format,
        chunk_spec,
        width,
        height,
    })
}

fn encode_values(
    image: &RasterImage,
    format: PixelFormat,
    plane: &[u8],
    palette: &[u8],
    opts: &EncodeOptions,
) -> Result<EncodedSprite> {
    let (width, height) = (image.width, image.height);
    let padded = pad_rows(plane, width, height, format.padded_width(width));
    let (values, runs) = value_runs(&padded);

    let candidates: Vec<(ChunkSpec, &[u64])> = chunk_widths(opts)
        .into_iter()
        .map(|n| (ChunkSpec::new(n, false), runs.as_slice()))
        .collect();
    let (chunk_spec, runs, rle) = smallest_rle(&candidates)?;

    let vn = format.bits_per_pixel();
    let value_bytes = pack_fixed(&values, vn);
    let verify = unpack_fixed(&value_bytes, vn, values.len());
    if verify != values {
        return Err(RleError::EncodeIntegrity(format!(
            "{vn}-bit values do not unpack to their source"
        )));
    }
    let pixels = expand_value_runs(&verify, runs, padded.len()).map_err(integrity)?;
    if pixels != padded {
        return Err(RleError::EncodeIntegrity(
            "value runs do not rebuild the bitmap".to_string(),
        ));
    }

    let rle_end = HEADER_SIZE + rle.len();
    let values_end = rle_end + value_bytes.len();
    let header = ContainerHeader {
        width: width as u8,
        height: height as u8,
        chunk_spec,
        format,
        rle_end: region_end(rle_end)?,
        values_end: region_end(values_end)?,
    };

    let mut data = Vec::with_capacity(values_end + palette.len());
    header.write(&mut data);
    data.extend_from_slice(&rle);
    data.extend_from_slice(&value_bytes);
    data.extend_from_slice(palette);

    Ok(EncodedSprite {
        data,
        format,
        chunk_spec,
        width,
        height,
    })
}
