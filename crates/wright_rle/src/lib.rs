//! # wright_rle
//!
//! A run-length sprite codec for watch faces. Sprites are packed at build
//! time into a compact container and unpacked on the device by a tiny C
//! decoder; the Rust [`decode`] mirrors that decoder bit for bit.
//!
//! ## Features
//!
//! - **Encoder**: classifies an RGBA sprite as monochrome, 2/4/16 color
//!   palette or packed 8-bit ARGB, then searches chunk widths for the
//!   smallest run-length stream and verifies it before returning.
//! - **Decoder**: exact inverse of the encoder, cropping the padded device
//!   bitmap back to the declared width.
//!
//! ## Quick Start
//!
//! ```
//! use wright_rle::{decode, encode, RasterImage, Variant};
//!
//! let mut image = RasterImage::new(4, 2);
//! image.set_pixel(1, 1, [255, 255, 255, 255]);
//!
//! let sprite = encode(&image, Variant::Monochrome)?;
//! let decoded = decode(&sprite.data)?;
//! assert_eq!(decoded.pixel(1, 1), [255, 255, 255, 255]);
//! # Ok::<(), wright_rle::RleError>(())
//! ```
//!
//! ## Container layout
//!
//! ```text
//! 0  width (unpadded)      4  RLE region end (u16 LE)
//! 1  height                6  values region end (u16 LE)
//! 2  chunk width | 0x80    8  RLE bytes, values bytes, palette bytes
//! 3  format code
//! ```

use thiserror::Error;

pub mod chunks;
pub mod color;
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod masks;
pub mod pixels;
pub mod raster;
pub mod runs;

pub use decoder::decode;
pub use encoder::{encode, encode_with_options, EncodeOptions, EncodedSprite, Variant};
pub use format::{ChunkSpec, ContainerHeader, PixelFormat};
pub use raster::RasterImage;
pub use masks::{split_transparency, TransparencyMasks};

/// Errors that can occur while packing or unpacking a sprite.
#[derive(Debug, Error)]
pub enum RleError {
    /// Width or height does not fit the single header byte
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Buffer size doesn't match expected size for dimensions
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Chunk width other than 1, 2, 4 or 8 bits
    #[error("invalid chunk width: {0}")]
    InvalidChunkWidth(u8),

    /// A region end offset does not fit in the 16-bit header field
    #[error("container too large: region ends at byte {0}")]
    ContainerTooLarge(usize),

    /// The encoded stream did not decode back to its source
    #[error("encode integrity check failed: {0}")]
    EncodeIntegrity(String),

    /// More distinct colors than the largest palette format holds
    #[error("unsupported palette size: {0} colors")]
    UnsupportedPaletteSize(usize),

    /// Header, offsets or run totals are inconsistent
    #[error("malformed container: {0}")]
    MalformedContainer(String),
}

/// Result type for sprite codec operations.
pub type Result<T> = core::result::Result<T, RleError>;

/// Largest width or height a container can describe.
pub const MAX_DIMENSION: usize = 0xff;

/// Size in bytes of the fixed container header.
pub const HEADER_SIZE: usize = 8;

/// Largest palette any pixel format carries.
pub const PALETTE_MAX: usize = 16;
