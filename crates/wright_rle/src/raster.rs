use crate::{Result, RleError};

/// An RGBA8 raster, the input of the encoder and the output of the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// RGBA pixel data (4 bytes per pixel: R, G, B, A), row-major
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl RasterImage {
    /// A fully transparent image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    /// Wraps an RGBA buffer, checking its length against the dimensions.
    pub fn from_rgba(pixels: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(RleError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let idx = (y * self.width + x) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Iterates pixels in row-major order.
    pub fn rgba_pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }
}
