//! Pixel formats and the fixed 8 byte container header.

use core::fmt;
use core::ops::Range;

use log::trace;

use crate::chunks::CHUNK_WIDTHS;
use crate::{Result, RleError, HEADER_SIZE, PALETTE_MAX};

const UNSCREEN_FLAG: u8 = 0x80;

/// Pixel layout of the device bitmap a container unpacks into.
///
/// The discriminant is the format code stored in header byte 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelFormat {
    /// 1 bit per pixel, black and white, no values or palette
    Mono1Bit = 0,
    /// 8 bits per pixel, every run carries a packed ARGB8 color
    Packed8Bit = 1,
    /// 1 bit palette index, up to 2 colors
    Palette1Bit = 2,
    /// 2 bit palette index, up to 4 colors
    Palette2Bit = 3,
    /// 4 bit palette index, up to 16 colors
    Palette4Bit = 4,
}

impl PixelFormat {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Mono1Bit),
            1 => Some(Self::Packed8Bit),
            2 => Some(Self::Palette1Bit),
            3 => Some(Self::Palette2Bit),
            4 => Some(Self::Palette4Bit),
            _ => None,
        }
    }

    /// Smallest palette format holding `colors` entries.
    pub fn for_palette_size(colors: usize) -> Result<Self> {
        match colors {
            0..=2 => Ok(Self::Palette1Bit),
            3..=4 => Ok(Self::Palette2Bit),
            5..=PALETTE_MAX => Ok(Self::Palette4Bit),
            _ => Err(RleError::UnsupportedPaletteSize(colors)),
        }
    }

    pub fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Mono1Bit | Self::Palette1Bit => 1,
            Self::Palette2Bit => 2,
            Self::Palette4Bit => 4,
            Self::Packed8Bit => 8,
        }
    }

    #[inline]
    pub fn pixels_per_byte(self) -> usize {
        8 / self.bits_per_pixel() as usize
    }

    /// Whether a values region follows the run lengths.
    #[inline]
    pub fn has_values(self) -> bool {
        self != Self::Mono1Bit
    }

    #[inline]
    pub fn has_palette(self) -> bool {
        self.palette_capacity() > 0
    }

    pub fn palette_capacity(self) -> usize {
        match self {
            Self::Mono1Bit | Self::Packed8Bit => 0,
            Self::Palette1Bit => 2,
            Self::Palette2Bit => 4,
            Self::Palette4Bit => 16,
        }
    }

    /// Row width in pixels once padded to whole bytes. Monochrome rows are
    /// further padded to a multiple of 4 bytes, the device's bitmap stride.
    pub fn padded_width(self, width: usize) -> usize {
        let unit = match self {
            Self::Mono1Bit => 32,
            _ => self.pixels_per_byte(),
        };
        width.div_ceil(unit) * unit
    }

    /// Bytes per row of the device bitmap.
    pub fn row_stride(self, width: usize) -> usize {
        self.padded_width(width) * self.bits_per_pixel() as usize / 8
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mono1Bit => "mono 1-bit",
            Self::Packed8Bit => "packed 8-bit ARGB",
            Self::Palette1Bit => "palette 1-bit",
            Self::Palette2Bit => "palette 2-bit",
            Self::Palette4Bit => "palette 4-bit",
        };
        f.write_str(name)
    }
}

/// Header byte 2: the RLE chunk width plus the unscreen flag in bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub width: u8,
    pub unscreen: bool,
}

impl ChunkSpec {
    pub const fn new(width: u8, unscreen: bool) -> Self {
        Self { width, unscreen }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        let flag = if self.unscreen { UNSCREEN_FLAG } else { 0 };
        self.width | flag
    }

    pub fn from_byte(byte: u8) -> Result<Self> {
        let width = byte & !UNSCREEN_FLAG;
        if !CHUNK_WIDTHS.contains(&width) {
            return Err(RleError::MalformedContainer(format!(
                "chunk width {width} is not one of {CHUNK_WIDTHS:?}"
            )));
        }
        Ok(Self {
            width,
            unscreen: byte & UNSCREEN_FLAG != 0,
        })
    }
}

impl fmt::Display for ChunkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unscreen {
            write!(f, "{}+unscreen", self.width)
        } else {
            write!(f, "{}", self.width)
        }
    }
}

/// The fixed header at the start of every container.
///
/// Offsets are absolute from the container start. Regions follow each other
/// without gaps: RLE `8..rle_end`, values `rle_end..values_end`, palette
/// `values_end..` to the end of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub width: u8,
    pub height: u8,
    pub chunk_spec: ChunkSpec,
    pub format: PixelFormat,
    pub rle_end: u16,
    pub values_end: u16,
}

impl ContainerHeader {
    /// Reads and validates the header of `data`, including the region
    /// offsets against the container length.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(RleError::MalformedContainer(format!(
                "{} bytes is shorter than the header",
                data.len()
            )));
        }

        let format = PixelFormat::from_code(data[3]).ok_or_else(|| {
            RleError::MalformedContainer(format!("unknown format code {}", data[3]))
        })?;
        let header = Self {
            width: data[0],
            height: data[1],
            chunk_spec: ChunkSpec::from_byte(data[2])?,
            format,
            rle_end: u16::from_le_bytes([data[4], data[5]]),
            values_end: u16::from_le_bytes([data[6], data[7]]),
        };
        trace!("container header: {header:?}");

        let rle_end = header.rle_end as usize;
        let values_end = header.values_end as usize;
        if rle_end < HEADER_SIZE || rle_end > values_end || values_end > data.len() {
            return Err(RleError::MalformedContainer(format!(
                "region offsets {rle_end}, {values_end} out of order for {} bytes",
                data.len()
            )));
        }
        if !format.has_values() && values_end != rle_end {
            return Err(RleError::MalformedContainer(format!(
                "{format} container with a values region"
            )));
        }
        if !format.has_palette() && values_end != data.len() {
            return Err(RleError::MalformedContainer(format!(
                "{format} container with a palette region"
            )));
        }
        Ok(header)
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[
            self.width,
            self.height,
            self.chunk_spec.to_byte(),
            self.format.code(),
        ]);
        out.extend_from_slice(&self.rle_end.to_le_bytes());
        out.extend_from_slice(&self.values_end.to_le_bytes());
    }

    #[inline]
    pub fn padded_width(&self) -> usize {
        self.format.padded_width(self.width as usize)
    }

    pub fn rle_range(&self) -> Range<usize> {
        HEADER_SIZE..self.rle_end as usize
    }

    pub fn values_range(&self) -> Range<usize> {
        self.rle_end as usize..self.values_end as usize
    }

    /// Palette bytes run to the end of a container of `len` bytes.
    pub fn palette_range(&self, len: usize) -> Range<usize> {
        self.values_end as usize..len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        for code in 0..5u8 {
            let format = PixelFormat::from_code(code).unwrap();
            assert_eq!(format.code(), code);
        }
        assert_eq!(PixelFormat::from_code(5), None);
        assert_eq!(PixelFormat::from_code(0xff), None);
    }

    #[test]
    fn test_palette_size_selection() {
        assert_eq!(PixelFormat::for_palette_size(1).unwrap(), PixelFormat::Palette1Bit);
        assert_eq!(PixelFormat::for_palette_size(2).unwrap(), PixelFormat::Palette1Bit);
        assert_eq!(PixelFormat::for_palette_size(3).unwrap(), PixelFormat::Palette2Bit);
        assert_eq!(PixelFormat::for_palette_size(4).unwrap(), PixelFormat::Palette2Bit);
        assert_eq!(PixelFormat::for_palette_size(5).unwrap(), PixelFormat::Palette4Bit);
        assert_eq!(PixelFormat::for_palette_size(16).unwrap(), PixelFormat::Palette4Bit);
        assert!(matches!(
            PixelFormat::for_palette_size(17),
            Err(RleError::UnsupportedPaletteSize(17))
        ));
    }

    #[test]
    fn test_padded_width() {
        assert_eq!(PixelFormat::Mono1Bit.padded_width(0), 0);
        assert_eq!(PixelFormat::Mono1Bit.padded_width(1), 32);
        assert_eq!(PixelFormat::Mono1Bit.padded_width(16), 32);
        assert_eq!(PixelFormat::Mono1Bit.padded_width(33), 64);
        assert_eq!(PixelFormat::Mono1Bit.row_stride(33), 8);

        assert_eq!(PixelFormat::Palette1Bit.padded_width(9), 16);
        assert_eq!(PixelFormat::Palette2Bit.padded_width(9), 12);
        assert_eq!(PixelFormat::Palette4Bit.padded_width(9), 10);
        assert_eq!(PixelFormat::Packed8Bit.padded_width(9), 9);
        assert_eq!(PixelFormat::Palette2Bit.row_stride(9), 3);
    }

    #[test]
    fn test_chunk_spec_byte() {
        let spec = ChunkSpec::new(1, true);
        assert_eq!(spec.to_byte(), 0x81);
        assert_eq!(ChunkSpec::from_byte(0x81).unwrap(), spec);
        assert_eq!(ChunkSpec::from_byte(4).unwrap(), ChunkSpec::new(4, false));
        assert_eq!(spec.to_string(), "1+unscreen");
        assert!(ChunkSpec::from_byte(3).is_err());
        assert!(ChunkSpec::from_byte(0x80).is_err());
    }

    #[test]
    fn test_header_write_parse() {
        let header = ContainerHeader {
            width: 14,
            height: 3,
            chunk_spec: ChunkSpec::new(2, false),
            format: PixelFormat::Palette2Bit,
            rle_end: 10,
            values_end: 12,
        };
        let mut data = Vec::new();
        header.write(&mut data);
        assert_eq!(data, vec![14, 3, 2, 3, 10, 0, 12, 0]);

        data.extend_from_slice(&[0; 4]);
        let parsed = ContainerHeader::parse(&data).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.rle_range(), 8..10);
        assert_eq!(parsed.values_range(), 10..12);
        assert_eq!(parsed.palette_range(data.len()), 12..14);
        assert_eq!(parsed.padded_width(), 16);
    }

    #[test]
    fn test_header_rejects_bad_offsets() {
        // short
        assert!(ContainerHeader::parse(&[1, 1, 1, 0]).is_err());
        // rle end inside the header
        assert!(ContainerHeader::parse(&[1, 1, 1, 0, 4, 0, 4, 0]).is_err());
        // values end past the buffer
        assert!(ContainerHeader::parse(&[1, 1, 1, 1, 8, 0, 20, 0, 0]).is_err());
        // offsets reversed
        assert!(ContainerHeader::parse(&[1, 1, 1, 1, 9, 0, 8, 0, 0]).is_err());
        // mono with a values region
        assert!(ContainerHeader::parse(&[1, 1, 1, 0, 8, 0, 9, 0, 0]).is_err());
        // unknown format
        assert!(ContainerHeader::parse(&[1, 1, 1, 9, 8, 0, 8, 0]).is_err());
    }
}
