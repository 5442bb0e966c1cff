//! Self-delimiting variable-width integers.
//!
//! A positive integer `v` is split into `k` groups of `n` bits, where `k` is
//! the smallest count that holds `v`. The groups are preceded by `k - 1`
//! zero groups, so the reader learns the length by counting zeros up to the
//! first non-zero group (the most significant group of a minimal encoding
//! is never zero). Groups are packed MSB-first into bytes and the last byte
//! is padded with zero bits, which the reader sees as an unterminated
//! prefix and treats as end of stream.
//!
//! ```text
//! v = 5, n = 1:  0 0 | 1 0 1
//! v = 16, n = 4: 0000 | 0001 0000
//! ```

use crate::{Result, RleError};

/// Chunk widths the device decoder supports, in search order.
pub const CHUNK_WIDTHS: [u8; 4] = [1, 2, 4, 8];

/// Fails unless `n` divides a byte evenly.
pub fn check_chunk_width(n: u8) -> Result<()> {
    if CHUNK_WIDTHS.contains(&n) {
        Ok(())
    } else {
        Err(RleError::InvalidChunkWidth(n))
    }
}

#[inline]
fn chunk_mask(n: u8) -> u8 {
    ((1u16 << n) - 1) as u8
}

#[inline]
fn bit_length(v: u64) -> u32 {
    u64::BITS - v.leading_zeros()
}

/// Splits every value into its zero-prefixed sequence of `n`-bit symbols.
///
/// Zero cannot be represented and is rejected, since the reader would take
/// it for part of the next value's prefix.
pub fn chop(values: &[u64], n: u8) -> Result<Vec<u8>> {
    check_chunk_width(n)?;
    let width = u32::from(n);
    let mask = u64::from(chunk_mask(n));

    let mut symbols = Vec::with_capacity(values.len());
    for &v in values {
        if v == 0 {
            return Err(RleError::EncodeIntegrity(
                "zero cannot be chunk encoded".to_string(),
            ));
        }
        let num_chunks = bit_length(v).div_ceil(width);
        symbols.extend(std::iter::repeat(0).take(num_chunks as usize - 1));
        for x in 0..num_chunks {
            let shift = (num_chunks - x - 1) * width;
            symbols.push(((v >> shift) & mask) as u8);
        }
    }
    Ok(symbols)
}

/// Packs `n`-bit symbols MSB-first into bytes, zero padding the last byte.
///
/// Only the low `n` bits of each symbol are kept.
pub fn pack_fixed(symbols: &[u8], n: u8) -> Vec<u8> {
    let mask = chunk_mask(n);
    let mut out = Vec::with_capacity((symbols.len() * n as usize).div_ceil(8));
    let mut acc = 0u8;
    let mut used = 0u8;

    for &s in symbols {
        acc |= (s & mask) << (8 - used - n);
        used += n;
        if used == 8 {
            out.push(acc);
            acc = 0;
            used = 0;
        }
    }
    if used > 0 {
        out.push(acc);
    }
    out
}

/// Reads up to `count` fixed `n`-bit symbols; fewer are returned when `data`
/// runs out first.
pub fn unpack_fixed(data: &[u8], n: u8, count: usize) -> Vec<u8> {
    let mask = chunk_mask(n);
    let per_byte = (8 / n) as usize;
    let available = count.min(data.len() * per_byte);

    (0..available)
        .map(|i| {
            let byte = data[i / per_byte];
            let shift = 8 - n * (1 + (i % per_byte) as u8);
            (byte >> shift) & mask
        })
        .collect()
}

/// Chunk encodes and packs a sequence of positive integers.
pub fn pack_chunks(values: &[u64], n: u8) -> Result<Vec<u8>> {
    Ok(pack_fixed(&chop(values, n)?, n))
}

/// Unpacks every value of a chunk encoded stream.
pub fn unpack_chunks(data: &[u8], n: u8) -> Result<Vec<u64>> {
    ChunkReader::new(data, n)?.collect()
}

/// Cursor over a packed chunk stream, reading one value at a time the way
/// the device decoder does.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    n: u32,
    index: usize,
    // bits not yet consumed in data[index], counted from the top
    bits_left: u32,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8], n: u8) -> Result<Self> {
        check_chunk_width(n)?;
        Ok(Self {
            data,
            n: u32::from(n),
            index: 0,
            bits_left: 8,
        })
    }

    #[inline]
    fn consume(&mut self, bits: u32) {
        self.bits_left -= bits;
        if self.bits_left == 0 {
            self.index += 1;
            self.bits_left = 8;
        }
    }

    /// Returns the next value, or `None` once the stream is exhausted.
    ///
    /// Values wider than 64 bits can only come from a corrupt stream and are
    /// reported as malformed.
    pub fn next_value(&mut self) -> Result<Option<u64>> {
        let mask = u32::from(chunk_mask(self.n as u8));

        let mut zero_count = 0u32;
        loop {
            let Some(&byte) = self.data.get(self.index) else {
                return Ok(None);
            };
            let chunk = (u32::from(byte) >> (self.bits_left - self.n)) & mask;
            if chunk != 0 {
                break;
            }
            zero_count += 1;
            self.consume(self.n);
        }

        let mut bit_count = (zero_count + 1) * self.n;
        if bit_count > u64::BITS {
            return Err(RleError::MalformedContainer(format!(
                "chunk value of {bit_count} bits at byte {}",
                self.index
            )));
        }

        let mut result = 0u64;
        while bit_count > 0 {
            let Some(&byte) = self.data.get(self.index) else {
                break;
            };
            let take = bit_count.min(self.bits_left);
            let bits = (u64::from(byte) >> (self.bits_left - take)) & ((1u64 << take) - 1);
            result = (result << take) | bits;
            bit_count -= take;
            self.consume(take);
        }

        Ok(Some(result))
    }
}

impl Iterator for ChunkReader<'_> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}
