//! Little-endian bit reader used by the sample codec

use crate::ItCodecError;

/// Reads unsigned integers of arbitrary width from a byte slice, LSB first
///
/// Bits are consumed from bit 0 of each byte upward, and bytes in order, so
/// a value spanning a byte boundary takes its low bits from the earlier byte.
pub struct BitReader<'a> {
    source: &'a [u8],
    read_pos: usize,
    /// Pending bits, next bit to consume in bit 0
    buffer: u64,
    /// Valid bits in `buffer` (always < 64)
    buffered: u32,
}

impl<'a> BitReader<'a> {
    /// Create a reader over `source`
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            read_pos: 0,
            buffer: 0,
            buffered: 0,
        }
    }

    /// Read the next `width` bits (0-31) as an unsigned value
    ///
    /// A failed read leaves the reader untouched, so a later, narrower read
    /// still sees the same bits.
    pub fn read(&mut self, width: u32) -> Result<u32, ItCodecError> {
        if width >= 32 {
            return Err(ItCodecError::BadParameter { width });
        }

        if self.buffered < width {
            let needed = (width - self.buffered).div_ceil(8) as usize;
            if self.source.len() - self.read_pos < needed {
                return Err(ItCodecError::EndOfStream);
            }

            while self.buffered < width {
                self.buffer |= u64::from(self.source[self.read_pos]) << self.buffered;
                self.read_pos += 1;
                self.buffered += 8;
            }
        }

        let value = (self.buffer & ((1u64 << width) - 1)) as u32;
        self.buffer >>= width;
        self.buffered -= width;

        Ok(value)
    }

    /// Bytes pulled from the source so far (including partially consumed ones)
    pub fn bytes_consumed(&self) -> usize {
        self.read_pos
    }

    /// Bits still available, buffered or not
    pub fn bits_remaining(&self) -> usize {
        (self.source.len() - self.read_pos) * 8 + self.buffered as usize
    }
}
