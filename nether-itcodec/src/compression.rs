//! IT214/IT215 sample decompression
//!
//! Compressed samples are stored as a sequence of chunks, each a `u16`
//! little-endian byte length followed by that many bytes of bit-packed
//! deltas. A chunk decodes into one block of at most 0x8000 (8-bit) or
//! 0x4000 (16-bit) samples and starts from fresh delta state.
//!
//! Within a block the bit width of the next value adapts through in-band
//! escape codes. How an escape is recognised depends on the current width:
//!
//! - **Low** (1-6 bits): the value `1 << (width - 1)` is followed by a
//!   `fetch_width`-bit width code.
//! - **Mid** (7 up to `default_width - 1`): values in a small window around
//!   the top bit carry the width code themselves.
//! - **Max** (`default_width`): a set top bit means the low bits are the new
//!   width minus one.

use std::io::Read;

use log::{debug, trace, warn};

use crate::bitstream::BitReader;
use crate::{IT215_VERSION, ItCodecError, MAX_BLOCK_LENGTH_8BIT, MAX_BLOCK_LENGTH_16BIT};

/// Width and escape constants for one sample bit depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    /// Smallest delta representable at each width (index = width - 1)
    pub lower_table: &'static [i16],
    /// Largest delta representable at each width (index = width - 1)
    pub upper_table: &'static [i16],
    /// Bits read for a new width code in low-width mode
    pub fetch_width: u32,
    /// Start of the mid-width escape window, relative to the top bit
    pub lower_bias: i32,
    /// End of the mid-width escape window, relative to the top bit
    pub upper_bias: i32,
    /// Starting and maximum bit width
    pub default_width: u32,
}

impl CodecParams {
    /// Parameters for 8-bit samples
    pub const EIGHT_BIT: Self = Self {
        lower_table: &[0, -1, -3, -7, -15, -31, -60, -124, -128],
        upper_table: &[0, 1, 3, 7, 15, 31, 59, 123, 127],
        fetch_width: 3,
        lower_bias: -4,
        upper_bias: 3,
        default_width: 9,
    };

    /// Parameters for 16-bit samples
    pub const SIXTEEN_BIT: Self = Self {
        lower_table: &[
            0, -1, -3, -7, -15, -31, -56, -120, -248, -504, -1016, -2040, -4088, -8184, -16376,
            -32760, -32768,
        ],
        upper_table: &[
            0, 1, 3, 7, 15, 31, 55, 119, 247, 503, 1015, 2039, 4087, 8183, 16375, 32759, 32767,
        ],
        fetch_width: 4,
        lower_bias: -8,
        upper_bias: 7,
        default_width: 17,
    };
}

/// How the current width interprets the next value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidthMode {
    Low,
    Mid,
    Max,
}

impl WidthMode {
    fn of(width: u32, params: &CodecParams) -> Self {
        if width <= 6 {
            Self::Low
        } else if width < params.default_width {
            Self::Mid
        } else {
            Self::Max
        }
    }
}

/// Delta state for a single block
struct BlockState {
    width: u32,
    mem1: i32,
    mem2: i32,
}

impl BlockState {
    fn new(params: &CodecParams) -> Self {
        Self {
            width: params.default_width,
            mem1: 0,
            mem2: 0,
        }
    }

    /// Relative width change; the result never equals the current width
    fn change_width(&mut self, code: u32) {
        let mut width = code + 1;
        if width >= self.width {
            width += 1;
        }
        self.width = width;
    }

    /// Accumulate one delta, returning the unnarrowed running value
    fn apply(&mut self, value: u32, top_bit: u32, it215: bool) -> i32 {
        let mut delta = value as i32;
        if value & top_bit != 0 {
            delta -= (top_bit << 1) as i32;
        }
        self.mem1 = self.mem1.wrapping_add(delta);
        self.mem2 = self.mem2.wrapping_add(self.mem1);
        if it215 { self.mem2 } else { self.mem1 }
    }
}

/// IT sample decompressor
///
/// # Example
///
/// ```
/// use nether_itcodec::SampleCodec;
///
/// // One chunk: 2-byte length, then a single 9-bit value of 5
/// let data = [0x02, 0x00, 0x05, 0x00];
/// let samples = SampleCodec::new(false, false).decode(&mut &data[..], 1).unwrap();
/// assert_eq!(samples, vec![5]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCodec {
    /// Second-order delta mode, used by files saved with IT 2.15 or later
    pub it215: bool,
    /// Decode 16-bit samples (8-bit otherwise)
    pub is_16bit: bool,
}

impl SampleCodec {
    /// Create a codec for the given bit depth and delta order
    pub const fn new(is_16bit: bool, it215: bool) -> Self {
        Self { it215, is_16bit }
    }

    /// Create a codec for a file written by tracker version `cwtv`
    pub const fn for_version(is_16bit: bool, cwtv: u16) -> Self {
        Self::new(is_16bit, cwtv >= IT215_VERSION)
    }

    /// Parameter set for this codec's bit depth
    pub const fn params(&self) -> &'static CodecParams {
        if self.is_16bit {
            &CodecParams::SIXTEEN_BIT
        } else {
            &CodecParams::EIGHT_BIT
        }
    }

    /// Largest number of samples a single chunk decodes to
    pub const fn max_block_length(&self) -> usize {
        if self.is_16bit {
            MAX_BLOCK_LENGTH_16BIT
        } else {
            MAX_BLOCK_LENGTH_8BIT
        }
    }

    /// Decode `sample_length` samples, pulling as many chunks from `reader`
    /// as needed
    ///
    /// 8-bit samples come back sign-extended into `i16`; see
    /// [`SampleCodec::decode_i8`] for narrowed output. The reader is left
    /// positioned after the last chunk consumed, which is where the next
    /// channel of a stereo sample begins.
    pub fn decode<R: Read>(
        &self,
        reader: &mut R,
        sample_length: usize,
    ) -> Result<Vec<i16>, ItCodecError> {
        // The length comes from an untrusted header; grow a block at a time
        let mut output = Vec::with_capacity(sample_length.min(self.max_block_length()));
        let mut chunks = 0usize;

        while output.len() < sample_length {
            let payload = read_chunk(reader)?;
            let block_length = (sample_length - output.len()).min(self.max_block_length());
            trace!(
                "IT sample chunk {}: {} bytes -> {} samples",
                chunks,
                payload.len(),
                block_length
            );

            self.decode_into(&payload, block_length, &mut output)?;
            chunks += 1;
        }

        debug!(
            "Decoded {} {}-bit samples from {} chunks",
            output.len(),
            if self.is_16bit { 16 } else { 8 },
            chunks
        );
        Ok(output)
    }

    /// Decode and narrow to 8-bit samples
    pub fn decode_i8<R: Read>(
        &self,
        reader: &mut R,
        sample_length: usize,
    ) -> Result<Vec<i8>, ItCodecError> {
        let samples = self.decode(reader, sample_length)?;
        Ok(samples.into_iter().map(|s| s as i8).collect())
    }

    /// Decode one block of `block_length` samples from a chunk payload
    /// (without its length prefix)
    pub fn decode_block(
        &self,
        payload: &[u8],
        block_length: usize,
    ) -> Result<Vec<i16>, ItCodecError> {
        let mut output = Vec::with_capacity(block_length.min(self.max_block_length()));
        self.decode_into(payload, block_length, &mut output)?;
        Ok(output)
    }

    fn decode_into(
        &self,
        payload: &[u8],
        block_length: usize,
        output: &mut Vec<i16>,
    ) -> Result<(), ItCodecError> {
        let params = self.params();
        let mut bits = BitReader::new(payload);
        let mut state = BlockState::new(params);
        let mut remaining = block_length;

        while remaining > 0 {
            if state.width > params.default_width {
                warn!(
                    "IT sample block corrupt: width {} exceeds {} with {} samples left",
                    state.width, params.default_width, remaining
                );
                return Err(ItCodecError::DecodingError {
                    width: state.width,
                    max: params.default_width,
                });
            }

            let value = bits.read(state.width)?;
            let top_bit = 1u32 << (state.width - 1);

            let decoded = match WidthMode::of(state.width, params) {
                WidthMode::Low => {
                    if value == top_bit {
                        let code = bits.read(params.fetch_width)?;
                        state.change_width(code);
                        None
                    } else {
                        Some(state.apply(value, top_bit, self.it215))
                    }
                }
                WidthMode::Mid => {
                    let window_start = top_bit as i32 + params.lower_bias;
                    let window_end = top_bit as i32 + params.upper_bias;
                    let signed = value as i32;
                    if (window_start..=window_end).contains(&signed) {
                        state.change_width((signed - window_start) as u32);
                        None
                    } else {
                        Some(state.apply(value, top_bit, self.it215))
                    }
                }
                WidthMode::Max => {
                    if value & top_bit != 0 {
                        state.width = (value & !top_bit) + 1;
                        None
                    } else {
                        Some(state.apply(value & !top_bit, 0, self.it215))
                    }
                }
            };

            if let Some(sample) = decoded {
                output.push(self.narrow(sample));
                remaining -= 1;
            }
        }

        Ok(())
    }

    /// Truncate an accumulator to the native sample width
    fn narrow(&self, value: i32) -> i16 {
        if self.is_16bit {
            value as i16
        } else {
            i16::from(value as i8)
        }
    }
}

/// Read one length-prefixed chunk
fn read_chunk<R: Read>(reader: &mut R) -> Result<Vec<u8>, ItCodecError> {
    let mut len = [0u8; 2];
    reader.read_exact(&mut len)?;

    let mut payload = vec![0u8; u16::from_le_bytes(len) as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}
