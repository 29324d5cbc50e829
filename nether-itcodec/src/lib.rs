//! Nether-ITCodec: IT (Impulse Tracker) sample decompression and pattern unpacking
//!
//! This crate implements the two packed sub-formats inside an IT module, once
//! the surrounding headers have located their byte ranges:
//!
//! - **Compressed samples** (IT214/IT215): adaptive bit-width delta coding in
//!   independently decodable, length-prefixed chunks
//! - **Packed patterns**: channel-mask driven row data with per-channel
//!   "repeat last value" state, normalised into [`PatternEntry`] events
//!
//! Both decoders are pure functions over borrowed input. They fail on the
//! first inconsistency instead of returning partial data.
//!
//! # Usage
//!
//! ```ignore
//! use nether_itcodec::{SampleCodec, decode_pattern};
//!
//! // `it_data` is the whole file, offsets and counts come from its headers
//! let mut sample_bytes = &it_data[sample_offset..];
//! let pcm = SampleCodec::for_version(is_16bit, cwtv).decode(&mut sample_bytes, length)?;
//!
//! let pattern = decode_pattern(&it_data[data_start..data_end], num_rows)?;
//! for (row, entries) in pattern.rows.iter().enumerate() {
//!     println!("row {}: {} entries", row, entries.entries.len());
//! }
//! ```
//!
//! # Format Reference
//!
//! - Impulse Tracker Technical Specification (ITTECH.TXT)
//! - <https://github.com/schismtracker/schismtracker/wiki/ITTECH.TXT>

mod bitstream;
mod compression;
mod error;
mod pattern;
mod sample;

pub use bitstream::BitReader;
pub use compression::{CodecParams, SampleCodec};
pub use error::ItCodecError;
pub use pattern::{
    ChannelMask, DecodedPattern, PATTERN_HEADER_SIZE, PatternEntry, PatternRow, VolumeCommand,
    decode_pattern, translate_note, translate_volume, unpack_pattern,
};
pub use sample::{ConvertFlags, SampleData, SampleFlags, SampleLayout, load_sample_data};

// =============================================================================
// Constants
// =============================================================================

/// Number of channels a pattern can address
pub const MAX_CHANNELS: u8 = 64;

/// Samples per compressed block for 8-bit data
pub const MAX_BLOCK_LENGTH_8BIT: usize = 0x8000;

/// Samples per compressed block for 16-bit data (same 32 KiB of PCM)
pub const MAX_BLOCK_LENGTH_16BIT: usize = 0x4000;

/// First tracker version (Cwt/v) that writes second-order compressed samples
pub const IT215_VERSION: u16 = 0x0215;

// =============================================================================
// Note Constants
// =============================================================================

/// Decoded note value for "note fade"
pub const NOTE_FADE: u8 = 253;

/// Note value for "note cut" (===)
pub const NOTE_CUT: u8 = 254;

/// Note value for "note off" (^^^)
pub const NOTE_OFF: u8 = 255;

/// Highest decoded pitched note (raw 120 + 1)
pub const NOTE_MAX: u8 = 121;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_lengths_cover_32k_of_pcm() {
        assert_eq!(MAX_BLOCK_LENGTH_8BIT, 32 * 1024);
        assert_eq!(MAX_BLOCK_LENGTH_16BIT * 2, 32 * 1024);
    }

    #[test]
    fn test_note_constants() {
        assert_eq!(NOTE_FADE, 253);
        assert_eq!(NOTE_CUT, 254);
        assert_eq!(NOTE_OFF, 255);
        assert_eq!(translate_note(120), NOTE_MAX);
    }
}
