//! Packed pattern decoding
//!
//! IT stores each pattern as a byte stream of channel-select commands. A
//! select byte names a channel and optionally carries a new field mask; the
//! mask says which of note, instrument, volume and effect follow in the
//! stream and which are repeated from that channel's previous values. A zero
//! byte ends the row.

use std::io::Cursor;

use log::{debug, warn};

use crate::error::ItCodecError;
use crate::{MAX_CHANNELS, NOTE_CUT, NOTE_FADE, NOTE_MAX, NOTE_OFF};

mod helpers;
mod translate;
#[cfg(test)]
mod tests;

use helpers::{read_u8, read_u16, skip};

pub use translate::{VolumeCommand, translate_note, translate_volume};

/// Size of the header in front of each packed pattern
pub const PATTERN_HEADER_SIZE: usize = 8;

/// Per-channel field mask from a channel-select command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelMask(u8);

impl ChannelMask {
    /// Note byte follows
    pub const NOTE: Self = Self(0x01);
    /// Instrument byte follows
    pub const INSTRUMENT: Self = Self(0x02);
    /// Volume column byte follows
    pub const VOLUME: Self = Self(0x04);
    /// Effect and parameter bytes follow
    pub const EFFECT: Self = Self(0x08);
    /// Reuse the channel's last note
    pub const LAST_NOTE: Self = Self(0x10);
    /// Reuse the channel's last instrument
    pub const LAST_INSTRUMENT: Self = Self(0x20);
    /// Reuse the channel's last volume column
    pub const LAST_VOLUME: Self = Self(0x40);
    /// Reuse the channel's last effect and parameter
    pub const LAST_EFFECT: Self = Self(0x80);

    /// Create a mask from a raw byte
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get the raw byte
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all bits of `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any bit of `other` is set
    pub const fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ChannelMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One channel's event in a decoded row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternEntry {
    /// Channel index (0-63)
    pub channel: u8,
    /// 0 = empty, 1-121 = note + 1, 253 = fade, 254 = cut, 255 = off
    pub note: u8,
    /// Instrument number (0 = none)
    pub instrument: u8,
    /// Volume column command
    pub volume_command: VolumeCommand,
    /// Volume column parameter
    pub volume_param: u8,
    /// Effect command (A-Z = 1-26, 0 = none)
    pub effect: u8,
    /// Effect parameter
    pub effect_param: u8,
}

impl PatternEntry {
    /// Check if this entry triggers a pitched note
    #[inline]
    pub fn has_note(&self) -> bool {
        (1..=NOTE_MAX).contains(&self.note)
    }

    /// Check if this is a note-cut (===)
    #[inline]
    pub fn is_note_cut(&self) -> bool {
        self.note == NOTE_CUT
    }

    /// Check if this is a note-off (^^^)
    #[inline]
    pub fn is_note_off(&self) -> bool {
        self.note == NOTE_OFF
    }

    /// Check if this is a note-fade
    #[inline]
    pub fn is_note_fade(&self) -> bool {
        self.note == NOTE_FADE
    }
}

/// Entries of one row, in stream order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternRow {
    pub entries: Vec<PatternEntry>,
}

impl PatternRow {
    /// Check if no channel was selected in this row
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry for `channel`, if selected
    pub fn entry(&self, channel: u8) -> Option<&PatternEntry> {
        self.entries.iter().find(|e| e.channel == channel)
    }
}

/// Fully unpacked pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPattern {
    /// Highest channel selected plus one (0 if nothing was selected)
    pub channels: u8,
    /// One entry list per row
    pub rows: Vec<PatternRow>,
}

impl DecodedPattern {
    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Last-seen values for one channel, reused by the `LAST_*` mask bits
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    mask: ChannelMask,
    note: u8,
    instrument: u8,
    volume: u8,
    effect: u8,
    effect_param: u8,
}

/// Decode `row_count` rows of packed pattern data
///
/// Every row must be terminated in `data`; running out of bytes before the
/// last row ends is an error rather than a short pattern.
pub fn decode_pattern(data: &[u8], row_count: u16) -> Result<DecodedPattern, ItCodecError> {
    let mut cursor = Cursor::new(data);
    let mut state = [ChannelState::default(); MAX_CHANNELS as usize];
    let mut channels = 0u8;
    let mut rows = Vec::with_capacity(row_count as usize);

    for row in 0..row_count {
        let entries = decode_row(&mut cursor, &mut state, &mut channels).inspect_err(|_| {
            warn!(
                "Pattern data truncated in row {} of {} ({} bytes)",
                row,
                row_count,
                data.len()
            );
        })?;
        rows.push(PatternRow { entries });
    }

    debug!(
        "Decoded pattern: {} rows, {} channels, {} of {} bytes used",
        row_count,
        channels,
        cursor.position(),
        data.len()
    );

    Ok(DecodedPattern { channels, rows })
}

fn decode_row(
    cursor: &mut Cursor<&[u8]>,
    state: &mut [ChannelState; MAX_CHANNELS as usize],
    channels: &mut u8,
) -> Result<Vec<PatternEntry>, ItCodecError> {
    let mut entries = Vec::new();

    loop {
        let select = read_u8(cursor)?;
        if select == 0 {
            return Ok(entries);
        }

        let channel = (select.wrapping_sub(1) & 0x3F) as usize;
        *channels = (*channels).max(channel as u8 + 1);

        let last = &mut state[channel];
        if select & 0x80 != 0 {
            last.mask = ChannelMask::from_bits(read_u8(cursor)?);
        }
        let mask = last.mask;

        let mut entry = PatternEntry {
            channel: channel as u8,
            ..Default::default()
        };

        if mask.contains(ChannelMask::NOTE) {
            last.note = read_u8(cursor)?;
        }
        if mask.intersects(ChannelMask::NOTE | ChannelMask::LAST_NOTE) {
            entry.note = translate_note(last.note);
        }

        if mask.contains(ChannelMask::INSTRUMENT) {
            last.instrument = read_u8(cursor)?;
        }
        if mask.intersects(ChannelMask::INSTRUMENT | ChannelMask::LAST_INSTRUMENT) {
            entry.instrument = last.instrument;
        }

        if mask.contains(ChannelMask::VOLUME) {
            last.volume = read_u8(cursor)?;
        }
        if mask.intersects(ChannelMask::VOLUME | ChannelMask::LAST_VOLUME) {
            (entry.volume_command, entry.volume_param) = translate_volume(last.volume);
        }

        if mask.contains(ChannelMask::EFFECT) {
            last.effect = read_u8(cursor)?;
            last.effect_param = read_u8(cursor)?;
        }
        if mask.intersects(ChannelMask::EFFECT | ChannelMask::LAST_EFFECT) {
            entry.effect = last.effect;
            entry.effect_param = last.effect_param;
        }

        entries.push(entry);
    }
}

/// Decode a pattern block: the 8-byte header (packed length, row count,
/// 4 reserved bytes) followed by the packed data
pub fn unpack_pattern(block: &[u8]) -> Result<DecodedPattern, ItCodecError> {
    let mut cursor = Cursor::new(block);

    let packed_length = read_u16(&mut cursor)? as usize;
    let row_count = read_u16(&mut cursor)?;
    skip(&mut cursor, 4)?;

    let data = block
        .get(PATTERN_HEADER_SIZE..PATTERN_HEADER_SIZE + packed_length)
        .ok_or(ItCodecError::InvalidSource(
            "pattern data shorter than its declared length",
        ))?;

    decode_pattern(data, row_count)
}
