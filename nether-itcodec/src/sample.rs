//! Sample data loading
//!
//! Turns the data region a sample header points at into PCM, decompressing
//! if needed. Header parsing itself happens elsewhere; callers pass the
//! relevant fields in a [`SampleLayout`].

use std::io::Read;

use log::debug;

use crate::compression::SampleCodec;
use crate::error::ItCodecError;

/// IT sample flags (sample header `Flg` byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleFlags(u8);

impl SampleFlags {
    /// 16-bit sample (vs 8-bit)
    pub const SAMPLE_16BIT: Self = Self(0x02);
    /// Stereo sample
    pub const STEREO: Self = Self(0x04);
    /// Compressed sample
    pub const COMPRESSED: Self = Self(0x08);

    /// Create flags from raw u8
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Empty flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if flag is set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for SampleFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// IT sample conversion flags (sample header `Cvt` byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertFlags(u8);

impl ConvertFlags {
    /// Samples are signed (unsigned otherwise)
    pub const SIGNED: Self = Self(0x01);
    /// Samples are stored as deltas
    pub const DELTA: Self = Self(0x04);

    /// Create flags from raw u8
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Check if flag is set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// The sample header fields needed to read its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleLayout {
    pub flags: SampleFlags,
    pub convert: ConvertFlags,
    /// Length in samples, counting both channels of a stereo sample
    pub length: u32,
}

impl SampleLayout {
    /// Number of channels (1 or 2)
    pub fn channels(&self) -> u8 {
        if self.flags.contains(SampleFlags::STEREO) { 2 } else { 1 }
    }

    /// Samples stored per channel
    pub fn frames(&self) -> usize {
        (self.length / u32::from(self.channels())) as usize
    }
}

/// Decoded PCM, channels interleaved (L, R, L, R, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleData {
    /// 8-bit signed samples
    I8 { channels: u8, data: Vec<i8> },
    /// 16-bit signed samples
    I16 { channels: u8, data: Vec<i16> },
}

impl SampleData {
    /// Number of interleaved channels
    pub fn channels(&self) -> u8 {
        match self {
            Self::I8 { channels, .. } | Self::I16 { channels, .. } => *channels,
        }
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        let total = match self {
            Self::I8 { data, .. } => data.len(),
            Self::I16 { data, .. } => data.len(),
        };
        total / self.channels().max(1) as usize
    }
}

/// Read a sample's data, decompressing if the flags say so
///
/// `reader` must be positioned at the sample's data offset. Stereo channels
/// are stored one after the other (left first). `it215` selects the
/// second-order delta mode for compressed samples and comes from the file's
/// tracker version.
pub fn load_sample_data<R: Read>(
    reader: &mut R,
    layout: &SampleLayout,
    it215: bool,
) -> Result<SampleData, ItCodecError> {
    if layout.convert.contains(ConvertFlags::DELTA) {
        return Err(ItCodecError::UnsupportedSource(
            "delta-encoded samples not supported",
        ));
    }

    let is_16bit = layout.flags.contains(SampleFlags::SAMPLE_16BIT);
    let compressed = layout.flags.contains(SampleFlags::COMPRESSED);
    let signed = layout.convert.contains(ConvertFlags::SIGNED);
    let channels = layout.channels();
    let frames = layout.frames();
    let codec = SampleCodec::new(is_16bit, it215);

    let data = if is_16bit {
        let mut planes = Vec::with_capacity(channels as usize);
        for _ in 0..channels {
            planes.push(if compressed {
                codec.decode(reader, frames)?
            } else {
                read_pcm16(reader, frames, signed)?
            });
        }
        SampleData::I16 {
            channels,
            data: interleave(planes),
        }
    } else {
        let mut planes = Vec::with_capacity(channels as usize);
        for _ in 0..channels {
            planes.push(if compressed {
                codec.decode_i8(reader, frames)?
            } else {
                read_pcm8(reader, frames, signed)?
            });
        }
        SampleData::I8 {
            channels,
            data: interleave(planes),
        }
    };

    debug!(
        "Loaded {} sample: {} frames x {} channels",
        match (is_16bit, compressed) {
            (true, true) => "compressed 16-bit",
            (true, false) => "16-bit",
            (false, true) => "compressed 8-bit",
            (false, false) => "8-bit",
        },
        frames,
        channels
    );

    Ok(data)
}

fn read_pcm8<R: Read>(
    reader: &mut R,
    frames: usize,
    signed: bool,
) -> Result<Vec<i8>, ItCodecError> {
    let bytes = read_bytes(reader, frames as u64)?;
    let offset: u8 = if signed { 0 } else { 0x80 };
    Ok(bytes.into_iter().map(|b| b.wrapping_add(offset) as i8).collect())
}

fn read_pcm16<R: Read>(
    reader: &mut R,
    frames: usize,
    signed: bool,
) -> Result<Vec<i16>, ItCodecError> {
    let bytes = read_bytes(reader, (frames as u64).saturating_mul(2))?;
    let offset: u16 = if signed { 0 } else { 0x8000 };
    Ok(bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]).wrapping_add(offset) as i16)
        .collect())
}

/// Read exactly `count` bytes, growing the buffer only as data arrives
fn read_bytes<R: Read>(reader: &mut R, count: u64) -> Result<Vec<u8>, ItCodecError> {
    let mut bytes = Vec::new();
    reader.take(count).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < count {
        return Err(ItCodecError::EndOfStream);
    }
    Ok(bytes)
}

fn interleave<T: Copy>(planes: Vec<Vec<T>>) -> Vec<T> {
    if planes.len() == 1 {
        return planes.into_iter().next().unwrap_or_default();
    }

    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * planes.len());
    for i in 0..frames {
        out.extend(planes.iter().map(|plane| plane[i]));
    }
    out
}
