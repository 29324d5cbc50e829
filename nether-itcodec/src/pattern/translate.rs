//! Raw pattern value normalisation

use crate::{NOTE_CUT, NOTE_FADE, NOTE_OFF};

/// Normalise a raw note byte
///
/// Notes 0-120 shift up by one so that 0 can mean "no note". Cut and off
/// pass through; every other value is treated as a note fade.
pub fn translate_note(raw: u8) -> u8 {
    match raw {
        0..=120 => raw + 1,
        NOTE_CUT | NOTE_OFF => raw,
        _ => NOTE_FADE,
    }
}

/// Volume column command, normalised from the packed column byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VolumeCommand {
    #[default]
    Empty = 0,
    SetVolume = 1,
    FineVolumeUp = 2,
    FineVolumeDown = 3,
    VolumeSlideUp = 4,
    VolumeSlideDown = 5,
    PitchSlideDown = 6,
    PitchSlideUp = 7,
    SetPanning = 8,
    TonePortamento = 9,
    Vibrato = 10,
}

impl VolumeCommand {
    /// Numeric command code (0 = empty)
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Command for a numeric code, if it is one
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Empty,
            1 => Self::SetVolume,
            2 => Self::FineVolumeUp,
            3 => Self::FineVolumeDown,
            4 => Self::VolumeSlideUp,
            5 => Self::VolumeSlideDown,
            6 => Self::PitchSlideDown,
            7 => Self::PitchSlideUp,
            8 => Self::SetPanning,
            9 => Self::TonePortamento,
            10 => Self::Vibrato,
            _ => return None,
        })
    }
}

/// Split a raw volume column byte into command and parameter
///
/// The ranges are kept exactly as existing files were decoded. Two of them do
/// not follow the "offset from range start" pattern: 115-124 subtracts 125
/// (wrapping to 246-255) and only 128 selects panning, with 129-202 decoding
/// as portamento.
pub fn translate_volume(raw: u8) -> (VolumeCommand, u8) {
    match raw {
        0..=64 => (VolumeCommand::SetVolume, raw),
        65..=74 => (VolumeCommand::FineVolumeUp, raw - 65),
        75..=84 => (VolumeCommand::FineVolumeDown, raw - 75),
        85..=94 => (VolumeCommand::VolumeSlideUp, raw - 85),
        95..=104 => (VolumeCommand::VolumeSlideDown, raw - 95),
        105..=114 => (VolumeCommand::PitchSlideDown, raw - 105),
        // TODO: confirm with the format owner whether this should be `raw - 115`
        115..=124 => (VolumeCommand::PitchSlideUp, raw.wrapping_sub(125)),
        128 => (VolumeCommand::SetPanning, raw - 128),
        129..=202 => (VolumeCommand::TonePortamento, raw - 129),
        203..=212 => (VolumeCommand::Vibrato, raw - 203),
        _ => (VolumeCommand::Empty, 0),
    }
}
