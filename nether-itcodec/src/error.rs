//! Error types for IT sample and pattern decoding

use std::io;

/// Errors that can occur while decoding IT sample or pattern data
#[derive(Debug, thiserror::Error)]
pub enum ItCodecError {
    /// Bit read width outside `0..32`
    #[error("Bad parameter: cannot read {width} bits at once (max 31)")]
    BadParameter { width: u32 },

    /// Source exhausted before the requested bits or chunk bytes were available
    #[error("Unexpected end of stream")]
    EndOfStream,

    /// Adaptive bit width grew past the format maximum
    #[error("Decoding error: bit width {width} exceeds maximum {max}")]
    DecodingError { width: u32, max: u32 },

    /// Pattern data is truncated or structurally invalid
    #[error("Invalid source: {0}")]
    InvalidSource(&'static str),

    /// Sample data uses an encoding this crate does not decode
    #[error("Unsupported source: {0}")]
    UnsupportedSource(&'static str),

    /// IO error from the underlying reader
    #[error("IO error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ItCodecError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::EndOfStream,
            _ => Self::Io(err),
        }
    }
}
