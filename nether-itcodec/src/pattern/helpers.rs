//! Helper functions for reading packed pattern bytes

use std::io::{Cursor, Read};

use crate::error::ItCodecError;

const TRUNCATED: ItCodecError = ItCodecError::InvalidSource("unexpected end of pattern data");

/// Read a single byte
pub(crate) fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, ItCodecError> {
    let mut buf = [0u8; 1];
    cursor.read_exact(&mut buf).map_err(|_| TRUNCATED)?;
    Ok(buf[0])
}

/// Read a 16-bit little-endian integer
pub(crate) fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, ItCodecError> {
    let mut buf = [0u8; 2];
    cursor.read_exact(&mut buf).map_err(|_| TRUNCATED)?;
    Ok(u16::from_le_bytes(buf))
}

/// Skip `count` bytes that must be present
pub(crate) fn skip(cursor: &mut Cursor<&[u8]>, count: u64) -> Result<(), ItCodecError> {
    let end = cursor.position() + count;
    if end > cursor.get_ref().len() as u64 {
        return Err(TRUNCATED);
    }
    cursor.set_position(end);
    Ok(())
}
