//! Tests for pattern decoding

use super::*;

#[test]
fn test_empty_row() {
    let pattern = decode_pattern(&[0x00], 1).unwrap();
    assert_eq!(pattern.num_rows(), 1);
    assert!(pattern.rows[0].is_empty());
    assert_eq!(pattern.channels, 0);
}

#[test]
fn test_empty_rows_advance() {
    // Row 0 empty, row 1 has channel 0 with an instrument
    let data = [0x00, 0x81, 0x02, 0x05, 0x00];
    let pattern = decode_pattern(&data, 2).unwrap();
    assert!(pattern.rows[0].is_empty());
    assert_eq!(pattern.rows[1].entries.len(), 1);
    assert_eq!(pattern.rows[1].entries[0].instrument, 5);
}

#[test]
fn test_row_with_two_channels() {
    let data = [
        0x81, 0x03, 46, 1, // channel 0: note + instrument
        0x82, 0x08, 8, 0x33, // channel 1: effect
        0x00,
    ];
    let pattern = decode_pattern(&data, 1).unwrap();
    let row = &pattern.rows[0];

    assert_eq!(
        row.entries,
        vec![
            PatternEntry {
                channel: 0,
                note: 47,
                instrument: 1,
                ..Default::default()
            },
            PatternEntry {
                channel: 1,
                effect: 8,
                effect_param: 0x33,
                ..Default::default()
            },
        ]
    );
    assert_eq!(pattern.channels, 2);
}

#[test]
fn test_entries_keep_stream_order() {
    let data = [0x84, 0x02, 3, 0x81, 0x02, 1, 0x00];
    let pattern = decode_pattern(&data, 1).unwrap();
    let channels: Vec<u8> = pattern.rows[0].entries.iter().map(|e| e.channel).collect();
    assert_eq!(channels, vec![3, 0]);
    assert_eq!(pattern.rows[0].entry(3).unwrap().instrument, 3);
    assert_eq!(pattern.channels, 4);
}

#[test]
fn test_repeat_last_volume_consumes_no_byte() {
    let data = [
        // Row 0: channel 1 sets volume 15 and H32
        0x82, 0x0C, 15, 8, 0x32, 0x00,
        // Row 1: repeat volume, new effect H13
        0x82, 0x48, 8, 0x13, 0x00,
        // Row 2: no mask byte, reuses 0x48
        0x02, 8, 0x00, 0x00,
    ];
    let pattern = decode_pattern(&data, 3).unwrap();

    let expected = |effect_param| PatternEntry {
        channel: 1,
        volume_command: VolumeCommand::SetVolume,
        volume_param: 15,
        effect: 8,
        effect_param,
        ..Default::default()
    };
    assert_eq!(pattern.rows[0].entries, vec![expected(0x32)]);
    assert_eq!(pattern.rows[1].entries, vec![expected(0x13)]);
    assert_eq!(pattern.rows[2].entries, vec![expected(0x00)]);
}

#[test]
fn test_repeat_last_note_and_instrument() {
    let data = [
        0x81, 0x03, 60, 2, 0x00, // row 0: C-5, instrument 2
        0x81, 0x30, 0x00, // row 1: both repeated
    ];
    let pattern = decode_pattern(&data, 2).unwrap();
    let entry = pattern.rows[1].entries[0];
    assert_eq!(entry.note, 61);
    assert_eq!(entry.instrument, 2);
    assert_eq!(entry.volume_command, VolumeCommand::Empty);
}

#[test]
fn test_notes_are_translated() {
    let data = [
        0x81, 0x01, 120, // channel 0
        0x82, 0x01, 254, // channel 1
        0x83, 0x01, 255, // channel 2
        0x84, 0x01, 200, // channel 3
        0x00,
    ];
    let pattern = decode_pattern(&data, 1).unwrap();
    let notes: Vec<u8> = pattern.rows[0].entries.iter().map(|e| e.note).collect();
    assert_eq!(notes, vec![121, 254, 255, 253]);

    let entries = &pattern.rows[0].entries;
    assert!(entries[0].has_note());
    assert!(entries[1].is_note_cut());
    assert!(entries[2].is_note_off());
    assert!(entries[3].is_note_fade());
}

#[test]
fn test_volume_column_is_translated() {
    let data = [0x81, 0x04, 203, 0x00];
    let pattern = decode_pattern(&data, 1).unwrap();
    let entry = pattern.rows[0].entries[0];
    assert_eq!(entry.volume_command, VolumeCommand::Vibrato);
    assert_eq!(entry.volume_param, 0);
}

#[test]
fn test_channel_select_wraps_to_64_channels() {
    // 0xC0 -> channel 63 with a mask; 0x40 -> channel 63 reusing it
    let data = [0xC0, 0x02, 9, 0x00, 0x40, 7, 0x00];
    let pattern = decode_pattern(&data, 2).unwrap();
    assert_eq!(pattern.rows[0].entries[0].channel, 63);
    assert_eq!(pattern.rows[1].entries[0].channel, 63);
    assert_eq!(pattern.rows[1].entries[0].instrument, 7);
    assert_eq!(pattern.channels, 64);
}

#[test]
fn test_channel_state_is_fresh_per_pattern() {
    decode_pattern(&[0x81, 0x01, 60, 0x00], 1).unwrap();

    // Repeat-last-note with no earlier note in this pattern sees raw note 0
    let pattern = decode_pattern(&[0x81, 0x10, 0x00], 1).unwrap();
    assert_eq!(pattern.rows[0].entries[0].note, 1);
}

#[test]
fn test_select_without_fields_still_emits_entry() {
    let pattern = decode_pattern(&[0x85, 0x00, 0x00], 1).unwrap();
    assert_eq!(
        pattern.rows[0].entries,
        vec![PatternEntry {
            channel: 4,
            ..Default::default()
        }]
    );
}

#[test]
fn test_truncated_mid_row() {
    // Mask promises a note that is not there
    let result = decode_pattern(&[0x81, 0x01], 1);
    assert!(matches!(result, Err(ItCodecError::InvalidSource(_))));

    // Effect needs two bytes
    let result = decode_pattern(&[0x81, 0x08, 0x01], 1);
    assert!(matches!(result, Err(ItCodecError::InvalidSource(_))));
}

#[test]
fn test_missing_row_terminator() {
    let result = decode_pattern(&[0x81, 0x01, 60], 1);
    assert!(matches!(result, Err(ItCodecError::InvalidSource(_))));
}

#[test]
fn test_fewer_rows_than_declared() {
    let result = decode_pattern(&[0x00], 2);
    assert!(matches!(result, Err(ItCodecError::InvalidSource(_))));
}

#[test]
fn test_zero_rows() {
    let pattern = decode_pattern(&[], 0).unwrap();
    assert_eq!(pattern, DecodedPattern::default());
}

#[test]
fn test_unpack_pattern_block() {
    let packed = [0x81, 0x01, 48, 0x00, 0x00];
    let mut block = Vec::new();
    block.extend_from_slice(&(packed.len() as u16).to_le_bytes());
    block.extend_from_slice(&2u16.to_le_bytes());
    block.extend_from_slice(&[0; 4]);
    block.extend_from_slice(&packed);

    let pattern = unpack_pattern(&block).unwrap();
    assert_eq!(pattern.num_rows(), 2);
    assert_eq!(pattern.rows[0].entries[0].note, 49);
    assert!(pattern.rows[1].is_empty());
}

#[test]
fn test_unpack_pattern_short_block() {
    // Declares 10 bytes of packed data, carries 1
    let block = [10, 0, 1, 0, 0, 0, 0, 0, 0x00];
    assert!(matches!(
        unpack_pattern(&block),
        Err(ItCodecError::InvalidSource(_))
    ));

    // Header itself cut short
    assert!(matches!(
        unpack_pattern(&[1, 0, 1]),
        Err(ItCodecError::InvalidSource(_))
    ));
}

#[test]
fn test_channel_mask_bits() {
    let mask = ChannelMask::from_bits(0x48);
    assert!(mask.contains(ChannelMask::EFFECT));
    assert!(mask.contains(ChannelMask::LAST_VOLUME));
    assert!(!mask.contains(ChannelMask::VOLUME));
    assert!(mask.intersects(ChannelMask::VOLUME | ChannelMask::LAST_VOLUME));
    assert_eq!((ChannelMask::NOTE | ChannelMask::LAST_EFFECT).bits(), 0x81);
}
