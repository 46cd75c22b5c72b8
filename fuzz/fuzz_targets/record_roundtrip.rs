#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use rstruct_view::{RecordConfig, SizedRecord};

// Fuzz target: SizedRecord write->read roundtrip.
//
// Input format:
//   byte 0: inclusive flag (low bit)
//   bytes 1..: body
//
// Frames the body, reads it back, and asserts the bodies match and the
// whole frame was consumed.
fuzz_target!(|data: &[u8]| {
    let Some((&flags, body)) = data.split_first() else {
        return;
    };
    let config = RecordConfig::new("<I", flags & 1 == 1);
    let record = SizedRecord::new(body.to_vec());

    let mut wire = Vec::new();
    record.write_to(&mut wire, &config).unwrap();

    let mut cursor = Cursor::new(&wire);
    let parsed = SizedRecord::from_stream_with(&mut cursor, &config).unwrap();
    assert_eq!(parsed, record);
    assert_eq!(cursor.position() as usize, wire.len());
});
