#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use rstruct_view::{RecordConfig, RecordStream};

// Fuzz target: record framing over arbitrary streams.
//
// Input format:
//   byte 0: size format selector and inclusive flag
//   bytes 1..: stream
//
// Catches bugs in:
// - Negative and oversized size fields
// - Truncated headers and bodies
// - Iterator fusing after an error
fuzz_target!(|data: &[u8]| {
    let Some((&selector, stream)) = data.split_first() else {
        return;
    };
    const FORMATS: [&str; 6] = ["<i", ">I", "<h", "B", "!q", "<Q"];
    let size_format = FORMATS[usize::from(selector) % FORMATS.len()];
    let config = RecordConfig::new(size_format, selector & 0x80 == 0).with_max_body_len(1 << 20);

    let mut records = RecordStream::new(Cursor::new(stream), config).unwrap();
    let mut consumed = 0usize;
    for record in records.by_ref() {
        match record {
            Ok(record) => consumed += record.len(),
            Err(_) => break,
        }
    }
    assert!(consumed <= stream.len());
    assert!(records.next().is_none());
});
