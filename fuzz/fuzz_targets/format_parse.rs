#![no_main]

use libfuzzer_sys::fuzz_target;
use rstruct_codec::Format;

// Fuzz target: format-string parsing.
//
// Catches bugs in:
// - Count overflow in repeat counts
// - Byte-order markers in odd positions
// - Size arithmetic on very long formats
//
// Anything that parses must print back to a format with the same size
// and items.
fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(format) = Format::parse(src) else {
        return;
    };

    let canonical = format.to_string();
    let reparsed = Format::parse(&canonical).unwrap();
    assert_eq!(reparsed.items(), format.items());
    assert_eq!(reparsed.size(), format.size());
});
