#![no_main]

use libfuzzer_sys::fuzz_target;
use resp_wire::line::{parse_aggregate_len, parse_bulk_len, parse_double, parse_integer, read_line};

// Fuzz target: the line-level scalar parsers.
//
// Every accepted integer must print back to the exact input, since the
// grammar has no leading zeros, no `+` and no `-0`.
fuzz_target!(|data: &[u8]| {
    if let Some((line, consumed)) = read_line(data) {
        assert_eq!(consumed, line.len() + 2);
        assert!(!line.windows(2).any(|w| w == b"\r\n"));
    }

    if let Ok(value) = parse_integer(data) {
        assert_eq!(value.to_string().as_bytes(), data);
    }
    let _ = parse_double(data);
    let _ = parse_bulk_len(data);
    if let Ok(Some(count)) = parse_aggregate_len(data, 1024) {
        assert!(count <= 1024);
    }
});
