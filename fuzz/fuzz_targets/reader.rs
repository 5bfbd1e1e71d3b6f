#![no_main]

use libfuzzer_sys::fuzz_target;
use resp_decoder::Reader;

// Fuzz target: Reader::gets on arbitrary bytes fed in one piece.
//
// Catches bugs in:
// - Length lines that overflow or go negative
// - Aggregate counts near the element ceiling
// - Bulk payloads without their trailing CRLF
// - Buffer bookkeeping after a protocol error reset
fuzz_target!(|data: &[u8]| {
    let mut reader = Reader::new();
    reader.set_maxbuf(Some(1 << 20));
    reader.feed(data);
    for reply in reader.replies() {
        if reply.is_err() {
            break;
        }
    }
    assert!(reader.len() <= data.len());
});
