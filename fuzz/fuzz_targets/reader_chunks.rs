#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resp_decoder::Reader;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    splits: Vec<u8>,
    encoding: u8,
    errors: u8,
}

const ENCODINGS: [Option<&str>; 5] = [None, Some("utf-8"), Some("utf-16"), Some("latin-1"), Some("ascii")];
const HANDLERS: [&str; 5] = ["strict", "ignore", "replace", "surrogateescape", "backslashreplace"];

/// Pull every ready reply, rendered with `Debug` so NaN doubles compare
/// equal. Returns true once a protocol error has reset the reader.
fn drain(reader: &mut Reader, out: &mut Vec<Result<String, String>>) -> bool {
    while let Some(outcome) = reader.gets().transpose() {
        match outcome {
            Ok(reply) => out.push(Ok(format!("{reply:?}"))),
            Err(e) => {
                out.push(Err(e.to_string()));
                if e.is_protocol() {
                    return true;
                }
            }
        }
    }
    false
}

fn reader(encoding: Option<&str>, errors: &str) -> Reader {
    let mut reader = Reader::new();
    reader.set_encoding(encoding, Some(errors)).unwrap();
    reader
}

// Fuzz target: chunk-boundary independence.
//
// Decodes the same bytes once in a single feed and once in the fuzzer's
// chunk sizes, up to the first protocol error, and asserts both readers
// report the same sequence of replies and errors.
fuzz_target!(|input: FuzzInput| {
    let encoding = ENCODINGS[usize::from(input.encoding) % ENCODINGS.len()];
    let errors = HANDLERS[usize::from(input.errors) % HANDLERS.len()];

    let mut whole = reader(encoding, errors);
    whole.feed(&input.data);
    let mut expected = Vec::new();
    drain(&mut whole, &mut expected);

    let mut chunked = reader(encoding, errors);
    let mut got = Vec::new();
    let mut rest = input.data.as_slice();
    let mut sizes = input.splits.iter().map(|&s| usize::from(s).max(1));
    while !rest.is_empty() {
        let size = sizes.next().unwrap_or(rest.len()).min(rest.len());
        let (chunk, tail) = rest.split_at(size);
        rest = tail;
        chunked.feed(chunk);
        if drain(&mut chunked, &mut got) {
            break;
        }
    }

    assert_eq!(got, expected);
});
