#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resp_decoder::Reader;
use resp_encoder::{pack_command, Arg};
use resp_types::Reply;

#[derive(Debug, Arbitrary)]
enum FuzzArg {
    Bytes(Vec<u8>),
    Text(String),
    Int(i64),
    UInt(u128),
    Float(f64),
}

// Fuzz target: pack_command → Reader roundtrip.
//
// Every packed command must read back as one array of bulk strings, each
// equal to the argument's own byte form, with nothing left over.
fuzz_target!(|args: Vec<FuzzArg>| {
    let args: Vec<Arg<'_>> = args
        .iter()
        .map(|arg| match arg {
            FuzzArg::Bytes(b) => Arg::from(b),
            FuzzArg::Text(s) => Arg::from(s),
            FuzzArg::Int(n) => Arg::from(*n),
            FuzzArg::UInt(n) => Arg::from(*n),
            FuzzArg::Float(f) => Arg::from(*f),
        })
        .collect();

    let packed = pack_command(&args);
    assert_eq!(packed.len(), packed.capacity());

    let mut reader = Reader::new();
    reader.set_maxbuf(Some(0));
    reader.feed(&packed);
    let reply = reader.gets().unwrap().unwrap();
    assert!(reader.is_empty());

    let expected: Vec<Reply> = args.iter().map(|arg| Reply::bytes(&arg.to_bytes())).collect();
    assert_eq!(reply, Reply::Array(expected));
});
