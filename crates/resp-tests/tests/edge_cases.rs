//! Edge cases of the reply format and of buffer management.
//!
//! - **Nil versus empty**: `*-1`, `$-1` and `_` are nil; `*0` and `$0` are
//!   empty values, never nil.
//! - **Deep nesting**: aggregates nest without a depth limit, and the
//!   resulting replies drop, clone and compare without a depth limit too.
//! - **Maps and sets**: map pairs are reduced, duplicate keys and members
//!   collapse.
//! - **Buffer bookkeeping**: `len()` tracks unconsumed bytes and the raw
//!   buffer shrinks once the consumed prefix reaches the compaction
//!   threshold.
//! - **Protocol violations**: reported once, then the reader starts over.

use resp_decoder::buffer::COMPACT_THRESHOLD;
use resp_decoder::{DecodeError, Reader, ReaderConfig};
use resp_tests::{read_chunked, read_whole};
use resp_types::{ErrorKind, ErrorReply, Reply};

fn one(input: &[u8]) -> Reply {
    let mut replies = read_whole(input).unwrap();
    assert_eq!(replies.len(), 1, "{}", input.escape_ascii());
    replies.remove(0)
}

fn protocol_diagnostic(input: &[u8]) -> String {
    let mut reader = Reader::new();
    reader.feed(input);
    let err = reader.gets().unwrap_err();
    assert!(err.is_protocol(), "{err:?}");
    assert!(reader.is_empty(), "buffer not discarded after {err}");
    err.as_error_reply().map(|e| e.message().to_string()).unwrap()
}

// ── Nil versus empty ──────────────────────────────────────────────────────────

#[test]
fn empty_reader_is_not_ready() {
    let mut reader = Reader::new();
    assert_eq!(reader.gets().unwrap(), None);
    assert_eq!(reader.gets_or_not_ready().unwrap(), Reply::Bool(false));
    assert_eq!(reader.len(), 0);
}

#[test]
fn nil_forms() {
    assert_eq!(one(b"*-1\r\n"), Reply::Nil);
    assert_eq!(one(b"$-1\r\n"), Reply::Nil);
    assert_eq!(one(b"_\r\n"), Reply::Nil);
    assert_eq!(one(b"%-1\r\n"), Reply::Nil);
}

#[test]
fn empty_values_are_not_nil() {
    assert_eq!(one(b"*0\r\n"), Reply::Array(Vec::new()));
    assert_eq!(one(b"$0\r\n\r\n"), Reply::from(""));
    assert_eq!(one(b"~0\r\n"), Reply::Set(Vec::new()));
    assert_eq!(one(b">0\r\n"), Reply::Array(Vec::new()));
}

#[test]
fn nil_inside_aggregate_keeps_its_slot() {
    assert_eq!(
        one(b"*3\r\n$-1\r\n*0\r\n_\r\n"),
        Reply::Array(vec![Reply::Nil, Reply::Array(Vec::new()), Reply::Nil])
    );
}

// ── Nesting ───────────────────────────────────────────────────────────────────

#[test]
fn four_deep_nesting() {
    let reply = one(b"*1\r\n*1\r\n*1\r\n*1\r\n$1\r\n!\r\n");
    let expected = Reply::Array(vec![Reply::Array(vec![Reply::Array(vec![Reply::Array(vec![
        Reply::from("!"),
    ])])])]);
    assert_eq!(reply, expected);
}

#[test]
fn sibling_after_nested_aggregate() {
    let reply = one(b"*2\r\n*2\r\n:1\r\n:2\r\n:3\r\n");
    assert_eq!(
        reply,
        Reply::Array(vec![
            Reply::Array(vec![Reply::Integer(1), Reply::Integer(2)]),
            Reply::Integer(3),
        ])
    );
}

#[test]
fn hundred_thousand_deep_reply_is_ordinary_to_handle() {
    let depth = 100_000;
    let mut input = b"*1\r\n".repeat(depth);
    input.extend_from_slice(b":1\r\n");

    let reply = one(&input);
    let copy = reply.clone();
    assert_eq!(copy, reply);
    assert_eq!(reply, one(&input));
    assert!(format!("{reply:?}").ends_with("Integer(1)])"));
    drop(copy);
    drop(reply);
}

#[test]
fn deep_mixed_aggregates_drop() {
    let mut input = b"*2\r\n:0\r\n%1\r\n+k\r\n~1\r\n".repeat(30_000);
    input.extend_from_slice(b"_\r\n");
    let replies = read_chunked(&mut Reader::new(), &input, 4096).unwrap();
    assert_eq!(replies.len(), 1);
}

// ── Maps and sets ─────────────────────────────────────────────────────────────

#[test]
fn map_of_scalars() {
    let reply = one(b"%2\r\n+radius\r\n,4.5\r\n+diameter\r\n:9\r\n");
    let entries = reply.as_map().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (Reply::from("radius"), Reply::Double(4.5)));
    assert_eq!(entries[1], (Reply::from("diameter"), Reply::Integer(9)));
}

#[test]
fn map_with_aggregate_values() {
    let reply = one(b"%1\r\n+list\r\n*2\r\n:1\r\n:2\r\n");
    assert_eq!(
        reply,
        Reply::map(vec![(
            Reply::from("list"),
            Reply::Array(vec![Reply::Integer(1), Reply::Integer(2)])
        )])
    );
}

#[test]
fn duplicate_map_keys_collapse() {
    let reply = one(b"%3\r\n+k\r\n:1\r\n+j\r\n:2\r\n+k\r\n:3\r\n");
    assert_eq!(
        reply.as_map().unwrap(),
        &[
            (Reply::from("k"), Reply::Integer(3)),
            (Reply::from("j"), Reply::Integer(2)),
        ][..]
    );
}

#[test]
fn set_members_are_unique() {
    let reply = one(b"~4\r\n:1\r\n:2\r\n:1\r\n:3\r\n");
    assert_eq!(reply.as_set().unwrap().len(), 3);
}

// ── Scalars ───────────────────────────────────────────────────────────────────

#[test]
fn integer_extremes() {
    assert_eq!(one(b":9223372036854775807\r\n"), Reply::Integer(i64::MAX));
    assert_eq!(one(b":-9223372036854775808\r\n"), Reply::Integer(i64::MIN));
    assert_eq!(protocol_diagnostic(b":9223372036854775808\r\n"), "Bad integer value");
}

#[test]
fn double_specials() {
    assert_eq!(one(b",inf\r\n"), Reply::Double(f64::INFINITY));
    assert_eq!(one(b",-inf\r\n"), Reply::Double(f64::NEG_INFINITY));
    assert!(one(b",nan\r\n").as_double().unwrap().is_nan());
    assert_eq!(one(b",1.5e3\r\n"), Reply::Double(1500.0));
}

#[test]
fn bulk_payload_may_contain_crlf() {
    assert_eq!(one(b"$8\r\nab\r\ncd\r\n\r\n"), Reply::from("ab\r\ncd\r\n"));
}

#[test]
fn error_reply_kinds() {
    let reply = one(b"-WRONGTYPE Operation against a key\r\n");
    let err = reply.as_error().unwrap();
    assert_eq!(err.kind(), &ErrorKind::Reply);
    assert_eq!(err.code(), Some("WRONGTYPE"));

    let reply = one(b"-error \xd1\r\n");
    assert_eq!(reply, Reply::Error(ErrorReply::reply("error \u{fffd}")));
}

// ── Buffer bookkeeping ────────────────────────────────────────────────────────

#[test]
fn len_counts_only_unconsumed_bytes() {
    let mut reader = Reader::new();
    reader.feed(b"+first\r\n+sec");
    assert_eq!(reader.len(), 12);
    assert!(reader.has_data());

    reader.gets().unwrap();
    assert_eq!(reader.len(), 4);

    reader.feed(b"ond\r\n");
    reader.gets().unwrap();
    assert_eq!(reader.len(), 0);
    assert!(!reader.has_data());
}

#[test]
fn raw_buffer_shrinks_after_threshold() {
    let mut reader = Reader::new();
    let reply = b"$10\r\n0123456789\r\n";
    let count = COMPACT_THRESHOLD / reply.len() + 1;
    let total = count * reply.len();
    for _ in 0..count {
        reader.feed(reply);
    }
    assert_eq!(reader.buffered(), total);

    let mut consumed = 0;
    let mut compacted = false;
    while reader.gets().unwrap().is_some() {
        consumed += reply.len();
        assert_eq!(reader.len(), total - consumed);
        if reader.buffered() < total {
            compacted = true;
            assert!(consumed >= COMPACT_THRESHOLD);
        }
    }
    assert!(compacted);
}

#[test]
fn feed_range_selects_window() {
    let mut reader = Reader::new();
    let chunk = b"junk:12\r\njunk";
    reader.feed_range(chunk, 4, Some(5)).unwrap();
    assert_eq!(reader.gets().unwrap(), Some(Reply::Integer(12)));

    let err = reader.feed_range(chunk, 10, Some(10)).unwrap_err();
    assert!(matches!(err, DecodeError::OutOfRange { .. }));
    assert_eq!(err.to_string(), "input is larger than buffer size");
}

#[test]
fn bulk_of_exactly_maxbuf_arrives_in_chunks() {
    let mut input = b"$32\r\n".to_vec();
    input.extend_from_slice(&[b'z'; 32]);
    input.extend_from_slice(b"\r\n:1\r\n");

    for chunk in [1, 3, 7, input.len()] {
        let mut reader = Reader::with_config(ReaderConfig::default().with_max_buf(32));
        let replies = read_chunked(&mut reader, &input, chunk).unwrap();
        assert_eq!(replies, vec![Reply::bytes(&[b'z'; 32]), Reply::Integer(1)], "chunk {chunk}");
    }
}

// ── Protocol violations ───────────────────────────────────────────────────────

#[test]
fn unknown_type_bytes() {
    assert_eq!(
        protocol_diagnostic(b"x"),
        "Protocol error, got \"x\" as reply type byte"
    );
    assert_eq!(
        protocol_diagnostic(b"\r\n"),
        "Protocol error, got \"\\r\" as reply type byte"
    );
    assert_eq!(
        protocol_diagnostic(b"|1\r\n+key\r\n+val\r\n"),
        "Protocol error, got \"|\" as reply type byte"
    );
}

#[test]
fn malformed_lengths() {
    assert_eq!(protocol_diagnostic(b"$abc\r\n"), "Bad bulk string length");
    assert_eq!(protocol_diagnostic(b"*1.5\r\n"), "Bad multi-bulk length");
    assert_eq!(protocol_diagnostic(b"$-5\r\n"), "Bulk string length out of range");
    assert_eq!(protocol_diagnostic(b"%-3\r\n"), "Multi-bulk length out of range");
}

#[test]
fn verbatim_without_format_tag() {
    assert_eq!(
        protocol_diagnostic(b"=4\r\ntxt_\r\n"),
        "Verbatim string 4 bytes of content type are missing or incorrectly encoded."
    );
}

#[test]
fn violation_inside_aggregate_resets_everything() {
    let mut reader = Reader::new();
    reader.feed(b"*3\r\n:1\r\n*2\r\n:2\r\n#maybe\r\n:3\r\n+after\r\n");
    let err = reader.gets().unwrap_err();
    assert_eq!(err.as_error_reply().map(ErrorReply::message), Some("Bad bool value"));
    assert_eq!(reader.gets().unwrap(), None);

    reader.feed(b":7\r\n");
    assert_eq!(reader.gets().unwrap(), Some(Reply::Integer(7)));
}
