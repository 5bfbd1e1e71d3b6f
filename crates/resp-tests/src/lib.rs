//! Shared fixtures for the integration tests and benches.

use resp_decoder::{DecodeError, Reader};
use resp_types::Reply;

/// Well-formed encodings covering every reply type, each one complete.
pub const CORPUS: &[&[u8]] = &[
    b"+OK\r\n",
    b"-ERR unknown command 'foo'\r\n",
    b":0\r\n",
    b":-9223372036854775808\r\n",
    b"$0\r\n\r\n",
    b"$-1\r\n",
    b"$12\r\nhello\r\nworld\r\n",
    b"*-1\r\n",
    b"*0\r\n",
    b"*3\r\n:1\r\n:2\r\n:3\r\n",
    b"*2\r\n*1\r\n+a\r\n*2\r\n$1\r\nb\r\n_\r\n",
    b"_\r\n",
    b"#t\r\n",
    b",-inf\r\n",
    b",3.25\r\n",
    b"(3492890328409238509324850943850943825024385\r\n",
    b"!21\r\nSYNTAX invalid syntax\r\n",
    b"=15\r\ntxt:Some string\r\n",
    b"%2\r\n+radius\r\n,4.5\r\n+diameter\r\n:9\r\n",
    b"~3\r\n+a\r\n+b\r\n+a\r\n",
    b">3\r\n+message\r\n+channel\r\n$5\r\nhello\r\n",
    b"*1\r\n*1\r\n*1\r\n*1\r\n$1\r\n!\r\n",
];

/// Every corpus entry concatenated into one pipelined stream.
#[must_use]
pub fn corpus_stream() -> Vec<u8> {
    CORPUS.concat()
}

/// Feed `input` in pieces of `chunk` bytes, collecting replies as they
/// complete.
///
/// # Errors
///
/// Returns the first error the reader reports.
pub fn read_chunked(reader: &mut Reader, input: &[u8], chunk: usize) -> Result<Vec<Reply>, DecodeError> {
    let mut replies = Vec::new();
    for piece in input.chunks(chunk.max(1)) {
        reader.feed(piece);
        for reply in reader.replies() {
            replies.push(reply?);
        }
    }
    Ok(replies)
}

/// Decode `input` fed in one piece with a default reader.
///
/// # Errors
///
/// Returns the first error the reader reports.
pub fn read_whole(input: &[u8]) -> Result<Vec<Reply>, DecodeError> {
    read_chunked(&mut Reader::new(), input, input.len())
}
