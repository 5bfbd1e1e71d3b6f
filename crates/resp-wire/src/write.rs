use crate::line::CRLF_LEN;
use crate::tag::tag;

/// Number of decimal digits needed to render `value`.
#[must_use]
pub fn decimal_len(value: usize) -> usize {
    itoa::Buffer::new().format(value).len()
}

/// Encoded size of a `<tag><len>\r\n` header.
#[must_use]
pub fn header_len(len: usize) -> usize {
    1 + decimal_len(len) + CRLF_LEN
}

/// Encoded size of a bulk string carrying `payload_len` bytes.
///
/// ```text
/// ┌─────┬────────┬──────┬──────────────────┬──────┐
/// │ $   │ digits │ \r\n │ payload          │ \r\n │
/// └─────┴────────┴──────┴──────────────────┴──────┘
/// ```
#[must_use]
pub fn bulk_len(payload_len: usize) -> usize {
    header_len(payload_len) + payload_len + CRLF_LEN
}

/// Append a `<tag><len>\r\n` header.
pub fn write_header(out: &mut Vec<u8>, tag_byte: u8, len: usize) {
    let mut digits = itoa::Buffer::new();
    out.push(tag_byte);
    out.extend_from_slice(digits.format(len).as_bytes());
    out.extend_from_slice(b"\r\n");
}

/// Append a complete bulk string: `$<len>\r\n<payload>\r\n`.
pub fn write_bulk(out: &mut Vec<u8>, payload: &[u8]) {
    write_header(out, tag::BULK_STRING, payload.len());
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\r\n");
}
