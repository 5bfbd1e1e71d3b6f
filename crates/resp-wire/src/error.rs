use std::fmt;

/// A framing violation in a RESP byte stream.
///
/// The `Display` text of each variant is the diagnostic string handed to
/// the reader's protocol-error factory, so the wording is kept stable and
/// close to what Redis clients have always reported.
///
/// ```text
///   WireError
///   ├── UnknownTag              ← first byte is not a RESP type tag
///   ├── BadInteger              ← `:` payload is not a strict i64
///   ├── BadDouble               ← `,` payload is not a float
///   ├── BadBool                 ← `#` payload is not `t` or `f`
///   ├── BadNil                  ← `_` carries a payload
///   ├── BadBulkLength           ← length line is not an integer
///   ├── BadMultiBulkLength      ← count line is not an integer
///   ├── BulkLengthOutOfRange    ← length below -1
///   ├── MultiBulkLengthOutOfRange ← count below -1 or above the ceiling
///   ├── BadVerbatim             ← `=` payload lacks a `xxx:` format tag
///   ├── MissingTrailingCrlf     ← bulk payload not followed by CRLF
///   └── ExceedsMaxBuf           ← pending reply larger than maxbuf
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("Protocol error, got {0} as reply type byte")]
    UnknownTag(TagByte),

    #[error("Bad integer value")]
    BadInteger,

    #[error("Bad double value")]
    BadDouble,

    #[error("Bad bool value")]
    BadBool,

    #[error("Bad nil value")]
    BadNil,

    #[error("Bad bulk string length")]
    BadBulkLength,

    #[error("Bad multi-bulk length")]
    BadMultiBulkLength,

    #[error("Bulk string length out of range")]
    BulkLengthOutOfRange,

    #[error("Multi-bulk length out of range")]
    MultiBulkLengthOutOfRange,

    #[error("Verbatim string 4 bytes of content type are missing or incorrectly encoded.")]
    BadVerbatim,

    #[error("Bulk string missing trailing CRLF")]
    MissingTrailingCrlf,

    /// The pending reply needs more than `limit` bytes of buffer.
    #[error("Reply exceeds maxbuf ({limit} bytes)")]
    ExceedsMaxBuf { limit: usize },
}

/// A raw byte rendered the way protocol diagnostics quote it.
///
/// Printable ASCII is shown as-is inside double quotes, the usual control
/// characters use their C escapes, and everything else becomes `\xNN`.
///
/// | Byte   | Rendered  |
/// |--------|-----------|
/// | `x`    | `"x"`     |
/// | `"`    | `"\""`    |
/// | `\r`   | `"\r"`    |
/// | `0x01` | `"\x01"`  |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagByte(pub u8);

impl fmt::Display for TagByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\\' => f.write_str("\"\\\\\""),
            b'"' => f.write_str("\"\\\"\""),
            b'\n' => f.write_str("\"\\n\""),
            b'\r' => f.write_str("\"\\r\""),
            b'\t' => f.write_str("\"\\t\""),
            0x07 => f.write_str("\"\\a\""),
            0x08 => f.write_str("\"\\b\""),
            b if b.is_ascii_graphic() || b == b' ' => write!(f, "\"{}\"", char::from(b)),
            b => write!(f, "\"\\x{b:02x}\""),
        }
    }
}
