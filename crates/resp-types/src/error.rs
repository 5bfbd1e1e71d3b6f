use std::fmt;

/// Errors raised while resolving a text-decoding policy.
///
/// Both variants are lookup failures: the caller named a charset or an
/// invalid-sequence handler that this crate does not implement. They are
/// reported eagerly, when the policy is built, so a bad name never reaches
/// the decode path.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── UnknownEncoding      for unsupported charsets │
/// │   └── UnknownErrorHandler  for unsupported handlers │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("unknown encoding: {name}")]
    UnknownEncoding { name: String },

    #[error("unknown error handler name '{name}'")]
    UnknownErrorHandler { name: String },
}

/// A payload could not be decoded under the strict (or surrogate-escape)
/// handler.
///
/// The message follows the familiar codec wording so that logs read the
/// same regardless of which client produced them:
///
/// ```text
/// 'utf-8' codec can't decode byte 0x80 in position 0: invalid start byte
/// 'utf-16-le' codec can't decode byte 0x41 in position 4: truncated data
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{charset}' codec can't decode {span}: {reason}")]
pub struct TextDecodeError {
    /// Canonical name of the charset that failed.
    pub charset: &'static str,
    /// The offending byte range within the payload.
    pub span: ByteSpan,
    /// Short description of the failure.
    pub reason: &'static str,
}

impl TextDecodeError {
    #[must_use]
    pub fn new(
        charset: &'static str,
        input: &[u8],
        start: usize,
        end: usize,
        reason: &'static str,
    ) -> Self {
        Self {
            charset,
            span: ByteSpan {
                first: input.get(start).copied().unwrap_or_default(),
                start,
                end,
            },
            reason,
        }
    }
}

/// Half-open byte range `start..end` of an undecodable sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    /// The first offending byte, reported for single-byte spans.
    pub first: u8,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end.saturating_sub(self.start) <= 1 {
            write!(f, "byte {:#04x} in position {}", self.first, self.start)
        } else {
            write!(f, "bytes in position {}-{}", self.start, self.end - 1)
        }
    }
}
