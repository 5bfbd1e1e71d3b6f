use std::fmt::Write as _;

use crate::error::{TextDecodeError, TypeError};

/// First code point of the block that `surrogateescape` maps undecodable
/// bytes into.
///
/// Byte `0xNN` (always `>= 0x80`) becomes `U+EFNN`, a private-use code
/// point, so the text stays a valid `String` and the original byte can be
/// recovered with `ch as u32 - SURROGATE_ESCAPE_BASE`.
pub const SURROGATE_ESCAPE_BASE: u32 = 0xEF00;

/// Character sets the reader can decode string payloads with.
///
/// Names are resolved case-insensitively and `_` or a space may stand in
/// for `-`:
///
/// ```text
/// ┌───────────┬───────────────────────────────────────────────┐
/// │ Charset   │ Accepted names                                │
/// ├───────────┼───────────────────────────────────────────────┤
/// │ Utf8      │ utf-8, utf8, u8, utf                          │
/// │ Utf16     │ utf-16, utf16, u16 (BOM-aware, LE default)    │
/// │ Utf16Le   │ utf-16-le, utf-16le, utf16le                  │
/// │ Utf16Be   │ utf-16-be, utf-16be, utf16be                  │
/// │ Latin1    │ latin-1, latin1, iso-8859-1, iso8859-1, l1    │
/// │ Ascii     │ ascii, us-ascii, 646                          │
/// └───────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Utf16,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
}

impl Charset {
    /// Resolve a charset by name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownEncoding`] if the name is not recognised.
    pub fn lookup(name: &str) -> Result<Self, TypeError> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        let charset = match normalized.as_str() {
            "utf-8" | "utf8" | "u8" | "utf" => Self::Utf8,
            "utf-16" | "utf16" | "u16" => Self::Utf16,
            "utf-16-le" | "utf-16le" | "utf16le" => Self::Utf16Le,
            "utf-16-be" | "utf-16be" | "utf16be" => Self::Utf16Be,
            "latin-1" | "latin1" | "latin" | "iso-8859-1" | "iso8859-1" | "8859" | "l1" => {
                Self::Latin1
            }
            "ascii" | "us-ascii" | "646" => Self::Ascii,
            _ => {
                return Err(TypeError::UnknownEncoding {
                    name: name.to_string(),
                });
            }
        };
        Ok(charset)
    }

    /// Canonical name, as used in decode error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16-le",
            Self::Utf16Be => "utf-16-be",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }

    /// Decode `input` into text, resolving invalid sequences with `errors`.
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError`] if `errors` is [`DecodeErrors::Strict`]
    /// and the input is invalid, or if `surrogateescape` meets an invalid
    /// byte below `0x80`.
    pub fn decode(self, input: &[u8], errors: DecodeErrors) -> Result<String, TextDecodeError> {
        let mut out = String::with_capacity(input.len());
        let mut sink = Sink {
            charset: self,
            errors,
            input,
            out: &mut out,
        };
        match self {
            Self::Utf8 => sink.utf8()?,
            Self::Utf16 => sink.utf16(None)?,
            Self::Utf16Le => sink.utf16(Some(false))?,
            Self::Utf16Be => sink.utf16(Some(true))?,
            Self::Latin1 => sink.out.extend(input.iter().map(|&b| char::from(b))),
            Self::Ascii => sink.ascii()?,
        }
        Ok(out)
    }
}

/// How invalid byte sequences are handled during decoding.
///
/// | Handler            | Effect on an invalid sequence               |
/// |--------------------|---------------------------------------------|
/// | `strict`           | fail with [`TextDecodeError`]               |
/// | `ignore`           | drop it                                     |
/// | `replace`          | emit one `U+FFFD`                           |
/// | `surrogateescape`  | emit `U+EF80..U+EFFF`, one per byte         |
/// | `backslashreplace` | emit `\xNN`, one per byte                   |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecodeErrors {
    #[default]
    Strict,
    Ignore,
    Replace,
    SurrogateEscape,
    BackslashReplace,
}

impl DecodeErrors {
    /// Resolve a handler by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownErrorHandler`] if the name is not one
    /// of the supported handlers.
    pub fn lookup(name: &str) -> Result<Self, TypeError> {
        match name {
            "strict" => Ok(Self::Strict),
            "ignore" => Ok(Self::Ignore),
            "replace" => Ok(Self::Replace),
            "surrogateescape" => Ok(Self::SurrogateEscape),
            "backslashreplace" => Ok(Self::BackslashReplace),
            _ => Err(TypeError::UnknownErrorHandler {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Ignore => "ignore",
            Self::Replace => "replace",
            Self::SurrogateEscape => "surrogateescape",
            Self::BackslashReplace => "backslashreplace",
        }
    }
}

/// The text-decoding policy applied to string payloads.
///
/// A policy without a charset is *raw*: payloads are returned as bytes.
/// The default policy is raw with the `strict` handler, so switching a
/// charset on later keeps strict semantics unless told otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextPolicy {
    charset: Option<Charset>,
    errors: DecodeErrors,
}

impl TextPolicy {
    /// Raw policy: no decoding.
    pub const RAW: Self = Self {
        charset: None,
        errors: DecodeErrors::Strict,
    };

    /// Resolve a policy from optional names.
    ///
    /// `None` for `encoding` selects the raw policy; `None` for `errors`
    /// selects `strict`. Both names are validated before anything is
    /// returned, so a failed lookup leaves no partial policy behind.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownEncoding`] or
    /// [`TypeError::UnknownErrorHandler`] for unsupported names.
    pub fn new(encoding: Option<&str>, errors: Option<&str>) -> Result<Self, TypeError> {
        let charset = encoding.map(Charset::lookup).transpose()?;
        let errors = errors.map(DecodeErrors::lookup).transpose()?.unwrap_or_default();
        Ok(Self { charset, errors })
    }

    #[must_use]
    pub fn with_charset(charset: Charset, errors: DecodeErrors) -> Self {
        Self {
            charset: Some(charset),
            errors,
        }
    }

    #[must_use]
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    #[must_use]
    pub fn errors(&self) -> DecodeErrors {
        self.errors
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.charset.is_none()
    }
}

/// Decoding cursor shared by the per-charset loops.
struct Sink<'a> {
    charset: Charset,
    errors: DecodeErrors,
    input: &'a [u8],
    out: &'a mut String,
}

impl Sink<'_> {
    /// Resolve `input[start..end]` with the configured handler.
    fn invalid(&mut self, start: usize, end: usize, reason: &'static str) -> Result<(), TextDecodeError> {
        let input = self.input;
        let bad = &input[start..end];
        match self.errors {
            DecodeErrors::Strict => Err(self.error(start, end, reason)),
            DecodeErrors::Ignore => Ok(()),
            DecodeErrors::Replace => {
                self.out.push(char::REPLACEMENT_CHARACTER);
                Ok(())
            }
            DecodeErrors::BackslashReplace => {
                for b in bad {
                    let _ = write!(self.out, "\\x{b:02x}");
                }
                Ok(())
            }
            DecodeErrors::SurrogateEscape => {
                if bad.iter().any(|&b| b < 0x80) {
                    return Err(self.error(start, end, reason));
                }
                for &b in bad {
                    let escaped = char::from_u32(SURROGATE_ESCAPE_BASE + u32::from(b))
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    self.out.push(escaped);
                }
                Ok(())
            }
        }
    }

    fn error(&self, start: usize, end: usize, reason: &'static str) -> TextDecodeError {
        TextDecodeError::new(self.charset.name(), self.input, start, end, reason)
    }

    fn utf8(&mut self) -> Result<(), TextDecodeError> {
        let input = self.input;
        let mut offset = 0;
        loop {
            let rest = &input[offset..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.out.push_str(text);
                    return Ok(());
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        self.out.push_str(text);
                    }
                    let (bad_len, reason) = match e.error_len() {
                        Some(n) if is_utf8_lead(rest[valid]) => (n, "invalid continuation byte"),
                        Some(n) => (n, "invalid start byte"),
                        None => (rest.len() - valid, "unexpected end of data"),
                    };
                    let start = offset + valid;
                    self.invalid(start, start + bad_len, reason)?;
                    offset = start + bad_len;
                }
            }
        }
    }

    /// `big_endian = None` means detect a BOM, defaulting to little-endian.
    fn utf16(&mut self, big_endian: Option<bool>) -> Result<(), TextDecodeError> {
        let input = self.input;
        let (big_endian, mut i) = match big_endian {
            Some(be) => (be, 0),
            None => match input {
                [0xFF, 0xFE, ..] => (false, 2),
                [0xFE, 0xFF, ..] => (true, 2),
                _ => (false, 0),
            },
        };
        let unit_at = |at: usize| {
            let pair = [input[at], input[at + 1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        };

        while i < input.len() {
            if i + 1 >= input.len() {
                return self.invalid(i, input.len(), "truncated data");
            }
            let unit = unit_at(i);
            match unit {
                0xD800..=0xDBFF => {
                    if i + 3 >= input.len() {
                        return self.invalid(i, input.len(), "unexpected end of data");
                    }
                    let low = unit_at(i + 2);
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let code = 0x10000
                            + ((u32::from(unit) - 0xD800) << 10)
                            + (u32::from(low) - 0xDC00);
                        self.out
                            .push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                        i += 4;
                    } else {
                        self.invalid(i, i + 2, "illegal UTF-16 surrogate")?;
                        i += 2;
                    }
                }
                0xDC00..=0xDFFF => {
                    self.invalid(i, i + 2, "illegal encoding")?;
                    i += 2;
                }
                _ => {
                    self.out.push(
                        char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
                    );
                    i += 2;
                }
            }
        }
        Ok(())
    }

    fn ascii(&mut self) -> Result<(), TextDecodeError> {
        for (i, &b) in self.input.iter().enumerate() {
            if b.is_ascii() {
                self.out.push(char::from(b));
            } else {
                self.invalid(i, i + 1, "ordinal not in range(128)")?;
            }
        }
        Ok(())
    }
}

/// Whether `b` can start a multi-byte UTF-8 sequence.
fn is_utf8_lead(b: u8) -> bool {
    matches!(b, 0xC2..=0xF4)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNOWMAN_UTF8: &[u8] = b"\xe2\x98\x83";

    fn decode(charset: Charset, errors: DecodeErrors, input: &[u8]) -> Result<String, TextDecodeError> {
        charset.decode(input, errors)
    }

    // ── lookup ──────────────────────────────────────────────────────────

    #[test]
    fn charset_names_are_normalized() {
        assert_eq!(Charset::lookup("UTF-8"), Ok(Charset::Utf8));
        assert_eq!(Charset::lookup("utf_16_le"), Ok(Charset::Utf16Le));
        assert_eq!(Charset::lookup("ISO-8859-1"), Ok(Charset::Latin1));
        assert!(matches!(
            Charset::lookup("unknown"),
            Err(TypeError::UnknownEncoding { name }) if name == "unknown"
        ));
    }

    #[test]
    fn handler_names_are_exact() {
        assert_eq!(DecodeErrors::lookup("surrogateescape"), Ok(DecodeErrors::SurrogateEscape));
        assert!(DecodeErrors::lookup("Strict").is_err());
    }

    #[test]
    fn policy_rejects_bad_names_without_partial_result() {
        assert!(TextPolicy::new(Some("utf-8"), Some("unknown")).is_err());
        assert!(TextPolicy::new(Some("unknown"), Some("strict")).is_err());
        let policy = TextPolicy::new(None, None).unwrap();
        assert!(policy.is_raw());
        assert_eq!(policy.errors(), DecodeErrors::Strict);
    }

    // ── utf-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_valid() {
        assert_eq!(decode(Charset::Utf8, DecodeErrors::Strict, SNOWMAN_UTF8).unwrap(), "☃");
    }

    #[test]
    fn utf8_strict_reports_position() {
        let err = decode(Charset::Utf8, DecodeErrors::Strict, b"\x80value").unwrap_err();
        assert_eq!(err.span.start, 0);
        assert_eq!(err.reason, "invalid start byte");
    }

    #[test]
    fn utf8_handlers() {
        let input = b"\x80value";
        assert_eq!(decode(Charset::Utf8, DecodeErrors::Ignore, input).unwrap(), "value");
        assert_eq!(decode(Charset::Utf8, DecodeErrors::Replace, input).unwrap(), "\u{fffd}value");
        assert_eq!(
            decode(Charset::Utf8, DecodeErrors::SurrogateEscape, input).unwrap(),
            "\u{ef80}value"
        );
        assert_eq!(
            decode(Charset::Utf8, DecodeErrors::BackslashReplace, input).unwrap(),
            "\\x80value"
        );
    }

    #[test]
    fn utf8_truncated_tail_is_one_replacement() {
        let out = decode(Charset::Utf8, DecodeErrors::Replace, b"ok\xe2\x98").unwrap();
        assert_eq!(out, "ok\u{fffd}");
    }

    #[test]
    fn surrogate_escape_is_reversible() {
        let out = decode(Charset::Utf8, DecodeErrors::SurrogateEscape, b"a\xff").unwrap();
        let last = out.chars().last().unwrap();
        assert_eq!(u32::from(last) - SURROGATE_ESCAPE_BASE, 0xff);
    }

    // ── utf-16 ──────────────────────────────────────────────────────────

    #[test]
    fn utf16_detects_bom() {
        assert_eq!(decode(Charset::Utf16, DecodeErrors::Strict, b"\xff\xfe\x03&").unwrap(), "☃");
        assert_eq!(decode(Charset::Utf16, DecodeErrors::Strict, b"\xfe\xff&\x03").unwrap(), "☃");
    }

    #[test]
    fn utf16_surrogate_pair() {
        // U+1F600 as D83D DE00, little-endian
        let input = [0x3D, 0xD8, 0x00, 0xDE];
        assert_eq!(decode(Charset::Utf16Le, DecodeErrors::Strict, &input).unwrap(), "😀");
    }

    #[test]
    fn utf16_odd_length_is_truncated() {
        let err = decode(Charset::Utf16Le, DecodeErrors::Strict, b"a\x00b").unwrap_err();
        assert_eq!(err.reason, "truncated data");
        assert_eq!(err.span.start, 2);
    }

    #[test]
    fn utf16_lone_low_surrogate() {
        let input = [0x00, 0xDC, b'a', 0x00];
        assert_eq!(decode(Charset::Utf16Le, DecodeErrors::Replace, &input).unwrap(), "\u{fffd}a");
    }

    // ── single-byte charsets ────────────────────────────────────────────

    #[test]
    fn latin1_never_fails() {
        assert_eq!(decode(Charset::Latin1, DecodeErrors::Strict, b"caf\xe9").unwrap(), "café");
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        let err = decode(Charset::Ascii, DecodeErrors::Strict, b"ab\xe9").unwrap_err();
        assert_eq!(err.to_string(), "'ascii' codec can't decode byte 0xe9 in position 2: ordinal not in range(128)");
        assert_eq!(decode(Charset::Ascii, DecodeErrors::Ignore, b"ab\xe9").unwrap(), "ab");
    }
}
