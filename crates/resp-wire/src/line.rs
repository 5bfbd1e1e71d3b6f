use crate::error::WireError;

/// Length of the `\r\n` line terminator.
pub const CRLF_LEN: usize = 2;

/// Find the offset of the first `\r\n` in `buf`.
///
/// A lone `\r` that is not followed by `\n` is skipped, so a payload may
/// carry carriage returns as long as they are not line terminators.
#[must_use]
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    memchr::memmem::find(buf, b"\r\n")
}

/// Split one CRLF-terminated line off the front of `buf`.
///
/// # Returns
///
/// `Some((line, consumed))` where `line` excludes the terminator and
/// `consumed` includes it, or `None` if no terminator is buffered yet.
#[must_use]
pub fn read_line(buf: &[u8]) -> Option<(&[u8], usize)> {
    find_crlf(buf).map(|at| (&buf[..at], at + CRLF_LEN))
}

/// Parse a strict decimal `i64`.
///
/// Accepts an optional leading `-` followed by digits without leading
/// zeros (`0` itself is fine). Rejects `+`, whitespace, `-0`, empty input
/// and anything that overflows.
///
/// | Input                  | Result     |
/// |------------------------|------------|
/// | `0`                    | `Ok(0)`    |
/// | `-42`                  | `Ok(-42)`  |
/// | `9223372036854775807`  | `Ok(MAX)`  |
/// | `007`, `-0`, `+1`, ``  | `Err`      |
///
/// # Errors
///
/// Returns [`WireError::BadInteger`] on any malformed input.
pub fn parse_integer(line: &[u8]) -> Result<i64, WireError> {
    if line == b"0" {
        return Ok(0);
    }

    let (negative, digits) = match line.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, line),
    };

    match digits.first() {
        Some(b'1'..=b'9') => {}
        _ => return Err(WireError::BadInteger),
    }

    // Accumulate as a negative number so i64::MIN fits.
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(WireError::BadInteger);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_sub(i64::from(b - b'0')))
            .ok_or(WireError::BadInteger)?;
    }

    if negative {
        Ok(value)
    } else {
        value.checked_neg().ok_or(WireError::BadInteger)
    }
}

/// Longest textual double accepted, matching the widest `%f` rendering of
/// `f64::MAX` plus sign and fraction.
const MAX_DOUBLE_LEN: usize = 326;

/// Parse a RESP3 double.
///
/// `inf`, `-inf` and `nan` (any case) are accepted by name. Anything else
/// must parse as a finite `f64`.
///
/// # Errors
///
/// Returns [`WireError::BadDouble`] on malformed or overlong input.
pub fn parse_double(line: &[u8]) -> Result<f64, WireError> {
    if line.is_empty() || line.len() > MAX_DOUBLE_LEN {
        return Err(WireError::BadDouble);
    }
    let text = std::str::from_utf8(line).map_err(|_| WireError::BadDouble)?;

    if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("+inf") {
        return Ok(f64::INFINITY);
    }
    if text.eq_ignore_ascii_case("-inf") {
        return Ok(f64::NEG_INFINITY);
    }
    if text.eq_ignore_ascii_case("nan") || text.eq_ignore_ascii_case("-nan") {
        return Ok(f64::NAN);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(WireError::BadDouble),
    }
}

/// Parse a RESP3 boolean payload (`t` or `f`).
///
/// # Errors
///
/// Returns [`WireError::BadBool`] for anything other than a single
/// `t` or `f`.
pub fn parse_bool(line: &[u8]) -> Result<bool, WireError> {
    match line {
        b"t" => Ok(true),
        b"f" => Ok(false),
        _ => Err(WireError::BadBool),
    }
}

/// Validate a RESP3 null payload, which must be empty.
///
/// # Errors
///
/// Returns [`WireError::BadNil`] if the line carries any bytes.
pub fn parse_null(line: &[u8]) -> Result<(), WireError> {
    if line.is_empty() {
        Ok(())
    } else {
        Err(WireError::BadNil)
    }
}

/// Parse the length line of a bulk value.
///
/// Returns `None` for the `-1` nil sentinel.
///
/// # Errors
///
/// - [`WireError::BadBulkLength`] if the line is not an integer.
/// - [`WireError::BulkLengthOutOfRange`] for lengths below `-1` or
///   beyond the address space.
pub fn parse_bulk_len(line: &[u8]) -> Result<Option<usize>, WireError> {
    let len = parse_integer(line).map_err(|_| WireError::BadBulkLength)?;
    match len {
        -1 => Ok(None),
        n if n < -1 => Err(WireError::BulkLengthOutOfRange),
        n => usize::try_from(n)
            .map(Some)
            .map_err(|_| WireError::BulkLengthOutOfRange),
    }
}

/// Parse the count line of an aggregate value.
///
/// Returns `None` for the `-1` null-aggregate sentinel.
///
/// # Errors
///
/// - [`WireError::BadMultiBulkLength`] if the line is not an integer.
/// - [`WireError::MultiBulkLengthOutOfRange`] for counts below `-1` or
///   above `max_elements`.
pub fn parse_aggregate_len(line: &[u8], max_elements: usize) -> Result<Option<usize>, WireError> {
    let count = parse_integer(line).map_err(|_| WireError::BadMultiBulkLength)?;
    match count {
        -1 => Ok(None),
        n if n < -1 => Err(WireError::MultiBulkLengthOutOfRange),
        n => match usize::try_from(n) {
            Ok(count) if count <= max_elements => Ok(Some(count)),
            _ => Err(WireError::MultiBulkLengthOutOfRange),
        },
    }
}
