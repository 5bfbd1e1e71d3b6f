use std::fmt::Write as _;

/// Exponent range (of the leading digit) rendered in fixed notation.
///
/// Outside `[-4, 16)` floats switch to scientific notation, the same
/// cut-over as the shortest-repr "general" format.
const FIXED_EXPONENTS: std::ops::Range<i32> = -4..16;

/// Render a float as its shortest round-trip decimal text.
///
/// | Value           | Text              |
/// |-----------------|-------------------|
/// | `3.14159265359` | `3.14159265359`   |
/// | `1.0`           | `1.0`             |
/// | `-0.0`          | `-0.0`            |
/// | `1e15`          | `1000000000000000.0` |
/// | `1e16`          | `1e+16`           |
/// | `0.0001`        | `0.0001`          |
/// | `0.00001`       | `1e-05`           |
/// | `inf` / `nan`   | `inf` / `nan`     |
#[must_use]
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    from_scientific(&format!("{value:e}"))
}

/// [`format_f64`] for single-precision values.
///
/// Uses the shortest digits that round-trip as `f32`, so `0.1f32` packs
/// as `0.1` rather than its widened `f64` expansion.
#[must_use]
pub fn format_f32(value: f32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    from_scientific(&format!("{value:e}"))
}

/// Re-lay Rust's shortest `{:e}` output (`-1.5e-5`) in repr form.
fn from_scientific(sci: &str) -> String {
    let (negative, body) = match sci.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, sci),
    };
    let (mantissa, exponent) = body.split_once('e').unwrap_or((body, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if FIXED_EXPONENTS.contains(&exponent) {
        // Position of the decimal point relative to the first digit.
        let point = exponent + 1;
        if point <= 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', point.unsigned_abs() as usize));
            out.push_str(&digits);
        } else {
            let point = point.unsigned_abs() as usize;
            if point >= digits.len() {
                out.push_str(&digits);
                out.extend(std::iter::repeat_n('0', point - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..point]);
                out.push('.');
                out.push_str(&digits[point..]);
            }
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let _ = write!(out, "e{exponent:+03}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_notation() {
        assert_eq!(format_f64(3.141_592_653_59), "3.14159265359");
        assert_eq!(format_f64(1.0), "1.0");
        assert_eq!(format_f64(0.0), "0.0");
        assert_eq!(format_f64(-0.0), "-0.0");
        assert_eq!(format_f64(-99.5), "-99.5");
        assert_eq!(format_f64(0.1), "0.1");
        assert_eq!(format_f64(0.0001), "0.0001");
        assert_eq!(format_f64(123_456.789), "123456.789");
        assert_eq!(format_f64(1e15), "1000000000000000.0");
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(format_f64(1e16), "1e+16");
        assert_eq!(format_f64(0.000_01), "1e-05");
        assert_eq!(format_f64(1.5e-5), "1.5e-05");
        assert_eq!(format_f64(-2.5e100), "-2.5e+100");
        assert_eq!(format_f64(f64::MAX), "1.7976931348623157e+308");
        assert_eq!(format_f64(5e-324), "5e-324");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_f64(f64::INFINITY), "inf");
        assert_eq!(format_f64(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_f64(f64::NAN), "nan");
        assert_eq!(format_f32(f32::NEG_INFINITY), "-inf");
    }

    #[test]
    fn single_precision_uses_own_shortest_digits() {
        assert_eq!(format_f32(0.1), "0.1");
        assert_eq!(format_f32(2.5), "2.5");
        assert_eq!(format_f32(1e20), "1e+20");
    }

    #[test]
    fn text_round_trips() {
        for value in [0.1, 1.0 / 3.0, 2.0f64.powi(60), 6.02e23, 1e-7, -123.456] {
            let text = format_f64(value);
            assert_eq!(text.parse::<f64>().unwrap(), value, "{text}");
        }
    }
}
