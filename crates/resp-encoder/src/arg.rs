use std::borrow::Cow;

use bytes::Bytes;

use crate::error::EncodeError;
use crate::number::{format_f32, format_f64};

/// One command argument.
///
/// Every argument is sent as a bulk string; the variant only decides how
/// its bytes are produced:
///
/// ```text
/// ┌──────────┬──────────────────────────────┬──────────────────────┐
/// │ Variant  │ Built from                   │ Bytes on the wire    │
/// ├──────────┼──────────────────────────────┼──────────────────────┤
/// │ Bytes    │ &[u8], &Vec<u8>, &Bytes      │ as-is                │
/// │ Text     │ &str, &String                │ UTF-8                │
/// │ Int      │ i8 ... i128, isize           │ decimal              │
/// │ UInt     │ u8 ... u128, usize           │ decimal              │
/// │ Digits   │ Arg::big_integer("...")      │ validated decimal    │
/// │ Float    │ f64                          │ shortest repr        │
/// │ Float32  │ f32                          │ shortest repr (f32)  │
/// └──────────┴──────────────────────────────┴──────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
    Int(i128),
    UInt(u128),
    /// A decimal integer too wide for any primitive.
    Digits(&'a str),
    Float(f64),
    Float32(f32),
}

impl<'a> Arg<'a> {
    /// An integer of arbitrary width given as decimal text.
    ///
    /// Accepts an optional leading `-` followed by digits, without leading
    /// zeros (`0` itself is fine).
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidInteger`] if `digits` is not such a
    /// literal.
    pub fn big_integer(digits: &'a str) -> Result<Self, EncodeError> {
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        let valid = match unsigned.as_bytes() {
            [] => false,
            [b'0'] => unsigned.len() == digits.len(),
            [b'0', ..] => false,
            bytes => bytes.iter().all(u8::is_ascii_digit),
        };
        if valid {
            Ok(Self::Digits(digits))
        } else {
            Err(EncodeError::InvalidInteger {
                digits: digits.to_string(),
            })
        }
    }

    /// The bytes this argument is sent as.
    #[must_use]
    pub fn to_bytes(&self) -> Cow<'a, [u8]> {
        match *self {
            Self::Bytes(b) => Cow::Borrowed(b),
            Self::Text(s) | Self::Digits(s) => Cow::Borrowed(s.as_bytes()),
            Self::Int(n) => Cow::Owned(itoa::Buffer::new().format(n).as_bytes().to_vec()),
            Self::UInt(n) => Cow::Owned(itoa::Buffer::new().format(n).as_bytes().to_vec()),
            Self::Float(f) => Cow::Owned(format_f64(f).into_bytes()),
            Self::Float32(f) => Cow::Owned(format_f32(f).into_bytes()),
        }
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Arg<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a Bytes> for Arg<'a> {
    fn from(b: &'a Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Arg<'_> {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Arg<'_> {
    fn from(f: f32) -> Self {
        Self::Float32(f)
    }
}

macro_rules! int_arg {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Arg<'_> {
                fn from(n: $ty) -> Self {
                    Self::$variant(n.into())
                }
            }
        )*
    };
}

int_arg!(Int: i8, i16, i32, i64, i128);
int_arg!(UInt: u8, u16, u32, u64, u128);

impl From<isize> for Arg<'_> {
    fn from(n: isize) -> Self {
        // isize is at most 64 bits on every supported target.
        Self::Int(n as i128)
    }
}

impl From<usize> for Arg<'_> {
    fn from(n: usize) -> Self {
        Self::UInt(n as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(arg: Arg<'_>) -> String {
        String::from_utf8(arg.to_bytes().into_owned()).unwrap()
    }

    #[test]
    fn integer_widths() {
        assert_eq!(text(Arg::from(-7i8)), "-7");
        assert_eq!(text(Arg::from(u64::MAX)), "18446744073709551615");
        assert_eq!(text(Arg::from(i128::MIN)), "-170141183460469231731687303715884105728");
        assert_eq!(text(Arg::from(usize::MIN)), "0");
    }

    #[test]
    fn borrowed_forms_do_not_copy() {
        let owned = String::from("value");
        assert!(matches!(Arg::from(&owned).to_bytes(), Cow::Borrowed(b"value")));
        assert!(matches!(Arg::from(b"raw").to_bytes(), Cow::Borrowed(_)));
    }

    #[test]
    fn big_integer_validation() {
        let two_128 = "340282366920938463463374607431768211456";
        assert_eq!(Arg::big_integer(two_128), Ok(Arg::Digits(two_128)));
        assert!(Arg::big_integer("0").is_ok());
        assert!(Arg::big_integer("-12").is_ok());
        for bad in ["", "-", "-0", "007", "1_000", "12a", "+5", " 1"] {
            assert!(Arg::big_integer(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn floats() {
        assert_eq!(text(Arg::from(3.141_592_653_59)), "3.14159265359");
        assert_eq!(text(Arg::from(0.1f32)), "0.1");
    }
}
