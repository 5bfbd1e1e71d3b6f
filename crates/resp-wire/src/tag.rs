/// RESP type tag bytes.
///
/// The first byte of every encoded value selects its type. RESP2 defines
/// the first five; the rest arrived with RESP3.
pub mod tag {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
    pub const NULL: u8 = b'_';
    pub const BOOLEAN: u8 = b'#';
    pub const DOUBLE: u8 = b',';
    pub const BIG_NUMBER: u8 = b'(';
    pub const BULK_ERROR: u8 = b'!';
    pub const VERBATIM_STRING: u8 = b'=';
    pub const MAP: u8 = b'%';
    pub const SET: u8 = b'~';
    pub const PUSH: u8 = b'>';
}

/// The reply type selected by a tag byte.
///
/// ```text
/// ┌─────┬────────────────┬───────────┐
/// │ Tag │ Type           │ Shape     │
/// ├─────┼────────────────┼───────────┤
/// │ +   │ SimpleString   │ Line      │
/// │ -   │ Error          │ Line      │
/// │ :   │ Integer        │ Line      │
/// │ _   │ Null           │ Line      │
/// │ #   │ Boolean        │ Line      │
/// │ ,   │ Double         │ Line      │
/// │ (   │ BigNumber      │ Line      │
/// │ $   │ BulkString     │ Bulk      │
/// │ !   │ BulkError      │ Bulk      │
/// │ =   │ VerbatimString │ Bulk      │
/// │ *   │ Array          │ Aggregate │
/// │ %   │ Map            │ Aggregate │
/// │ ~   │ Set            │ Aggregate │
/// │ >   │ Push           │ Aggregate │
/// └─────┴────────────────┴───────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplyType {
    SimpleString,
    Error,
    Integer,
    Null,
    Boolean,
    Double,
    BigNumber,
    BulkString,
    BulkError,
    VerbatimString,
    Array,
    Map,
    Set,
    Push,
}

/// How a reply type is framed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Payload runs up to the first CRLF.
    Line,
    /// `<len>CRLF<len bytes>CRLF`.
    Bulk,
    /// `<count>CRLF` followed by `count` nested values.
    Aggregate,
}

impl ReplyType {
    /// Look up the reply type for a tag byte, or `None` if the byte is
    /// not a known RESP2/RESP3 tag.
    #[must_use]
    pub fn from_tag(byte: u8) -> Option<Self> {
        let ty = match byte {
            tag::SIMPLE_STRING => Self::SimpleString,
            tag::ERROR => Self::Error,
            tag::INTEGER => Self::Integer,
            tag::NULL => Self::Null,
            tag::BOOLEAN => Self::Boolean,
            tag::DOUBLE => Self::Double,
            tag::BIG_NUMBER => Self::BigNumber,
            tag::BULK_STRING => Self::BulkString,
            tag::BULK_ERROR => Self::BulkError,
            tag::VERBATIM_STRING => Self::VerbatimString,
            tag::ARRAY => Self::Array,
            tag::MAP => Self::Map,
            tag::SET => Self::Set,
            tag::PUSH => Self::Push,
            _ => return None,
        };
        Some(ty)
    }

    /// The tag byte that introduces this type.
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::SimpleString => tag::SIMPLE_STRING,
            Self::Error => tag::ERROR,
            Self::Integer => tag::INTEGER,
            Self::Null => tag::NULL,
            Self::Boolean => tag::BOOLEAN,
            Self::Double => tag::DOUBLE,
            Self::BigNumber => tag::BIG_NUMBER,
            Self::BulkString => tag::BULK_STRING,
            Self::BulkError => tag::BULK_ERROR,
            Self::VerbatimString => tag::VERBATIM_STRING,
            Self::Array => tag::ARRAY,
            Self::Map => tag::MAP,
            Self::Set => tag::SET,
            Self::Push => tag::PUSH,
        }
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            Self::SimpleString
            | Self::Error
            | Self::Integer
            | Self::Null
            | Self::Boolean
            | Self::Double
            | Self::BigNumber => Shape::Line,
            Self::BulkString | Self::BulkError | Self::VerbatimString => Shape::Bulk,
            Self::Array | Self::Map | Self::Set | Self::Push => Shape::Aggregate,
        }
    }

    /// Whether values of this type are built by the reply-error factory.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::BulkError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ReplyType; 14] = [
        ReplyType::SimpleString,
        ReplyType::Error,
        ReplyType::Integer,
        ReplyType::Null,
        ReplyType::Boolean,
        ReplyType::Double,
        ReplyType::BigNumber,
        ReplyType::BulkString,
        ReplyType::BulkError,
        ReplyType::VerbatimString,
        ReplyType::Array,
        ReplyType::Map,
        ReplyType::Set,
        ReplyType::Push,
    ];

    #[test]
    fn tag_lookup_is_inverse_of_tag() {
        for ty in ALL {
            assert_eq!(ReplyType::from_tag(ty.tag()), Some(ty));
        }
    }

    #[test]
    fn attribute_and_junk_tags_are_unknown() {
        assert_eq!(ReplyType::from_tag(b'|'), None);
        assert_eq!(ReplyType::from_tag(b'x'), None);
        assert_eq!(ReplyType::from_tag(b'\r'), None);
    }

    #[test]
    fn error_types_are_flagged() {
        let errors: Vec<_> = ALL.into_iter().filter(|t| t.is_error()).collect();
        assert_eq!(errors, vec![ReplyType::Error, ReplyType::BulkError]);
    }

    #[test]
    fn push_is_framed_like_array() {
        assert_eq!(ReplyType::Push.shape(), ReplyType::Array.shape());
    }
}
