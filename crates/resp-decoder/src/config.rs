use std::fmt;

use resp_types::{ErrorReply, Reply, TextPolicy, TypeError};

use crate::error::{BoxError, DecodeError};

/// Default ceiling on the bytes a single pending reply may occupy.
///
/// Matches the largest bulk string a Redis server will send (512 MiB).
pub const DEFAULT_MAX_BUF: usize = 512 * 1024 * 1024;

/// Default ceiling on the element count of one aggregate.
pub const DEFAULT_MAX_ELEMENTS: usize = u32::MAX as usize;

/// Configuration for a [`Reader`](crate::Reader).
///
/// ```text
/// ┌────────────────┬─────────────────────────────────────────────────────┐
/// │ Field          │ Purpose                                             │
/// ├────────────────┼─────────────────────────────────────────────────────┤
/// │ text           │ Charset and invalid-sequence handler for strings    │
/// │ protocol_error │ Builds the error returned on framing violations     │
/// │ reply_error    │ Builds the value returned for `-` and `!` replies   │
/// │ not_ready      │ Returned by gets_or_not_ready() with nothing queued │
/// │ max_buf        │ Byte ceiling for one pending reply (0 = unlimited)  │
/// │ max_elements   │ Element ceiling for one aggregate                   │
/// └────────────────┴─────────────────────────────────────────────────────┘
/// ```
///
/// The default reads raw bytes, reports errors as [`ErrorReply`] values,
/// uses `false` as the not-ready sentinel and caps replies at
/// [`DEFAULT_MAX_BUF`] bytes and [`DEFAULT_MAX_ELEMENTS`] elements.
#[derive(Debug)]
pub struct ReaderConfig {
    pub text: TextPolicy,
    pub protocol_error: ProtocolErrorPolicy,
    pub reply_error: ReplyErrorPolicy,
    pub not_ready: Reply,
    pub max_buf: usize,
    pub max_elements: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            text: TextPolicy::RAW,
            protocol_error: ProtocolErrorPolicy::Default,
            reply_error: ReplyErrorPolicy::Default,
            not_ready: Reply::Bool(false),
            max_buf: DEFAULT_MAX_BUF,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl ReaderConfig {
    /// Replace the text policy by name.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeError`] if either name is unknown.
    pub fn with_encoding(
        mut self,
        encoding: Option<&str>,
        errors: Option<&str>,
    ) -> Result<Self, TypeError> {
        self.text = TextPolicy::new(encoding, errors)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_protocol_error(mut self, policy: ProtocolErrorPolicy) -> Self {
        self.protocol_error = policy;
        self
    }

    #[must_use]
    pub fn with_reply_error(mut self, policy: ReplyErrorPolicy) -> Self {
        self.reply_error = policy;
        self
    }

    #[must_use]
    pub fn with_not_ready(mut self, sentinel: Reply) -> Self {
        self.not_ready = sentinel;
        self
    }

    #[must_use]
    pub fn with_max_buf(mut self, max_buf: usize) -> Self {
        self.max_buf = max_buf;
        self
    }

    #[must_use]
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }
}

type ProtocolFactory = dyn Fn(&str) -> Result<BoxError, BoxError> + Send;
type ReplyFactory = dyn Fn(&str) -> Result<Reply, BoxError> + Send;

/// How framing violations are turned into errors.
///
/// The factory receives the diagnostic text (`Bad integer value`,
/// `Protocol error, got "x" as reply type byte`, ...). If it returns
/// `Err`, that error is what the caller sees, as
/// [`DecodeError::Callback`].
#[derive(Default)]
pub enum ProtocolErrorPolicy {
    /// An [`ErrorReply`] of the protocol kind.
    #[default]
    Default,
    Custom(Box<ProtocolFactory>),
}

impl ProtocolErrorPolicy {
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Result<BoxError, BoxError> + Send + 'static,
    {
        Self::Custom(Box::new(factory))
    }

    pub(crate) fn build(&self, diagnostic: &str) -> DecodeError {
        match self {
            Self::Default => DecodeError::Protocol(Box::new(ErrorReply::protocol(diagnostic))),
            Self::Custom(factory) => match factory(diagnostic) {
                Ok(err) => DecodeError::Protocol(err),
                Err(err) => DecodeError::Callback(err),
            },
        }
    }
}

impl fmt::Debug for ProtocolErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How `-` and `!` replies are turned into values.
///
/// The factory receives the error text, already decoded as UTF-8 with
/// invalid sequences replaced. An `Err` from the factory is parked and
/// returned once the enclosing reply completes; the failed slot holds
/// [`Reply::Nil`] in the meantime.
#[derive(Default)]
pub enum ReplyErrorPolicy {
    /// A [`Reply::Error`] of the reply kind.
    #[default]
    Default,
    Custom(Box<ReplyFactory>),
}

impl ReplyErrorPolicy {
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Result<Reply, BoxError> + Send + 'static,
    {
        Self::Custom(Box::new(factory))
    }

    pub(crate) fn build(&self, message: &str) -> Result<Reply, BoxError> {
        match self {
            Self::Default => Ok(Reply::Error(ErrorReply::reply(message))),
            Self::Custom(factory) => factory(message),
        }
    }
}

impl fmt::Debug for ReplyErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use resp_types::{Charset, ErrorKind};

    use super::*;

    #[test]
    fn defaults() {
        let config = ReaderConfig::default();
        assert!(config.text.is_raw());
        assert_eq!(config.not_ready, Reply::Bool(false));
        assert_eq!(config.max_buf, DEFAULT_MAX_BUF);
        assert_eq!(config.max_elements, DEFAULT_MAX_ELEMENTS);
    }

    #[test]
    fn with_encoding_resolves_names() {
        let config = ReaderConfig::default()
            .with_encoding(Some("utf-8"), Some("replace"))
            .unwrap();
        assert_eq!(config.text.charset(), Some(Charset::Utf8));
        assert!(ReaderConfig::default().with_encoding(Some("nope"), None).is_err());
    }

    #[test]
    fn default_policies_build_error_replies() {
        let reply = ReplyErrorPolicy::Default.build("ERR boom").unwrap();
        assert_eq!(reply.as_error().map(ErrorReply::kind), Some(&ErrorKind::Reply));

        let err = ProtocolErrorPolicy::Default.build("Bad nil value");
        assert!(err.is_protocol());
        assert_eq!(err.as_error_reply().map(ErrorReply::kind), Some(&ErrorKind::Protocol));
    }

    #[test]
    fn failing_protocol_factory_becomes_callback_error() {
        let policy = ProtocolErrorPolicy::custom(|_| Err("factory broke".into()));
        let err = policy.build("Bad bool value");
        assert!(matches!(err, DecodeError::Callback(_)));
        assert_eq!(err.to_string(), "factory broke");
    }

    #[test]
    fn debug_hides_closures() {
        let policy = ReplyErrorPolicy::custom(|m| Ok(Reply::text(m)));
        assert_eq!(format!("{policy:?}"), "Custom(..)");
    }
}
