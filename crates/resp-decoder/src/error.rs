use resp_types::{ErrorReply, TextDecodeError, TypeError};

/// Boxed error produced by the reader's factories and callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the [`Reader`](crate::Reader).
///
/// Protocol violations are fatal to the reply being parsed and reset the
/// reader. Callback and text faults are deferred: the reply they occurred
/// in is finished first, then the fault is returned once.
///
/// ```text
///   DecodeError
///   ├── Protocol(BoxError)        ← built by the protocol-error factory
///   ├── Callback(BoxError)        ← a factory itself returned an error
///   ├── Text(TextDecodeError)     ← payload not decodable under the policy
///   ├── OutOfRange                ← feed() offset/length past the chunk
///   └── Lookup(TypeError)         ← unknown charset or error handler name
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream violated the protocol.
    ///
    /// With the default policy the payload is an [`ErrorReply`] of the
    /// protocol kind; a custom policy may put anything here.
    #[error("{0}")]
    Protocol(BoxError),

    /// A caller-supplied factory failed while building a value.
    #[error("{0}")]
    Callback(BoxError),

    #[error(transparent)]
    Text(#[from] TextDecodeError),

    #[error("input is larger than buffer size")]
    OutOfRange {
        offset: usize,
        length: usize,
        size: usize,
    },

    #[error(transparent)]
    Lookup(#[from] TypeError),
}

impl DecodeError {
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// The boxed error of a `Protocol` or `Callback` fault.
    #[must_use]
    pub fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Protocol(e) | Self::Callback(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// The [`ErrorReply`] carried by a default-built protocol error.
    #[must_use]
    pub fn as_error_reply(&self) -> Option<&ErrorReply> {
        self.inner()?.downcast_ref::<ErrorReply>()
    }
}
