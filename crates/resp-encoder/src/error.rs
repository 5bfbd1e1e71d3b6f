/// Errors that can occur while packing a command.
///
/// Plain [`Arg`](crate::Arg) slices always pack; these only arise when
/// arguments are built from untyped sources such as decoded replies or
/// decimal strings.
///
/// ```text
///   EncodeError
///   ├── UnsupportedArgument  ← value kind has no bulk-string form
///   └── InvalidInteger       ← big-integer text is not a decimal literal
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// `position` is the zero-based index of the offending argument.
    #[error("argument {position} must be str, int, float or bytes, got {kind}")]
    UnsupportedArgument { position: usize, kind: &'static str },

    #[error("invalid integer literal {digits:?}")]
    InvalidInteger { digits: String },
}
