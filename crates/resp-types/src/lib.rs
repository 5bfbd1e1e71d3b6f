#![warn(clippy::pedantic)]

pub mod error;
pub mod reply;
pub mod text;

pub use error::{TextDecodeError, TypeError};
pub use reply::{ErrorKind, ErrorReply, Reply};
pub use text::{Charset, DecodeErrors, TextPolicy};
