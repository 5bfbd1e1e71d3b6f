#![warn(clippy::pedantic)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod reader;

mod task;

pub use config::{ProtocolErrorPolicy, ReaderConfig, ReplyErrorPolicy};
pub use error::{BoxError, DecodeError};
pub use reader::{Reader, Replies};
