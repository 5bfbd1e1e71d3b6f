#![warn(clippy::pedantic)]

pub mod error;
pub mod line;
pub mod tag;
pub mod write;

pub use error::{TagByte, WireError};
pub use tag::{ReplyType, Shape};
