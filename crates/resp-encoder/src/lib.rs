#![warn(clippy::pedantic)]

pub mod arg;
pub mod error;
pub mod number;
pub mod pack;

pub use arg::Arg;
pub use error::EncodeError;
pub use pack::{pack_command, pack_replies, CommandWriter};
