//! Implementation of `resp pack`.
//!
//! ```text
//! $ resp pack --escape SET greeting "hello world"
//! *3\r\n$3\r\nSET\r\n$8\r\ngreeting\r\n$11\r\nhello world\r\n
//! ```
use std::io::{self, Write as _};

use anyhow::{Context, Result};
use resp_encoder::{pack_command, Arg};

use crate::PackArgs;

/// Run the `resp pack` command.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run(args: &PackArgs) -> Result<()> {
    let argv: Vec<Arg<'_>> = args.args.iter().map(Arg::from).collect();
    let packed = pack_command(&argv);
    tracing::debug!(args = argv.len(), bytes = packed.len(), "packed command");

    let mut out = io::stdout().lock();
    if args.escape {
        writeln!(out, "{}", escape(&packed)).context("cannot write to stdout")?;
    } else {
        out.write_all(&packed).context("cannot write to stdout")?;
    }
    out.flush().context("cannot flush stdout")?;
    Ok(())
}

/// Render bytes with C-style escapes for everything non-printable.
pub fn escape(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_shows_terminators() {
        assert_eq!(escape(b"*1\r\n$2\r\nhi\r\n"), "*1\\r\\n$2\\r\\nhi\\r\\n");
        assert_eq!(escape(b"\x00\xff\"q"), "\\x00\\xff\\\"q");
    }
}
