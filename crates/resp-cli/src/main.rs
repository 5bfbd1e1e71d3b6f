//! RESP command-line tool: pack commands into wire bytes and decode
//! captured reply streams.
//!
//! # Command overview
//!
//! ```text
//! resp <COMMAND> [OPTIONS]
//!
//! Commands:
//!   pack     Encode arguments as a multi-bulk command
//!   decode   Decode a stream of replies from a file or stdin
//!   help     Print help information
//!
//! Global options:
//!   -v, --verbose    Log decoder internals to stderr
//!   -h, --help       Print help
//!   -V, --version    Print version
//! ```
//!
//! # Exit codes
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | Error (I/O failure, protocol error, bad flag...) |
//!
//! All diagnostics go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod cmd_decode;
mod cmd_pack;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The RESP wire-format tool.
#[derive(Parser)]
#[command(name = "resp", version, about = "Redis protocol encoder and reply decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder internals (`debug` level) to stderr.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Encode arguments as a multi-bulk command.
    Pack(PackArgs),
    /// Decode a stream of replies from a file or stdin.
    Decode(DecodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `resp pack`.
///
/// Every argument is sent as a text bulk string. The packed bytes are
/// written raw to stdout, ready to pipe into `nc`, unless `--escape` asks
/// for a printable rendering.
#[derive(clap::Args)]
pub struct PackArgs {
    /// Command name followed by its arguments.
    #[arg(required = true)]
    pub args: Vec<String>,

    /// Print `\r\n` and non-printable bytes as escapes, followed by a
    /// newline.
    #[arg(long)]
    pub escape: bool,
}

/// Arguments for `resp decode`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Values / default                                     │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ FILE         │ input path (default: stdin)                          │
/// │ --chunk-size │ bytes fed per call (default 4096)                    │
/// │ --encoding   │ utf-8 | utf-16 | latin-1 | ascii ... (default: raw)  │
/// │ --errors     │ strict | ignore | replace | surrogateescape | ...    │
/// │ --json       │ one JSON document per reply instead of text          │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// File holding the captured reply stream. Reads stdin when omitted.
    pub file: Option<PathBuf>,

    /// Number of bytes handed to the reader per feed.
    #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_size: u32,

    /// Decode string payloads with this charset.
    #[arg(long)]
    pub encoding: Option<String>,

    /// How invalid byte sequences are handled when `--encoding` is set.
    #[arg(long)]
    pub errors: Option<String>,

    /// Print each reply as a line of JSON.
    #[arg(long)]
    pub json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pack(args) => cmd_pack::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
