//! Implementation of `resp decode`.
//!
//! Feeds the input to a [`Reader`] in `--chunk-size` pieces, the way a
//! socket would deliver it, and prints every reply as soon as it
//! completes.
//!
//! # Text output
//!
//! ```text
//! ┌──────────────┬─────────────────────────────────┐
//! │ Reply        │ Rendered as                     │
//! ├──────────────┼─────────────────────────────────┤
//! │ nil          │ (nil)                           │
//! │ integer      │ (integer) 42                    │
//! │ double       │ (double) 4.5                    │
//! │ bool         │ (true) / (false)                │
//! │ bytes        │ "escaped\r\n"                   │
//! │ text         │ "decoded text"                  │
//! │ error        │ (error) ERR message             │
//! │ array        │ 1) ... numbered, indented       │
//! │ set          │ 1~ ...                          │
//! │ map          │ 1# key => value                 │
//! └──────────────┴─────────────────────────────────┘
//! ```
//!
//! With `--json` each reply is one line of JSON instead.
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read as _, Write as _};

use anyhow::{bail, Context, Result};
use resp_decoder::{Reader, ReaderConfig};
use resp_types::Reply;
use serde_json::Value;

use crate::DecodeArgs;

/// Run the `resp decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, a flag names an unknown
/// charset or handler, the stream violates the protocol, or it ends in
/// the middle of a reply.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let input = match &args.file {
        Some(path) => {
            fs::read(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("cannot read stdin")?;
            buf
        }
    };

    let config = ReaderConfig::default()
        .with_encoding(args.encoding.as_deref(), args.errors.as_deref())
        .context("invalid text policy")?;
    let mut reader = Reader::with_config(config);

    let mut out = io::stdout().lock();
    let mut count = 0usize;
    for chunk in input.chunks(args.chunk_size as usize) {
        reader.feed(chunk);
        for reply in reader.replies() {
            let reply = reply.with_context(|| format!("reply #{}", count + 1))?;
            count += 1;
            if args.json {
                writeln!(out, "{}", to_json(&reply))?;
            } else {
                writeln!(out, "{}", render(&reply))?;
            }
        }
    }
    out.flush()?;

    tracing::debug!(replies = count, bytes = input.len(), "decoded stream");
    if reader.has_data() {
        bail!(
            "{} trailing bytes do not form a complete reply",
            reader.len()
        );
    }
    Ok(())
}

enum Piece<'a> {
    Node(&'a Reply, usize),
    Text(String),
}

/// Render a reply the way `redis-cli` does.
///
/// Nested aggregates are laid out with a work list rather than by
/// recursion, so any reply the reader can build can be rendered.
pub fn render(reply: &Reply) -> String {
    let mut out = String::new();
    let mut work = vec![Piece::Node(reply, 0)];
    while let Some(piece) = work.pop() {
        let (node, indent) = match piece {
            Piece::Node(node, indent) => (node, indent),
            Piece::Text(text) => {
                out.push_str(&text);
                continue;
            }
        };
        match node {
            Reply::Nil => out.push_str("(nil)"),
            Reply::Bool(b) => out.push_str(if *b { "(true)" } else { "(false)" }),
            Reply::Integer(n) => {
                let _ = write!(out, "(integer) {n}");
            }
            Reply::Double(d) => {
                let _ = write!(out, "(double) {d}");
            }
            Reply::Bytes(b) => {
                let _ = write!(out, "\"{}\"", b.escape_ascii());
            }
            Reply::Text(s) => {
                let _ = write!(out, "{s:?}");
            }
            Reply::Error(e) => {
                let _ = write!(out, "(error) {e}");
            }
            Reply::Array(items) if items.is_empty() => out.push_str("(empty array)"),
            Reply::Set(members) if members.is_empty() => out.push_str("(empty set)"),
            Reply::Map(entries) if entries.is_empty() => out.push_str("(empty map)"),
            Reply::Array(items) => push_items(&mut work, items, ")", indent),
            Reply::Set(members) => push_items(&mut work, members, "~", indent),
            Reply::Map(entries) => {
                let width = entries.len().to_string().len();
                for (i, (key, value)) in entries.iter().enumerate().rev() {
                    let label = format!("{:>width$}# ", i + 1);
                    let inner = indent + label.len();
                    work.push(Piece::Node(value, inner));
                    work.push(Piece::Text(" => ".to_string()));
                    work.push(Piece::Node(key, inner));
                    work.push(Piece::Text(line_start(i, indent, label)));
                }
            }
        }
    }
    out
}

/// Queue numbered items so they pop in order.
fn push_items<'a>(work: &mut Vec<Piece<'a>>, items: &'a [Reply], marker: &str, indent: usize) {
    let width = items.len().to_string().len();
    for (i, item) in items.iter().enumerate().rev() {
        let label = format!("{:>width$}{marker} ", i + 1);
        work.push(Piece::Node(item, indent + label.len()));
        work.push(Piece::Text(line_start(i, indent, label)));
    }
}

/// Every item after the first starts on a new line, aligned under the
/// first item's label.
fn line_start(i: usize, indent: usize, label: String) -> String {
    if i == 0 {
        label
    } else {
        format!("\n{}{label}", " ".repeat(indent))
    }
}

enum JsonPiece<'a> {
    Node(&'a Reply),
    Raw(&'static str),
    /// A byte or text key, written as its own text.
    PlainKey(&'a Reply),
    /// Start capturing output for a non-string key.
    KeyOpen,
    /// Stop capturing and write the captured JSON as a string key.
    KeyClose,
}

/// Convert a reply to one line of JSON.
///
/// Byte strings are decoded lossily, non-finite doubles become strings,
/// and maps become objects keyed by each key's text form, in wire order.
/// A key that is not a string is keyed by its own JSON text.
pub fn to_json(reply: &Reply) -> String {
    let mut outputs = vec![String::new()];
    let mut work = vec![JsonPiece::Node(reply)];
    while let Some(piece) = work.pop() {
        let node = match piece {
            JsonPiece::Node(node) => node,
            JsonPiece::Raw(text) => {
                push_output(&mut outputs, text);
                continue;
            }
            JsonPiece::PlainKey(key) => {
                push_output(&mut outputs, &json_string(&plain_text(key)));
                continue;
            }
            JsonPiece::KeyOpen => {
                outputs.push(String::new());
                continue;
            }
            JsonPiece::KeyClose => {
                let captured = outputs.pop().unwrap_or_default();
                push_output(&mut outputs, &json_string(&captured));
                continue;
            }
        };
        let text = match node {
            Reply::Nil => "null".to_string(),
            Reply::Bool(b) => b.to_string(),
            Reply::Integer(n) => n.to_string(),
            Reply::Double(d) => match serde_json::Number::from_f64(*d) {
                Some(number) => number.to_string(),
                None => json_string(&d.to_string()),
            },
            Reply::Bytes(_) | Reply::Text(_) => json_string(&plain_text(node)),
            Reply::Error(e) => format!("{{\"error\":{}}}", json_string(e.message())),
            Reply::Array(items) | Reply::Set(items) => {
                work.push(JsonPiece::Raw("]"));
                for (i, item) in items.iter().enumerate().rev() {
                    work.push(JsonPiece::Node(item));
                    if i > 0 {
                        work.push(JsonPiece::Raw(","));
                    }
                }
                "[".to_string()
            }
            Reply::Map(entries) => {
                work.push(JsonPiece::Raw("}"));
                for (i, (key, value)) in entries.iter().enumerate().rev() {
                    work.push(JsonPiece::Node(value));
                    work.push(JsonPiece::Raw(":"));
                    if matches!(key, Reply::Bytes(_) | Reply::Text(_)) {
                        work.push(JsonPiece::PlainKey(key));
                    } else {
                        work.push(JsonPiece::KeyClose);
                        work.push(JsonPiece::Node(key));
                        work.push(JsonPiece::KeyOpen);
                    }
                    if i > 0 {
                        work.push(JsonPiece::Raw(","));
                    }
                }
                "{".to_string()
            }
        };
        push_output(&mut outputs, &text);
    }
    outputs.concat()
}

fn push_output(outputs: &mut [String], text: &str) {
    if let Some(out) = outputs.last_mut() {
        out.push_str(text);
    }
}

fn plain_text(reply: &Reply) -> String {
    match reply {
        Reply::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Reply::Text(s) => s.clone(),
        _ => String::new(),
    }
}

fn json_string(text: &str) -> String {
    Value::from(text).to_string()
}
