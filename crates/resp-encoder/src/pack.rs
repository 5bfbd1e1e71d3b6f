use std::borrow::Cow;

use resp_types::Reply;
use resp_wire::tag::tag;
use resp_wire::write::{bulk_len, header_len, write_bulk, write_header};

use crate::arg::Arg;
use crate::error::EncodeError;

/// Builder for one multi-bulk command.
///
/// Writes the `*<count>` header on creation and one bulk string per
/// argument after that. [`pack_command`] sizes the buffer exactly, so a
/// packed command never reallocates.
///
/// ```text
/// *3\r\n $3\r\nSET\r\n $1\r\na\r\n $1\r\n1\r\n
/// ─┬──── ─────┬────── ────┬───── ────┬─────
///  count    arg 0       arg 1      arg 2
/// ```
#[derive(Debug)]
pub struct CommandWriter {
    buf: Vec<u8>,
}

impl CommandWriter {
    /// Start a command of `count` arguments.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self::with_capacity(count, header_len(count))
    }

    /// Start a command of `count` arguments in a buffer of `capacity`
    /// bytes.
    #[must_use]
    pub fn with_capacity(count: usize, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity);
        write_header(&mut buf, tag::ARRAY, count);
        Self { buf }
    }

    pub fn write_arg(&mut self, payload: &[u8]) {
        write_bulk(&mut self.buf, payload);
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode a command as a RESP multi-bulk request.
///
/// # Example
///
/// ```rust
/// use resp_encoder::{pack_command, Arg};
///
/// let packed = pack_command(&[Arg::from("SET"), Arg::from("a"), Arg::from(1)]);
/// assert_eq!(packed, b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n");
/// ```
#[must_use]
pub fn pack_command(args: &[Arg<'_>]) -> Vec<u8> {
    let payloads: Vec<Cow<'_, [u8]>> = args.iter().map(Arg::to_bytes).collect();
    pack_payloads(&payloads)
}

/// Encode decoded reply values as a command.
///
/// Byte strings, text, integers and doubles map to their argument forms.
///
/// # Errors
///
/// Returns [`EncodeError::UnsupportedArgument`] for the first nil, bool,
/// aggregate or error value, naming its position.
pub fn pack_replies(replies: &[Reply]) -> Result<Vec<u8>, EncodeError> {
    let args = replies
        .iter()
        .enumerate()
        .map(|(position, reply)| reply_arg(position, reply))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pack_command(&args))
}

fn reply_arg(position: usize, reply: &Reply) -> Result<Arg<'_>, EncodeError> {
    match reply {
        Reply::Bytes(b) => Ok(Arg::Bytes(b)),
        Reply::Text(s) => Ok(Arg::Text(s)),
        Reply::Integer(n) => Ok(Arg::Int(i128::from(*n))),
        Reply::Double(d) => Ok(Arg::Float(*d)),
        other => Err(EncodeError::UnsupportedArgument {
            position,
            kind: other.kind_name(),
        }),
    }
}

fn pack_payloads(payloads: &[Cow<'_, [u8]>]) -> Vec<u8> {
    let capacity = header_len(payloads.len())
        + payloads.iter().map(|p| bulk_len(p.len())).sum::<usize>();
    let mut writer = CommandWriter::with_capacity(payloads.len(), capacity);
    for payload in payloads {
        writer.write_arg(payload);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use resp_decoder::Reader;
    use resp_types::ErrorReply;

    use super::*;

    #[test]
    fn mixed_argument_kinds() {
        let packed = pack_command(&[
            Arg::from("HSET"),
            Arg::from("foo"),
            Arg::from("key"),
            Arg::from("value1"),
            Arg::from(b"key_b"),
            Arg::from(b"bytes str"),
            Arg::from("key_mv"),
            Arg::from(&Bytes::from_static(b"bytes str")),
            Arg::from(b"key_i"),
            Arg::from(67),
            Arg::from("key_f"),
            Arg::from(3.141_592_653_59),
        ]);
        let expected: &[u8] = b"*12\r\n$4\r\nHSET\r\n$3\r\nfoo\r\n$3\r\nkey\r\n$6\r\nvalue1\r\n\
            $5\r\nkey_b\r\n$9\r\nbytes str\r\n$6\r\nkey_mv\r\n$9\r\nbytes str\r\n\
            $5\r\nkey_i\r\n$2\r\n67\r\n$5\r\nkey_f\r\n$13\r\n3.14159265359\r\n";
        assert_eq!(packed, expected);
    }

    #[test]
    fn binary_payload_passes_through() {
        let packed = pack_command(&[Arg::from("SET"), Arg::from("a"), Arg::from(b"\xaa\x00\xffU")]);
        assert_eq!(packed, b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$4\r\n\xaa\x00\xffU\r\n");
    }

    #[test]
    fn empty_command() {
        assert_eq!(pack_command(&[]), b"*0\r\n");
        assert_eq!(pack_command(&[Arg::from("")]), b"*1\r\n$0\r\n\r\n");
    }

    #[test]
    fn capacity_is_exact() {
        let args = [Arg::from("GET"), Arg::from(1.5), Arg::from(-9i64)];
        let packed = pack_command(&args);
        assert_eq!(packed.capacity(), packed.len());
    }

    #[test]
    fn big_integer_argument() {
        let two_128 = Arg::big_integer("340282366920938463463374607431768211456").unwrap();
        let packed = pack_command(&[Arg::from("SET"), Arg::from("a"), two_128]);
        assert_eq!(
            packed,
            b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$39\r\n340282366920938463463374607431768211456\r\n"
        );
    }

    #[test]
    fn replies_pack_by_kind() {
        let packed = pack_replies(&[
            Reply::from("ECHO"),
            Reply::text("hé"),
            Reply::Integer(-1),
            Reply::Double(0.5),
        ])
        .unwrap();
        assert_eq!(packed, "*4\r\n$4\r\nECHO\r\n$3\r\nhé\r\n$2\r\n-1\r\n$3\r\n0.5\r\n".as_bytes());
    }

    #[test]
    fn replies_reject_unsupported_kinds() {
        let err = pack_replies(&[Reply::from("SET"), Reply::Nil]).unwrap_err();
        assert_eq!(err, EncodeError::UnsupportedArgument { position: 1, kind: "nil" });

        let err = pack_replies(&[Reply::Error(ErrorReply::reply("ERR"))]).unwrap_err();
        assert_eq!(err.to_string(), "argument 0 must be str, int, float or bytes, got error");

        assert!(pack_replies(&[Reply::Bool(true)]).is_err());
        assert!(pack_replies(&[Reply::Array(Vec::new())]).is_err());
    }

    #[test]
    fn packed_command_reads_back() {
        let packed = pack_command(&[Arg::from("LPUSH"), Arg::from("list"), Arg::from(u128::MAX)]);
        let mut reader = Reader::new();
        reader.feed(&packed);
        let reply = reader.gets().unwrap().unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![
                Reply::from("LPUSH"),
                Reply::from("list"),
                Reply::from("340282366920938463463374607431768211455"),
            ])
        );
    }
}
