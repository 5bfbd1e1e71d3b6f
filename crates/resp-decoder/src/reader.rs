use resp_types::{Reply, TextPolicy};
use resp_wire::line::{
    find_crlf, parse_aggregate_len, parse_bool, parse_bulk_len, parse_double, parse_integer,
    parse_null, read_line, CRLF_LEN,
};
use resp_wire::{ReplyType, Shape, TagByte, WireError};
use tracing::{debug, trace, warn};

use crate::buffer::ReadBuffer;
use crate::config::{ReaderConfig, DEFAULT_MAX_BUF};
use crate::error::DecodeError;
use crate::task::{AggregateKind, Frame};

/// Incremental RESP2/RESP3 reply reader.
///
/// Bytes are appended with [`feed`](Self::feed) as they arrive, in chunks
/// of any size; complete replies are pulled out with
/// [`gets`](Self::gets). Feeding never parses, and parsing never blocks:
/// if a reply is not complete yet, `gets` returns `Ok(None)` and picks up
/// where it left off on the next call.
///
/// ```text
///   feed(b"*2\r\n$3\r\nfoo")   gets() → None       (array half-built)
///   feed(b"\r\n:42\r\n")       gets() → [foo, 42]
///                              gets() → None
/// ```
///
/// Aggregates are built on an explicit stack of frames, so nesting depth
/// is bounded by memory only, never by the call stack.
///
/// # Example
///
/// ```rust
/// use resp_decoder::Reader;
/// use resp_types::Reply;
///
/// let mut reader = Reader::new();
/// reader.feed(b"%1\r\n+key\r\n:7\r\n");
/// let reply = reader.gets().unwrap().unwrap();
/// assert_eq!(reply, Reply::map(vec![(Reply::from("key"), Reply::Integer(7))]));
/// ```
#[derive(Debug, Default)]
pub struct Reader {
    buf: ReadBuffer,
    stack: Vec<Frame>,
    config: ReaderConfig,
    /// First fault raised while building the current reply.
    pending: Option<DecodeError>,
}

impl Reader {
    /// Create a reader with the default [`ReaderConfig`]: raw bytes, error
    /// replies as values, a 512 MiB `maxbuf`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with the given configuration.
    ///
    /// The buffer starts empty; nothing is allocated until the first
    /// [`feed`](Self::feed).
    #[must_use]
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The active configuration, including any changes made through
    /// [`set_maxbuf`](Self::set_maxbuf) or
    /// [`set_encoding`](Self::set_encoding).
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Append a chunk of bytes received from the transport.
    pub fn feed(&mut self, chunk: &[u8]) {
        if let Some(released) = self.buf.release_idle() {
            trace!(released, "released idle read buffer");
        }
        self.buf.extend(chunk);
    }

    /// Append `chunk[offset..offset + length]`.
    ///
    /// `length` defaults to the rest of the chunk after `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::OutOfRange`] if the range does not fit
    /// inside `chunk`; nothing is appended in that case.
    pub fn feed_range(
        &mut self,
        chunk: &[u8],
        offset: usize,
        length: Option<usize>,
    ) -> Result<(), DecodeError> {
        let size = chunk.len();
        let length = length.unwrap_or_else(|| size.saturating_sub(offset));
        let range = offset
            .checked_add(length)
            .filter(|&end| end <= size)
            .map(|end| offset..end)
            .ok_or(DecodeError::OutOfRange {
                offset,
                length,
                size,
            })?;
        self.feed(&chunk[range]);
        Ok(())
    }

    // ── Output ──────────────────────────────────────────────────────────

    /// Pull the next complete reply, decoding strings per the text policy.
    ///
    /// # Errors
    ///
    /// See [`gets_with`](Self::gets_with).
    pub fn gets(&mut self) -> Result<Option<Reply>, DecodeError> {
        self.gets_with(true)
    }

    /// Pull the next complete reply.
    ///
    /// With `should_decode` false, string payloads in this call come back
    /// as raw bytes even if a charset is configured.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no complete reply is buffered yet.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Protocol`] (or [`DecodeError::Callback`] if the
    ///   protocol-error factory fails) on a framing violation. Every
    ///   buffered byte is discarded and the reader starts over.
    /// - [`DecodeError::Text`] or [`DecodeError::Callback`] if a string
    ///   could not be decoded or the reply-error factory failed somewhere
    ///   inside the reply. The reply is still consumed in full, so the
    ///   next call continues with the reply after it.
    pub fn gets_with(&mut self, should_decode: bool) -> Result<Option<Reply>, DecodeError> {
        let outcome = self.parse(should_decode).and_then(|reply| {
            if reply.is_none() {
                self.check_max_buf()?;
            }
            Ok(reply)
        });

        match outcome {
            Ok(Some(reply)) => {
                self.compact();
                match self.pending.take() {
                    Some(fault) => Err(fault),
                    None => Ok(Some(reply)),
                }
            }
            Ok(None) => {
                self.compact();
                Ok(None)
            }
            Err(violation) => Err(self.reset(&violation)),
        }
    }

    /// Like [`gets`](Self::gets), but returns the configured not-ready
    /// sentinel instead of `None`.
    ///
    /// # Errors
    ///
    /// See [`gets_with`](Self::gets_with).
    pub fn gets_or_not_ready(&mut self) -> Result<Reply, DecodeError> {
        match self.gets()? {
            Some(reply) => Ok(reply),
            None => Ok(self.config.not_ready.clone()),
        }
    }

    /// Iterate over every complete reply currently buffered.
    pub fn replies(&mut self) -> Replies<'_> {
        Replies { reader: self }
    }

    // ── State ───────────────────────────────────────────────────────────

    /// Number of buffered bytes not yet consumed by a reply.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.remaining()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.is_empty()
    }

    /// Raw size of the read buffer, including the consumed prefix that has
    /// not been compacted away yet.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.buffered()
    }

    /// Byte ceiling for one pending reply; `0` means unlimited.
    #[must_use]
    pub fn maxbuf(&self) -> usize {
        self.config.max_buf
    }

    /// Set the byte ceiling for one pending reply. `None` restores the
    /// default.
    pub fn set_maxbuf(&mut self, max_buf: Option<usize>) {
        self.config.max_buf = max_buf.unwrap_or(DEFAULT_MAX_BUF);
    }

    /// Switch the text policy for replies parsed from now on.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Lookup`] for an unknown charset or handler
    /// name; the current policy is left untouched.
    pub fn set_encoding(
        &mut self,
        encoding: Option<&str>,
        errors: Option<&str>,
    ) -> Result<(), DecodeError> {
        self.config.text = TextPolicy::new(encoding, errors)?;
        Ok(())
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    /// Parse values until a top-level reply completes or input runs out.
    fn parse(&mut self, should_decode: bool) -> Result<Option<Reply>, WireError> {
        loop {
            let Some(step) = self.step(should_decode)? else {
                return Ok(None);
            };
            if let Some(value) = step {
                if let Some(reply) = self.install(value) {
                    return Ok(Some(reply));
                }
            }
        }
    }

    /// Parse one value header, and the value itself if it is a scalar.
    ///
    /// # Returns
    ///
    /// - `None` if more input is needed; nothing was consumed.
    /// - `Some(None)` if an aggregate frame was pushed.
    /// - `Some(Some(value))` for a finished scalar, nil or empty aggregate.
    #[allow(clippy::option_option)]
    fn step(&mut self, should_decode: bool) -> Result<Option<Option<Reply>>, WireError> {
        let input = self.buf.unconsumed();
        let Some(&tag_byte) = input.first() else {
            return Ok(None);
        };
        let ty = ReplyType::from_tag(tag_byte).ok_or(WireError::UnknownTag(TagByte(tag_byte)))?;
        let Some((line, line_len)) = read_line(&input[1..]) else {
            return Ok(None);
        };
        let header_len = 1 + line_len;

        let (consumed, built) = match ty.shape() {
            Shape::Line => (header_len, self.build_line(ty, line, should_decode)?),
            Shape::Bulk => {
                let Some(len) = parse_bulk_len(line)? else {
                    self.buf.consume(header_len);
                    return Ok(Some(Some(Reply::Nil)));
                };
                if self.config.max_buf != 0 && len > self.config.max_buf {
                    return Err(WireError::ExceedsMaxBuf {
                        limit: self.config.max_buf,
                    });
                }
                let total = header_len
                    .checked_add(len)
                    .and_then(|n| n.checked_add(CRLF_LEN))
                    .ok_or(WireError::BulkLengthOutOfRange)?;
                if input.len() < total {
                    return Ok(None);
                }
                if &input[header_len + len..total] != b"\r\n" {
                    return Err(WireError::MissingTrailingCrlf);
                }
                let payload = &input[header_len..header_len + len];
                (total, self.build_bulk(ty, payload, should_decode)?)
            }
            Shape::Aggregate => {
                let kind = AggregateKind::of(ty).ok_or(WireError::UnknownTag(TagByte(tag_byte)))?;
                let count = parse_aggregate_len(line, self.config.max_elements)?;
                self.buf.consume(header_len);
                let Some(count) = count else {
                    return Ok(Some(Some(Reply::Nil)));
                };
                let slots = kind
                    .slots(count)
                    .ok_or(WireError::MultiBulkLengthOutOfRange)?;
                let frame = Frame::new(kind, slots);
                if frame.is_complete() {
                    return Ok(Some(Some(frame.finish())));
                }
                self.stack.push(frame);
                return Ok(Some(None));
            }
        };

        self.buf.consume(consumed);
        let value = match built {
            Ok(value) => value,
            Err(fault) => {
                self.park(fault);
                Reply::Nil
            }
        };
        Ok(Some(Some(value)))
    }

    /// Build a line-framed value.
    ///
    /// The outer `Result` is a framing violation; the inner one is a
    /// construction fault to be parked.
    fn build_line(
        &self,
        ty: ReplyType,
        line: &[u8],
        should_decode: bool,
    ) -> Result<Result<Reply, DecodeError>, WireError> {
        let value = match ty {
            ReplyType::SimpleString | ReplyType::BigNumber => {
                return Ok(self.build_string(line, should_decode));
            }
            ReplyType::Error => return Ok(self.build_error(line)),
            ReplyType::Integer => Reply::Integer(parse_integer(line)?),
            ReplyType::Double => Reply::Double(parse_double(line)?),
            ReplyType::Boolean => Reply::Bool(parse_bool(line)?),
            ReplyType::Null => {
                parse_null(line)?;
                Reply::Nil
            }
            _ => return Err(WireError::UnknownTag(TagByte(ty.tag()))),
        };
        Ok(Ok(value))
    }

    /// Build a length-prefixed value from its payload.
    fn build_bulk(
        &self,
        ty: ReplyType,
        payload: &[u8],
        should_decode: bool,
    ) -> Result<Result<Reply, DecodeError>, WireError> {
        match ty {
            ReplyType::BulkString => Ok(self.build_string(payload, should_decode)),
            ReplyType::BulkError => Ok(self.build_error(payload)),
            ReplyType::VerbatimString => {
                // `txt:` / `mkd:` format tag, stripped from the value.
                if payload.len() < 4 || payload[3] != b':' {
                    return Err(WireError::BadVerbatim);
                }
                Ok(self.build_string(&payload[4..], should_decode))
            }
            _ => Err(WireError::UnknownTag(TagByte(ty.tag()))),
        }
    }

    fn build_string(&self, payload: &[u8], should_decode: bool) -> Result<Reply, DecodeError> {
        match self.config.text.charset() {
            Some(charset) if should_decode => {
                let text = charset.decode(payload, self.config.text.errors())?;
                Ok(Reply::Text(text))
            }
            _ => Ok(Reply::bytes(payload)),
        }
    }

    fn build_error(&self, payload: &[u8]) -> Result<Reply, DecodeError> {
        let message = String::from_utf8_lossy(payload);
        self.config
            .reply_error
            .build(&message)
            .map_err(DecodeError::Callback)
    }

    /// Place a finished value into the frame on top of the stack, popping
    /// every frame it completes.
    ///
    /// Returns the top-level reply once the stack unwinds completely.
    fn install(&mut self, mut value: Reply) -> Option<Reply> {
        while let Some(frame) = self.stack.last_mut() {
            frame.push(value);
            if !frame.is_complete() {
                return None;
            }
            let done = self.stack.pop()?;
            value = done.finish();
        }
        Some(value)
    }

    fn park(&mut self, fault: DecodeError) {
        if self.pending.is_some() {
            debug!(%fault, "dropping fault, an earlier one is already pending");
            return;
        }
        debug!(%fault, depth = self.stack.len(), "parking fault until the reply completes");
        self.pending = Some(fault);
    }

    /// Reject an unterminated line that has outgrown `maxbuf`.
    ///
    /// Once a line is complete, the bytes after it belong to a bulk payload
    /// whose declared length was already checked in [`step`](Self::step),
    /// so the header and trailing CRLF never count against the limit.
    fn check_max_buf(&self) -> Result<(), WireError> {
        let limit = self.config.max_buf;
        let pending = self.buf.unconsumed();
        if limit != 0 && pending.len() > limit && find_crlf(pending).is_none() {
            return Err(WireError::ExceedsMaxBuf { limit });
        }
        Ok(())
    }

    fn compact(&mut self) {
        let dropped = self.buf.compact();
        if dropped > 0 {
            trace!(dropped, remaining = self.buf.remaining(), "compacted read buffer");
        }
    }

    /// Discard all parser state after a framing violation and build the
    /// error to report.
    fn reset(&mut self, violation: &WireError) -> DecodeError {
        let diagnostic = violation.to_string();
        debug!(
            %diagnostic,
            discarded = self.buf.remaining(),
            depth = self.stack.len(),
            "protocol error, resetting reader"
        );
        self.buf.clear();
        self.stack.clear();
        if let Some(fault) = self.pending.take() {
            warn!(%fault, "pending fault superseded by protocol error");
        }
        self.config.protocol_error.build(&diagnostic)
    }
}

/// Iterator over the complete replies buffered in a [`Reader`].
///
/// Yields until the reader reports that no complete reply is left. A
/// protocol error is yielded once; the reader has discarded its buffer
/// by then, so iteration ends right after it.
#[derive(Debug)]
pub struct Replies<'a> {
    reader: &'a mut Reader,
}

impl Iterator for Replies<'_> {
    type Item = Result<Reply, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.gets().transpose()
    }
}
