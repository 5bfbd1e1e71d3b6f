/// Consumed-prefix size at which the read buffer is compacted.
pub const COMPACT_THRESHOLD: usize = 1024;

/// Capacity above which a fully drained buffer is released instead of
/// being kept around for the next reply.
pub const IDLE_BUFFER_LIMIT: usize = 16 * 1024;

/// Accumulation buffer with a read cursor.
///
/// Bytes before the cursor have already been turned into replies and are
/// garbage; bytes after it are waiting to be parsed.
///
/// ```text
///   0                pos                          data.len()
///   ├─── consumed ────┼──────── unconsumed ─────────┤
/// ```
///
/// The consumed prefix is discarded lazily by [`compact`](Self::compact)
/// once it reaches [`COMPACT_THRESHOLD`], so a stream of small replies
/// does not pay for a `memmove` per reply.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl ReadBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// Bytes waiting to be parsed.
    #[must_use]
    pub fn unconsumed(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Number of bytes waiting to be parsed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Raw length of the buffer, including the consumed prefix.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Advance the cursor past `n` parsed bytes.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos = (self.pos + n).min(self.data.len());
    }

    /// Drop the consumed prefix if it has reached the threshold.
    ///
    /// Returns the number of bytes discarded.
    pub fn compact(&mut self) -> usize {
        if self.pos < COMPACT_THRESHOLD {
            return 0;
        }
        let dropped = self.pos;
        let live = self.data.len() - dropped;
        self.data.copy_within(dropped.., 0);
        self.data.truncate(live);
        self.pos = 0;
        dropped
    }

    /// Release the allocation if nothing is pending and it has grown past
    /// [`IDLE_BUFFER_LIMIT`].
    ///
    /// Returns the capacity released, if any.
    pub fn release_idle(&mut self) -> Option<usize> {
        if self.remaining() > 0 || self.data.capacity() <= IDLE_BUFFER_LIMIT {
            return None;
        }
        let released = self.data.capacity();
        self.data = Vec::new();
        self.pos = 0;
        Some(released)
    }

    /// Discard everything, consumed or not.
    pub fn clear(&mut self) {
        self.data.clear();
        self.pos = 0;
    }
}
