use resp_types::Reply;
use resp_wire::ReplyType;

/// Upper bound on the slots reserved up front for an aggregate.
///
/// The declared count comes off the wire, so it is only trusted as a
/// capacity hint up to this size; larger aggregates grow as they fill.
const PREALLOC_LIMIT: usize = 1024;

/// What an aggregate frame reduces to once all of its slots are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AggregateKind {
    /// `*` and `>` frames.
    Array,
    /// `~` frames.
    Set,
    /// `%` frames; slots hold alternating keys and values.
    Map,
}

impl AggregateKind {
    pub(crate) fn of(ty: ReplyType) -> Option<Self> {
        match ty {
            ReplyType::Array | ReplyType::Push => Some(Self::Array),
            ReplyType::Set => Some(Self::Set),
            ReplyType::Map => Some(Self::Map),
            _ => None,
        }
    }

    /// Number of child replies an aggregate of `count` elements carries.
    pub(crate) fn slots(self, count: usize) -> Option<usize> {
        match self {
            Self::Map => count.checked_mul(2),
            Self::Array | Self::Set => Some(count),
        }
    }
}

/// One in-progress aggregate on the reader's task stack.
///
/// Frames are pushed when a count line is read and popped when their last
/// slot is filled; the finished value is then installed into the frame
/// below, or returned as the top-level reply.
#[derive(Debug)]
pub(crate) struct Frame {
    kind: AggregateKind,
    expected: usize,
    items: Vec<Reply>,
}

impl Frame {
    pub(crate) fn new(kind: AggregateKind, expected: usize) -> Self {
        Self {
            kind,
            expected,
            items: Vec::with_capacity(expected.min(PREALLOC_LIMIT)),
        }
    }

    pub(crate) fn push(&mut self, value: Reply) {
        self.items.push(value);
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.items.len() >= self.expected
    }

    pub(crate) fn finish(self) -> Reply {
        match self.kind {
            AggregateKind::Array => Reply::Array(self.items),
            AggregateKind::Set => Reply::set(self.items),
            AggregateKind::Map => Reply::map_from_flat(self.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_frames_build_arrays() {
        assert_eq!(AggregateKind::of(ReplyType::Push), Some(AggregateKind::Array));
        assert_eq!(AggregateKind::of(ReplyType::BulkString), None);
    }

    #[test]
    fn map_frames_hold_two_slots_per_entry() {
        assert_eq!(AggregateKind::Map.slots(3), Some(6));
        assert_eq!(AggregateKind::Map.slots(usize::MAX), None);

        let mut frame = Frame::new(AggregateKind::Map, 4);
        for value in ["a", "1", "b", "2"] {
            assert!(!frame.is_complete());
            frame.push(Reply::from(value));
        }
        assert!(frame.is_complete());
        assert_eq!(frame.finish().as_map().map(<[_]>::len), Some(2));
    }

    #[test]
    fn empty_frame_is_complete() {
        let frame = Frame::new(AggregateKind::Set, 0);
        assert!(frame.is_complete());
        assert_eq!(frame.finish(), Reply::Set(Vec::new()));
    }
}
