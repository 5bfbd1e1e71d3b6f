use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use bytes::Bytes;

/// A fully decoded reply value.
///
/// One `Reply` is produced per complete top-level value on the stream.
/// Nested values of aggregates are themselves `Reply`s, so an array of
/// maps of sets is just a tree of this enum.
///
/// ```text
/// ┌──────────┬────────────────────────┬──────────────────────────────┐
/// │ Variant  │ Produced by            │ Notes                        │
/// ├──────────┼────────────────────────┼──────────────────────────────┤
/// │ Nil      │ $-1  *-1  _            │                              │
/// │ Bool     │ #t  #f                 │                              │
/// │ Integer  │ :                      │ signed 64-bit                │
/// │ Double   │ ,                      │ inf, -inf and nan allowed    │
/// │ Bytes    │ + $ ( =                │ raw policy or no decoding    │
/// │ Text     │ + $ ( =                │ a charset is active          │
/// │ Array    │ *  >                   │ push frames arrive as arrays │
/// │ Map      │ %                      │ keys unique, first slot kept │
/// │ Set      │ ~                      │ members unique, order kept   │
/// │ Error    │ -  !                   │ default reply-error factory  │
/// └──────────┴────────────────────────┴──────────────────────────────┘
/// ```
///
/// Equality treats maps and sets as unordered collections and compares
/// doubles numerically, so `nan != nan` and `0.0 == -0.0`.
///
/// Drop, clone, equality and `Debug` keep their work list on the heap, so
/// nesting depth is bounded by memory rather than by the call stack.
pub enum Reply {
    Nil,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Bytes(Bytes),
    Text(String),
    Array(Vec<Reply>),
    Map(Vec<(Reply, Reply)>),
    Set(Vec<Reply>),
    Error(ErrorReply),
}

impl Reply {
    /// Wrap a static byte string without copying.
    #[must_use]
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(bytes))
    }

    /// Copy `bytes` into a new byte-string reply.
    #[must_use]
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Build a map from key/value pairs.
    ///
    /// A repeated key keeps the position of its first occurrence and takes
    /// the value of its last one.
    #[must_use]
    pub fn map(pairs: impl IntoIterator<Item = (Reply, Reply)>) -> Self {
        let pairs: Vec<(Reply, Reply)> = pairs.into_iter().collect();
        if pairs.len() < 2 {
            return Self::Map(pairs);
        }
        let mut entries: Vec<(Reply, Reply)> = Vec::with_capacity(pairs.len());
        let mut index = FingerprintIndex::default();
        for (key, value) in pairs {
            let found = index.find(&key, |i| &entries[i].0);
            match found {
                Some(i) => entries[i].1 = value,
                None => {
                    index.insert(&key, entries.len());
                    entries.push((key, value));
                }
            }
        }
        Self::Map(entries)
    }

    /// Build a map from a flat `k1, v1, k2, v2, ...` sequence.
    ///
    /// A trailing key without a value is dropped.
    #[must_use]
    pub fn map_from_flat(items: Vec<Reply>) -> Self {
        let mut iter = items.into_iter();
        let mut pairs = Vec::new();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((key, value));
        }
        Self::map(pairs)
    }

    /// Build a set, keeping the first occurrence of each member.
    #[must_use]
    pub fn set(members: impl IntoIterator<Item = Reply>) -> Self {
        let members: Vec<Reply> = members.into_iter().collect();
        if members.len() < 2 {
            return Self::Set(members);
        }
        let mut unique: Vec<Reply> = Vec::with_capacity(members.len());
        let mut index = FingerprintIndex::default();
        for member in members {
            if index.find(&member, |i| &unique[i]).is_none() {
                index.insert(&member, unique.len());
                unique.push(member);
            }
        }
        Self::Set(unique)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Raw payload of a byte-string reply.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Text of a decoded string reply.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Reply, Reply)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&[Reply]> {
        match self {
            Self::Set(members) => Some(members),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorReply> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
            Self::Error(_) => "error",
        }
    }

    /// Stable hash of the value, consistent with `==`.
    fn fingerprint(&self) -> u64 {
        self.fold_up(|node, children: Vec<u64>| node.combine(&children))
    }

    /// Hash one node given the fingerprints of its children.
    fn combine(&self, children: &[u64]) -> u64 {
        let mut state = DefaultHasher::new();
        std::mem::discriminant(self).hash(&mut state);
        match self {
            Self::Nil => {}
            Self::Bool(b) => b.hash(&mut state),
            Self::Integer(n) => n.hash(&mut state),
            Self::Double(d) => {
                // 0.0 and -0.0 compare equal, so they must hash equal.
                let normalized = if *d == 0.0 { 0.0f64 } else { *d };
                normalized.to_bits().hash(&mut state);
            }
            Self::Bytes(b) => b.hash(&mut state),
            Self::Text(s) => s.hash(&mut state),
            Self::Error(e) => e.hash(&mut state),
            Self::Array(_) => children.hash(&mut state),
            Self::Set(_) => {
                let sum = children.iter().fold(0u64, |acc, &m| acc.wrapping_add(m));
                children.len().hash(&mut state);
                sum.hash(&mut state);
            }
            Self::Map(_) => {
                let sum = children.chunks_exact(2).fold(0u64, |acc, pair| {
                    let mut entry = DefaultHasher::new();
                    pair.hash(&mut entry);
                    acc.wrapping_add(entry.finish())
                });
                (children.len() / 2).hash(&mut state);
                sum.hash(&mut state);
            }
        }
        state.finish()
    }

    // ── Tree walks ──────────────────────────────────────────────────────

    /// Number of direct children; a map entry counts as two.
    fn child_count(&self) -> usize {
        match self {
            Self::Array(items) | Self::Set(items) => items.len(),
            Self::Map(entries) => entries.len() * 2,
            _ => 0,
        }
    }

    /// Direct children in order; a map yields `k1, v1, k2, v2, ...`.
    fn children(&self) -> impl DoubleEndedIterator<Item = &Reply> {
        let (items, entries): (&[Reply], &[(Reply, Reply)]) = match self {
            Self::Array(items) | Self::Set(items) => (items.as_slice(), &[]),
            Self::Map(entries) => (&[], entries.as_slice()),
            _ => (&[], &[]),
        };
        items
            .iter()
            .chain(entries.iter().flat_map(|(key, value)| [key, value]))
    }

    /// Post-order fold over the tree.
    ///
    /// `leave` sees each node once all of its children have been folded,
    /// together with their results in [`children`](Self::children) order.
    fn fold_up<'a, T>(&'a self, mut leave: impl FnMut(&'a Reply, Vec<T>) -> T) -> T {
        enum Visit<'r> {
            Enter(&'r Reply),
            Leave(&'r Reply),
        }

        let mut work: Vec<Visit<'a>> = self.children().rev().map(Visit::Enter).collect();
        let mut done: Vec<T> = Vec::new();
        while let Some(visit) = work.pop() {
            match visit {
                Visit::Enter(node) if node.child_count() > 0 => {
                    work.push(Visit::Leave(node));
                    work.extend(node.children().rev().map(Visit::Enter));
                }
                Visit::Enter(node) => done.push(leave(node, Vec::new())),
                Visit::Leave(node) => {
                    let children = done.split_off(done.len() - node.child_count());
                    done.push(leave(node, children));
                }
            }
        }
        leave(self, done)
    }

    /// Move every aggregate child out of `self` onto `out`. Scalar children
    /// are dropped on the spot.
    fn detach_children(&mut self, out: &mut Vec<Reply>) {
        match self {
            Self::Array(items) | Self::Set(items) => {
                out.extend(items.drain(..).filter(|item| item.child_count() > 0));
            }
            Self::Map(entries) => out.extend(
                entries
                    .drain(..)
                    .flat_map(|(key, value)| [key, value])
                    .filter(|item| item.child_count() > 0),
            ),
            _ => {}
        }
    }

    /// Copy this node with `children` as its contents.
    fn with_children(&self, children: Vec<Reply>) -> Self {
        match self {
            Self::Nil => Self::Nil,
            Self::Bool(b) => Self::Bool(*b),
            Self::Integer(n) => Self::Integer(*n),
            Self::Double(d) => Self::Double(*d),
            Self::Bytes(b) => Self::Bytes(b.clone()),
            Self::Text(s) => Self::Text(s.clone()),
            Self::Error(e) => Self::Error(e.clone()),
            Self::Array(_) => Self::Array(children),
            Self::Set(_) => Self::Set(children),
            Self::Map(_) => {
                let mut flat = children.into_iter();
                let mut entries = Vec::with_capacity(flat.len() / 2);
                while let (Some(key), Some(value)) = (flat.next(), flat.next()) {
                    entries.push((key, value));
                }
                Self::Map(entries)
            }
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        let mut orphans = Vec::new();
        self.detach_children(&mut orphans);
        while let Some(mut node) = orphans.pop() {
            node.detach_children(&mut orphans);
        }
    }
}

impl Clone for Reply {
    fn clone(&self) -> Self {
        self.fold_up(Reply::with_children)
    }
}

impl PartialEq for Reply {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        let mut work = vec![(self, other)];
        while let Some(pair) = work.pop() {
            let same = match pair {
                (Self::Nil, Self::Nil) => true,
                (Self::Bool(a), Self::Bool(b)) => a == b,
                (Self::Integer(a), Self::Integer(b)) => a == b,
                (Self::Double(a), Self::Double(b)) => a == b,
                (Self::Bytes(a), Self::Bytes(b)) => a == b,
                (Self::Text(a), Self::Text(b)) => a == b,
                (Self::Error(a), Self::Error(b)) => a == b,
                (Self::Array(a), Self::Array(b)) => {
                    work.extend(a.iter().zip(b));
                    a.len() == b.len()
                }
                (Self::Set(a), Self::Set(b)) => {
                    match pair_unordered(a, b, |member: &Reply| member) {
                        Some(pairs) => {
                            work.extend(pairs);
                            true
                        }
                        None => false,
                    }
                }
                (Self::Map(a), Self::Map(b)) => {
                    match pair_unordered(a, b, |(key, _): &(Reply, Reply)| key) {
                        Some(pairs) => {
                            for ((ak, av), (bk, bv)) in pairs {
                                work.push((ak, bk));
                                work.push((av, bv));
                            }
                            true
                        }
                        None => false,
                    }
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a Reply),
            Punct(&'static str),
        }

        let mut work = vec![Piece::Node(self)];
        while let Some(piece) = work.pop() {
            let node = match piece {
                Piece::Node(node) => node,
                Piece::Punct(text) => {
                    f.write_str(text)?;
                    continue;
                }
            };
            match node {
                Self::Nil => f.write_str("Nil")?,
                Self::Bool(b) => write!(f, "Bool({b:?})")?,
                Self::Integer(n) => write!(f, "Integer({n:?})")?,
                Self::Double(d) => write!(f, "Double({d:?})")?,
                Self::Bytes(b) => write!(f, "Bytes({b:?})")?,
                Self::Text(s) => write!(f, "Text({s:?})")?,
                Self::Error(e) => write!(f, "Error({e:?})")?,
                Self::Array(items) | Self::Set(items) => {
                    let open = if matches!(node, Self::Array(_)) { "Array([" } else { "Set([" };
                    f.write_str(open)?;
                    work.push(Piece::Punct("])"));
                    for (i, item) in items.iter().enumerate().rev() {
                        work.push(Piece::Node(item));
                        if i > 0 {
                            work.push(Piece::Punct(", "));
                        }
                    }
                }
                Self::Map(entries) => {
                    f.write_str("Map([")?;
                    work.push(Piece::Punct("])"));
                    for (i, (key, value)) in entries.iter().enumerate().rev() {
                        work.push(Piece::Punct(")"));
                        work.push(Piece::Node(value));
                        work.push(Piece::Punct(", "));
                        work.push(Piece::Node(key));
                        work.push(Piece::Punct(if i > 0 { ", (" } else { "(" }));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Pair each element of `a` with an element of `b` whose key has the same
/// fingerprint, for an unordered comparison.
///
/// Returns `None` if the lengths differ or some element has no partner.
/// Collections of one element pair up directly without hashing.
fn pair_unordered<'a, T>(
    a: &'a [T],
    b: &'a [T],
    key: impl Fn(&T) -> &Reply,
) -> Option<Vec<(&'a T, &'a T)>> {
    if a.len() != b.len() {
        return None;
    }
    if a.len() <= 1 {
        return Some(a.iter().zip(b).collect());
    }
    let mut unmatched: Vec<(u64, &'a T)> = b.iter().map(|e| (key(e).fingerprint(), e)).collect();
    let mut pairs = Vec::with_capacity(a.len());
    for element in a {
        let print = key(element).fingerprint();
        let at = unmatched.iter().position(|&(p, _)| p == print)?;
        pairs.push((element, unmatched.swap_remove(at).1));
    }
    Some(pairs)
}

impl From<&'static str> for Reply {
    fn from(s: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(s.as_bytes()))
    }
}

impl From<i64> for Reply {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<ErrorReply> for Reply {
    fn from(e: ErrorReply) -> Self {
        Self::Error(e)
    }
}

/// Fingerprint buckets for de-duplicating map keys and set members.
///
/// A fingerprint collision falls back to full equality, so distinct
/// values never merge.
#[derive(Default)]
struct FingerprintIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl FingerprintIndex {
    fn find<'a>(&self, value: &Reply, at: impl Fn(usize) -> &'a Reply) -> Option<usize> {
        self.buckets
            .get(&value.fingerprint())?
            .iter()
            .copied()
            .find(|&i| at(i) == value)
    }

    fn insert(&mut self, value: &Reply, slot: usize) {
        self.buckets
            .entry(value.fingerprint())
            .or_default()
            .push(slot);
    }
}

// ── Error replies ───────────────────────────────────────────────────────

/// Which factory produced an [`ErrorReply`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A `-` or `!` reply sent by the server.
    Reply,
    /// The stream violated the protocol.
    Protocol,
    /// A caller-defined category.
    Custom(Cow<'static, str>),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply => f.write_str("ReplyError"),
            Self::Protocol => f.write_str("ProtocolError"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// An error value carried in-band, either as a reply or as the payload of
/// a protocol failure.
///
/// ```text
/// -WRONGTYPE Operation against a key holding the wrong kind of value
///  ^^^^^^^^^ code()
///  ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ message()
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorReply {
    kind: ErrorKind,
    message: String,
}

impl ErrorReply {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// An error reply as built by the default reply-error factory.
    #[must_use]
    pub fn reply(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reply, message)
    }

    /// A protocol error as built by the default protocol-error factory.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Leading all-uppercase token of the message (`ERR`, `WRONGTYPE`,
    /// `MOVED`...), if there is one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        let first = self.message.split(' ').next()?;
        let is_code = !first.is_empty()
            && first
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        is_code.then_some(first)
    }
}

impl fmt::Display for ErrorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorReply {}
