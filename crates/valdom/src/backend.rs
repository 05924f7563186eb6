//! The capability contract every tree backend implements.

use alloc::format;

use crate::{
    convert::FromScalar,
    value::{CanonicalType, Scalar},
};

/// Index of a node inside its owning document's arena.
///
/// Node identifiers are only meaningful together with the document that
/// produced them; the arena keeps every node alive for the lifetime of the
/// document, so a stale id can at worst point at the wrong node of the same
/// document, never at freed memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One parsed document: node storage plus the navigation and value-access
/// primitives the [`Attribute`](crate::Attribute) facade builds on.
///
/// Every operation is total: out-of-range indices, unknown names and
/// inconvertible values answer with `None` or `0` rather than an error.
pub trait DocumentBackend: core::fmt::Debug {
    /// Identifies the backend format, e.g. `"json"`.
    fn backend_id(&self) -> &'static str;

    /// The document's root node.
    fn root(&self) -> NodeId;

    /// The key under which this node is stored in its parent struct, if any.
    fn node_name(&self, node: NodeId) -> Option<&str>;

    fn canonical_type(&self, node: NodeId) -> CanonicalType;

    /// `true` when the node is a list (ordered, unnamed children).
    fn is_list(&self, node: NodeId) -> bool;

    fn nested_count(&self, node: NodeId) -> usize;

    fn nested_index(&self, node: NodeId, index: usize) -> Option<NodeId>;

    fn nested_name(&self, node: NodeId, name: &str) -> Option<NodeId>;

    /// Number of addressable scalar values: lists report their element
    /// count, non-null scalars `1`, null `0`.
    fn value_count(&self, node: NodeId) -> usize;

    /// The scalar at `index`, where a scalar node holds exactly one value at
    /// index `0` and a list exposes its scalar elements in order.
    fn scalar(&self, node: NodeId, index: usize) -> Option<Scalar<'_>>;

    /// Byte-oriented fetch; backends with an encoded-binary representation
    /// (e.g. base64 strings) decode it here.
    fn fetch_bytes(&self, node: NodeId, offset: usize, dest: &mut [u8]) -> usize;

    /// Walks `path` one segment at a time from `node`.
    ///
    /// At a struct node each segment tries `segment@tag` for every tag in
    /// priority order before the bare segment; at a list node the segment is
    /// parsed as an element index. Any failed segment aborts the walk.
    fn find(&self, node: NodeId, path: &[&str], tags: &[&str]) -> Option<NodeId> {
        let mut current = node;
        for segment in path {
            current = self.resolve_segment(current, segment, tags)?;
        }
        Some(current)
    }

    /// Resolves a single path segment against `node`.
    fn resolve_segment(&self, node: NodeId, segment: &str, tags: &[&str]) -> Option<NodeId> {
        if self.is_list(node) {
            let index: usize = segment.parse().ok()?;
            return self.nested_index(node, index);
        }
        for tag in tags {
            if let Some(hit) = self.nested_name(node, &format!("{segment}@{tag}")) {
                return Some(hit);
            }
        }
        self.nested_name(node, segment)
    }
}

/// The generic numeric byte fetch shared by backends without a decoded
/// binary form for the node: each value runs through the `u8` ladder.
pub(crate) fn numeric_byte_fetch<B: DocumentBackend + ?Sized>(
    backend: &B,
    node: NodeId,
    offset: usize,
    dest: &mut [u8],
) -> usize {
    let total = backend.value_count(node);
    if offset >= total || dest.is_empty() {
        return 0;
    }
    let take = core::cmp::min(total - offset, dest.len());
    let mut written = 0;
    while written < take {
        let Some(byte) = backend
            .scalar(node, offset + written)
            .and_then(u8::from_scalar)
        else {
            break;
        };
        dest[written] = byte;
        written += 1;
    }
    written
}
