//! Materialized JSON documents.
//!
//! [`JsonDocument`] parses a complete JSON input into a flat node arena and
//! implements [`DocumentBackend`] over it. Child lists hold arena indices;
//! nothing in the tree borrows from the input, so the document is
//! self-contained once parsing returns.

use alloc::{string::String, vec::Vec};

use base64::Engine as _;

use super::{
    grammar::{Grammar, StructuralEvent},
    reader::{ByteReader, ChunkReader, SliceReader},
    scan::{ScanError, scan_token},
};
use crate::{
    backend::{DocumentBackend, NodeId, numeric_byte_fetch},
    error::ParseError,
    value::{CanonicalType, OwnedScalar, Scalar, join_canonical},
};

#[derive(Debug)]
enum NodeKind {
    Leaf(OwnedScalar),
    Struct { children: Vec<NodeId> },
    List { children: Vec<NodeId> },
}

#[derive(Debug)]
struct NodeData {
    /// Key in the parent struct; `None` for list elements and the root.
    name: Option<String>,
    kind: NodeKind,
}

/// A fully parsed JSON document.
#[derive(Debug)]
pub struct JsonDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl JsonDocument {
    /// Parses one contiguous JSON text.
    pub fn parse_text(text: &str) -> Result<Self, ParseError> {
        Self::parse(&mut SliceReader::new(text.as_bytes()))
    }

    /// Parses one JSON document spread over ordered byte blocks.
    ///
    /// Tokens may straddle block boundaries; the blocks are read strictly in
    /// order and never copied into one contiguous buffer.
    pub fn parse_blocks(blocks: &[&[u8]]) -> Result<Self, ParseError> {
        Self::parse(&mut ChunkReader::new(blocks))
    }

    /// Bytes after the root value are left unread and are not an error.
    fn parse<R: ByteReader>(input: &mut R) -> Result<Self, ParseError> {
        let mut grammar = Grammar::new();
        let mut builder = ArenaBuilder::new();
        while !grammar.is_done() {
            let token = match scan_token(input, true) {
                Ok(token) => token,
                Err(ScanError::Syntax(err)) => return Err(err),
                Err(ScanError::NeedMore) => {
                    return Err(ParseError::new("unexpected end of input", input.tell()));
                }
            };
            if let Some(event) = grammar.feed(token, input.tell())? {
                builder.apply(event);
            }
        }
        Ok(builder.finish())
    }

    fn node(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index())
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        match self.node(node).map(|n| &n.kind) {
            Some(NodeKind::Struct { children } | NodeKind::List { children }) => children,
            _ => &[],
        }
    }
}

/// Builds the arena from structural events, tracking the open container
/// chain and the key awaiting its value.
#[derive(Debug)]
struct ArenaBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
    pending_name: Option<String>,
    root: Option<NodeId>,
}

impl ArenaBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            open: Vec::new(),
            pending_name: None,
            root: None,
        }
    }

    fn apply(&mut self, event: StructuralEvent) {
        match event {
            StructuralEvent::Key(name) => self.pending_name = Some(name),
            StructuralEvent::BeginStruct => {
                let id = self.insert(NodeKind::Struct {
                    children: Vec::new(),
                });
                self.open.push(id);
            }
            StructuralEvent::BeginList => {
                let id = self.insert(NodeKind::List {
                    children: Vec::new(),
                });
                self.open.push(id);
            }
            StructuralEvent::EndStruct | StructuralEvent::EndList => {
                self.open.pop();
            }
            StructuralEvent::Value(value) => {
                self.insert(NodeKind::Leaf(value));
            }
        }
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            name: self.pending_name.take(),
            kind,
        });
        if let Some(&parent) = self.open.last() {
            match &mut self.nodes[parent.index()].kind {
                NodeKind::Struct { children } | NodeKind::List { children } => children.push(id),
                NodeKind::Leaf(_) => {}
            }
        } else if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    fn finish(mut self) -> JsonDocument {
        let root = match self.root {
            Some(root) => root,
            // The grammar emits a root before reaching done; this is the
            // fallback for a builder that never saw an event.
            None => {
                let id = NodeId::new(self.nodes.len());
                self.nodes.push(NodeData {
                    name: None,
                    kind: NodeKind::Leaf(OwnedScalar::Null),
                });
                id
            }
        };
        JsonDocument {
            nodes: self.nodes,
            root,
        }
    }
}

impl DocumentBackend for JsonDocument {
    fn backend_id(&self) -> &'static str {
        "json"
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.node(node)?.name.as_deref()
    }

    fn canonical_type(&self, node: NodeId) -> CanonicalType {
        match self.node(node).map(|n| &n.kind) {
            Some(NodeKind::Leaf(value)) => value.as_scalar().canonical_type(),
            Some(NodeKind::Struct { .. }) => CanonicalType::Composite,
            Some(NodeKind::List { children }) => {
                let mut joined = None;
                for &child in children {
                    let element = match self.node(child).map(|n| &n.kind) {
                        Some(NodeKind::Leaf(value)) => value.as_scalar().canonical_type(),
                        _ => return CanonicalType::Composite,
                    };
                    joined = Some(match joined {
                        None => element,
                        Some(prev) => match join_canonical(prev, element) {
                            Some(t) => t,
                            None => return CanonicalType::Composite,
                        },
                    });
                }
                match joined {
                    // A null element has no scalar type to contribute.
                    Some(CanonicalType::Unknown) | None => CanonicalType::Composite,
                    Some(t) => t,
                }
            }
            None => CanonicalType::Unknown,
        }
    }

    fn is_list(&self, node: NodeId) -> bool {
        matches!(self.node(node).map(|n| &n.kind), Some(NodeKind::List { .. }))
    }

    fn nested_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    fn nested_index(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    fn nested_name(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&child| self.node_name(child) == Some(name))
    }

    fn value_count(&self, node: NodeId) -> usize {
        match self.node(node).map(|n| &n.kind) {
            Some(NodeKind::Leaf(OwnedScalar::Null) | NodeKind::Struct { .. }) | None => 0,
            Some(NodeKind::Leaf(_)) => 1,
            Some(NodeKind::List { children }) => children.len(),
        }
    }

    fn scalar(&self, node: NodeId, index: usize) -> Option<Scalar<'_>> {
        match &self.node(node)?.kind {
            NodeKind::Leaf(value) => (index == 0).then(|| value.as_scalar()),
            NodeKind::List { children } => {
                let child = *children.get(index)?;
                match &self.node(child)?.kind {
                    NodeKind::Leaf(value) => Some(value.as_scalar()),
                    _ => None,
                }
            }
            NodeKind::Struct { .. } => None,
        }
    }

    fn fetch_bytes(&self, node: NodeId, offset: usize, dest: &mut [u8]) -> usize {
        if let Some(NodeKind::Leaf(OwnedScalar::Str(text))) = self.node(node).map(|n| &n.kind) {
            return decode_base64(text, offset, dest);
        }
        numeric_byte_fetch(self, node, offset, dest)
    }
}

/// Decodes a base64 string node into `dest`.
///
/// When the caller wants the whole payload and `dest` is large enough, the
/// decode goes straight into `dest`; otherwise the payload is decoded once
/// and the requested window copied out. Malformed base64 yields `0`.
fn decode_base64(text: &str, offset: usize, dest: &mut [u8]) -> usize {
    let engine = base64::engine::general_purpose::STANDARD;
    if offset == 0 && dest.len() >= base64::decoded_len_estimate(text.len()) {
        return engine.decode_slice(text, dest).unwrap_or(0);
    }
    let Ok(decoded) = engine.decode(text) else {
        return 0;
    };
    if offset >= decoded.len() || dest.is_empty() {
        return 0;
    }
    let take = core::cmp::min(decoded.len() - offset, dest.len());
    dest[..take].copy_from_slice(&decoded[offset..offset + take]);
    take
}
