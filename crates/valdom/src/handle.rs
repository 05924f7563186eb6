//! Reference-counted facade handles over a document backend.
//!
//! A [`Compound`] owns a parsed document; [`Attribute`]s borrow positions in
//! its tree. Navigation misses produce the *empty* attribute instead of an
//! error, so lookups chain without intermediate checks:
//!
//! ```rust
//! use valdom::{Compound, LogSink};
//!
//! let doc = Compound::from_json_text(r#"{"a":{"b":[10,20]}}"#, &mut LogSink).unwrap();
//! assert_eq!(doc.structure().nested("a").nested("b").at(1).get::<i64>(), Some(20));
//! assert!(doc.structure().nested("missing").at(3).is_empty());
//! ```

use alloc::{rc::Rc, string::String};

use crate::{
    backend::{DocumentBackend, NodeId},
    convert::FromScalar,
    error::DiagnosticSink,
    json::dom::JsonDocument,
    value::CanonicalType,
};

/// Owning handle for a parsed structured document.
///
/// Cloning is cheap and shares the document; the document and every node in
/// it live as long as any handle referencing them.
#[derive(Debug, Clone)]
pub struct Compound {
    backend: Rc<dyn DocumentBackend>,
}

impl Compound {
    /// Wraps an already-built backend document.
    #[must_use]
    pub fn new(backend: Rc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Parses a contiguous JSON text.
    ///
    /// On a syntax error the failure is reported to `sink` as a message and
    /// byte offset and `None` is returned.
    pub fn from_json_text(text: &str, sink: &mut dyn DiagnosticSink) -> Option<Self> {
        match JsonDocument::parse_text(text) {
            Ok(doc) => Some(Self::new(Rc::new(doc))),
            Err(err) => {
                sink.parse_error(&err.message, err.offset);
                None
            }
        }
    }

    /// Parses one JSON document spread over an ordered sequence of
    /// non-contiguous byte blocks.
    pub fn from_json_data(blocks: &[&[u8]], sink: &mut dyn DiagnosticSink) -> Option<Self> {
        match JsonDocument::parse_blocks(blocks) {
            Ok(doc) => Some(Self::new(Rc::new(doc))),
            Err(err) => {
                sink.parse_error(&err.message, err.offset);
                None
            }
        }
    }

    #[must_use]
    pub fn backend_id(&self) -> &'static str {
        self.backend.backend_id()
    }

    /// Root attribute of the document tree.
    #[must_use]
    pub fn structure(&self) -> Attribute {
        Attribute {
            inner: Some((Rc::clone(&self.backend), self.backend.root())),
        }
    }

    /// Shorthand for `structure().find(path)`.
    #[must_use]
    pub fn find(&self, path: &[&str]) -> Attribute {
        self.structure().find(path)
    }

    /// Shorthand for `structure().find_tagged(path, tags)`.
    #[must_use]
    pub fn find_tagged(&self, path: &[&str], tags: &[&str]) -> Attribute {
        self.structure().find_tagged(path, tags)
    }
}

/// A position inside a compound's tree.
///
/// The default value is the *empty* attribute: every navigation method on it
/// returns another empty attribute and every accessor reports absence.
#[derive(Debug, Clone, Default)]
pub struct Attribute {
    inner: Option<(Rc<dyn DocumentBackend>, NodeId)>,
}

impl Attribute {
    /// The empty attribute produced by failed navigation.
    #[must_use]
    pub fn empty() -> Self {
        Self { inner: None }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    /// `true` when the attribute points at a real node.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// The key under which this node is stored in its parent, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let (backend, node) = self.inner.as_ref()?;
        backend.node_name(*node)
    }

    #[must_use]
    pub fn canonical_type(&self) -> CanonicalType {
        match &self.inner {
            Some((backend, node)) => backend.canonical_type(*node),
            None => CanonicalType::Unknown,
        }
    }

    #[must_use]
    pub fn nested_count(&self) -> usize {
        match &self.inner {
            Some((backend, node)) => backend.nested_count(*node),
            None => 0,
        }
    }

    /// Child with the given name.
    #[must_use]
    pub fn nested(&self, name: &str) -> Attribute {
        self.navigate(|backend, node| backend.nested_name(node, name))
    }

    /// Child at the given position.
    #[must_use]
    pub fn at(&self, index: usize) -> Attribute {
        self.navigate(|backend, node| backend.nested_index(node, index))
    }

    /// Resolves `path` without tag qualification.
    #[must_use]
    pub fn find(&self, path: &[&str]) -> Attribute {
        self.find_tagged(path, &[])
    }

    /// Resolves `path`, preferring `segment@tag` variants in the priority
    /// order given by `tags`.
    #[must_use]
    pub fn find_tagged(&self, path: &[&str], tags: &[&str]) -> Attribute {
        self.navigate(|backend, node| backend.find(node, path, tags))
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        match &self.inner {
            Some((backend, node)) => backend.value_count(*node),
            None => 0,
        }
    }

    /// Copies up to `dest.len()` converted values starting at `offset`.
    ///
    /// Never writes past `dest.len()` and never reads past the node's value
    /// count; an absent node, an out-of-range offset or an inconvertible
    /// value yields `0` written elements, not an error. Conversion stops at
    /// the first element the ladder rejects.
    pub fn fetch_values<T: FromScalar>(&self, offset: usize, dest: &mut [T]) -> usize {
        let Some((backend, node)) = self.inner.as_ref() else {
            return 0;
        };
        let total = backend.value_count(*node);
        if offset >= total || dest.is_empty() {
            return 0;
        }
        let take = core::cmp::min(total - offset, dest.len());
        let mut written = 0;
        while written < take {
            let Some(value) = backend
                .scalar(*node, offset + written)
                .and_then(T::from_scalar)
            else {
                break;
            };
            dest[written] = value;
            written += 1;
        }
        written
    }

    /// Byte-oriented fetch; a base64 string node decodes into `dest`.
    pub fn fetch_bytes(&self, offset: usize, dest: &mut [u8]) -> usize {
        match &self.inner {
            Some((backend, node)) => backend.fetch_bytes(*node, offset, dest),
            None => 0,
        }
    }

    /// First value converted to `T`, if present and convertible.
    #[must_use]
    pub fn get<T: FromScalar>(&self) -> Option<T> {
        self.get_at(0)
    }

    /// Value at `offset` converted to `T`.
    #[must_use]
    pub fn get_at<T: FromScalar>(&self, offset: usize) -> Option<T> {
        let (backend, node) = self.inner.as_ref()?;
        backend.scalar(*node, offset).and_then(T::from_scalar)
    }

    fn navigate(
        &self,
        resolve: impl FnOnce(&dyn DocumentBackend, NodeId) -> Option<NodeId>,
    ) -> Attribute {
        let Some((backend, node)) = self.inner.as_ref() else {
            return Attribute::empty();
        };
        match resolve(backend.as_ref(), *node) {
            Some(hit) => Attribute {
                inner: Some((Rc::clone(backend), hit)),
            },
            None => Attribute::empty(),
        }
    }
}

/// Binds one compound and one attribute from the same backend.
#[derive(Debug, Clone)]
pub struct CompoundAttribute {
    compound: Compound,
    attribute: Attribute,
}

impl CompoundAttribute {
    /// Debug-asserts that both halves share a backend format.
    #[must_use]
    pub fn new(compound: Compound, attribute: Attribute) -> Self {
        if let Some((backend, _)) = attribute.inner.as_ref() {
            debug_assert_eq!(compound.backend_id(), backend.backend_id());
        }
        Self {
            compound,
            attribute,
        }
    }

    #[must_use]
    pub fn compound(&self) -> &Compound {
        &self.compound
    }

    #[must_use]
    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    /// First value of the bound attribute itself.
    #[must_use]
    pub fn fetch_value<T: FromScalar>(&self) -> Option<T> {
        self.attribute.get()
    }

    /// Value at `path` below the bound attribute.
    #[must_use]
    pub fn get<T: FromScalar>(&self, path: &[&str]) -> Option<T> {
        self.attribute.find(path).get()
    }

    /// Value at `path`, resolving tag-qualified segment variants first.
    #[must_use]
    pub fn get_tagged<T: FromScalar>(&self, path: &[&str], tags: &[&str]) -> Option<T> {
        self.attribute.find_tagged(path, tags).get()
    }

    /// Maps the string value at `path` through a name/variant table.
    #[must_use]
    pub fn select_value<E: Copy>(&self, path: &[&str], selector: &[(&str, E)]) -> Option<E> {
        let text: String = self.attribute.find(path).get()?;
        selector
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, value)| *value)
    }
}
