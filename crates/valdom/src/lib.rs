//! Backend-agnostic navigation over hierarchical structured data.
//!
//! The crate is organized around three pieces:
//!
//! * the [`Compound`] / [`Attribute`] handle model, a typed navigation facade
//!   over any tree backend implementing [`DocumentBackend`];
//! * a materialized JSON backend ([`json::dom::JsonDocument`]) that parses a
//!   whole document — contiguous text or an ordered sequence of scattered
//!   byte blocks — into an index arena;
//! * a progressive parser ([`json::stream::ProgressiveParser`]) that accepts
//!   arbitrarily-sized byte chunks as they arrive and pushes structured
//!   events to a caller-supplied [`StreamVisitor`].
//!
//! # Examples
//!
//! Materialized navigation:
//!
//! ```rust
//! use valdom::{Compound, LogSink};
//!
//! let mut sink = LogSink;
//! let doc = Compound::from_json_text(r#"{"a":1,"b":[1,2,3]}"#, &mut sink).unwrap();
//! assert_eq!(doc.structure().nested("b").value_count(), 3);
//! assert_eq!(doc.find(&["a"]).get::<i64>(), Some(1));
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod backend;
mod convert;
mod error;
mod handle;
mod pool;
mod value;

pub mod json;

#[cfg(test)]
mod tests;

pub use backend::{DocumentBackend, NodeId};
pub use convert::FromScalar;
pub use error::{DiagnosticSink, LogSink, ParseError};
pub use handle::{Attribute, Compound, CompoundAttribute};
pub use json::stream::{ProgressiveParser, StreamVisitor, ValueSlice};
pub use pool::{BufferPool, PooledBuf};
pub use value::{CanonicalType, OwnedScalar, Scalar};
