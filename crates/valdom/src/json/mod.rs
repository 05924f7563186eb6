//! JSON backends: byte readers, the materialized document and the
//! progressive parser.
//!
//! The scanner and grammar are shared between whole-document parsing
//! ([`dom::JsonDocument`]) and chunk-driven streaming
//! ([`stream::ProgressiveParser`]); only the input discipline differs.

pub mod dom;
pub mod reader;
pub mod stream;

mod escape;
mod grammar;
mod scan;
