//! Parse-error type and the diagnostic sink fed by document constructors.

use alloc::string::String;

/// A syntax error with the absolute byte offset where it was detected.
///
/// Offsets count from the start of the logical input, across chunk
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Receives parse failures from the `Compound::from_json_*` constructors.
///
/// Data-shape problems are not errors in this crate; the sink only ever sees
/// syntax failures, one per failed parse.
pub trait DiagnosticSink {
    fn parse_error(&mut self, message: &str, offset: usize);
}

/// Default sink forwarding to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn parse_error(&mut self, message: &str, offset: usize) {
        log::error!("JSON parse error at offset {offset}: {message}");
    }
}
