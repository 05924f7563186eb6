//! Shared fixtures: a recording visitor, a recording diagnostic sink and
//! chunk splitting helpers.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use crate::{DiagnosticSink, ParseError, StreamVisitor, ValueSlice};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Begin,
    BeginStruct,
    FinishStruct,
    BeginList,
    FinishList,
    BeginAttribute(String),
    FinishAttribute(String),
    Null,
    Bool(bool),
    Str(String),
    Ints(Vec<i64>),
    Uints(Vec<u64>),
    Floats(Vec<f64>),
    Unparsed(Vec<u8>),
    Flush,
    Finish,
    Failed(ParseError),
}

/// Visitor that records every callback in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingVisitor {
    pub(crate) events: Vec<Event>,
    /// Remaining `should_continue` allowances; `None` never pauses.
    pub(crate) budget: Option<usize>,
}

impl StreamVisitor for RecordingVisitor {
    fn begin(&mut self) {
        self.events.push(Event::Begin);
    }

    fn begin_struct(&mut self) {
        self.events.push(Event::BeginStruct);
    }

    fn finish_struct(&mut self) {
        self.events.push(Event::FinishStruct);
    }

    fn begin_list(&mut self) {
        self.events.push(Event::BeginList);
    }

    fn finish_list(&mut self) {
        self.events.push(Event::FinishList);
    }

    fn begin_attribute(&mut self, name: &str) {
        self.events.push(Event::BeginAttribute(name.to_string()));
    }

    fn finish_attribute(&mut self, name: &str) {
        self.events.push(Event::FinishAttribute(name.to_string()));
    }

    fn consume(&mut self, value: ValueSlice<'_>) {
        self.events.push(match value {
            ValueSlice::Null => Event::Null,
            ValueSlice::Bool(b) => Event::Bool(b),
            ValueSlice::Str(s) => Event::Str(s.to_string()),
            ValueSlice::Ints(v) => Event::Ints(v.to_vec()),
            ValueSlice::Uints(v) => Event::Uints(v.to_vec()),
            ValueSlice::Floats(v) => Event::Floats(v.to_vec()),
        });
    }

    fn unparsed_data(&mut self, data: &[u8]) {
        self.events.push(Event::Unparsed(data.to_vec()));
    }

    fn flush(&mut self) {
        self.events.push(Event::Flush);
    }

    fn finish(&mut self) {
        self.events.push(Event::Finish);
    }

    fn failed(&mut self, error: &ParseError) {
        self.events.push(Event::Failed(error.clone()));
    }

    fn should_continue(&mut self) -> bool {
        match &mut self.budget {
            None => true,
            Some(0) => false,
            Some(budget) => {
                *budget -= 1;
                true
            }
        }
    }
}

/// Splits `data` into chunks of at most `size` bytes.
pub(crate) fn chunks_of(data: &[u8], size: usize) -> Vec<&[u8]> {
    data.chunks(size.max(1)).collect()
}

/// Merges adjacent `Unparsed` events so event streams compare independently
/// of how the trailing bytes were chunked.
pub(crate) fn normalized(events: &[Event]) -> Vec<Event> {
    let mut out: Vec<Event> = Vec::new();
    for event in events {
        if let (Event::Unparsed(data), Some(Event::Unparsed(tail))) = (event, out.last_mut()) {
            tail.extend_from_slice(data);
        } else {
            out.push(event.clone());
        }
    }
    out
}

/// Diagnostic sink that records reported failures.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) errors: Vec<(String, usize)>,
}

impl DiagnosticSink for RecordingSink {
    fn parse_error(&mut self, message: &str, offset: usize) {
        self.errors.push((message.to_string(), offset));
    }
}
