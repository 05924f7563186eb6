//! Chunk-driven progressive JSON parsing.
//!
//! A [`ProgressiveParser`] accepts input in arbitrarily sized chunks and
//! pushes structured events to a [`StreamVisitor`] as soon as they are
//! complete. Unconsumed bytes are carried between chunks in a buffer leased
//! from a [`BufferPool`]; the carry never exceeds the configured maximum
//! token size, because the parser only steps while at least that many bytes
//! are buffered (or the input is final).
//!
//! Consecutive numeric list elements of one type are batched into a single
//! [`ValueSlice`] delivery; a batch flushes when its type changes, the list
//! ends, or it reaches [`MAX_BATCH_LEN`] elements.

use alloc::{rc::Rc, string::String, vec, vec::Vec};

use super::{
    grammar::{Grammar, StructuralEvent},
    reader::{ByteReader, ChunkReader},
    scan::{self, ScanError, Token, scan_token},
};
use crate::{
    error::ParseError,
    pool::{BufferPool, PooledBuf},
    value::OwnedScalar,
};

/// Upper bound on batched numeric deliveries.
pub const MAX_BATCH_LEN: usize = 512;

/// One value delivery from the progressive parser.
///
/// Numeric variants carry slices so consecutive list elements of one type
/// arrive in a single call; standalone numbers arrive as one-element slices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueSlice<'a> {
    Null,
    Bool(bool),
    Str(&'a str),
    Ints(&'a [i64]),
    Uints(&'a [u64]),
    Floats(&'a [f64]),
}

/// Receives structured events from a [`ProgressiveParser`].
///
/// Every method has a no-op default, so a visitor implements only the events
/// it cares about. Attribute events bracket the member's value events:
/// `begin_attribute(name)` fires when the key is read and
/// `finish_attribute(name)` once the member's value is complete.
pub trait StreamVisitor {
    /// A parse session starts.
    fn begin(&mut self) {}

    fn begin_struct(&mut self) {}

    fn finish_struct(&mut self) {}

    fn begin_list(&mut self) {}

    fn finish_list(&mut self) {}

    fn begin_attribute(&mut self, _name: &str) {}

    fn finish_attribute(&mut self, _name: &str) {}

    fn consume(&mut self, _value: ValueSlice<'_>) {}

    /// Bytes following the document's root value, forwarded verbatim.
    fn unparsed_data(&mut self, _data: &[u8]) {}

    /// All buffered deliveries are out; fired right before [`finish`].
    ///
    /// [`finish`]: StreamVisitor::finish
    fn flush(&mut self) {}

    /// The session completed successfully.
    fn finish(&mut self) {}

    /// The session failed; no further events follow.
    fn failed(&mut self, _error: &ParseError) {}

    /// Polled before each parser step; `false` pauses the session.
    fn should_continue(&mut self) -> bool {
        true
    }
}

/// Accumulates consecutive numeric list elements of one type.
#[derive(Debug, Default)]
enum ScalarBatch {
    #[default]
    Empty,
    Ints(Vec<i64>),
    Uints(Vec<u64>),
    Floats(Vec<f64>),
}

impl ScalarBatch {
    fn len(&self) -> usize {
        match self {
            ScalarBatch::Empty => 0,
            ScalarBatch::Ints(v) => v.len(),
            ScalarBatch::Uints(v) => v.len(),
            ScalarBatch::Floats(v) => v.len(),
        }
    }

    /// `false` when the value does not extend the current batch.
    fn push(&mut self, value: &OwnedScalar) -> bool {
        match (&mut *self, value) {
            (ScalarBatch::Empty, OwnedScalar::Int(i)) => {
                *self = ScalarBatch::Ints(vec![*i]);
                true
            }
            (ScalarBatch::Empty, OwnedScalar::Uint(u)) => {
                *self = ScalarBatch::Uints(vec![*u]);
                true
            }
            (ScalarBatch::Empty, OwnedScalar::Float(f)) => {
                *self = ScalarBatch::Floats(vec![*f]);
                true
            }
            (ScalarBatch::Ints(v), OwnedScalar::Int(i)) => {
                v.push(*i);
                true
            }
            (ScalarBatch::Uints(v), OwnedScalar::Uint(u)) => {
                v.push(*u);
                true
            }
            (ScalarBatch::Floats(v), OwnedScalar::Float(f)) => {
                v.push(*f);
                true
            }
            _ => false,
        }
    }

    fn flush_into<V: StreamVisitor>(&mut self, visitor: &mut V) {
        match core::mem::take(self) {
            ScalarBatch::Empty => {}
            ScalarBatch::Ints(v) => visitor.consume(ValueSlice::Ints(&v)),
            ScalarBatch::Uints(v) => visitor.consume(ValueSlice::Uints(&v)),
            ScalarBatch::Floats(v) => visitor.consume(ValueSlice::Floats(&v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Active,
    Done,
    Failed,
}

enum Outcome {
    Parsing,
    Complete,
    Cancelled,
    Failed(ParseError),
}

/// Push parser over a chunked byte stream.
///
/// Lifecycle: [`begin`] opens a session, [`parse_data`] feeds chunks and
/// [`finish`] marks the end of input. `parse_data` and `finish` return
/// `false` once the session has failed or the visitor paused it; a paused
/// session resumes on the next call.
///
/// [`begin`]: ProgressiveParser::begin
/// [`parse_data`]: ProgressiveParser::parse_data
/// [`finish`]: ProgressiveParser::finish
pub struct ProgressiveParser<V> {
    visitor: V,
    pool: Rc<BufferPool>,
    max_token_size: usize,
    state: SessionState,
    carry: Option<PooledBuf>,
    consumed: usize,
    grammar: Grammar,
    batch: ScalarBatch,
    /// Pending attribute name per open struct.
    names: Vec<Option<String>>,
    /// Root value complete; the rest of the input passes through unparsed.
    tail: bool,
}

impl<V: StreamVisitor> ProgressiveParser<V> {
    /// `max_token_size` bounds the carry buffer: any single token longer
    /// than this fails the session. Clamped to at least one byte.
    pub fn new(visitor: V, pool: Rc<BufferPool>, max_token_size: usize) -> Self {
        Self {
            visitor,
            pool,
            max_token_size: max_token_size.max(1),
            state: SessionState::Idle,
            carry: None,
            consumed: 0,
            grammar: Grammar::new(),
            batch: ScalarBatch::Empty,
            names: Vec::new(),
            tail: false,
        }
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn visitor_mut(&mut self) -> &mut V {
        &mut self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Total bytes accepted so far, including passed-through tail bytes.
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    /// Starts a session, resetting any previous one.
    pub fn begin(&mut self) {
        log::debug!("progressive parse session started");
        self.state = SessionState::Active;
        self.carry = Some(self.pool.lease(self.max_token_size));
        self.consumed = 0;
        self.grammar = Grammar::new();
        self.batch = ScalarBatch::Empty;
        self.names.clear();
        self.tail = false;
        self.visitor.begin();
    }

    /// Feeds one chunk of input.
    pub fn parse_data(&mut self, chunk: &[u8]) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        if self.tail {
            if !chunk.is_empty() {
                self.visitor.unparsed_data(chunk);
            }
            self.consumed += chunk.len();
            return true;
        }
        self.drive(chunk, false)
    }

    /// Marks the end of input and closes the session.
    pub fn finish(&mut self) -> bool {
        match self.state {
            SessionState::Active => {}
            SessionState::Done => return true,
            SessionState::Idle | SessionState::Failed => return false,
        }
        if self.tail || self.drive(&[], true) {
            self.complete();
            return true;
        }
        false
    }

    fn complete(&mut self) {
        self.batch.flush_into(&mut self.visitor);
        self.visitor.flush();
        self.visitor.finish();
        self.carry = None;
        self.tail = true;
        self.state = SessionState::Done;
        log::debug!(
            "progressive parse session finished after {} bytes",
            self.consumed
        );
    }

    /// Runs the scanner over the carry followed by `chunk` and rebuilds the
    /// carry from whatever the scanner did not consume.
    fn drive(&mut self, chunk: &[u8], final_input: bool) -> bool {
        let mut carry = match self.carry.take() {
            Some(carry) => carry,
            None => self.pool.lease(self.max_token_size),
        };
        let carry_len = carry.len();

        let outcome;
        let mut taken;
        {
            let blocks: [&[u8]; 2] = [&carry[..], chunk];
            let mut view = ChunkReader::new(&blocks);
            loop {
                // Whitespace is always safe to discard, so it never counts
                // against the token budget.
                scan::skip_whitespace(&mut view);
                taken = view.tell();
                let available = view.remaining();
                if !final_input && available < self.max_token_size {
                    outcome = Outcome::Parsing;
                    break;
                }
                if !self.visitor.should_continue() {
                    outcome = Outcome::Cancelled;
                    break;
                }
                match scan_token(&mut view, final_input) {
                    Ok(token) => match self.accept(token, self.consumed + view.tell()) {
                        Ok(true) => {
                            taken = view.tell();
                            outcome = Outcome::Complete;
                            break;
                        }
                        Ok(false) => {}
                        Err(err) => {
                            outcome = Outcome::Failed(err);
                            break;
                        }
                    },
                    Err(ScanError::NeedMore) => {
                        // Exactly the budget buffered and still unterminated
                        // is not over the budget yet; keep the bytes and wait
                        // for more input or the final flush.
                        outcome = if available > self.max_token_size {
                            Outcome::Failed(ParseError::new(
                                "token exceeds the maximum token size",
                                self.consumed + taken,
                            ))
                        } else {
                            Outcome::Parsing
                        };
                        break;
                    }
                    Err(ScanError::Syntax(mut err)) => {
                        err.offset += self.consumed;
                        outcome = Outcome::Failed(err);
                        break;
                    }
                }
            }
        }

        match outcome {
            Outcome::Failed(err) => {
                log::debug!("progressive parse failed: {err}");
                self.visitor.failed(&err);
                self.state = SessionState::Failed;
                false
            }
            Outcome::Complete => {
                self.consumed += taken;
                if taken >= carry_len {
                    let rest = &chunk[taken - carry_len..];
                    if !rest.is_empty() {
                        self.visitor.unparsed_data(rest);
                        self.consumed += rest.len();
                    }
                } else {
                    let rest = &carry[taken..];
                    self.visitor.unparsed_data(rest);
                    self.consumed += rest.len();
                    if !chunk.is_empty() {
                        self.visitor.unparsed_data(chunk);
                        self.consumed += chunk.len();
                    }
                }
                self.tail = true;
                true
            }
            Outcome::Parsing | Outcome::Cancelled => {
                self.consumed += taken;
                if taken >= carry_len {
                    carry.clear();
                    carry.extend_from_slice(&chunk[taken - carry_len..]);
                } else {
                    carry.drain(..taken);
                    carry.extend_from_slice(chunk);
                }
                self.carry = Some(carry);
                matches!(outcome, Outcome::Parsing)
            }
        }
    }

    /// Feeds one scanned token to the grammar. `Ok(true)` once the root
    /// value is complete.
    fn accept(&mut self, token: Token, offset: usize) -> Result<bool, ParseError> {
        if let Some(event) = self.grammar.feed(token, offset)? {
            self.route(event);
        }
        Ok(self.grammar.is_done())
    }

    fn route(&mut self, event: StructuralEvent) {
        match event {
            StructuralEvent::BeginStruct => {
                self.batch.flush_into(&mut self.visitor);
                self.names.push(None);
                self.visitor.begin_struct();
            }
            StructuralEvent::EndStruct => {
                if let Some(Some(name)) = self.names.pop() {
                    self.visitor.finish_attribute(&name);
                }
                self.visitor.finish_struct();
            }
            StructuralEvent::BeginList => {
                self.batch.flush_into(&mut self.visitor);
                self.visitor.begin_list();
            }
            StructuralEvent::EndList => {
                self.batch.flush_into(&mut self.visitor);
                self.visitor.finish_list();
            }
            StructuralEvent::Key(name) => {
                if let Some(slot) = self.names.last_mut() {
                    if let Some(prev) = slot.replace(name) {
                        self.visitor.finish_attribute(&prev);
                    }
                }
                if let Some(Some(current)) = self.names.last() {
                    self.visitor.begin_attribute(current);
                }
            }
            StructuralEvent::Value(value) => self.route_scalar(&value),
        }
    }

    fn route_scalar(&mut self, value: &OwnedScalar) {
        if self.grammar.in_list() && value.is_numeric() {
            if !self.batch.push(value) {
                self.batch.flush_into(&mut self.visitor);
                self.batch.push(value);
            }
            if self.batch.len() >= MAX_BATCH_LEN {
                self.batch.flush_into(&mut self.visitor);
            }
            return;
        }
        self.batch.flush_into(&mut self.visitor);
        match value {
            OwnedScalar::Null => self.visitor.consume(ValueSlice::Null),
            OwnedScalar::Bool(b) => self.visitor.consume(ValueSlice::Bool(*b)),
            OwnedScalar::Str(s) => self.visitor.consume(ValueSlice::Str(s)),
            OwnedScalar::Int(i) => self.visitor.consume(ValueSlice::Ints(core::slice::from_ref(i))),
            OwnedScalar::Uint(u) => self.visitor.consume(ValueSlice::Uints(core::slice::from_ref(u))),
            OwnedScalar::Float(f) => {
                self.visitor.consume(ValueSlice::Floats(core::slice::from_ref(f)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_extends_same_type_only() {
        let mut batch = ScalarBatch::Empty;
        assert!(batch.push(&OwnedScalar::Int(1)));
        assert!(batch.push(&OwnedScalar::Int(2)));
        assert!(!batch.push(&OwnedScalar::Float(1.5)));
        assert_eq!(batch.len(), 2);
    }
}
