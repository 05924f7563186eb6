//! Structural validation of one token stream.
//!
//! The grammar tracks container nesting and member/element phases and turns
//! valid tokens into [`StructuralEvent`]s. It is deliberately ignorant of
//! where bytes come from, so the whole-document parser and the progressive
//! parser share it unchanged.

use alloc::{format, string::String, vec::Vec};

use super::scan::Token;
use crate::{error::ParseError, value::OwnedScalar};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StructuralEvent {
    BeginStruct,
    EndStruct,
    BeginList,
    EndList,
    Key(String),
    Value(OwnedScalar),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the document's root value.
    Start,
    /// Just after `{`, expecting the first key or `}`.
    BeforeFirstKey,
    /// After a member comma, expecting the next key.
    BeforeKey,
    /// After a key, expecting `:`.
    AfterKey,
    /// After `:`, expecting the member's value.
    BeforeValue,
    /// Just after `[`, expecting the first element or `]`.
    BeforeFirstElement,
    /// After an element comma, expecting the next element.
    BeforeElement,
    /// After a member's value, expecting `,` or `}`.
    AfterMember,
    /// After a list element, expecting `,` or `]`.
    AfterElement,
    /// Root value complete.
    Done,
}

#[derive(Debug)]
pub(crate) struct Grammar {
    state: State,
    /// Open containers, `true` for lists.
    lists: Vec<bool>,
}

impl Grammar {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Start,
            lists: Vec::new(),
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub(crate) fn in_list(&self) -> bool {
        self.lists.last().copied().unwrap_or(false)
    }

    /// Advances the state machine by one token.
    ///
    /// Returns the structural event the token produced, or `None` for pure
    /// punctuation (`:` and `,`).
    pub(crate) fn feed(
        &mut self,
        token: Token,
        offset: usize,
    ) -> Result<Option<StructuralEvent>, ParseError> {
        if token == Token::End && self.state != State::Done {
            return Err(ParseError::new("unexpected end of input", offset));
        }
        match (self.state, token) {
            (
                State::BeforeFirstKey | State::BeforeKey,
                Token::Scalar(OwnedScalar::Str(name)),
            ) => {
                self.state = State::AfterKey;
                Ok(Some(StructuralEvent::Key(name)))
            }
            (State::BeforeFirstKey | State::AfterMember, Token::EndStruct) => {
                self.lists.pop();
                self.state = self.after_value();
                Ok(Some(StructuralEvent::EndStruct))
            }
            (State::AfterKey, Token::Colon) => {
                self.state = State::BeforeValue;
                Ok(None)
            }
            (State::BeforeFirstElement | State::AfterElement, Token::EndList) => {
                self.lists.pop();
                self.state = self.after_value();
                Ok(Some(StructuralEvent::EndList))
            }
            (
                State::Start | State::BeforeValue | State::BeforeFirstElement | State::BeforeElement,
                Token::BeginStruct,
            ) => {
                self.lists.push(false);
                self.state = State::BeforeFirstKey;
                Ok(Some(StructuralEvent::BeginStruct))
            }
            (
                State::Start | State::BeforeValue | State::BeforeFirstElement | State::BeforeElement,
                Token::BeginList,
            ) => {
                self.lists.push(true);
                self.state = State::BeforeFirstElement;
                Ok(Some(StructuralEvent::BeginList))
            }
            (
                State::Start | State::BeforeValue | State::BeforeFirstElement | State::BeforeElement,
                Token::Scalar(value),
            ) => {
                self.state = self.after_value();
                Ok(Some(StructuralEvent::Value(value)))
            }
            (State::AfterMember, Token::Comma) => {
                self.state = State::BeforeKey;
                Ok(None)
            }
            (State::AfterElement, Token::Comma) => {
                self.state = State::BeforeElement;
                Ok(None)
            }
            (_, token) => Err(ParseError::new(
                format!("unexpected {}", describe(&token)),
                offset,
            )),
        }
    }

    fn after_value(&self) -> State {
        match self.lists.last() {
            None => State::Done,
            Some(true) => State::AfterElement,
            Some(false) => State::AfterMember,
        }
    }
}

fn describe(token: &Token) -> &'static str {
    match token {
        Token::BeginStruct => "'{'",
        Token::EndStruct => "'}'",
        Token::BeginList => "'['",
        Token::EndList => "']'",
        Token::Colon => "':'",
        Token::Comma => "','",
        Token::Scalar(_) => "value",
        Token::End => "end of input",
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;
    use crate::json::{
        reader::{ByteReader, SliceReader},
        scan::{ScanError, scan_token},
    };

    fn events(text: &str) -> Result<Vec<StructuralEvent>, ParseError> {
        let mut input = SliceReader::new(text.as_bytes());
        let mut grammar = Grammar::new();
        let mut out = Vec::new();
        while !grammar.is_done() {
            let token = match scan_token(&mut input, true) {
                Ok(token) => token,
                Err(ScanError::Syntax(err)) => return Err(err),
                Err(ScanError::NeedMore) => unreachable!("final input"),
            };
            if let Some(event) = grammar.feed(token, input.tell())? {
                out.push(event);
            }
        }
        Ok(out)
    }

    #[test]
    fn object_with_member() {
        assert_eq!(
            events(r#"{"a":1}"#).unwrap(),
            vec![
                StructuralEvent::BeginStruct,
                StructuralEvent::Key("a".to_string()),
                StructuralEvent::Value(OwnedScalar::Int(1)),
                StructuralEvent::EndStruct,
            ]
        );
    }

    #[test]
    fn nested_list() {
        assert_eq!(
            events("[1,[],2]").unwrap(),
            vec![
                StructuralEvent::BeginList,
                StructuralEvent::Value(OwnedScalar::Int(1)),
                StructuralEvent::BeginList,
                StructuralEvent::EndList,
                StructuralEvent::Value(OwnedScalar::Int(2)),
                StructuralEvent::EndList,
            ]
        );
    }

    #[test]
    fn truncated_object_reports_end_offset() {
        let err = events(r#"{"a":"#).unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn rejects_misplaced_tokens() {
        assert!(events(r#"{"a" 1}"#).is_err());
        assert!(events("[1 2]").is_err());
        assert!(events(r#"{1:2}"#).is_err());
        assert!(events("]").is_err());
        assert!(events("").is_err());
    }

    #[test]
    fn rejects_trailing_commas() {
        let err = events(r#"{"a":1,}"#).unwrap_err();
        assert_eq!(err.message, "unexpected '}'");
        let err = events("[1,]").unwrap_err();
        assert_eq!(err.message, "unexpected ']'");
    }

    #[test]
    fn scalar_root_completes() {
        assert_eq!(
            events("42").unwrap(),
            vec![StructuralEvent::Value(OwnedScalar::Int(42))]
        );
    }
}
