//! One-token scanner shared by whole-document and progressive parsing.
//!
//! The scanner pulls bytes from a [`ByteReader`] and produces one complete
//! token per call. Running out of input mid-token yields
//! [`ScanError::NeedMore`] while the input is not final, so the progressive
//! parser can retry once more bytes arrive; on final input the same
//! condition is a syntax error with the offset where the input ended.

use alloc::{format, string::String, vec::Vec};

use bstr::BStr;

use super::{
    escape::{UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate, is_low_surrogate},
    reader::ByteReader,
};
use crate::{error::ParseError, value::OwnedScalar};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    BeginStruct,
    EndStruct,
    BeginList,
    EndList,
    Colon,
    Comma,
    Scalar(OwnedScalar),
    /// True end of the input stream (final input only).
    End,
}

#[derive(Debug)]
pub(crate) enum ScanError {
    /// Input exhausted mid-token while more may still arrive.
    NeedMore,
    Syntax(ParseError),
}

fn syntax(message: impl Into<String>, offset: usize) -> ScanError {
    ScanError::Syntax(ParseError::new(message, offset))
}

pub(crate) fn skip_whitespace<R: ByteReader>(input: &mut R) {
    while matches!(input.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        input.take();
    }
}

pub(crate) fn scan_token<R: ByteReader>(
    input: &mut R,
    final_input: bool,
) -> Result<Token, ScanError> {
    skip_whitespace(input);
    let Some(byte) = input.peek() else {
        return if final_input {
            Ok(Token::End)
        } else {
            Err(ScanError::NeedMore)
        };
    };
    match byte {
        b'{' => punctuation(input, Token::BeginStruct),
        b'}' => punctuation(input, Token::EndStruct),
        b'[' => punctuation(input, Token::BeginList),
        b']' => punctuation(input, Token::EndList),
        b':' => punctuation(input, Token::Colon),
        b',' => punctuation(input, Token::Comma),
        b'"' => scan_string(input, final_input).map(|s| Token::Scalar(OwnedScalar::Str(s))),
        b'-' | b'0'..=b'9' => scan_number(input, final_input).map(Token::Scalar),
        b't' => scan_literal(input, final_input, b"true", OwnedScalar::Bool(true)),
        b'f' => scan_literal(input, final_input, b"false", OwnedScalar::Bool(false)),
        b'n' => scan_literal(input, final_input, b"null", OwnedScalar::Null),
        other => Err(syntax(
            format!("invalid character {:?}", BStr::new(&[other])),
            input.tell(),
        )),
    }
}

fn punctuation<R: ByteReader>(input: &mut R, token: Token) -> Result<Token, ScanError> {
    input.take();
    Ok(token)
}

fn scan_literal<R: ByteReader>(
    input: &mut R,
    final_input: bool,
    expected: &'static [u8],
    scalar: OwnedScalar,
) -> Result<Token, ScanError> {
    for &want in expected {
        match input.take() {
            None if final_input => {
                return Err(syntax("unexpected end of input in literal", input.tell()));
            }
            None => return Err(ScanError::NeedMore),
            Some(byte) if byte == want => {}
            Some(_) => return Err(syntax("invalid literal", input.tell())),
        }
    }
    Ok(Token::Scalar(scalar))
}

fn copy_digits<R: ByteReader>(input: &mut R, text: &mut String) {
    while let Some(byte @ b'0'..=b'9') = input.peek() {
        text.push(char::from(byte));
        input.take();
    }
}

/// Scans one number and classifies it: integral values that fit `i64`
/// become `Int`, positive integral values that only fit `u64` become
/// `Uint`, everything else `Float`.
fn scan_number<R: ByteReader>(
    input: &mut R,
    final_input: bool,
) -> Result<OwnedScalar, ScanError> {
    let mut text = String::new();
    let negative = input.peek() == Some(b'-');
    if negative {
        text.push('-');
        input.take();
    }

    match input.peek() {
        None if !final_input => return Err(ScanError::NeedMore),
        Some(b'0') => {
            text.push('0');
            input.take();
        }
        Some(byte @ b'1'..=b'9') => {
            text.push(char::from(byte));
            input.take();
            copy_digits(input, &mut text);
        }
        _ => return Err(syntax("invalid number", input.tell())),
    }

    let mut float = false;
    if input.peek() == Some(b'.') {
        float = true;
        text.push('.');
        input.take();
        match input.peek() {
            None if !final_input => return Err(ScanError::NeedMore),
            Some(b'0'..=b'9') => copy_digits(input, &mut text),
            _ => return Err(syntax("invalid number", input.tell())),
        }
    }
    if matches!(input.peek(), Some(b'e' | b'E')) {
        float = true;
        text.push('e');
        input.take();
        if matches!(input.peek(), Some(b'+' | b'-')) {
            if input.peek() == Some(b'-') {
                text.push('-');
            }
            input.take();
        }
        match input.peek() {
            None if !final_input => return Err(ScanError::NeedMore),
            Some(b'0'..=b'9') => copy_digits(input, &mut text),
            _ => return Err(syntax("invalid number", input.tell())),
        }
    }

    // The token may still grow: a digit, '.', or exponent could follow.
    if input.peek().is_none() && !final_input {
        return Err(ScanError::NeedMore);
    }

    if !float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(OwnedScalar::Int(i));
        }
        if !negative {
            if let Ok(u) = text.parse::<u64>() {
                return Ok(OwnedScalar::Uint(u));
            }
        }
    }
    text.parse::<f64>()
        .map(OwnedScalar::Float)
        .map_err(|_| syntax("number out of range", input.tell()))
}

fn scan_string<R: ByteReader>(input: &mut R, final_input: bool) -> Result<String, ScanError> {
    input.take(); // opening quote
    let mut buf = Vec::new();
    loop {
        match input.take() {
            None if final_input => return Err(syntax("unterminated string", input.tell())),
            None => return Err(ScanError::NeedMore),
            Some(b'"') => {
                return String::from_utf8(buf)
                    .map_err(|_| syntax("invalid UTF-8 in string", input.tell()));
            }
            Some(b'\\') => scan_escape(input, final_input, &mut buf)?,
            Some(byte) if byte < 0x20 => {
                return Err(syntax("invalid control character in string", input.tell()));
            }
            Some(byte) => buf.push(byte),
        }
    }
}

fn scan_escape<R: ByteReader>(
    input: &mut R,
    final_input: bool,
    buf: &mut Vec<u8>,
) -> Result<(), ScanError> {
    let mapped = match input.take() {
        None if final_input => {
            return Err(syntax("unterminated string escape", input.tell()));
        }
        None => return Err(ScanError::NeedMore),
        Some(b'"') => b'"',
        Some(b'\\') => b'\\',
        Some(b'/') => b'/',
        Some(b'b') => 0x08,
        Some(b'f') => 0x0C,
        Some(b'n') => b'\n',
        Some(b'r') => b'\r',
        Some(b't') => b'\t',
        Some(b'u') => {
            let unit = read_hex4(input, final_input)?;
            let ch = if is_high_surrogate(unit) {
                expect_escape_byte(input, final_input, b'\\')?;
                expect_escape_byte(input, final_input, b'u')?;
                let low = read_hex4(input, final_input)?;
                combine_surrogates(unit, low)
                    .ok_or_else(|| syntax("invalid surrogate pair", input.tell()))?
            } else if is_low_surrogate(unit) {
                return Err(syntax("unpaired surrogate in unicode escape", input.tell()));
            } else {
                // Non-surrogate BMP code units are always scalar values.
                char::from_u32(u32::from(unit))
                    .ok_or_else(|| syntax("invalid unicode escape", input.tell()))?
            };
            let mut utf8 = [0u8; 4];
            buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            return Ok(());
        }
        Some(_) => return Err(syntax("invalid escape sequence", input.tell())),
    };
    buf.push(mapped);
    Ok(())
}

fn expect_escape_byte<R: ByteReader>(
    input: &mut R,
    final_input: bool,
    want: u8,
) -> Result<(), ScanError> {
    match input.take() {
        None if final_input => Err(syntax("unpaired surrogate in unicode escape", input.tell())),
        None => Err(ScanError::NeedMore),
        Some(byte) if byte == want => Ok(()),
        Some(_) => Err(syntax("unpaired surrogate in unicode escape", input.tell())),
    }
}

fn read_hex4<R: ByteReader>(input: &mut R, final_input: bool) -> Result<u16, ScanError> {
    let mut escape = UnicodeEscapeBuffer::new();
    loop {
        match input.take() {
            None if final_input => {
                return Err(syntax(
                    "unexpected end of input in unicode escape",
                    input.tell(),
                ));
            }
            None => return Err(ScanError::NeedMore),
            Some(byte) => match escape.feed(byte) {
                Ok(Some(unit)) => return Ok(unit),
                Ok(None) => {}
                Err(message) => return Err(syntax(message, input.tell())),
            },
        }
    }
}
