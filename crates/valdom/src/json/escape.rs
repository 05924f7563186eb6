//! Buffering and decoding of `\uXXXX` escape sequences.

/// Accumulates four hexadecimal digits into one UTF-16 code unit.
///
/// The buffer resets itself after a successful decode so it can be reused
/// for the next escape.
#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    value: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feeds one input byte.
    ///
    /// Returns `Ok(Some(unit))` once four digits have been accumulated,
    /// `Ok(None)` while more digits are expected, and an error message for a
    /// non-hexadecimal byte.
    pub(crate) fn feed(&mut self, byte: u8) -> Result<Option<u16>, &'static str> {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err("invalid hexadecimal digit in unicode escape"),
        };
        self.value = (self.value << 4) | u16::from(digit);
        self.len += 1;
        if self.len == 4 {
            let unit = self.value;
            *self = Self::default();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combines a surrogate pair into the character it encodes.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    if !is_high_surrogate(high) || !is_low_surrogate(low) {
        return None;
    }
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_four_digits() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'4').unwrap(), None);
        assert_eq!(buf.feed(b'1').unwrap(), Some(0x41));
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        for byte in *b"AbCd" {
            let _ = buf.feed(byte).unwrap();
        }
        // Buffer reset after completion: next escape starts clean.
        assert_eq!(buf.feed(b'0').unwrap(), None);
    }

    #[test]
    fn rejects_non_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert!(buf.feed(b'G').is_err());
    }

    #[test]
    fn surrogate_pairs() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some('\u{1F600}'));
        assert_eq!(combine_surrogates(0x0041, 0xDE00), None);
        assert_eq!(combine_surrogates(0xD83D, 0x0041), None);
    }
}
