//! The ordered type-conversion ladders behind `fetch_values` and `get`.
//!
//! Each target type tries the wire shapes in a fixed order and falls back to
//! parsing a string value last; a miss is `None`, never an error. The ladder
//! is deliberately explicit so backends stay free of per-type logic.

use alloc::string::{String, ToString};
use core::time::Duration;

use crate::value::Scalar;

/// Conversion from a backend scalar, applying the target's fallback chain.
pub trait FromScalar: Sized {
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self>;
}

impl FromScalar for bool {
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Bool(b) => Some(b),
            Scalar::Int(0) | Scalar::Uint(0) => Some(false),
            Scalar::Int(1) | Scalar::Uint(1) => Some(true),
            Scalar::Str(text) => parse_bool(text),
            _ => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

macro_rules! impl_from_scalar_signed {
    ($($t:ty),+) => {
        $(
            impl FromScalar for $t {
                fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
                    match scalar {
                        Scalar::Int(i) => <$t>::try_from(i).ok(),
                        Scalar::Uint(u) => <$t>::try_from(u).ok(),
                        Scalar::Str(text) => text.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

macro_rules! impl_from_scalar_unsigned {
    ($($t:ty),+) => {
        $(
            impl FromScalar for $t {
                fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
                    match scalar {
                        Scalar::Uint(u) => <$t>::try_from(u).ok(),
                        Scalar::Int(i) => <$t>::try_from(i).ok(),
                        Scalar::Str(text) => text.trim().parse().ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_from_scalar_signed!(i16, i32, i64);
impl_from_scalar_unsigned!(u8, u16, u32, u64);

impl FromScalar for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Float(f) => Some(f),
            Scalar::Int(i) => Some(i as f64),
            Scalar::Uint(u) => Some(u as f64),
            Scalar::Str(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromScalar for f32 {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Float(f) => Some(f as f32),
            Scalar::Int(i) => Some(i as f32),
            Scalar::Uint(u) => Some(u as f32),
            Scalar::Str(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromScalar for String {
    /// Strings convert from string values only; no number formatting.
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Str(text) => Some(text.to_string()),
            _ => None,
        }
    }
}

impl FromScalar for Duration {
    /// Numeric values are interpreted as seconds; strings may carry a unit
    /// suffix (`ns`, `us`, `ms`, `s`, `m`, `h`). Negative values are a miss.
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_) => {
                Duration::try_from_secs_f64(f64::from_scalar(scalar)?).ok()
            }
            Scalar::Str(text) => parse_duration(text),
            _ => None,
        }
    }
}

fn parse_duration(text: &str) -> Option<Duration> {
    const UNITS: &[(&str, f64)] = &[
        ("ns", 1e-9),
        ("us", 1e-6),
        ("ms", 1e-3),
        ("s", 1.0),
        ("m", 60.0),
        ("h", 3600.0),
    ];

    let text = text.trim();
    let (number, factor) = UNITS
        .iter()
        .find_map(|(suffix, factor)| text.strip_suffix(suffix).map(|n| (n, *factor)))
        .unwrap_or((text, 1.0));
    let seconds: f64 = number.trim_end().parse().ok()?;
    Duration::try_from_secs_f64(seconds * factor).ok()
}
