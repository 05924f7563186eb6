//! Canonical value classification shared by every tree backend.

use alloc::string::String;

/// The backend's best single-type classification of a node's value(s).
///
/// A struct node is always [`Composite`]; a list node is the common scalar
/// type of its elements when they are homogeneous and the list is non-empty,
/// otherwise [`Composite`].
///
/// [`Composite`]: CanonicalType::Composite
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalType {
    Unknown,
    Bool,
    Int32,
    Int64,
    Float,
    String,
    Composite,
}

/// A borrowed scalar value in one of the wire-level JSON shapes.
///
/// `Int`, `Uint` and `Float` mirror how the scanner classifies numbers:
/// integral values that fit `i64`, positive integral values that only fit
/// `u64`, and everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
}

impl Scalar<'_> {
    #[must_use]
    pub fn canonical_type(&self) -> CanonicalType {
        match *self {
            Scalar::Null => CanonicalType::Unknown,
            Scalar::Bool(_) => CanonicalType::Bool,
            Scalar::Int(i) => {
                if i32::try_from(i).is_ok() {
                    CanonicalType::Int32
                } else {
                    CanonicalType::Int64
                }
            }
            Scalar::Uint(u) => {
                if i32::try_from(u).is_ok() {
                    CanonicalType::Int32
                } else if i64::try_from(u).is_ok() {
                    CanonicalType::Int64
                } else {
                    CanonicalType::Float
                }
            }
            Scalar::Float(_) => CanonicalType::Float,
            Scalar::Str(_) => CanonicalType::String,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Uint(_) | Scalar::Float(_))
    }
}

/// Owning counterpart of [`Scalar`], as stored in a materialized document.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedScalar {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

impl OwnedScalar {
    #[must_use]
    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            OwnedScalar::Null => Scalar::Null,
            OwnedScalar::Bool(b) => Scalar::Bool(*b),
            OwnedScalar::Int(i) => Scalar::Int(*i),
            OwnedScalar::Uint(u) => Scalar::Uint(*u),
            OwnedScalar::Float(f) => Scalar::Float(*f),
            OwnedScalar::Str(s) => Scalar::Str(s),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            OwnedScalar::Int(_) | OwnedScalar::Uint(_) | OwnedScalar::Float(_)
        )
    }
}

/// Joins two element classifications into a list's common scalar type.
///
/// Integer widths widen (`Int32 ∨ Int64 = Int64`), integers widen to `Float`,
/// and any other mixture has no common type. `Unknown` (null elements) and
/// `Composite` never join.
pub(crate) fn join_canonical(a: CanonicalType, b: CanonicalType) -> Option<CanonicalType> {
    use CanonicalType::{Composite, Float, Int32, Int64, Unknown};

    if matches!(a, Unknown | Composite) || matches!(b, Unknown | Composite) {
        return None;
    }
    if a == b {
        return Some(a);
    }
    match (a, b) {
        (Int32, Int64) | (Int64, Int32) => Some(Int64),
        (Int32 | Int64, Float) | (Float, Int32 | Int64) => Some(Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_classification() {
        assert_eq!(Scalar::Null.canonical_type(), CanonicalType::Unknown);
        assert_eq!(Scalar::Bool(true).canonical_type(), CanonicalType::Bool);
        assert_eq!(Scalar::Int(42).canonical_type(), CanonicalType::Int32);
        assert_eq!(
            Scalar::Int(i64::from(i32::MAX) + 1).canonical_type(),
            CanonicalType::Int64
        );
        assert_eq!(Scalar::Uint(7).canonical_type(), CanonicalType::Int32);
        assert_eq!(Scalar::Uint(u64::MAX).canonical_type(), CanonicalType::Float);
        assert_eq!(Scalar::Float(1.5).canonical_type(), CanonicalType::Float);
        assert_eq!(Scalar::Str("x").canonical_type(), CanonicalType::String);
    }

    #[test]
    fn join_widens_numerics() {
        assert_eq!(
            join_canonical(CanonicalType::Int32, CanonicalType::Int64),
            Some(CanonicalType::Int64)
        );
        assert_eq!(
            join_canonical(CanonicalType::Int64, CanonicalType::Float),
            Some(CanonicalType::Float)
        );
        assert_eq!(
            join_canonical(CanonicalType::Bool, CanonicalType::Int32),
            None
        );
        assert_eq!(
            join_canonical(CanonicalType::Unknown, CanonicalType::Unknown),
            None
        );
    }
}
