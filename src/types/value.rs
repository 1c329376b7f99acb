//! # Runtime Value Representation
//!
//! This module provides `Value<'a>`, the runtime representation for scalar SQL
//! values inside the expression core. Text and blob variants use `Cow` so
//! ascending-order decode can borrow directly from the encoded cell while
//! descending-order decode (which must un-invert the bytes) returns owned
//! data.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Description |
//! |---------|-----------|-------------|
//! | Null | - | SQL NULL (encodes as zero length) |
//! | Int | i64 | Int2/Int4/Int8 family |
//! | Float | f64 | Float4/Float8 family |
//! | Decimal | Decimal | exact fixed-point numeric |
//! | Timestamp | Timestamp | epoch millis + sub-ms nanos |
//! | Text | Cow<str> | UTF-8 string |
//! | Blob | Cow<[u8]> | binary data |
//!
//! ## Comparison Semantics
//!
//! - NULL compared to anything returns None (SQL UNKNOWN)
//! - Within the numeric family, mixed-type comparison goes through the exact
//!   decimal intermediate, so `Int(1)` equals `Decimal(1.0)` equals
//!   `Float(1.0)`
//! - NaN compared to any number returns None
//! - Cross-family comparisons (numeric vs text vs blob) return None; ordering
//!   between families is a storage concern, not an expression concern

use super::{DataType, Decimal, Timestamp};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Runtime scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Text(Cow<'a, str>),
    Blob(Cow<'a, [u8]>),
}

impl<'a> Value<'a> {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the natural data type of this value, or None for NULL.
    ///
    /// Integers report Int8 and floats Float8; narrower encodings are chosen
    /// by the expression's declared type, not by the value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int8),
            Value::Float(_) => Some(DataType::Float8),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Text(_) => Some(DataType::Text),
            Value::Blob(_) => Some(DataType::Blob),
        }
    }

    /// Compares two values with SQL NULL semantics.
    /// Returns None if either value is NULL, NaN is involved, or the values
    /// belong to different non-numeric families.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,

            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Value::Blob(a), Value::Blob(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),

            (Value::Float(a), Value::Float(b)) => {
                if a.is_nan() || b.is_nan() {
                    None
                } else {
                    a.partial_cmp(b)
                }
            }

            _ => {
                let a = self.as_decimal()?;
                let b = other.as_decimal()?;
                Some(a.cmp_value(&b))
            }
        }
    }

    /// The exact decimal interpretation of a numeric-family value.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(i) => Some(Decimal::from_i64(*i)),
            Value::Float(f) => Decimal::from_f64(*f).ok(),
            Value::Decimal(d) => Some(*d),
            Value::Timestamp(ts) => Some(ts.to_decimal()),
            _ => None,
        }
    }

    /// Clones this value to a fully-owned static lifetime.
    pub fn to_owned_static(&self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Decimal(d) => Value::Decimal(*d),
            Value::Timestamp(ts) => Value::Timestamp(*ts),
            Value::Text(s) => Value::Text(Cow::Owned(s.to_string())),
            Value::Blob(b) => Value::Blob(Cow::Owned(b.to_vec())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_comparison_is_unknown() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Int(1).compare(&Value::Null), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_mixed_numeric_comparison_is_exact() {
        let int = Value::Int(1);
        let dec = Value::Decimal(Decimal::new(100, 2));
        let float = Value::Float(1.0);
        assert_eq!(int.compare(&dec), Some(Ordering::Equal));
        assert_eq!(dec.compare(&float), Some(Ordering::Equal));
        assert_eq!(Value::Int(2).compare(&dec), Some(Ordering::Greater));
    }

    #[test]
    fn test_nan_comparison_is_unknown() {
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
        assert_eq!(Value::Int(1).compare(&Value::Float(f64::NAN)), None);
    }

    #[test]
    fn test_cross_family_comparison_is_unknown() {
        let text = Value::Text(Cow::Borrowed("1"));
        assert_eq!(Value::Int(1).compare(&text), None);
    }

    #[test]
    fn test_to_owned_static_detaches_borrows() {
        let data = vec![1u8, 2, 3];
        let borrowed = Value::Blob(Cow::Borrowed(data.as_slice()));
        let owned = borrowed.to_owned_static();
        drop(data);
        assert_eq!(owned, Value::Blob(Cow::Owned(vec![1, 2, 3])));
    }
}
