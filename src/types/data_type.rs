//! # Data Types and Coercion Rules
//!
//! This module provides the canonical `DataType` enum for Osprey's expression
//! core, used across value encoding, array cells, and expression evaluation.
//!
//! ## Design Principles
//!
//! 1. **Single source of truth**: one DataType enum used everywhere
//! 2. **Stable wire tags**: `#[repr(u8)]` with explicit discriminants that are
//!    a versioned serialization contract, never reordered
//! 3. **Total coercion**: `is_coercible_to` is a deterministic partial order
//!    over the numeric family
//!
//! ## Type Categories
//!
//! | Category | Types | Fixed Size |
//! |----------|-------|------------|
//! | **Integer** | Int2, Int4, Int8 | 2, 4, 8 bytes |
//! | **Float** | Float4, Float8 | 4, 8 bytes |
//! | **Date/Time** | Timestamp | 12 bytes |
//! | **Text** | Text | Variable |
//! | **Binary** | Blob | Variable |
//! | **Numeric** | Decimal | Variable |
//! | **Array** | one per scalar base | Variable |
//!
//! ## Discriminant Values
//!
//! Discriminants are grouped by category and double as wire tags:
//!
//! - 1-8: fixed-width scalars
//! - 20-21: variable-length text/binary
//! - 30: decimal
//! - `scalar | 0x80`: the ARRAY type of that scalar
//!
//! The array mapping is deliberately arithmetic so that a scalar tag and its
//! array tag can never drift apart across versions.
//!
//! ## Coercion
//!
//! `is_coercible_to` defines which source types may be re-read as a wider
//! target without loss:
//!
//! ```text
//! Int2 ──> Int4 ──> Int8 ──────┐
//!   │        │                 v
//!   │        └─────> Float8 ─> Decimal
//!   └─────> Float4 ────┘          ^
//! Timestamp (explicit decimal path only, see types::codec)
//! ```
//!
//! Timestamp is excluded from the partial order on purpose: its decimal
//! interpretation (milliseconds with a sub-millisecond fraction) is an
//! arithmetic convention, not a re-encoding, and lives in the codec.

use eyre::bail;

/// Canonical data type enum for the expression core.
///
/// Uses `#[repr(u8)]` with explicit discriminants; the discriminant is the
/// wire tag used by expression serialization and the array trailer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int2 = 1,
    Int4 = 2,
    Int8 = 3,
    Float4 = 4,
    Float8 = 5,
    Timestamp = 8,

    Text = 20,
    Blob = 21,

    Decimal = 30,

    Int2Array = 0x81,
    Int4Array = 0x82,
    Int8Array = 0x83,
    Float4Array = 0x84,
    Float8Array = 0x85,
    TimestampArray = 0x88,
    TextArray = 0x94,
    BlobArray = 0x95,
    DecimalArray = 0x9E,
}

/// Whether a value's bytes are stored ascending or bit-inverted descending.
///
/// A descending column stores `!b` for every encoded byte `b`, so that the
/// key-value store's ascending iteration yields descending logical order. The
/// codec applies the inversion on encode and removes it on decode; zero-length
/// (NULL) encodings are unaffected.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending = 0,
    Descending = 1,
}

impl DataType {
    /// Returns the fixed byte size for this type, or None for variable-length
    /// types.
    ///
    /// Decimal always encodes to 19 bytes today but is classified variable so
    /// that arrays of decimals carry an offset table; this keeps the cell
    /// format stable if the decimal encoding ever grows.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Int2 => Some(2),
            DataType::Int4 => Some(4),
            DataType::Int8 => Some(8),
            DataType::Float4 => Some(4),
            DataType::Float8 => Some(8),
            DataType::Timestamp => Some(12),
            _ => None,
        }
    }

    /// Returns true if this type requires variable-length encoding.
    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }

    /// Returns true if this is an ARRAY type.
    pub fn is_array(&self) -> bool {
        (*self as u8) & 0x80 != 0
    }

    /// Returns the ARRAY type whose elements are this scalar type.
    pub fn array_of(&self) -> eyre::Result<DataType> {
        if self.is_array() {
            bail!("nested arrays are not supported: {:?}", self);
        }
        DataType::try_from(*self as u8 | 0x80)
    }

    /// Returns the element type of an ARRAY type, or None for scalars.
    pub fn element_type(&self) -> Option<DataType> {
        if self.is_array() {
            DataType::try_from(*self as u8 & 0x7F).ok()
        } else {
            None
        }
    }

    /// Returns true if values of this type may be re-read as `target` without
    /// loss. Reflexive; never true across the scalar/array divide.
    pub fn is_coercible_to(&self, target: DataType) -> bool {
        use DataType::*;
        if *self == target {
            return true;
        }
        matches!(
            (*self, target),
            (Int2, Int4 | Int8 | Float4 | Float8 | Decimal)
                | (Int4, Int8 | Float8 | Decimal)
                | (Int8, Decimal)
                | (Float4, Float8 | Decimal)
                | (Float8, Decimal)
        )
    }
}

impl TryFrom<u8> for DataType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DataType::Int2),
            2 => Ok(DataType::Int4),
            3 => Ok(DataType::Int8),
            4 => Ok(DataType::Float4),
            5 => Ok(DataType::Float8),
            8 => Ok(DataType::Timestamp),
            20 => Ok(DataType::Text),
            21 => Ok(DataType::Blob),
            30 => Ok(DataType::Decimal),
            0x81 => Ok(DataType::Int2Array),
            0x82 => Ok(DataType::Int4Array),
            0x83 => Ok(DataType::Int8Array),
            0x84 => Ok(DataType::Float4Array),
            0x85 => Ok(DataType::Float8Array),
            0x88 => Ok(DataType::TimestampArray),
            0x94 => Ok(DataType::TextArray),
            0x95 => Ok(DataType::BlobArray),
            0x9E => Ok(DataType::DecimalArray),
            _ => eyre::bail!("invalid DataType tag: {}", value),
        }
    }
}

impl TryFrom<u8> for SortOrder {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SortOrder::Ascending),
            1 => Ok(SortOrder::Descending),
            _ => eyre::bail!("invalid SortOrder tag: {}", value),
        }
    }
}
