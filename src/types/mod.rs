//! # Value Codec
//!
//! The canonical type system and byte codec for Osprey's expression core.
//!
//! ## Module Structure
//!
//! - `data_type`: `DataType` and `SortOrder` with stable wire tags, plus the
//!   coercion partial order
//! - `value`: runtime `Value<'a>` with zero-copy text/blob and SQL comparison
//! - `decimal`: exact fixed-point `Decimal` and `RoundingMode`
//! - `timestamp`: `Timestamp` with a sub-millisecond nanosecond component
//! - `codec`: encode/decode between values and canonical cell bytes
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `DataType` | type discriminant, doubles as the wire tag |
//! | `SortOrder` | ascending vs bit-inverted descending storage |
//! | `Value<'a>` | runtime value (zero-copy from cells) |
//! | `Decimal` | exact numeric intermediate for mixed arithmetic |
//! | `Timestamp` | epoch millis + sub-ms nanos, exact decimal round-trip |

pub mod codec;
mod data_type;
mod decimal;
mod timestamp;
mod value;

pub use data_type::{DataType, SortOrder};
pub use decimal::{Decimal, RoundingMode, MAX_SCALE};
pub use timestamp::Timestamp;
pub use value::Value;
