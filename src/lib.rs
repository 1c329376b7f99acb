//! # Osprey Expression Core
//!
//! Osprey is a distributed SQL layer over a sorted key-value store. This crate
//! is its expression evaluation and value-encoding engine: the part that takes
//! a tree of SQL expression nodes, evaluates it against a row, and produces a
//! byte-encoded result directly in a caller-supplied buffer.
//!
//! ## Responsibilities
//!
//! - **Value codec**: canonical byte encodings for scalar SQL values, with
//!   deterministic coercion rules across the numeric family (integer, decimal,
//!   double, timestamp)
//! - **Array codec**: a compact binary format for SQL ARRAY cells with O(1)
//!   random element access for both fixed-width and variable-width base types
//! - **Expression trees**: a closed set of evaluable node kinds that can be
//!   serialized, shipped to remote row-evaluation sites, and reconstructed
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │   Expression Tree (expression)         │
//! │   literal · column · array constructor │
//! │   timestamp add · round/floor          │
//! ├────────────────────────────────────────┤
//! │   Array Codec (array)                  │
//! │   element bytes + offsets + trailer    │
//! ├────────────────────────────────────────┤
//! │   Value Codec (types)                  │
//! │   DataType · Value · Decimal · codec   │
//! └────────────────────────────────────────┘
//! ```
//!
//! Evaluation flows through the tree: a node asks each child to evaluate into
//! a shared [`ValueSlot`](expression::ValueSlot), combines the children's
//! encoded bytes, and writes its own encoded result into the same slot for its
//! parent to consume.
//!
//! ## Partial evaluation
//!
//! Rows may arrive incrementally. When a child cannot produce a value yet and
//! the [`Tuple`](expression::Tuple) is still mutable, evaluation returns
//! `Ok(false)` and remembers its position; the caller re-invokes once more row
//! data is available and evaluation resumes where it stopped. On an immutable
//! tuple the same `false` means the value is genuinely absent for this row.
//!
//! ## Quick Start
//!
//! ```
//! use osprey::expression::{Expression, LiteralExpression, RowTuple, ValueSlot};
//! use osprey::types::{DataType, SortOrder, Value};
//!
//! # fn main() -> eyre::Result<()> {
//! let one = LiteralExpression::new(&Value::Int(1), DataType::Int4, SortOrder::Ascending)?;
//! let mut expr = Expression::Literal(one);
//!
//! let tuple = RowTuple::new(vec![]);
//! let mut slot = ValueSlot::new();
//! assert!(expr.evaluate(&tuple, &mut slot)?);
//! assert_eq!(slot.bytes().len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`types`]: data types, runtime values, decimal arithmetic, byte codec
//! - [`array`]: array binary format, builder and zero-copy view
//! - [`expression`]: expression nodes, evaluation, wire serialization

pub mod array;
pub mod expression;
pub mod types;

pub use array::{ArrayBuilder, ArrayView};
pub use expression::{Expression, RowTuple, StreamingTuple, Tuple, ValueSlot};
pub use types::{DataType, Decimal, RoundingMode, SortOrder, Timestamp, Value};
