//! # Expression Trees
//!
//! This module provides the evaluable expression tree: a closed set of node
//! kinds dispatched by pattern matching. A tree is built by the planner
//! (outside this crate), optionally serialized and shipped to a remote
//! row-evaluation site, and evaluated against one [`Tuple`] at a time.
//!
//! ## Node Kinds
//!
//! | Kind | Wire tag | Result type |
//! |------|----------|-------------|
//! | Literal | 1 | declared |
//! | Column | 2 | declared |
//! | ArrayConstructor | 3 | array of base |
//! | TimestampAdd | 4 | Timestamp |
//! | RoundDecimal | 5 | Decimal |
//!
//! ## Evaluation Contract
//!
//! `evaluate(tuple, slot)` returns:
//!
//! - `Ok(true)`: the encoded result is in the slot; zero length is NULL
//! - `Ok(false)` with a mutable tuple: a child was not yet available; partial
//!   progress is retained and a later call resumes
//! - `Ok(false)` with an immutable tuple: the value is absent for this row
//! - `Err(_)`: an encoding/decoding failure; aborts this row only
//!
//! A node's result type depends only on its kind and its children's types,
//! never on evaluated data. Type mismatches are rejected when a node is
//! constructed (or deserialized), so they cannot surface mid-evaluation.
//!
//! ## Per-Node State Machine
//!
//! Nodes that support resumption carry an explicit cursor:
//!
//! ```text
//! Idle (no cursor) ──evaluate, immutable tuple or full success──> Idle/Resolved
//! Idle ──child k unavailable on a mutable tuple──> Partial (cursor = k)
//! Partial ──evaluate──> resumes at child k
//! any ──full success──> Resolved (cursor = child count)
//! Resolved ──evaluate──> fresh pass (idempotent re-evaluation)
//! any ──reset()──> cursor = 0, scratch cleared
//! ```
//!
//! `reset()` must be called between rows when a node is reused; it clears the
//! cursor and any accumulated scratch recursively.
//!
//! ## Wire Format
//!
//! Self-describing, kind tag first, so a heterogeneous tree reconstructs
//! without external schema:
//!
//! ```text
//! node     := tag:u8 payload
//! children := count:u16 LE node*
//! Literal  := type:u8 order:u8 len:u32 LE bytes
//! Column   := index:u32 LE type:u8 order:u8
//! ArrayConstructor := base:u8 children
//! TimestampAdd     := children
//! RoundDecimal     := mode:u8 children
//! ```
//!
//! Tags, type ordinals, and rounding modes are explicit `#[repr(u8)]`
//! discriminants: a versioned table, not declaration order. Deserialization
//! re-runs construction-time validation, so a corrupt tree is rejected
//! before it can evaluate.

mod array_constructor;
mod column;
mod literal;
mod round;
mod slot;
mod timestamp_add;
mod tuple;


pub use array_constructor::ArrayConstructorExpression;
pub use column::ColumnExpression;
pub use literal::LiteralExpression;
pub use round::RoundDecimalExpression;
pub use slot::ValueSlot;
pub use timestamp_add::{TimestampAddExpression, MILLIS_IN_DAY};
pub use tuple::{RowTuple, StreamingTuple, Tuple};

use crate::types::{DataType, SortOrder};
use eyre::{bail, ensure, Result};
use log::trace;

/// Wire tags for expression kinds. Append-only; never reorder.
mod kind_tag {
    pub const LITERAL: u8 = 1;
    pub const COLUMN: u8 = 2;
    pub const ARRAY_CONSTRUCTOR: u8 = 3;
    pub const TIMESTAMP_ADD: u8 = 4;
    pub const ROUND_DECIMAL: u8 = 5;
}

/// One node of an evaluable expression tree.
///
/// A node owns its children; children are never shared across trees. A
/// single node's cursor state is not safe for concurrent use; evaluate one
/// tree against one row per thread and `reset()` (or discard) between rows.
#[derive(Debug)]
pub enum Expression {
    Literal(LiteralExpression),
    Column(ColumnExpression),
    ArrayConstructor(ArrayConstructorExpression),
    TimestampAdd(TimestampAddExpression),
    RoundDecimal(RoundDecimalExpression),
}

impl Expression {
    /// Evaluates this node against `tuple`, writing the encoded result into
    /// `slot`. See the module docs for the full return-value contract.
    pub fn evaluate(&mut self, tuple: &dyn Tuple, slot: &mut ValueSlot) -> Result<bool> {
        match self {
            Expression::Literal(e) => Ok(e.evaluate(slot)),
            Expression::Column(e) => Ok(e.evaluate(tuple, slot)),
            Expression::ArrayConstructor(e) => e.evaluate(tuple, slot),
            Expression::TimestampAdd(e) => e.evaluate(tuple, slot),
            Expression::RoundDecimal(e) => e.evaluate(tuple, slot),
        }
    }

    /// The statically known result type of this node.
    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(e) => e.data_type(),
            Expression::Column(e) => e.data_type(),
            Expression::ArrayConstructor(e) => e.data_type(),
            Expression::TimestampAdd(e) => e.data_type(),
            Expression::RoundDecimal(e) => e.data_type(),
        }
    }

    /// The sort order of this node's encoded result.
    pub fn sort_order(&self) -> SortOrder {
        match self {
            Expression::Literal(e) => e.sort_order(),
            Expression::Column(e) => e.sort_order(),
            _ => SortOrder::Ascending,
        }
    }

    /// This node's children, in evaluation order.
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::Literal(_) | Expression::Column(_) => &[],
            Expression::ArrayConstructor(e) => e.children(),
            Expression::TimestampAdd(e) => e.children(),
            Expression::RoundDecimal(e) => e.children(),
        }
    }

    /// Clears accumulated partial state, recursively. Call before reusing a
    /// tree across independent rows.
    pub fn reset(&mut self) {
        match self {
            Expression::Literal(_) | Expression::Column(_) => {}
            Expression::ArrayConstructor(e) => e.reset(),
            Expression::TimestampAdd(e) => e.reset(),
            Expression::RoundDecimal(e) => e.reset(),
        }
    }

    /// Serializes this node and its children into `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Expression::Literal(e) => {
                out.push(kind_tag::LITERAL);
                e.write_payload(out)
            }
            Expression::Column(e) => {
                out.push(kind_tag::COLUMN);
                e.write_payload(out)
            }
            Expression::ArrayConstructor(e) => {
                out.push(kind_tag::ARRAY_CONSTRUCTOR);
                e.write_payload(out)
            }
            Expression::TimestampAdd(e) => {
                out.push(kind_tag::TIMESTAMP_ADD);
                e.write_payload(out)
            }
            Expression::RoundDecimal(e) => {
                out.push(kind_tag::ROUND_DECIMAL);
                e.write_payload(out)
            }
        }
    }

    /// Reconstructs a node from the front of `buf`; returns the node and the
    /// number of bytes consumed. The reconstructed node evaluates
    /// indistinguishably from the original for the same tuple inputs.
    pub fn read_from(buf: &[u8]) -> Result<(Expression, usize)> {
        ensure!(!buf.is_empty(), "truncated expression: missing kind tag");
        let payload = &buf[1..];
        let (expression, used) = match buf[0] {
            kind_tag::LITERAL => {
                let (e, n) = LiteralExpression::read_payload(payload)?;
                (Expression::Literal(e), n)
            }
            kind_tag::COLUMN => {
                let (e, n) = ColumnExpression::read_payload(payload)?;
                (Expression::Column(e), n)
            }
            kind_tag::ARRAY_CONSTRUCTOR => {
                let (e, n) = ArrayConstructorExpression::read_payload(payload)?;
                (Expression::ArrayConstructor(e), n)
            }
            kind_tag::TIMESTAMP_ADD => {
                let (e, n) = TimestampAddExpression::read_payload(payload)?;
                (Expression::TimestampAdd(e), n)
            }
            kind_tag::ROUND_DECIMAL => {
                let (e, n) = RoundDecimalExpression::read_payload(payload)?;
                (Expression::RoundDecimal(e), n)
            }
            tag => bail!("unknown expression kind tag: {}", tag),
        };
        trace!(
            "deserialized {:?} expression, {} bytes",
            expression.data_type(),
            1 + used
        );
        Ok((expression, 1 + used))
    }
}

pub(crate) fn write_children(children: &[Expression], out: &mut Vec<u8>) -> Result<()> {
    ensure!(
        children.len() <= u16::MAX as usize,
        "{} children exceeds wire limit",
        children.len()
    );
    out.extend((children.len() as u16).to_le_bytes());
    for child in children {
        child.write_to(out)?;
    }
    Ok(())
}

pub(crate) fn read_children(buf: &[u8]) -> Result<(Vec<Expression>, usize)> {
    ensure!(buf.len() >= 2, "truncated expression: missing child count");
    let count = u16::from_le_bytes(buf[0..2].try_into().unwrap()) as usize;
    let mut used = 2;
    let mut children = Vec::with_capacity(count);
    for _ in 0..count {
        let (child, n) = Expression::read_from(&buf[used..])?;
        children.push(child);
        used += n;
    }
    Ok((children, used))
}
