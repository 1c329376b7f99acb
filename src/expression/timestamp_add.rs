//! Timestamp addition with numeric coercion.
//!
//! Every operand is converted to the exact decimal intermediate before
//! summing:
//!
//! - a Timestamp operand contributes its millisecond value with the
//!   sub-millisecond fraction intact
//! - any decimal-coercible operand (integers, floats, decimal) is a day
//!   count: value × 86,400,000 ms, rescaled to 6 decimal digits half-up
//!
//! The sum converts back to a Timestamp, so `ts + 1` advances one day and
//! `ts + 0.5` half a day, to the nanosecond.

use super::{read_children, write_children, Expression, Tuple, ValueSlot};
use crate::types::{codec, DataType, Decimal, RoundingMode, SortOrder, Timestamp, Value};
use eyre::{ensure, Result};

/// Milliseconds in a day; the scale factor for day-valued operands.
pub const MILLIS_IN_DAY: i64 = 86_400_000;

#[derive(Debug)]
pub struct TimestampAddExpression {
    children: Vec<Expression>,
}

impl TimestampAddExpression {
    /// Builds an n-ary addition node. Operand types are checked here: a type
    /// that is neither Timestamp nor decimal-coercible has no legal place in
    /// timestamp arithmetic and fails construction, never evaluation.
    pub fn new(children: Vec<Expression>) -> Result<Self> {
        ensure!(
            children.len() >= 2,
            "timestamp addition needs at least two operands, got {}",
            children.len()
        );
        for child in &children {
            let data_type = child.data_type();
            ensure!(
                data_type == DataType::Timestamp || data_type.is_coercible_to(DataType::Decimal),
                "cannot use {:?} in timestamp arithmetic",
                data_type
            );
        }
        Ok(Self { children })
    }

    pub fn data_type(&self) -> DataType {
        DataType::Timestamp
    }

    pub fn children(&self) -> &[Expression] {
        &self.children
    }

    pub(crate) fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
    }

    pub(crate) fn evaluate(&mut self, tuple: &dyn Tuple, slot: &mut ValueSlot) -> Result<bool> {
        let mut sum = Decimal::ZERO;
        for i in 0..self.children.len() {
            if !self.children[i].evaluate(tuple, slot)? {
                return Ok(false);
            }
            // A null operand nulls the whole sum; the empty slot is already
            // the encoded result.
            if slot.is_null() {
                return Ok(true);
            }
            let data_type = self.children[i].data_type();
            let order = self.children[i].sort_order();
            let operand = codec::decode_decimal(slot.bytes(), data_type, order)?;
            let term = if data_type == DataType::Timestamp {
                operand
            } else {
                operand
                    .checked_mul_i64(MILLIS_IN_DAY)?
                    .with_scale(6, RoundingMode::HalfUp)?
            };
            sum = sum.checked_add(&term)?;
        }
        let result = Timestamp::from_decimal_millis(&sum)?;
        let mut out = Vec::with_capacity(12);
        codec::encode_into(
            &Value::Timestamp(result),
            DataType::Timestamp,
            SortOrder::Ascending,
            &mut out,
        )?;
        slot.set_owned(out);
        Ok(true)
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        write_children(&self.children, out)
    }

    pub(crate) fn read_payload(buf: &[u8]) -> Result<(Self, usize)> {
        let (children, used) = read_children(buf)?;
        Ok((Self::new(children)?, used))
    }
}
