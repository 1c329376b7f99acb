//! Rounding expression family: FLOOR, CEIL, and ROUND over decimals.
//!
//! One node kind serves the whole family; the [`RoundingMode`] parameter is
//! the only difference between flooring, ceiling, and half-up rounding. The
//! rounding scale travels as a literal child so serialized trees are
//! self-contained.

use super::{read_children, write_children, Expression, LiteralExpression, Tuple, ValueSlot};
use crate::types::{codec, DataType, RoundingMode, SortOrder, Value, MAX_SCALE};
use eyre::{ensure, Result};

#[derive(Debug)]
pub struct RoundDecimalExpression {
    children: Vec<Expression>,
    mode: RoundingMode,
}

impl RoundDecimalExpression {
    /// Wraps `input` in a rounding node at `scale` decimal digits.
    ///
    /// When the input type already coerces to Int8 the value is integral and
    /// rounding is a no-op, so the input expression is returned unchanged:
    /// no wrapping node is ever constructed around an integral operand.
    pub fn create(input: Expression, scale: i32, mode: RoundingMode) -> Result<Expression> {
        if input.data_type().is_coercible_to(DataType::Int8) {
            return Ok(input);
        }
        ensure!(
            input.data_type().is_coercible_to(DataType::Decimal),
            "cannot round {:?}",
            input.data_type()
        );
        let scale_literal = LiteralExpression::new(
            &Value::Int(scale as i64),
            DataType::Int4,
            SortOrder::Ascending,
        )?;
        let children = vec![input, Expression::Literal(scale_literal)];
        Ok(Expression::RoundDecimal(Self { children, mode }))
    }

    /// FLOOR at scale 0.
    pub fn floor(input: Expression) -> Result<Expression> {
        Self::create(input, 0, RoundingMode::Floor)
    }

    /// CEIL at scale 0.
    pub fn ceiling(input: Expression) -> Result<Expression> {
        Self::create(input, 0, RoundingMode::Ceiling)
    }

    /// ROUND (half-up) at scale 0.
    pub fn round(input: Expression) -> Result<Expression> {
        Self::create(input, 0, RoundingMode::HalfUp)
    }

    fn from_parts(children: Vec<Expression>, mode: RoundingMode) -> Result<Self> {
        ensure!(
            children.len() == 2,
            "rounding expression needs exactly an input and a scale, got {} children",
            children.len()
        );
        ensure!(
            children[0].data_type().is_coercible_to(DataType::Decimal),
            "cannot round {:?}",
            children[0].data_type()
        );
        ensure!(
            children[1].data_type().is_coercible_to(DataType::Int8),
            "rounding scale must be integral, got {:?}",
            children[1].data_type()
        );
        Ok(Self { children, mode })
    }

    pub fn mode(&self) -> RoundingMode {
        self.mode
    }

    pub fn data_type(&self) -> DataType {
        DataType::Decimal
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
        if !self.children[0].evaluate(tuple, slot)? {
            return Ok(false);
        }
        if slot.is_null() {
            return Ok(true);
        }
        let input_type = self.children[0].data_type();
        let input_order = self.children[0].sort_order();
        let value = codec::decode_decimal(slot.bytes(), input_type, input_order)?;

        if !self.children[1].evaluate(tuple, slot)? {
            return Ok(false);
        }
        ensure!(!slot.is_null(), "rounding scale must not be null");
        let scale = codec::decode_long(
            slot.bytes(),
            self.children[1].data_type(),
            self.children[1].sort_order(),
        )?;
        ensure!(
            (-(MAX_SCALE as i64)..=MAX_SCALE as i64).contains(&scale),
            "rounding scale {} out of range",
            scale
        );

        let rounded = value.with_scale(scale as i16, self.mode)?;
        let mut out = Vec::new();
        codec::encode_into(
            &Value::Decimal(rounded),
            DataType::Decimal,
            SortOrder::Ascending,
            &mut out,
        )?;
        slot.set_owned(out);
        Ok(true)
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.mode as u8);
        write_children(&self.children, out)
    }

    pub(crate) fn read_payload(buf: &[u8]) -> Result<(Self, usize)> {
        ensure!(buf.len() >= 1, "truncated rounding expression");
        let mode = RoundingMode::try_from(buf[0])?;
        let (children, used) = read_children(&buf[1..])?;
        Ok((Self::from_parts(children, mode)?, 1 + used))
    }
}
