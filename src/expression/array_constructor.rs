//! ARRAY constructor node.
//!
//! Evaluates its children left to right, streaming each child's encoded
//! bytes into an [`ArrayBuilder`](crate::array::ArrayBuilder) sized up front
//! by [`estimate_size`](crate::array::estimate_size). Offsets accumulate in
//! the same single pass; the offset table and trailer are appended after the
//! last element, so one buffer suffices.
//!
//! ## Resumption
//!
//! On a mutable (streaming) tuple, a child that is not yet available stops
//! the pass: the node records its cursor, keeps the element bytes gathered so
//! far, and returns `false`. A later call resumes at the recorded child
//! rather than restarting. On an immutable tuple an unavailable child is a
//! null element and the pass continues. `reset` must still be called between
//! rows; it clears both the cursor and the accumulated element bytes.

use super::{read_children, write_children, Expression, Tuple, ValueSlot};
use crate::array::ArrayBuilder;
use crate::types::DataType;
use eyre::{ensure, Result};

#[derive(Debug)]
pub struct ArrayConstructorExpression {
    children: Vec<Expression>,
    base_type: DataType,
    result_type: DataType,
    cursor: Option<usize>,
    builder: ArrayBuilder,
}

impl ArrayConstructorExpression {
    /// Builds an ARRAY[..] node over `children` with the declared element
    /// type. Fails fast when a child's type has no coercion path to the base
    /// type, so evaluation never sees a type mismatch.
    pub fn new(children: Vec<Expression>, base_type: DataType) -> Result<Self> {
        let result_type = base_type.array_of()?;
        ensure!(
            children.len() <= u16::MAX as usize,
            "array constructor with {} children exceeds wire limit",
            children.len()
        );
        for child in &children {
            ensure!(
                child.data_type().is_coercible_to(base_type),
                "array element type {:?} is not coercible to base type {:?}",
                child.data_type(),
                base_type
            );
        }
        let builder = ArrayBuilder::with_capacity(base_type, children.len())?;
        Ok(Self {
            children,
            base_type,
            result_type,
            cursor: None,
            builder,
        })
    }

    pub fn base_type(&self) -> DataType {
        self.base_type
    }

    pub fn data_type(&self) -> DataType {
        self.result_type
    }

    pub fn children(&self) -> &[Expression] {
        &self.children
    }

    pub(crate) fn reset(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
        self.cursor = Some(0);
        self.builder.reset();
    }

    pub(crate) fn evaluate(&mut self, tuple: &dyn Tuple, slot: &mut ValueSlot) -> Result<bool> {
        let child_count = self.children.len();
        let start = match self.cursor {
            // Mid-flight resumption: keep the elements gathered so far.
            Some(k) if k < child_count => k,
            // Fresh pass (idle or previously completed): scratch must not
            // carry anything from an earlier row.
            _ => {
                self.builder.reset();
                0
            }
        };
        for i in start..child_count {
            if !self.children[i].evaluate(tuple, slot)? {
                if !tuple.is_immutable() {
                    self.cursor = Some(i);
                    return Ok(false);
                }
                self.builder.push_null();
            } else {
                self.builder.push(slot.bytes())?;
            }
        }
        self.cursor = Some(child_count);
        let cell = self.builder.build()?;
        slot.set_owned(cell);
        Ok(true)
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.base_type as u8);
        write_children(&self.children, out)
    }

    pub(crate) fn read_payload(buf: &[u8]) -> Result<(Self, usize)> {
        ensure!(buf.len() >= 1, "truncated array constructor expression");
        let base_type = DataType::try_from(buf[0])?;
        let (children, used) = read_children(&buf[1..])?;
        Ok((Self::new(children, base_type)?, 1 + used))
    }
}
