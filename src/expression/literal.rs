//! Constant expression node.

use super::ValueSlot;
use crate::types::{codec, DataType, SortOrder, Value};
use eyre::{ensure, Result};

/// A constant, held in its canonical encoded form so evaluation is a copy.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpression {
    bytes: Vec<u8>,
    data_type: DataType,
    sort_order: SortOrder,
}

impl LiteralExpression {
    /// Encodes `value` as `data_type` under `sort_order`.
    pub fn new(value: &Value, data_type: DataType, sort_order: SortOrder) -> Result<Self> {
        Ok(Self {
            bytes: codec::encode(value, data_type, sort_order)?,
            data_type,
            sort_order,
        })
    }

    /// A NULL constant of the given type.
    pub fn typed_null(data_type: DataType, sort_order: SortOrder) -> Self {
        Self {
            bytes: Vec::new(),
            data_type,
            sort_order,
        }
    }

    /// Decodes the constant back to a value.
    pub fn value(&self) -> Result<Value<'_>> {
        codec::decode(&self.bytes, self.data_type, self.sort_order)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub(crate) fn evaluate(&self, slot: &mut ValueSlot) -> bool {
        slot.set(&self.bytes);
        true
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        ensure!(
            self.bytes.len() <= u32::MAX as usize,
            "literal of {} bytes exceeds wire limit",
            self.bytes.len()
        );
        out.push(self.data_type as u8);
        out.push(self.sort_order as u8);
        out.extend((self.bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.bytes);
        Ok(())
    }

    pub(crate) fn read_payload(buf: &[u8]) -> Result<(Self, usize)> {
        ensure!(buf.len() >= 6, "truncated literal expression");
        let data_type = DataType::try_from(buf[0])?;
        let sort_order = SortOrder::try_from(buf[1])?;
        let len = u32::from_le_bytes(buf[2..6].try_into().unwrap()) as usize;
        ensure!(buf.len() >= 6 + len, "truncated literal expression");
        Ok((
            Self {
                bytes: buf[6..6 + len].to_vec(),
                data_type,
                sort_order,
            },
            6 + len,
        ))
    }
}
