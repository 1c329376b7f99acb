//! Column reference node: the leaf that reads from the tuple.

use super::{Tuple, ValueSlot};
use crate::types::{DataType, SortOrder};
use eyre::{ensure, Result};

/// Fetches one column's encoded bytes from the row under evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnExpression {
    index: usize,
    data_type: DataType,
    sort_order: SortOrder,
}

impl ColumnExpression {
    pub fn new(index: usize, data_type: DataType, sort_order: SortOrder) -> Self {
        Self {
            index,
            data_type,
            sort_order,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub(crate) fn evaluate(&self, tuple: &dyn Tuple, slot: &mut ValueSlot) -> bool {
        tuple.get(self.index, slot)
    }

    pub(crate) fn write_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        ensure!(
            self.index <= u32::MAX as usize,
            "column index {} exceeds wire limit",
            self.index
        );
        out.extend((self.index as u32).to_le_bytes());
        out.push(self.data_type as u8);
        out.push(self.sort_order as u8);
        Ok(())
    }

    pub(crate) fn read_payload(buf: &[u8]) -> Result<(Self, usize)> {
        ensure!(buf.len() >= 6, "truncated column expression");
        let index = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
        let data_type = DataType::try_from(buf[4])?;
        let sort_order = SortOrder::try_from(buf[5])?;
        Ok((Self::new(index, data_type, sort_order), 6))
    }
}
