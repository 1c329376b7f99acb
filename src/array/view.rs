//! Zero-copy array cell reading.

use super::{flags, offset_entry_size, FORMAT_VERSION, TRAILER_SIZE};
use crate::types::DataType;
use eyre::{bail, ensure, Result};

/// Borrowed view over a serialized array cell with O(1) element access.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a> {
    data: &'a [u8],
    count: usize,
    data_len: usize,
    elem_type: DataType,
    wide: bool,
}

impl<'a> ArrayView<'a> {
    /// Validates the trailer and overall cell geometry.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() >= TRAILER_SIZE,
            "array cell too short: {} bytes, need at least {}",
            data.len(),
            TRAILER_SIZE
        );
        let trailer = &data[data.len() - TRAILER_SIZE..];
        let version = trailer[10];
        ensure!(
            version == FORMAT_VERSION,
            "unsupported array format version: {}",
            version
        );
        let count = u32::from_le_bytes(trailer[0..4].try_into().unwrap()) as usize;
        let data_len = u32::from_le_bytes(trailer[4..8].try_into().unwrap()) as usize;
        let elem_type = DataType::try_from(trailer[8])?;
        let flag_bits = trailer[9];
        let has_offsets = flag_bits & flags::HAS_OFFSETS != 0;
        ensure!(
            has_offsets == elem_type.is_variable(),
            "array flags disagree with element type {:?}",
            elem_type
        );
        let wide = flag_bits & flags::WIDE_OFFSETS != 0;
        let offsets_len = if has_offsets {
            count * offset_entry_size(wide)
        } else {
            0
        };
        ensure!(
            data.len() == data_len + offsets_len + TRAILER_SIZE,
            "array cell size mismatch: {} bytes, trailer claims {}",
            data.len(),
            data_len + offsets_len + TRAILER_SIZE
        );
        if let Some(width) = elem_type.fixed_size() {
            ensure!(
                data_len == count * width || data_len == 0,
                "fixed-width array data of {} bytes for {} elements of width {}",
                data_len,
                count,
                width
            );
        }
        Ok(Self {
            data,
            count,
            data_len,
            elem_type,
            wide,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn elem_type(&self) -> DataType {
        self.elem_type
    }

    pub fn is_variable(&self) -> bool {
        self.elem_type.is_variable()
    }

    fn read_offset(&self, idx: usize) -> usize {
        let entry = offset_entry_size(self.wide);
        let pos = self.data_len + idx * entry;
        if self.wide {
            u32::from_le_bytes(self.data[pos..pos + 4].try_into().unwrap()) as usize
        } else {
            u16::from_le_bytes(self.data[pos..pos + 2].try_into().unwrap()) as usize
        }
    }

    /// Returns element `idx`'s encoded bytes. Zero length means null.
    pub fn element(&self, idx: usize) -> Result<&'a [u8]> {
        ensure!(
            idx < self.count,
            "array index {} out of bounds (len={})",
            idx,
            self.count
        );
        match self.elem_type.fixed_size() {
            Some(width) => {
                // An all-null fixed-width array stores no element bytes.
                if self.data_len == 0 {
                    return Ok(&[]);
                }
                let start = idx * width;
                Ok(&self.data[start..start + width])
            }
            None => {
                let start = self.read_offset(idx);
                let end = if idx + 1 < self.count {
                    self.read_offset(idx + 1)
                } else {
                    self.data_len
                };
                if start > end || end > self.data_len {
                    bail!(
                        "corrupt array offsets: element {} spans {}..{} of {}",
                        idx,
                        start,
                        end,
                        self.data_len
                    );
                }
                Ok(&self.data[start..end])
            }
        }
    }
}
