//! Streaming array construction.
//!
//! `ArrayBuilder` accumulates element bytes and (for variable-width base
//! types) their offsets in a single left-to-right pass; `build` appends the
//! offset table and trailer in one shot. No element is ever re-encoded.

use super::{estimate_size, serialize_offsets, serialize_trailer, TRAILER_SIZE};
use crate::types::DataType;
use eyre::{bail, ensure, Result};

#[derive(Debug)]
pub struct ArrayBuilder {
    elem_type: DataType,
    data: Vec<u8>,
    offsets: Vec<u32>,
    count: usize,
}

impl ArrayBuilder {
    pub fn new(elem_type: DataType) -> Result<Self> {
        Self::with_capacity(elem_type, 0)
    }

    /// Creates a builder preallocated for `element_count` elements using
    /// [`estimate_size`].
    pub fn with_capacity(elem_type: DataType, element_count: usize) -> Result<Self> {
        ensure!(
            !elem_type.is_array(),
            "nested arrays are not supported: {:?}",
            elem_type
        );
        let estimate = estimate_size(element_count, elem_type);
        Ok(Self {
            elem_type,
            data: Vec::with_capacity(estimate.saturating_sub(TRAILER_SIZE)),
            offsets: Vec::with_capacity(if elem_type.is_variable() {
                element_count
            } else {
                0
            }),
            count: 0,
        })
    }

    pub fn elem_type(&self) -> DataType {
        self.elem_type
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total element bytes accumulated so far.
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Appends one element's encoded bytes. A zero-length element is a null.
    ///
    /// Fixed-width base types accept exactly their width or zero bytes;
    /// anything else is a caller bug surfaced as an error.
    pub fn push(&mut self, element: &[u8]) -> Result<()> {
        if let Some(width) = self.elem_type.fixed_size() {
            if !element.is_empty() && element.len() != width {
                bail!(
                    "element of {} bytes pushed into a {:?} array (width {})",
                    element.len(),
                    self.elem_type,
                    width
                );
            }
        }
        ensure!(
            self.data.len() + element.len() <= u32::MAX as usize,
            "array data length exceeds format limit"
        );
        if self.elem_type.is_variable() {
            self.offsets.push(self.data.len() as u32);
        }
        self.data.extend_from_slice(element);
        self.count += 1;
        Ok(())
    }

    /// Appends a null element: zero bytes, offset equal to the next start.
    pub fn push_null(&mut self) {
        if self.elem_type.is_variable() {
            self.offsets.push(self.data.len() as u32);
        }
        self.count += 1;
    }

    /// Serializes the accumulated elements into a finished cell.
    ///
    /// The builder is left untouched, so a cell can be built again or more
    /// elements appended afterwards.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(
            self.data.len() + self.offsets.len() * 4 + TRAILER_SIZE,
        );
        out.extend_from_slice(&self.data);
        if self.elem_type.is_variable() {
            serialize_offsets(&mut out, self.count, self.data.len(), &self.offsets)?;
        }
        serialize_trailer(&mut out, self.count, self.data.len(), self.elem_type)?;
        Ok(out)
    }

    /// Clears all accumulated state, keeping allocations.
    pub fn reset(&mut self) {
        self.data.clear();
        self.offsets.clear();
        self.count = 0;
    }
}
