//! # SQL Array Binary Format with O(1) Element Access
//!
//! This module provides the binary cell format for SQL ARRAY values. Arrays
//! can contain any scalar type, with O(1) access by direct offset computation
//! for fixed-width element types and O(1) access via an offset table for
//! variable-width types.
//!
//! ## Binary Format (version 1)
//!
//! All metadata trails the element bytes, so an encoder can stream elements
//! left to right into a single buffer and append the offset table and trailer
//! once the last element is known. A reader locates the trailer at the end of
//! the cell and works backwards.
//!
//! ```text
//! +------------------+------------------+-------------------+
//! | Element Bytes    | Offset Table     | Trailer (12 bytes)|
//! | [u8; data_len]   | (variable only)  |                   |
//! +------------------+------------------+-------------------+
//!
//! Trailer Layout:
//!   Bytes 0-3:  Element count (u32 LE)
//!   Bytes 4-7:  Element data length in bytes (u32 LE)
//!   Byte  8:    Element type (DataType tag)
//!   Byte  9:    Flags (bit 0 = has offset table, bit 1 = wide offsets)
//!   Byte 10:    Format version (currently 1)
//!   Byte 11:    Reserved, 0
//! ```
//!
//! ## Fixed-Width Element Layout
//!
//! Fixed-width base types store no offset table; element *i* starts at
//! `i * element_size`, and the serialized size is exactly
//! `count * element_size + 12`. An all-null fixed-width array stores zero
//! element bytes with a non-zero count.
//!
//! ## Variable-Width Element Layout
//!
//! Variable-width base types store one offset per element, relative to the
//! start of the element region:
//!
//! ```text
//! offset[0] == 0
//! offset[i] <= offset[i+1]                  (null elements are zero-length)
//! length of element[i] = offset[i+1] - offset[i]
//! length of the last element = data_len - offset[count-1]
//! ```
//!
//! Offsets are u16 LE while the element data fits in 16 bits, u32 LE
//! otherwise; the width is recorded in the flags byte and is derived
//! deterministically from `data_len`, so encoder and decoder can never
//! disagree.
//!
//! ## Usage Example
//!
//! ```
//! use osprey::array::{ArrayBuilder, ArrayView};
//! use osprey::types::DataType;
//!
//! # fn main() -> eyre::Result<()> {
//! let mut builder = ArrayBuilder::new(DataType::Text)?;
//! builder.push(b"a")?;
//! builder.push_null();
//! builder.push(b"ccc")?;
//! let cell = builder.build()?;
//!
//! let view = ArrayView::new(&cell)?;
//! assert_eq!(view.len(), 3);
//! assert_eq!(view.element(0)?, b"a");
//! assert_eq!(view.element(1)?, b"");
//! assert_eq!(view.element(2)?, b"ccc");
//! # Ok(())
//! # }
//! ```

mod builder;
mod view;

#[cfg(test)]
mod tests;

pub use builder::ArrayBuilder;
pub use view::ArrayView;

use crate::types::DataType;
use eyre::{ensure, Result};

/// Size of the array trailer.
pub const TRAILER_SIZE: usize = 12;

/// Current array format version.
pub const FORMAT_VERSION: u8 = 1;

pub(crate) mod flags {
    /// The cell carries an offset table (variable-width base type).
    pub const HAS_OFFSETS: u8 = 0x01;
    /// Offset entries are u32 rather than u16.
    pub const WIDE_OFFSETS: u8 = 0x02;
}

/// Preallocation guess per variable-width element, offsets excluded.
const VAR_ELEMENT_HINT: usize = 16;

/// Returns true when `data_len` bytes of element data require u32 offsets.
pub(crate) fn wide_offsets(data_len: usize) -> bool {
    data_len > u16::MAX as usize
}

pub(crate) fn offset_entry_size(wide: bool) -> usize {
    if wide {
        4
    } else {
        2
    }
}

/// Upper-bound buffer size for an array of `element_count` elements.
///
/// Exact for fixed-width base types; for variable-width base types this is a
/// preallocation hint that may overestimate but sizes the offset table
/// pessimistically so growth is rare.
pub fn estimate_size(element_count: usize, base: DataType) -> usize {
    match base.fixed_size() {
        Some(width) => TRAILER_SIZE + element_count * width,
        None => TRAILER_SIZE + element_count * (4 + VAR_ELEMENT_HINT),
    }
}

/// Appends the offset table for `element_count` elements to `buf`.
///
/// `offsets` holds each element's start relative to the element region;
/// `data_len` is the total element byte length, used to pick the offset
/// width. Returns the element count written.
pub fn serialize_offsets(
    buf: &mut Vec<u8>,
    element_count: usize,
    data_len: usize,
    offsets: &[u32],
) -> Result<usize> {
    ensure!(
        offsets.len() == element_count,
        "offset table has {} entries for {} elements",
        offsets.len(),
        element_count
    );
    ensure!(
        data_len <= u32::MAX as usize,
        "array data length {} exceeds format limit",
        data_len
    );
    let mut previous = 0u32;
    for &offset in offsets {
        ensure!(
            offset >= previous && offset as usize <= data_len,
            "array offsets must be non-decreasing and within the element region"
        );
        previous = offset;
    }
    if let Some(&first) = offsets.first() {
        ensure!(first == 0, "first array offset must be 0, got {}", first);
    }
    if wide_offsets(data_len) {
        for &offset in offsets {
            buf.extend(offset.to_le_bytes());
        }
    } else {
        for &offset in offsets {
            buf.extend((offset as u16).to_le_bytes());
        }
    }
    Ok(element_count)
}

/// Appends the 12-byte trailer to `buf`.
pub fn serialize_trailer(
    buf: &mut Vec<u8>,
    element_count: usize,
    data_len: usize,
    base: DataType,
) -> Result<()> {
    ensure!(
        element_count <= u32::MAX as usize,
        "array element count {} exceeds format limit",
        element_count
    );
    ensure!(
        data_len <= u32::MAX as usize,
        "array data length {} exceeds format limit",
        data_len
    );
    ensure!(!base.is_array(), "nested arrays are not supported");
    let mut flag_bits = 0u8;
    if base.is_variable() {
        flag_bits |= flags::HAS_OFFSETS;
        if wide_offsets(data_len) {
            flag_bits |= flags::WIDE_OFFSETS;
        }
    }
    buf.extend((element_count as u32).to_le_bytes());
    buf.extend((data_len as u32).to_le_bytes());
    buf.push(base as u8);
    buf.push(flag_bits);
    buf.push(FORMAT_VERSION);
    buf.push(0);
    Ok(())
}
