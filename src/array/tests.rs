//! Tests for the array cell format.

use super::*;
use crate::types::codec::encode;
use crate::types::{DataType, SortOrder, Value};

fn int4(v: i64) -> Vec<u8> {
    encode(&Value::Int(v), DataType::Int4, SortOrder::Ascending).unwrap()
}

#[test]
fn fixed_width_array_has_no_offset_table() {
    let mut builder = ArrayBuilder::new(DataType::Int4).unwrap();
    for v in [1, 2, 3] {
        builder.push(&int4(v)).unwrap();
    }
    let cell = builder.build().unwrap();

    assert_eq!(cell.len(), 3 * 4 + TRAILER_SIZE);

    let expected: Vec<u8> = int4(1)
        .into_iter()
        .chain(int4(2))
        .chain(int4(3))
        .collect();
    assert_eq!(&cell[..12], expected.as_slice());
}

#[test]
fn fixed_width_trailer_layout_is_exact() {
    let mut builder = ArrayBuilder::new(DataType::Int4).unwrap();
    for v in [1, 2, 3] {
        builder.push(&int4(v)).unwrap();
    }
    let cell = builder.build().unwrap();

    let trailer = &cell[cell.len() - TRAILER_SIZE..];
    assert_eq!(&trailer[0..4], &3u32.to_le_bytes());
    assert_eq!(&trailer[4..8], &12u32.to_le_bytes());
    assert_eq!(trailer[8], DataType::Int4 as u8);
    assert_eq!(trailer[9], 0);
    assert_eq!(trailer[10], FORMAT_VERSION);
    assert_eq!(trailer[11], 0);
}

#[test]
fn variable_width_layout_is_exact() {
    let mut builder = ArrayBuilder::new(DataType::Text).unwrap();
    builder.push(b"a").unwrap();
    builder.push(b"bb").unwrap();
    builder.push(b"ccc").unwrap();
    let cell = builder.build().unwrap();

    // element bytes, u16 offsets [0, 1, 3], trailer
    let mut expected = b"abbccc".to_vec();
    for offset in [0u16, 1, 3] {
        expected.extend(offset.to_le_bytes());
    }
    assert_eq!(&cell[..12], expected.as_slice());

    let trailer = &cell[cell.len() - TRAILER_SIZE..];
    assert_eq!(&trailer[0..4], &3u32.to_le_bytes());
    assert_eq!(&trailer[4..8], &6u32.to_le_bytes());
    assert_eq!(trailer[8], DataType::Text as u8);
    assert_eq!(trailer[9], flags::HAS_OFFSETS);
    assert_eq!(trailer[10], FORMAT_VERSION);
}

#[test]
fn view_round_trips_fixed_width_elements() {
    for n in [0usize, 1, 7, 64, 1000] {
        let mut builder = ArrayBuilder::with_capacity(DataType::Int8, n).unwrap();
        for i in 0..n {
            let bytes = encode(
                &Value::Int(i as i64 * 3 - 5),
                DataType::Int8,
                SortOrder::Ascending,
            )
            .unwrap();
            builder.push(&bytes).unwrap();
        }
        let cell = builder.build().unwrap();
        let view = ArrayView::new(&cell).unwrap();

        assert_eq!(view.len(), n);
        assert_eq!(view.elem_type(), DataType::Int8);
        for i in 0..n {
            let expected = encode(
                &Value::Int(i as i64 * 3 - 5),
                DataType::Int8,
                SortOrder::Ascending,
            )
            .unwrap();
            assert_eq!(view.element(i).unwrap(), expected.as_slice());
        }
    }
}

#[test]
fn view_round_trips_variable_width_elements() {
    for n in [0usize, 1, 7, 64, 1000] {
        let elements: Vec<String> = (0..n).map(|i| "x".repeat(i % 13)).collect();
        let mut builder = ArrayBuilder::with_capacity(DataType::Text, n).unwrap();
        for e in &elements {
            builder.push(e.as_bytes()).unwrap();
        }
        let cell = builder.build().unwrap();
        let view = ArrayView::new(&cell).unwrap();

        assert_eq!(view.len(), n);
        for (i, e) in elements.iter().enumerate() {
            assert_eq!(view.element(i).unwrap(), e.as_bytes());
        }
    }
}

#[test]
fn offsets_are_monotonic_and_start_at_zero() {
    let lengths = [1usize, 4, 0, 2, 9];
    let mut builder = ArrayBuilder::new(DataType::Blob).unwrap();
    for len in lengths {
        builder.push(&vec![0xAB; len]).unwrap();
    }
    let cell = builder.build().unwrap();
    let view = ArrayView::new(&cell).unwrap();

    let mut start = 0usize;
    for (i, len) in lengths.iter().enumerate() {
        let element = view.element(i).unwrap();
        assert_eq!(element.len(), *len);
        // element i begins exactly where the previous ended
        let data_start = cell.as_ptr() as usize;
        if !element.is_empty() {
            assert_eq!(element.as_ptr() as usize - data_start, start);
        }
        start += len;
    }
}

#[test]
fn null_elements_are_zero_length() {
    let mut builder = ArrayBuilder::new(DataType::Text).unwrap();
    builder.push(b"one").unwrap();
    builder.push_null();
    builder.push(b"three").unwrap();
    let cell = builder.build().unwrap();
    let view = ArrayView::new(&cell).unwrap();

    assert_eq!(view.element(0).unwrap(), b"one");
    assert_eq!(view.element(1).unwrap(), b"");
    assert_eq!(view.element(2).unwrap(), b"three");
}

#[test]
fn all_null_arrays_keep_their_count() {
    for elem_type in [DataType::Int4, DataType::Text] {
        let mut builder = ArrayBuilder::new(elem_type).unwrap();
        for _ in 0..4 {
            builder.push_null();
        }
        let cell = builder.build().unwrap();
        let view = ArrayView::new(&cell).unwrap();

        assert_eq!(view.len(), 4);
        for i in 0..4 {
            assert_eq!(view.element(i).unwrap(), b"", "{:?}", elem_type);
        }
    }
}

#[test]
fn wide_offsets_kick_in_past_64k_of_data() {
    let big = vec![7u8; 40_000];
    let mut builder = ArrayBuilder::new(DataType::Blob).unwrap();
    builder.push(&big).unwrap();
    builder.push(&big).unwrap();
    let cell = builder.build().unwrap();

    let trailer = &cell[cell.len() - TRAILER_SIZE..];
    assert_eq!(trailer[9], flags::HAS_OFFSETS | flags::WIDE_OFFSETS);
    assert_eq!(cell.len(), 80_000 + 2 * 4 + TRAILER_SIZE);

    let view = ArrayView::new(&cell).unwrap();
    assert_eq!(view.element(1).unwrap(), big.as_slice());
}

#[test]
fn builder_rejects_wrong_fixed_width() {
    let mut builder = ArrayBuilder::new(DataType::Int4).unwrap();
    let err = builder.push(&[1, 2, 3]).unwrap_err();
    assert!(err.to_string().contains("width"));
}

#[test]
fn builder_rejects_nested_arrays() {
    assert!(ArrayBuilder::new(DataType::Int4Array).is_err());
}

#[test]
fn builder_reset_clears_state() {
    let mut builder = ArrayBuilder::new(DataType::Text).unwrap();
    builder.push(b"stale").unwrap();
    builder.reset();
    builder.push(b"fresh").unwrap();
    let cell = builder.build().unwrap();
    let view = ArrayView::new(&cell).unwrap();

    assert_eq!(view.len(), 1);
    assert_eq!(view.element(0).unwrap(), b"fresh");
}

#[test]
fn view_rejects_truncated_cells() {
    let err = ArrayView::new(&[0u8; 5]).unwrap_err();
    assert!(err.to_string().contains("too short"));
}

#[test]
fn view_rejects_unknown_version() {
    let mut builder = ArrayBuilder::new(DataType::Int4).unwrap();
    builder.push(&int4(1)).unwrap();
    let mut cell = builder.build().unwrap();
    let version_at = cell.len() - 2;
    cell[version_at] = 99;
    let err = ArrayView::new(&cell).unwrap_err();
    assert!(err.to_string().contains("version"));
}

#[test]
fn view_rejects_size_mismatch() {
    let mut builder = ArrayBuilder::new(DataType::Text).unwrap();
    builder.push(b"abc").unwrap();
    let mut cell = builder.build().unwrap();
    cell.insert(0, 0); // extra byte ahead of the element region
    let err = ArrayView::new(&cell).unwrap_err();
    assert!(err.to_string().contains("size mismatch"));
}

#[test]
fn estimate_size_is_exact_for_fixed_width() {
    for n in [0usize, 1, 5, 100] {
        let mut builder = ArrayBuilder::with_capacity(DataType::Int8, n).unwrap();
        for i in 0..n {
            builder
                .push(&encode(&Value::Int(i as i64), DataType::Int8, SortOrder::Ascending).unwrap())
                .unwrap();
        }
        let cell = builder.build().unwrap();
        assert_eq!(cell.len(), estimate_size(n, DataType::Int8));
    }
}

#[test]
fn estimate_size_never_underestimates_offsets() {
    // The variable-width estimate must at least cover the offset table and
    // trailer even for empty elements.
    let n = 50;
    let mut builder = ArrayBuilder::with_capacity(DataType::Text, n).unwrap();
    for _ in 0..n {
        builder.push(b"").unwrap();
    }
    let cell = builder.build().unwrap();
    assert!(cell.len() <= estimate_size(n, DataType::Text));
}
