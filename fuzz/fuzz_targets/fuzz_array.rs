//! Fuzz testing for the array cell format.
//!
//! Builds arrays from arbitrary element sequences and reads every element
//! back through ArrayView, then feeds the view arbitrary raw bytes to check
//! that trailer validation never panics.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use osprey::array::{ArrayBuilder, ArrayView};
use osprey::types::codec;
use osprey::types::{DataType, SortOrder, Value};

#[derive(Debug, Arbitrary)]
struct ArrayInput {
    element_type: FuzzElemType,
    operations: Vec<ArrayOperation>,
    raw: Vec<u8>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzElemType {
    Int2,
    Int4,
    Int8,
    Float8,
    Text,
    Blob,
}

#[derive(Debug, Arbitrary)]
enum ArrayOperation {
    PushNull,
    PushInt(i64),
    PushFloat(f64),
    PushText(String),
    PushBlob(Vec<u8>),
}

impl From<FuzzElemType> for DataType {
    fn from(fdt: FuzzElemType) -> Self {
        match fdt {
            FuzzElemType::Int2 => DataType::Int2,
            FuzzElemType::Int4 => DataType::Int4,
            FuzzElemType::Int8 => DataType::Int8,
            FuzzElemType::Float8 => DataType::Float8,
            FuzzElemType::Text => DataType::Text,
            FuzzElemType::Blob => DataType::Blob,
        }
    }
}

fn encode_for(op: &ArrayOperation, elem_type: DataType) -> Option<Vec<u8>> {
    let value = match (op, elem_type) {
        (ArrayOperation::PushInt(v), DataType::Int2) => Value::Int(*v as i16 as i64),
        (ArrayOperation::PushInt(v), DataType::Int4) => Value::Int(*v as i32 as i64),
        (ArrayOperation::PushInt(v), DataType::Int8) => Value::Int(*v),
        (ArrayOperation::PushFloat(v), DataType::Float8) => Value::Float(*v),
        (ArrayOperation::PushText(s), DataType::Text) if s.len() <= 1024 => {
            Value::Text(s.as_str().into())
        }
        (ArrayOperation::PushBlob(b), DataType::Blob) if b.len() <= 1024 => {
            Value::Blob(b.as_slice().into())
        }
        _ => return None,
    };
    codec::encode(&value, elem_type, SortOrder::Ascending).ok()
}

fuzz_target!(|input: ArrayInput| {
    if input.operations.len() > 1000 {
        return;
    }

    let elem_type: DataType = input.element_type.into();
    let mut builder = ArrayBuilder::new(elem_type).unwrap();
    let mut pushed = 0usize;

    for op in &input.operations {
        match op {
            ArrayOperation::PushNull => {
                builder.push_null();
                pushed += 1;
            }
            other => {
                if let Some(bytes) = encode_for(other, elem_type) {
                    builder.push(&bytes).unwrap();
                    pushed += 1;
                }
            }
        }
    }

    let cell = builder.build().unwrap();
    if let Ok(view) = ArrayView::new(&cell) {
        assert_eq!(view.len(), pushed);
        assert_eq!(view.elem_type(), elem_type);
        for i in 0..view.len() {
            if let Ok(element) = view.element(i) {
                let _ = codec::decode(element, elem_type, SortOrder::Ascending);
            }
        }
    }

    // Arbitrary bytes must never panic the trailer validation.
    if let Ok(view) = ArrayView::new(&input.raw) {
        for i in 0..view.len().min(64) {
            let _ = view.element(i);
        }
    }
});
