//! Array codec benchmarks for the Osprey expression core
//!
//! These benchmarks measure array cell encoding and random element access,
//! the hot paths of array-valued expression evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use osprey::array::{ArrayBuilder, ArrayView};
use osprey::types::codec;
use osprey::types::{DataType, SortOrder, Value};

fn build_int_cell(n: usize) -> Vec<u8> {
    let mut builder = ArrayBuilder::with_capacity(DataType::Int8, n).unwrap();
    for i in 0..n {
        let bytes =
            codec::encode(&Value::Int(i as i64), DataType::Int8, SortOrder::Ascending).unwrap();
        builder.push(&bytes).unwrap();
    }
    builder.build().unwrap()
}

fn build_text_cell(n: usize) -> Vec<u8> {
    let mut builder = ArrayBuilder::with_capacity(DataType::Text, n).unwrap();
    for i in 0..n {
        builder.push(format!("element-{i}").as_bytes()).unwrap();
    }
    builder.build().unwrap()
}

fn bench_array_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_encode");

    for n in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("int8", n), &n, |b, &n| {
            b.iter(|| black_box(build_int_cell(n)));
        });
        group.bench_with_input(BenchmarkId::new("text", n), &n, |b, &n| {
            b.iter(|| black_box(build_text_cell(n)));
        });
    }

    group.finish();
}

fn bench_array_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_access");

    let int_cell = build_int_cell(4096);
    group.bench_function("int8_random", |b| {
        let view = ArrayView::new(&int_cell).unwrap();
        let mut i = 0usize;
        b.iter(|| {
            i = (i * 31 + 7) % view.len();
            black_box(view.element(i).unwrap())
        });
    });

    let text_cell = build_text_cell(4096);
    group.bench_function("text_random", |b| {
        let view = ArrayView::new(&text_cell).unwrap();
        let mut i = 0usize;
        b.iter(|| {
            i = (i * 31 + 7) % view.len();
            black_box(view.element(i).unwrap())
        });
    });

    group.finish();
}

fn bench_scalar_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_codec");

    group.bench_function("encode_int8", |b| {
        b.iter(|| {
            black_box(
                codec::encode(&Value::Int(black_box(42)), DataType::Int8, SortOrder::Ascending)
                    .unwrap(),
            )
        });
    });

    let encoded =
        codec::encode(&Value::Int(42), DataType::Int8, SortOrder::Ascending).unwrap();
    group.bench_function("decode_int8", |b| {
        b.iter(|| {
            black_box(codec::decode(black_box(&encoded), DataType::Int8, SortOrder::Ascending))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_array_encode, bench_array_access, bench_scalar_codec);
criterion_main!(benches);
