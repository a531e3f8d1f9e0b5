//! Benchmarks for the value algebra.
//!
//! Tests throughput of the operations an interpreter issues per instruction:
//! - Concrete arithmetic (folded immediately)
//! - Symbolic arithmetic (simplified on construction)
//! - Bit slicing and re-assembly of registers
//! - Merging of diverging states

extern crate concolic_sym;

use std::{collections::HashSet, hint::black_box};

use concolic_sym::{
    symbolic::{algebra, merge_values, SymValue, SymbolFactory},
    PredefinedConstraints,
};
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark a concrete 64-bit add.
fn bench_concrete_add(c: &mut Criterion) {
    let x = SymValue::concrete(0xdead_beef_u64, 64);
    let y = SymValue::concrete(0x1234_5678_u64, 64);

    c.bench_function("algebra_concrete_add", |b| {
        b.iter(|| black_box(algebra::add(black_box(&x), black_box(&y)).unwrap()));
    });
}

/// Benchmark a chain of constant offsets folding into one.
/// Expression: ((rsp + 8) - 16) + 8
fn bench_symbolic_offset_chain(c: &mut Criterion) {
    let rsp = SymValue::symbol("rsp", 64);
    let eight = SymValue::concrete(8u32, 64);
    let sixteen = SymValue::concrete(16u32, 64);

    c.bench_function("algebra_symbolic_offset_chain", |b| {
        b.iter(|| {
            let v = algebra::add(black_box(&rsp), &eight).unwrap();
            let v = algebra::sub(&v, &sixteen).unwrap();
            black_box(algebra::add(&v, &eight).unwrap())
        });
    });
}

/// Benchmark splitting a register into bytes and concatenating them back.
fn bench_byte_split_and_join(c: &mut Criterion) {
    let rax = SymValue::symbol("rax", 64);

    c.bench_function("algebra_byte_split_and_join", |b| {
        b.iter(|| {
            let bytes: Vec<SymValue> = (0..8)
                .rev()
                .map(|i| algebra::extract_bytes(black_box(&rax), i + 1, i).unwrap())
                .collect();
            black_box(algebra::concat(&bytes).unwrap())
        });
    });
}

/// Benchmark a comparison of a sign-extended symbol.
fn bench_sign_extended_compare(c: &mut Criterion) {
    let eax = SymValue::symbol("eax", 32);
    let limit = SymValue::concrete(0x100u32, 64);

    c.bench_function("algebra_sign_extended_compare", |b| {
        b.iter(|| {
            let wide = algebra::sign_extend(black_box(&eax), 32).unwrap();
            black_box(algebra::less(&wide, &limit).unwrap())
        });
    });
}

/// Benchmark merging a register file of 16 entries, half of them diverging.
fn bench_merge_register_file(c: &mut Criterion) {
    let lhs: Vec<SymValue> = (0..16u32).map(|i| SymValue::concrete(i, 64)).collect();
    let rhs: Vec<SymValue> = (0..16u32)
        .map(|i| SymValue::concrete(if i % 2 == 0 { i } else { i + 100 }, 64))
        .collect();
    let fixed = HashSet::new();

    c.bench_function("merge_register_file", |b| {
        b.iter(|| {
            let mut factory = SymbolFactory::new(64);
            for (l, r) in lhs.iter().zip(&rhs) {
                black_box(merge_values(l, r, &fixed, &mut factory));
            }
        });
    });
}

/// Benchmark loading a predefined-constraint file of 200 lines.
fn bench_load_constraints(c: &mut Criterion) {
    let text: String = (0..200)
        .map(|i| format!("func_{}\trax != {i}\n", i % 40))
        .collect();

    c.bench_function("constraints_load_200", |b| {
        b.iter(|| black_box(PredefinedConstraints::parse(black_box(&text)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_concrete_add,
    bench_symbolic_offset_chain,
    bench_byte_split_and_join,
    bench_sign_extended_compare,
    bench_merge_register_file,
    bench_load_constraints
);
criterion_main!(benches);
