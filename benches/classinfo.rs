//! Benchmarks for class file reading and record construction.
//!
//! - Event walk over a class with many members
//! - Building a standalone record with and without parameter names
//! - Cached repository lookups

#[path = "../src/test/classfile.rs"]
mod classfile;

use std::{hint::black_box, sync::Arc};

use classfile::{ClassFileBuilder, MethodSpec};
use classscope::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn wide_class() -> Vec<u8> {
    let mut builder = ClassFileBuilder::new("bench/Wide").default_constructor();
    for index in 0..64 {
        builder = builder.field(0x0002, &format!("field{index}"), "Ljava/lang/String;");
        builder = builder.method(
            MethodSpec::new(0x0001, &format!("method{index}"), "(IJLjava/lang/String;)V")
                .local("this", "Lbench/Wide;", 0)
                .local("count", "I", 1)
                .local("total", "J", 2)
                .local("label", "Ljava/lang/String;", 4),
        );
    }
    builder.build()
}

/// Walk every event without building anything
fn bench_reader_walk(c: &mut Criterion) {
    let data = wide_class();

    let mut group = c.benchmark_group("reader");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("accept", |b| {
        b.iter(|| {
            let reader = ClassReader::new(black_box(&data)).unwrap();
            let mut events = 0usize;
            reader
                .accept(&mut |_event| {
                    events += 1;
                    Ok(())
                })
                .unwrap();
            black_box(events)
        });
    });
    group.bench_function("class_name", |b| {
        b.iter(|| black_box(ClassReader::class_name(black_box(&data)).unwrap()));
    });
    group.finish();
}

/// Build a detached record, comparing the cost of the parameter name scan
fn bench_builder(c: &mut Criterion) {
    let data = wide_class();

    for collect in [true, false] {
        let name = if collect { "build_with_names" } else { "build_without_names" };
        c.bench_function(name, |b| {
            b.iter(|| {
                let reader = ClassReader::new(black_box(&data)).unwrap();
                let mut builder = ClassInfoBuilder::standalone(collect);
                reader.accept(&mut |event| builder.visit(event)).unwrap();
                black_box(builder.finish().unwrap())
            });
        });
    }
}

/// Lookups served from the cache, including synthetic array records
fn bench_repository_get(c: &mut Criterion) {
    let repository = ClassInfoRepository::new(RepositoryConfig::default());
    let scope = Arc::new(MemoryScope::new("bench"));
    scope.insert(wide_class()).unwrap();
    let id = repository.register_scope(&scope);
    repository.get("bench.Wide[][]", id).unwrap();

    c.bench_function("repository_get_cached", |b| {
        b.iter(|| black_box(repository.get(black_box("bench.Wide"), id).unwrap()));
    });
    c.bench_function("repository_get_array_cached", |b| {
        b.iter(|| black_box(repository.get(black_box("bench.Wide[][]"), id).unwrap()));
    });
    c.bench_function("member_lookup", |b| {
        let wide = repository.get("bench.Wide", id).unwrap();
        let hash = MemberHash::of("method63", "(IJLjava/lang/String;)V");
        b.iter(|| black_box(wide.method(black_box(hash)).unwrap()));
    });
}

criterion_group!(benches, bench_reader_walk, bench_builder, bench_repository_get);
criterion_main!(benches);
