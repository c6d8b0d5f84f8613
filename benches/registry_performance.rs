// benches/registry_performance.rs
//! Benchmarks for the registry hot paths.
//!
//! Reads (`classify`, `get_string`, exception derivations) are expected to be
//! hash lookups; allocation adds one native call plus a journal entry.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use errclass::{
    ErrorCode, ErrorRegistry, ExceptionValue, InProcessRuntime, RegistryConfig, SharedRegistry,
    check, definitions,
};

fn populated_registry(classes: usize, codes_per_class: usize) -> (ErrorRegistry, Vec<ErrorCode>) {
    let mut registry = ErrorRegistry::new(InProcessRuntime::new());
    let mut codes = Vec::with_capacity(classes * codes_per_class);

    for c in 0..classes {
        let class = registry.allocate_class().expect("allocate class");
        registry
            .set_string(class, format!("class {}", c))
            .expect("describe class");
        for _ in 0..codes_per_class {
            codes.push(registry.allocate_code(class).expect("allocate code"));
        }
    }

    (registry, codes)
}

// ============================================================================
// Reads
// ============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let (registry, codes) = populated_registry(16, 16);
    let dynamic = codes[codes.len() / 2];

    group.bench_function("builtin", |b| {
        b.iter(|| registry.classify(black_box(definitions::ERR_ARG)))
    });
    group.bench_function("dynamic", |b| {
        b.iter(|| registry.classify(black_box(dynamic)))
    });
    group.bench_function("unknown", |b| {
        b.iter(|| registry.classify(black_box(ErrorCode::new(-1))))
    });

    group.finish();
}

fn bench_get_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_string");
    let (registry, codes) = populated_registry(4, 4);

    group.bench_function("builtin", |b| {
        b.iter(|| registry.get_string(black_box(definitions::ERR_TRUNCATE)).len())
    });
    group.bench_function("undescribed_dynamic", |b| {
        b.iter(|| registry.get_string(black_box(codes[0])).len())
    });

    group.finish();
}

fn bench_exception_derivation(c: &mut Criterion) {
    let (registry, _) = populated_registry(1, 1);

    c.bench_function("exception_derive_all", |b| {
        b.iter(|| {
            let e = ExceptionValue::new(black_box(definitions::ERR_COMM));
            (e.error_class(&registry), e.error_string(&registry).len(), bool::from(e))
        })
    });

    c.bench_function("exception_repr_parse", |b| {
        b.iter(|| black_box("Exception(4096)").parse::<ExceptionValue>())
    });

    c.bench_function("check_raise", |b| {
        b.iter(|| check(&registry, black_box(definitions::ERR_COMM)).is_err())
    });
}

// ============================================================================
// Writes
// ============================================================================

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");

    for capacity in [1usize, 256, 4096] {
        group.bench_with_input(
            BenchmarkId::new("class_and_code", capacity),
            &capacity,
            |b, &capacity| {
                let config = RegistryConfig::default().with_journal_capacity(capacity);
                let mut registry = ErrorRegistry::with_config(InProcessRuntime::new(), config);
                b.iter(|| {
                    let class = registry.allocate_class().expect("allocate class");
                    registry.allocate_code(class).expect("allocate code")
                })
            },
        );
    }

    group.finish();
}

fn bench_set_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_string");

    for len in [8usize, 64, 256] {
        let description = "e".repeat(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &description, |b, description| {
            let mut registry = ErrorRegistry::new(InProcessRuntime::new());
            let class = registry.allocate_class().expect("allocate class");
            b.iter(|| registry.set_string(class, description.clone()))
        });
    }

    group.finish();
}

fn bench_shared_registry(c: &mut Criterion) {
    let shared = SharedRegistry::new(ErrorRegistry::new(InProcessRuntime::new()));
    let class = shared.allocate_class().expect("allocate class");

    c.bench_function("shared_classify", |b| {
        b.iter(|| shared.classify(black_box(class)))
    });
    c.bench_function("shared_world_attr", |b| {
        let world = shared.world();
        b.iter(|| world.get_attr(black_box(errclass::Attribute::LastUsedCode)))
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_get_string,
    bench_exception_derivation,
    bench_allocation,
    bench_set_string,
    bench_shared_registry,
);
criterion_main!(benches);
