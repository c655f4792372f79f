//! Benchmarks for per-file fact extraction
//!
//! Measures the normalizer and both extractors on synthetic modules of
//! increasing size, since they run once per file on every analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shakeguard::analysis::{
    normalize, FactExtractor, PatternExtractor, SourceFile, SyntaxExtractor,
};

/// Build a module with `count` exports, imports and some noise around them.
fn create_module(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!("import {{ dep{i} }} from './dep{i}';\n"));
    }
    for i in 0..count {
        source.push_str(&format!(
            "// export const commented{i} = 0;\n\
             const label{i} = `value ${{dep{i}}} with 'quotes'`;\n\
             export function fn{i}(a, b) {{ return a + b + label{i}.length; }}\n"
        ));
    }
    source.push_str("export default fn0;\n");
    source
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [10, 100, 1000].iter() {
        let source = create_module(*size);

        group.bench_with_input(BenchmarkId::new("exports", size), &source, |b, src| {
            b.iter(|| black_box(normalize(src)));
        });
    }

    group.finish();
}

fn bench_syntax_extractor(c: &mut Criterion) {
    let mut group = c.benchmark_group("syntax_extractor");
    let mut extractor = match SyntaxExtractor::new() {
        Ok(extractor) => extractor,
        Err(err) => panic!("grammar init failed: {err}"),
    };

    for size in [10, 100, 1000].iter() {
        let file = SourceFile::new("bench.ts", create_module(*size));

        group.bench_with_input(BenchmarkId::new("exports", size), &file, |b, file| {
            b.iter(|| black_box(extractor.extract(file)));
        });
    }

    group.finish();
}

fn bench_pattern_extractor(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_extractor");
    let extractor = PatternExtractor::new();

    for size in [10, 100, 1000].iter() {
        let file = SourceFile::new("bench.ts", create_module(*size));

        group.bench_with_input(BenchmarkId::new("exports", size), &file, |b, file| {
            b.iter(|| black_box(extractor.extract_facts(file)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_syntax_extractor,
    bench_pattern_extractor
);
criterion_main!(benches);
