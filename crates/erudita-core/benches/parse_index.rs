//! Benchmarks for llms.txt index parsing and prefix filtering

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use erudita_core::parser;
use std::fmt::Write as _;
use std::hint::black_box;
use url::Url;

// Build a synthetic index shaped like real llms.txt files: a title, a
// blockquote description, and sections of bullet links with descriptions.
fn create_index_text(entry_count: usize) -> String {
    let mut text = String::from(
        "# Example Library\n\n> A synthetic documentation index used to measure parser throughput.\n\n",
    );
    for i in 0..entry_count {
        if i % 25 == 0 {
            let _ = writeln!(text, "\n## Section {}\n", i / 25);
        }
        let _ = writeln!(
            text,
            "- [Guide {i}](/docs/guide-{i}.md): How to use feature {i} in production"
        );
    }
    text
}

fn bench_parse_scaling(c: &mut Criterion) {
    let entry_counts = [10, 100, 1_000, 5_000];

    let mut group = c.benchmark_group("parse_scaling");

    for &count in &entry_counts {
        let text = create_index_text(count);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("entries", count), &text, |b, text| {
            b.iter(|| parser::parse_index(black_box(text)));
        });
    }

    group.finish();
}

fn bench_line_shapes(c: &mut Criterion) {
    let shapes = [
        (
            "bullet_with_description",
            "- [Quickstart](/docs/quickstart.md): Get productive in five minutes\n",
        ),
        ("bullet_plain", "- [Quickstart](/docs/quickstart.md)\n"),
        ("bare_link", "[Quickstart](/docs/quickstart.md)\n"),
        (
            "prose",
            "This line is ignored by the parser but still has to be scanned.\n",
        ),
    ];

    let mut group = c.benchmark_group("line_shapes");

    for (name, line) in &shapes {
        let text = format!("# Shapes\n\n{}", line.repeat(1_000));
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("shape", name), &text, |b, text| {
            b.iter(|| parser::parse_index(black_box(text)));
        });
    }

    group.finish();
}

fn bench_prefix_filtering(c: &mut Criterion) {
    let text = create_index_text(2_000);
    let entries = parser::parse_index(&text).entries;
    let index_url = Url::parse("https://example.com/llms.txt").expect("static URL parses");

    let mut group = c.benchmark_group("prefix_filtering");
    group.throughput(Throughput::Elements(entries.len() as u64));

    group.bench_function("filter_2000_entries", |b| {
        b.iter_batched(
            || entries.clone(),
            |entries| parser::filter_by_prefix(entries, black_box(&index_url), "/docs"),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_scaling,
    bench_line_shapes,
    bench_prefix_filtering
);
criterion_main!(benches);
