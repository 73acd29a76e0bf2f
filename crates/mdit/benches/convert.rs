//! Benchmarks for markdown conversion.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mdit::{Converter, RenderConfig};

/// Generate markdown with headings and emphasis-heavy paragraphs.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold**, *italic* and `code`, \
                 plus a [link](/section-{i}) and a [reference][ref-{i}].\n\n"
            ));
        }
        md.push_str(&format!("[ref-{i}]: ../other/{i} \"Reference {i}\"\n\n"));
    }
    md
}

/// Generate markdown dominated by tables and lists.
fn generate_tables(tables: usize, rows: usize) -> String {
    let mut md = String::new();
    for t in 0..tables {
        md.push_str(&format!("Table {t}\n\n| name | value | note |\n|:-----|------:|:----:|\n"));
        for r in 0..rows {
            md.push_str(&format!("| row {r} | {r} | ~~old~~ *new* |\n"));
        }
        md.push_str("\n- item\n- [item](/x)\n  - nested\n\n");
    }
    md
}

fn full_config() -> RenderConfig {
    RenderConfig::new()
        .with_base_url("https://example.com")
        .with_heading_level_offset(1)
        .with_table_class("table")
}

fn bench_convert_simple(c: &mut Criterion) {
    let converter = Converter::default();

    c.bench_function("convert_simple_markdown", |b| {
        b.iter(|| converter.convert("# Hello\n\nSimple content."));
    });
}

fn bench_convert_varying_sizes(c: &mut Criterion) {
    let converter = Converter::new(full_config());
    let mut group = c.benchmark_group("convert_by_size");

    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let markdown = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(markdown.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &markdown,
            |b, md| b.iter(|| converter.convert(md)),
        );
    }

    group.finish();
}

fn bench_convert_tables(c: &mut Criterion) {
    let markdown = generate_tables(10, 20);
    let mut group = c.benchmark_group("convert_tables");
    group.throughput(Throughput::Bytes(markdown.len() as u64));

    group.bench_function("default", |b| {
        let converter = Converter::default();
        b.iter(|| converter.convert(&markdown));
    });
    group.bench_function("configured", |b| {
        let converter = Converter::new(full_config());
        b.iter(|| converter.convert(&markdown));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_varying_sizes,
    bench_convert_tables
);
criterion_main!(benches);
