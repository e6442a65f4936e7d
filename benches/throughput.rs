use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use medialog::{
    backend::raster::RasterImage,
    color::Rgba8,
    config::DocumentConfig,
    core::log::OperationLog,
    document::{Document, RasterDocument},
    wire,
};

fn filled_doc(ops: usize) -> RasterDocument {
    let config = DocumentConfig {
        log_capacity: ops,
        ..DocumentConfig::default()
    };
    let mut doc =
        Document::with_config(RasterImage::blank(64, 64, Rgba8::BLACK), config).expect("config");
    for i in 0..ops {
        match i % 4 {
            0 => doc.brightness((i % 200) as f64 - 100.0),
            1 => doc.roll(i as i32, -(i as i32)),
            2 => doc.rotate_with_background(90.0, "#202020"),
            _ => doc.crop(0, 0, 32, 32),
        }
        .expect("record");
    }
    doc
}

fn bench_record(c: &mut Criterion) {
    c.bench_function("record_1024", |b| {
        b.iter(|| filled_doc(1024));
    });
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for size in [16usize, 256, 1024] {
        let doc = filled_doc(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| doc.serialize().expect("json"));
        });
    }
    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize");
    for size in [16usize, 256, 1024] {
        let json = filled_doc(size).serialize().expect("json");
        group.bench_with_input(BenchmarkId::from_parameter(size), &json, |b, json| {
            b.iter(|| -> OperationLog { wire::from_json(json, size).expect("parse") });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_record, bench_serialize, bench_deserialize);
criterion_main!(benches);
