use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::DynamicImage;
use stikqr::generate::{generate, Generator};
use stikqr::scan::{decode_image, DEFAULT_MAX_DIMENSION};
use stikqr::store::settings::MemorySettings;
use stikqr::store::CodeStore;

/// Store holding `n` distinct codes.
fn filled_store(n: usize) -> CodeStore<MemorySettings> {
    let mut store = CodeStore::open(MemorySettings::new());
    for i in 0..n {
        store.append(&format!("https://example.com/item/{i}"));
    }
    store
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for size in [10, 100, 1_000] {
        // duplicate appends pay for the content scan but never persist
        group.bench_with_input(BenchmarkId::new("duplicate", size), &size, |b, &size| {
            let mut store = filled_store(size);
            b.iter(|| store.append(black_box("https://example.com/item/0")));
        });

        // new appends also rewrite the whole snapshot
        group.bench_with_input(BenchmarkId::new("new_then_remove", size), &size, |b, &size| {
            let mut store = filled_store(size);
            b.iter(|| {
                if let Some(code) = store.append(black_box("fresh")) {
                    store.remove(code.id);
                }
            });
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for len in [16, 128, 512] {
        let text = "x".repeat(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &text, |b, text| {
            b.iter(|| Generator::default().generate(black_box(text)));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let img = DynamicImage::ImageLuma8(generate("https://example.com").expect("image"));

    c.bench_function("decode_generated", |b| {
        b.iter(|| decode_image(black_box(&img), DEFAULT_MAX_DIMENSION));
    });
}

criterion_group!(benches, bench_append, bench_generate, bench_decode);
criterion_main!(benches);
