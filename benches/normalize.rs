//! Performance benchmarks for media normalization.
//!
//! Run with: `cargo bench --bench normalize`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use feed_resolver::normalize_listing;

/// Build a mixed listing: every third record is an image, every fourth
/// uses the linked shape.
fn make_listing(len: usize) -> Vec<Value> {
    (0..len)
        .map(|i| {
            let media_type = if i % 3 == 0 { "IMAGE" } else { "VIDEO" };
            let mut value = json!({
                "id": format!("m{}", i),
                "caption": format!("caption {}", i),
                "media_type": media_type,
                "media_url": format!("https://cdn.example.test/{}.mp4", i),
                "permalink": format!("https://example.test/p/{}", i),
                "timestamp": "2024-05-01T09:00:00+0000",
                "username": "creator"
            });
            if i % 4 == 0 {
                value["media_product_type"] = json!("REELS");
                value["children"] = json!({"data": []});
            }
            value
        })
        .collect()
}

fn bench_normalize_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_listing");

    for len in [10usize, 100, 1000] {
        let listing = make_listing(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &listing, |b, listing| {
            b.iter(|| normalize_listing(black_box(listing)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize_listing);
criterion_main!(benches);
