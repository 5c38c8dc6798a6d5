use cascading_config::properties;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;

fn sample() -> String {
    let mut text = String::from("# sample\n");
    for i in 0..200 {
        text.push_str(&format!(
            "key.{i} = value {i} with \\u00e9scapes \\\n    and a continuation\n"
        ));
    }
    text
}

pub fn bench_parse(c: &mut Criterion) {
    let text = sample();
    c.bench_function("parse_200_entries", |b| {
        b.iter(|| {
            let entries = properties::parse(black_box(&text)).unwrap();
            black_box(entries);
        })
    });
}

pub fn bench_write(c: &mut Criterion) {
    let entries: Vec<(String, String)> = properties::parse(&sample())
        .unwrap()
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect();
    c.bench_function("write_200_entries", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(16 * 1024);
            properties::write(
                &mut out,
                entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                Some("bench"),
            )
            .unwrap();
            black_box(out);
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_parse, bench_write
}
criterion_main!(benches);
