//! Benchmarks for the configuration blob codec
//!
//! Measures the compiler side (size pass plus serialization) and the manager
//! side (wire read plus offset validation) for menus of growing length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fawm_core::blob::{self, ConfigBlob};
use fawm_core::menu::{Config, Menu, MenuItem};
use fawm_core::parser;

fn menu_of(len: usize) -> Config {
    let mut items: Vec<MenuItem> = (0..len)
        .map(|i| MenuItem::exec(format!("Application {i}"), format!("app-{i} --flag {i}")))
        .collect();
    items.push(MenuItem::Reload);
    items.push(MenuItem::Exit);
    Config {
        menu: Some(Menu { items }),
    }
}

fn source_of(config: &Config) -> String {
    let mut source = String::from("menu\n");
    for item in config.menu.iter().flat_map(|m| &m.items) {
        match item {
            MenuItem::Exec { caption, command } => {
                source.push_str(&format!("  exec \"{caption}\" \"{command}\"\n"));
            }
            MenuItem::Exit => source.push_str("  exit\n"),
            MenuItem::Reload => source.push_str("  reload\n"),
        }
    }
    source.push_str("end\n");
    source
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_encode");

    for len in [4, 32, 256] {
        let config = menu_of(len);
        group.bench_with_input(BenchmarkId::new("serialize", len), &config, |b, config| {
            b.iter(|| blob::serialize(black_box(config)))
        });

        let source = source_of(&config);
        group.bench_with_input(BenchmarkId::new("parse", len), &source, |b, source| {
            b.iter(|| parser::parse(black_box(source)))
        });
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_decode");

    for len in [4, 32, 256] {
        let Ok(bytes) = blob::serialize(&menu_of(len)) else {
            continue;
        };
        let mut wire = Vec::with_capacity(bytes.len() + 8);
        if blob::write_blob(&mut wire, &bytes).is_err() {
            continue;
        }

        group.bench_with_input(BenchmarkId::new("read_blob", len), &wire, |b, wire| {
            b.iter(|| blob::read_blob(&mut black_box(wire.as_slice())))
        });

        group.bench_with_input(BenchmarkId::new("walk_items", len), &bytes, |b, bytes| {
            let Ok(menu) = ConfigBlob::from_bytes(bytes.clone()) else {
                return;
            };
            b.iter(|| {
                menu.menu()
                    .map(|m| m.items().map(|item| item.caption().len()).sum::<usize>())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);
