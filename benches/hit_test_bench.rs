//! Benchmarks for frame hit-testing and resize arithmetic
//!
//! Both run on every pointer motion over a frame, so they bound how fast a
//! drag can be tracked.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fawm_core::geometry::{
    detect_frame_position, detect_frame_status, resize_geometry, Anchor, ResizeEdges,
};
use fawm_core::{Geometry, Metrics, PointerPosition};

fn hit_test_benchmark(c: &mut Criterion) {
    let metrics = Metrics::default();
    let mut group = c.benchmark_group("hit_test");

    for size in [64, 320, 1280] {
        group.bench_with_input(
            BenchmarkId::new("detect_frame_position_scan", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut hits = 0u32;
                    for y in (-2..size + 2).step_by(7) {
                        for x in (-2..size + 2).step_by(7) {
                            let position = detect_frame_position(&metrics, size, size, x, y);
                            hits += u32::from(position.is_resize());
                        }
                    }
                    black_box(hits)
                });
            },
        );
    }

    group.bench_function("detect_frame_status_row", |b| {
        b.iter(|| {
            let mut boxes = 0u32;
            for x in 0..640 {
                let status = detect_frame_status(&metrics, 640, black_box(x), 8);
                boxes += u32::from(status != fawm_core::FrameStatus::None);
            }
            black_box(boxes)
        });
    });

    group.finish();
}

fn resize_benchmark(c: &mut Criterion) {
    let metrics = Metrics::default();
    let current = Geometry::new(100, 100, 400, 300);
    let anchor = Anchor {
        x: 200,
        y: 10,
        width: 400,
        height: 300,
    };
    let mut group = c.benchmark_group("resize");

    for (name, edges) in [
        ("south_east", ResizeEdges::BOTTOM | ResizeEdges::RIGHT),
        ("north_west", ResizeEdges::TOP | ResizeEdges::LEFT),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut last = current;
                for delta in -50..50 {
                    let pointer = PointerPosition {
                        x: anchor.x + delta,
                        y: anchor.y + delta,
                        root_x: 300 + delta,
                        root_y: 110 + delta,
                    };
                    last = resize_geometry(edges, current, anchor, pointer, (7, 13), &metrics);
                }
                black_box(last)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, hit_test_benchmark, resize_benchmark);
criterion_main!(benches);
