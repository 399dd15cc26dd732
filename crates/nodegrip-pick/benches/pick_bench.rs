//! Benchmarks for color encoding, picking and the nearest fallback.
//!
//! Run with:
//! `cargo bench -p nodegrip-pick --bench pick_bench`
//! `cargo bench -p nodegrip-pick --bench pick_bench --features gpu`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nodegrip_core::{Camera, NodeIndex, Vec3, Viewport};
use nodegrip_pick::{ColorKey, HitTester, InstanceSnapshot, PickColorMap, pick_nearest_in_world_space};
use std::hint::black_box;

const NODES: usize = 100_000;

fn grid_positions(count: usize) -> Vec<Vec3> {
    let side = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| Vec3::new((i % side) as f32 * 4.0, (i / side) as f32 * 4.0, 0.0))
        .collect()
}

fn bench_color_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick/color_key");
    group.throughput(Throughput::Elements(NODES as u64));

    group.bench_function("encode_decode", |b| {
        b.iter(|| {
            for raw in 0..NODES as u32 {
                let color = ColorKey::encode(NodeIndex::new(raw));
                black_box(color.and_then(ColorKey::decode));
            }
        });
    });

    group.bench_function("assign", |b| {
        let mut map = PickColorMap::new();
        b.iter(|| {
            black_box(map.assign(NODES).is_ok());
        });
    });

    group.finish();
}

fn bench_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick/resolve");
    for &count in &[1_000usize, NODES] {
        let positions = grid_positions(count);
        let snapshot = InstanceSnapshot::from_positions(&positions, 1.5);

        let mut tester = HitTester::software();
        tester.set_camera(Camera::screen_space(Viewport::new(1280.0, 1280.0)));
        let _ = tester.assign_colors(count);
        tester.sync_instances(&snapshot);

        group.bench_function(BenchmarkId::new("software", count), |b| {
            b.iter(|| black_box(tester.pick(black_box(40.0), black_box(40.0))));
        });

        #[cfg(feature = "gpu")]
        if let Ok(mut gpu) = HitTester::gpu() {
            gpu.set_camera(Camera::screen_space(Viewport::new(1280.0, 1280.0)));
            let _ = gpu.assign_colors(count);
            gpu.sync_instances(&snapshot);
            group.bench_function(BenchmarkId::new("gpu", count), |b| {
                b.iter(|| black_box(gpu.pick(black_box(40.0), black_box(40.0))));
            });
        }

        group.bench_function(BenchmarkId::new("nearest_fallback", count), |b| {
            let query = Vec3::new(40.5, 40.5, 0.0);
            b.iter(|| {
                black_box(pick_nearest_in_world_space(
                    black_box(query),
                    &positions,
                    count,
                    2.0,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_color_keys, bench_pick);
criterion_main!(benches);
