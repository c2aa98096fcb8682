//! 曲线采样与粒子系统性能基准测试
//!
//! 测试曲线采样、无分配采样和整帧 tick 的性能

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use particle_engine::curve::{Curve, CurveOut};
use particle_engine::particles::{EmitterParams, ParticleSystem, PlumeEffect};

fn bench_curve_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_sampling");

    for point_count in [2usize, 8, 32, 128] {
        let mut curve = Curve::linear();
        for i in 0..point_count {
            curve.add_point(i as f32 / (point_count - 1) as f32, i as f32);
        }

        group.bench_with_input(
            BenchmarkId::new("get", point_count),
            &curve,
            |b, curve| {
                b.iter(|| black_box(curve.get(black_box(0.73))));
            },
        );
    }

    group.finish();
}

fn bench_curve_out_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_out_sampling");

    let mut curve = CurveOut::new(Box::new(|f, a: &Vec3, b: &Vec3, out: &mut Vec3| {
        *out = a.lerp(*b, f);
    }));
    curve.add_point(0.0, Vec3::new(1.0, 0.0, 0.0));
    curve.add_point(0.5, Vec3::new(1.0, 1.0, 0.0));
    curve.add_point(1.0, Vec3::new(0.0, 1.0, 0.0));

    let mut out = Vec3::ZERO;
    group.bench_function("get_result", |b| {
        b.iter(|| {
            let _ = black_box(curve.get_result(black_box(0.73), &mut out));
        });
    });

    group.finish();
}

fn bench_system_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_tick");

    for pool_size in [64usize, 512, 4096] {
        group.bench_with_input(
            BenchmarkId::new("plume", pool_size),
            &pool_size,
            |b, &pool_size| {
                let effect = PlumeEffect::with_defaults();
                let params = EmitterParams {
                    // 门控间隔取大，基准只量更新与缓冲重建
                    frequency: 1.0e9,
                    max_emitter_life: None,
                };
                let mut system = ParticleSystem::new(
                    params,
                    PlumeEffect::default_emit_rate(),
                    Box::new(effect),
                )
                .unwrap();
                system.populate(pool_size);

                // dt 为 0：粒子不老化不死亡，池大小在整个基准期间稳定
                b.iter(|| {
                    system.tick(black_box(0.0));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_curve_sampling,
    bench_curve_out_sampling,
    bench_system_tick
);
criterion_main!(benches);
