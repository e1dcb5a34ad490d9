use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mingle_sim::{SimConfig, SimWorld};

fn bench_sim_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim_step");

    for &cats in &[20usize, 100, 400] {
        group.bench_function(format!("steps60_cats{}", cats), |b| {
            b.iter_batched(
                || {
                    let config = SimConfig {
                        mingling_cat_count: cats,
                        // Widen the ring so large populations still fit.
                        arena_outer_radius: 22.0 + cats as f32 * 0.1,
                        seed: 0xBEEF,
                        ..Default::default()
                    };
                    let mut sim = SimWorld::with_config(config);
                    sim.spawn_player(0.0, -4.5);
                    sim.spawn_mingling_cats(cats);
                    sim
                },
                |mut sim| {
                    for _ in 0..60 {
                        sim.step(1.0 / 60.0);
                    }
                    sim
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sim_steps);
criterion_main!(benches);
