// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tickbox_resolve::{Aabb, CollisionResolver, Hitbox};

/// A crowd of overlapping dynamic boxes inside a walled arena.
fn crowd(n: usize) -> Vec<Hitbox> {
    let mut rng = StdRng::seed_from_u64(0x31);
    let side = 40.0 * (n as f64).sqrt();
    let mut boxes = vec![
        Hitbox::fixed("wall-top", Aabb::new(-20.0, -20.0, side + 20.0, 0.0)),
        Hitbox::fixed("wall-bottom", Aabb::new(-20.0, side, side + 20.0, side + 20.0)),
        Hitbox::fixed("wall-left", Aabb::new(-20.0, 0.0, 0.0, side)),
        Hitbox::fixed("wall-right", Aabb::new(side, 0.0, side + 20.0, side)),
    ];
    for i in 0..n {
        let x = rng.gen_range(-8.0..side - 24.0);
        let y = rng.gen_range(-8.0..side - 24.0);
        boxes.push(Hitbox::dynamic(
            format!("ent-{i}"),
            Aabb::new(x, y, x + 32.0, y + 32.0),
        ));
    }
    boxes
}

fn bench_resolver_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver_tick");
    for &n in &[10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || (CollisionResolver::default(), crowd(n)),
                |(mut resolver, boxes)| resolver.tick(&boxes, |_, _| true).len(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolver_tick);
criterion_main!(benches);
