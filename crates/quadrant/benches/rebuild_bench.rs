use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use quadrant::{Aabb, QuadTree, QuadTreeConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn scattered_boxes(count: usize, seed: u64) -> Vec<Aabb> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let center = Vec2::new(rng.gen_range(0.0..1024.0), rng.gen_range(0.0..1024.0));
            Aabb::from_circle(center, rng.gen_range(2.0..12.0))
        })
        .collect()
}

fn bench_rebuild(c: &mut Criterion) {
    let boxes = scattered_boxes(2_000, 7);
    let mut tree = QuadTree::new(QuadTreeConfig::with_bounds(Aabb::new(0.0, 0.0, 1024.0, 1024.0)));

    c.bench_function("rebuild_2000", |b| {
        b.iter(|| {
            tree.clear();
            for (i, aabb) in boxes.iter().enumerate() {
                tree.insert(i, *aabb);
            }
            black_box(tree.len())
        })
    });
}

fn bench_pair_queries(c: &mut Criterion) {
    // One query per entry, as the collision dispatcher does every frame
    let boxes = scattered_boxes(2_000, 11);
    let mut tree = QuadTree::new(QuadTreeConfig::with_bounds(Aabb::new(0.0, 0.0, 1024.0, 1024.0)));
    for (i, aabb) in boxes.iter().enumerate() {
        tree.insert(i, *aabb);
    }

    c.bench_function("pair_queries_2000", |b| {
        b.iter(|| {
            let mut candidates = 0usize;
            for aabb in &boxes {
                tree.for_each_in(black_box(aabb), |_| candidates += 1);
            }
            black_box(candidates)
        })
    });
}

criterion_group!(benches, bench_rebuild, bench_pair_queries);
criterion_main!(benches);
