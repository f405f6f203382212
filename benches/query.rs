use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdbox::{BoundingBox, PointIndex};
use rand::prelude::*;
use rand::rngs::StdRng;

const POINTS: usize = 100_000;
// Fraction of the side length covered by the query box on each axis.
const SELECTIVITY: [f64; 4] = [0.01, 0.05, 0.2, 0.8];

fn random_ranges(rng: &mut StdRng, side: f64, count: usize) -> Vec<BoundingBox<2>> {
    (0..count)
        .map(|_| {
            let x = rng.gen_range(0.0..100.0 - side);
            let y = rng.gen_range(0.0..100.0 - side);
            BoundingBox::new([x, y], [x + side, y + side])
        })
        .collect()
}

fn benchmark_query(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0, 0.0], [100.0, 100.0]);
    let mut index = PointIndex::new(bounds).unwrap();
    index.random_points(POINTS).unwrap();
    let tree = index.tree();
    let mut rng = StdRng::seed_from_u64(42);

    let mut group = c.benchmark_group("query");
    for &fraction in &SELECTIVITY {
        let ranges = random_ranges(&mut rng, 100.0 * fraction, 64);

        group.bench_with_input(BenchmarkId::new("tree", fraction), &ranges, |b, ranges| {
            b.iter(|| {
                for range in ranges {
                    black_box(tree.count(range));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("scan", fraction), &ranges, |b, ranges| {
            b.iter(|| {
                for range in ranges {
                    black_box(tree.points().iter().filter(|p| range.contains(p)).count());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("parallel", fraction), &ranges, |b, ranges| {
            b.iter(|| black_box(tree.query_many(ranges)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_query);
criterion_main!(benches);
