//! Atlas Benchmarks
//!
//! Performance benchmarks for slot tree packing and arranger ticks

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use vitex_atlas::{
    Arranger, ArrangerConfig, PriorityList, RecordingOutput, SlotTree, TextureId,
};

fn bench_pack_leaves(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_leaves");

    for depth in [3u32, 5, 7].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let leaf_count = 4usize.pow(depth);
            b.iter(|| {
                let mut tree = SlotTree::new(depth);
                for raw in 0..leaf_count.min(256) as u32 {
                    black_box(tree.pack(depth, TextureId::new(raw), true));
                }
                tree
            });
        });
    }

    group.finish();
}

fn bench_get_smallness(c: &mut Criterion) {
    let mut tree = SlotTree::new(7);
    for raw in 0..512u32 {
        tree.pack(5, TextureId::new(raw), true);
    }

    c.bench_function("get_smallness_worst_case", |b| {
        b.iter(|| black_box(tree.get_smallness(TextureId::new(511))));
    });
}

fn bench_arranger_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("arranger_tick");

    for count in [16usize, 64, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut arranger = Arranger::new(ArrangerConfig::default());
            let mut output = RecordingOutput::new(128);
            let mut priorities = PriorityList::new();
            for raw in 0..count as u32 {
                priorities.push(TextureId::new(raw), 1.0 / count as f32);
            }
            // Warm the tree so ticks exercise placed objects too.
            for _ in 0..count {
                arranger.update(&priorities, &mut output);
            }
            b.iter(|| black_box(arranger.update(&priorities, &mut output)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pack_leaves,
    bench_get_smallness,
    bench_arranger_tick
);
criterion_main!(benches);
