//! Benchmarks for core ECS operations: entity creation, component
//! add/remove, archetype segregation, and cached query iteration.
//!
//! Run with: cargo bench

use archetype_ecs::{Component, ComponentTypeId, World};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

struct Position;
impl Component for Position {
    const DIMENSIONS: usize = 3;
}

struct Velocity;
impl Component for Velocity {
    const DIMENSIONS: usize = 3;
}

struct Health;
impl Component for Health {
    const DIMENSIONS: usize = 1;
}

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_1k_single_component", |b| {
        b.iter(|| {
            let mut world = World::new();
            for i in 0..1_000 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
            }
        });
    });

    group.bench_function("spawn_1k_three_components", |b| {
        b.iter(|| {
            let mut world = World::new();
            for i in 0..1_000 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
                world
                    .add_component::<Velocity>(e, (1.0, 0.0, 0.0))
                    .unwrap();
                world.add_component::<Health>(e, 100.0).unwrap();
            }
        });
    });

    group.finish();
}

fn bench_spawn_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_scaling");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("spawn_with_3_components", count),
            count,
            |b, &count| {
                b.iter(|| {
                    let mut world = World::new();
                    for i in 0..count {
                        let e = world.create_entity();
                        world
                            .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                            .unwrap();
                        world
                            .add_component::<Velocity>(e, (1.0, 0.0, 0.0))
                            .unwrap();
                        world.add_component::<Health>(e, 100.0).unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_despawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("despawn");

    group.bench_function("despawn_1k_entities", |b| {
        b.iter_batched(
            || {
                let mut world = World::new();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| {
                        let e = world.create_entity();
                        world
                            .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                            .unwrap();
                        world.add_component::<Health>(e, 100.0).unwrap();
                        e
                    })
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for entity in entities {
                    world.remove_entity(entity);
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_archetype_segregation(c: &mut Criterion) {
    c.bench_function("archetype_segregation_1k", |b| {
        b.iter(|| {
            let mut world = World::new();

            for i in 0..250 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
                world
                    .add_component::<Velocity>(e, (1.0, 0.0, 0.0))
                    .unwrap();
            }

            for i in 0..250 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
                world.add_component::<Health>(e, 100.0).unwrap();
            }

            for i in 0..250 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
                world
                    .add_component::<Velocity>(e, (1.0, 0.0, 0.0))
                    .unwrap();
                world.add_component::<Health>(e, 100.0).unwrap();
            }

            for i in 0..250 {
                let e = world.create_entity();
                world
                    .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                    .unwrap();
            }

            black_box(world.archetype_count());
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    group.bench_function("query_iteration_cached_10k", |b| {
        let mut world = World::new();
        for i in 0..10_000 {
            let e = world.create_entity();
            world
                .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                .unwrap();
            world
                .add_component::<Velocity>(e, (1.0, 0.0, 0.0))
                .unwrap();
        }

        let types = [
            ComponentTypeId::of::<Position>(),
            ComponentTypeId::of::<Velocity>(),
        ];
        // Warm the query cache once before measuring.
        let _ = world.query(&types).unwrap();

        b.iter(|| {
            let rows = world.query(&types).unwrap();
            black_box(rows.len());
        });
    });

    group.finish();
}

fn bench_entity_count(c: &mut Criterion) {
    c.bench_function("entity_count_10k", |b| {
        let mut world = World::new();
        for i in 0..10_000 {
            let e = world.create_entity();
            world
                .add_component::<Position>(e, (i as f64, 0.0, 0.0))
                .unwrap();
        }

        b.iter(|| {
            black_box(world.entity_count());
        });
    });
}

criterion_group!(
    benches,
    bench_spawn,
    bench_spawn_scaling,
    bench_despawn,
    bench_archetype_segregation,
    bench_query,
    bench_entity_count
);

criterion_main!(benches);
