use core_sim::{
    advance_meter_turn, LifecycleConfig, Meter, MeterType, ObjectId, ObjectKind, ObjectRegistry,
    SimulationObject,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn populated_registry(size: i32) -> ObjectRegistry {
    let mut registry = ObjectRegistry::new();
    for id in 0..size {
        let name = format!("Planet {id}");
        let mut planet = SimulationObject::new(ObjectId(id), ObjectKind::Planet, name)
            .with_position(f64::from(id), f64::from(id % 17));
        planet.init();
        for kind in MeterType::ALL {
            planet.meters_mut().insert(kind, Meter::new(10.0, 10.0));
        }
        registry.insert(planet);
    }
    registry
}

fn bench_turn(c: &mut Criterion) {
    let mut group = c.benchmark_group("meter_turn");
    let config = LifecycleConfig::default();

    for size in [64i32, 256, 1024, 4096] {
        group.bench_with_input(BenchmarkId::new("objects", size), &size, |b, &size| {
            b.iter_batched(
                || populated_registry(size),
                |mut registry| {
                    advance_meter_turn(&mut registry, &config, |object| {
                        if let Some(industry) = object.meter_mut(MeterType::Industry) {
                            industry.add_to_current(1.5);
                        }
                    });
                    registry
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(turn_benches, bench_turn);
criterion_main!(turn_benches);
