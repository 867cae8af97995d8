//! Admission and close throughput for the dispatcher hot path.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use loadsim::{ConnectionId, Dispatcher, SimulatorConfig};

fn seeded_config() -> SimulatorConfig {
    SimulatorConfig {
        seed: Some(0xC0FFEE),
        ..SimulatorConfig::default()
    }
}

fn bench_admissions(c: &mut Criterion) {
    c.bench_function("admit_1000_connections", |b| {
        b.iter(|| {
            let dispatcher = Dispatcher::with_config(seeded_config()).unwrap();
            for i in 0..1000 {
                dispatcher
                    .add_connection(format!("conn-{i}"))
                    .unwrap();
            }
            black_box(dispatcher.worker_count())
        })
    });
}

fn bench_admit_close_cycle(c: &mut Criterion) {
    c.bench_function("admit_close_cycle", |b| {
        let dispatcher = Dispatcher::with_config(seeded_config()).unwrap();
        let id = ConnectionId::from("cycled");
        b.iter(|| {
            dispatcher.add_connection(id.clone()).unwrap();
            black_box(dispatcher.close_connection(&id));
        })
    });
}

fn bench_average_load(c: &mut Criterion) {
    c.bench_function("average_load_over_grown_pool", |b| {
        let dispatcher = Dispatcher::with_config(seeded_config()).unwrap();
        for i in 0..1000 {
            dispatcher.add_connection(format!("conn-{i}")).unwrap();
        }
        b.iter(|| black_box(dispatcher.average_load().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_admissions,
    bench_admit_close_cycle,
    bench_average_load
);
criterion_main!(benches);
