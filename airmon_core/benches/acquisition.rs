use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use airmon_core::{AcquisitionCfg, AcquisitionController, AirQuality, SensorReadings};
use airmon_hardware::{SimulatedBoard, SimulatedClimate};
use airmon_traits::Level;
use airmon_traits::clock::test_clock::TestClock;

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_full_scale", |b| {
        b.iter(|| {
            let mut worst = AirQuality::Excellent;
            for raw in 0..=1023u16 {
                worst = worst.max(AirQuality::classify(black_box(raw)));
            }
            worst
        });
    });
}

fn bench_acquire_all(c: &mut Criterion) {
    let board = SimulatedBoard::new()
        .with_channel(0, 600)
        .with_channel(1, 600)
        .with_actuator(1, 5, Level::Low, 0);
    c.bench_function("acquire_all_simulated", |b| {
        b.iter_batched(
            || {
                AcquisitionController::new(
                    board.clone(),
                    SimulatedClimate::new(23.4, 45.0),
                    TestClock::new(),
                    AcquisitionCfg::default(),
                )
            },
            |mut ctl| {
                let mut r = SensorReadings::default();
                black_box(ctl.acquire_all(&mut r));
                r
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_classify, bench_acquire_all);
criterion_main!(benches);
