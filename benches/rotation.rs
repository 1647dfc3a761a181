//! Benchmarks for selection and rotation.

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cuber::config::Config;
use cuber::cube::RevengeCube;
use cuber::dispatcher::Controller;
use cuber::faces::{parse_sequence, Face, Layer, Turn};
use cuber::ledger::Source;

/// Benchmark selecting a wide layer on the 4x4x4.
fn bench_select(c: &mut Criterion) {
    let cube = RevengeCube::new(1.0, 0.01);
    let turn = Turn::new(Face::R, Layer::Wide);

    c.bench_function("select_wide", |b| b.iter(|| cube.select(black_box(turn))));
}

/// Benchmark a full animated turn plus its inverse, driven frame by frame.
fn bench_turn(c: &mut Criterion) {
    let config = Config {
        debounce_ms: 0,
        ..Config::default()
    };
    let mut controller = Controller::with_seed(4, config, 0).unwrap();
    let moves = parse_sequence("Rw Rw'").unwrap();

    c.bench_function("turn_and_inverse", |b| {
        b.iter(|| {
            controller
                .apply_sequence(black_box(&moves), Source::Scramble, Instant::now())
                .unwrap()
        })
    });
}

/// Benchmark formatting the position index.
fn bench_format_index(c: &mut Criterion) {
    let mut controller = Controller::with_seed(4, Config::default(), 0).unwrap();
    controller.scramble(Instant::now());
    controller.run_until_idle(Instant::now(), Duration::from_millis(16));

    c.bench_function("format_index", |b| {
        b.iter(|| black_box(controller.cube()).format_index())
    });
}

criterion_group!(benches, bench_select, bench_turn, bench_format_index);
criterion_main!(benches);
