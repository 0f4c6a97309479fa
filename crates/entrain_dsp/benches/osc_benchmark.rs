//! Performance benchmarks for the synthesis module
//!
//! Run with: cargo bench -p entrain_dsp

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use entrain_dsp::{SharedRenderState, StereoOscillator};

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("oscillator");

    // Common buffer sizes in audio applications
    let buffer_sizes = [64, 128, 256, 512, 1024, 2048];

    for size in buffer_sizes {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("render_interleaved_{}_frames", size), |b| {
            let osc = StereoOscillator::new(48_000.0);
            let state = SharedRenderState::new(200.0).unwrap();
            state.start(14.0).unwrap();
            let mut buffer = vec![0.0_f32; size * 2];

            b.iter(|| {
                osc.render_interleaved(&state, black_box(&mut buffer));
            });
        });

        group.bench_function(format!("render_planar_{}_frames", size), |b| {
            let osc = StereoOscillator::new(48_000.0);
            let state = SharedRenderState::new(200.0).unwrap();
            state.start(14.0).unwrap();
            let mut left = vec![0.0_f32; size];
            let mut right = vec![0.0_f32; size];

            b.iter(|| {
                osc.render_planar(&state, black_box(&mut left), black_box(&mut right));
            });
        });
    }

    group.finish();
}

fn benchmark_parameter_update(c: &mut Criterion) {
    c.bench_function("set_beat_hz", |b| {
        let state = SharedRenderState::new(200.0).unwrap();
        state.start(14.0).unwrap();
        let mut beat = 6.0_f32;

        b.iter(|| {
            // Simulate switching presets from the control plane
            state.set_beat_hz(black_box(beat)).unwrap();
            beat = if beat > 13.0 { 6.0 } else { beat + 4.0 };
        });
    });
}

criterion_group!(benches, benchmark_render, benchmark_parameter_update);
criterion_main!(benches);
