//! Benchmarks for the ladder low-pass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::ladder::{LadderFilter, LadderMode};

use crate::BLOCK_SIZES;

pub fn bench_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ladder");

    for &size in BLOCK_SIZES {
        let mut buffer: Vec<f32> = (0..size).map(|i| ((i % 100) as f32 / 50.0) - 1.0).collect();

        for (name, mode) in [("lpf12", LadderMode::Lpf12), ("lpf24", LadderMode::Lpf24)] {
            let mut filter = LadderFilter::new();
            filter.prepare(48_000.0);
            filter.set_mode(mode);
            filter.set_cutoff_hz(1_000.0);
            filter.set_resonance(0.5);
            filter.reset();

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        filter.update_smoothers();
                        *sample = filter.process_sample(*sample);
                    }
                    black_box(&mut buffer);
                })
            });
        }

        // Cutoff retargeted every block, as the control-rate modulation does
        let mut filter = LadderFilter::new();
        filter.prepare(48_000.0);
        filter.set_resonance(0.7);
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.1 };
                filter.set_cutoff_hz(black_box(cutoff));
                for sample in buffer.iter_mut() {
                    filter.update_smoothers();
                    *sample = filter.process_sample(*sample);
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
