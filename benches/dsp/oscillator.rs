//! Benchmarks for the band-limited impulse oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::oscillator::Oscillator;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Low note - long periods, mostly the sine recursion
        let mut osc = Oscillator::new();
        osc.period = 436.0; // ~110Hz at 48kHz
        group.bench_with_input(BenchmarkId::new("low", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.next_sample();
                }
                black_box(&mut buffer);
            })
        });

        // High note - a new impulse setup (sin, division) every few samples
        let mut osc = Oscillator::new();
        osc.period = 13.6; // ~3.5kHz at 48kHz
        group.bench_with_input(BenchmarkId::new("high", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.next_sample();
                }
                black_box(&mut buffer);
            })
        });

        // Integrated saw: two oscillators and a leaky integrator, as a voice runs them
        let mut osc1 = Oscillator::new();
        let mut osc2 = Oscillator::new();
        osc1.period = 218.0;
        osc2.period = 218.0 * 1.003;
        let mut saw = 0.0f32;
        group.bench_with_input(BenchmarkId::new("detuned_saw", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    saw = saw * 0.997 + osc1.next_sample() - osc2.next_sample();
                    *sample = saw;
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
