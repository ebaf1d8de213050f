//! Benchmarks for the exponential ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::envelope::{Envelope, EnvelopeShape};

use crate::BLOCK_SIZES;

fn coefficient(seconds: f32) -> f32 {
    (-1.0 / (seconds * 48_000.0)).exp()
}

fn shape(attack: f32, decay: f32, sustain: f32, release: f32) -> EnvelopeShape {
    EnvelopeShape {
        attack: coefficient(attack),
        decay: coefficient(decay),
        sustain,
        release: coefficient(release),
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (stage check on every sample)
        let mut env = Envelope::with_shape(shape(1.0, 0.1, 0.7, 0.3));
        env.attack();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_value();
                }
                black_box(&mut buffer);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::with_shape(shape(0.001, 0.001, 0.7, 0.3));
        env.attack();
        // Advance past attack/decay
        for _ in 0..2_000 {
            env.next_value();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_value();
                }
                black_box(&mut buffer);
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::with_shape(shape(0.001, 0.001, 0.7, 10.0));
        env.attack();
        for _ in 0..2_000 {
            env.next_value();
        }
        env.release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_value();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
