//! Benchmarks for the white noise source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::dsp::noise::NoiseGenerator;

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut noise = NoiseGenerator::new();

        group.bench_with_input(BenchmarkId::new("white", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = noise.next_value();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
