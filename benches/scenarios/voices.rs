//! Benchmarks for whole-synth renders.
//!
//! These model what a host actually asks for: a stereo block with some
//! number of sounding voices, modulation running, and messages applied at
//! the block boundary.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_poly::{
    synth::{GlideMode, PolyMode},
    Patch, Synth, MAX_BLOCK_SIZE,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn synth_with(patch: &Patch) -> Synth {
    let mut synth = Synth::new();
    synth.allocate_resources(SAMPLE_RATE, MAX_BLOCK_SIZE);
    synth.set_params(patch.to_params(SAMPLE_RATE));
    synth.reset();
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === IDLE ===
        // Nothing playing: the cost of the per-sample loop, LFO and guard alone
        let mut synth = synth_with(&Patch::default());
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right[..])));
            })
        });

        // === SINGLE NOTE ===
        // Baseline for what one voice costs
        let mut synth = synth_with(&Patch::default());
        synth.note_on(45, 100);
        group.bench_with_input(BenchmarkId::new("single_note", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right[..])));
            })
        });

        // === FULL POLY ===
        // All eight voices sounding with vibrato, noise and detuned osc 2
        let pad = Patch {
            osc_mix: 60.0,
            osc_fine: 8.0,
            osc_tune: 0.0,
            vibrato: 30.0,
            noise: 10.0,
            filter_lfo: 40.0,
            env_release: 60.0,
            ..Patch::default()
        };
        let mut synth = synth_with(&pad);
        for note in [48, 52, 55, 59, 62, 64, 67, 71] {
            synth.note_on(note, 90);
        }
        group.bench_with_input(BenchmarkId::new("poly_8_voices", size), &size, |b, _| {
            b.iter(|| {
                synth.render(black_box(&mut left), Some(black_box(&mut right[..])));
            })
        });

        // === MONO GLIDE ===
        // One voice walking between two notes, retriggered every block
        let lead = Patch {
            poly_mode: PolyMode::Mono,
            glide_mode: GlideMode::Always,
            glide_rate: 60.0,
            vibrato: -40.0, // pulse-width modulation
            osc_mix: 100.0,
            ..Patch::default()
        };
        let mut synth = synth_with(&lead);
        synth.note_on(60, 100);
        let mut high = false;
        group.bench_with_input(BenchmarkId::new("mono_glide", size), &size, |b, _| {
            b.iter(|| {
                high = !high;
                if high {
                    synth.note_on(72, 100);
                } else {
                    synth.note_off(72);
                }
                synth.render(black_box(&mut left), None);
            })
        });
    }

    group.finish();
}
