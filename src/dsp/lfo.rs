//! Control-rate sine LFO.

use std::f32::consts::{PI, TAU};

/*
Control-Rate LFO
================

Vibrato, pulse-width modulation and filter sweeps all move slowly compared to
audio, so the modulation source only needs to update every few milliseconds.
This LFO advances once every CONTROL_INTERVAL samples and the synth applies
its value to every voice at that moment. Between ticks, nothing is recomputed.

    samples  ──┬──────────────────────────────┬─────────────────────── ▶
               tick                           tick
               (sin, glide, filter env,       (32 samples later)
                cutoff update)

At 48kHz a 32-sample interval is 1500 updates per second: far beyond what the
ear resolves as stepping for vibrato, and 32x cheaper than per-sample exp()
and sin() calls for every voice.

Unlike the audio oscillators, the LFO is a plain phase accumulator wrapped to
[-π, π] and fed to sin(). Aliasing is irrelevant at these rates. The phase
increment is given per tick, not per sample.
*/

/// Samples between LFO updates.
pub const CONTROL_INTERVAL: u32 = 32;

#[derive(Debug, Clone, Default)]
pub struct Lfo {
    phase: f32,
    countdown: u32,
}

impl Lfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart at phase zero. The next `tick()` fires immediately.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.countdown = 0;
    }

    /// Count one sample. Returns the new LFO value when a control tick fires,
    /// advancing the phase by `inc` radians.
    #[inline]
    pub fn tick(&mut self, inc: f32) -> Option<f32> {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return None;
        }

        self.countdown = CONTROL_INTERVAL;

        self.phase += inc;
        if self.phase > PI {
            self.phase -= TAU;
        }

        Some(self.phase.sin())
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}
