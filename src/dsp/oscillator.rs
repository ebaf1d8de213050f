use std::f32::consts::{FRAC_PI_4, PI};

/*
Band-Limited Impulse Oscillator
===============================

A naive sawtooth (a ramp that snaps back to the start) aliases badly: the
instant reset contains harmonics far above Nyquist, and they fold back down
into the audible range as inharmonic whine. This oscillator never produces
that snap. It generates a band-limited impulse train (BLIT) and lets the voice
integrate pairs of them into saw and pulse shapes.

Vocabulary
----------

  period      Samples per cycle. 100.0 at 48kHz is 480 Hz.

  phase       Position along the current impulse, in radians of the sinc
              argument. Runs 0 → phase_max → 0 (ping-pong), one round trip
              per cycle.

  inc         Phase step per sample. Slightly under π, which places one
              sinc zero crossing per sample and keeps every harmonic below
              Nyquist.

  modulation  Multiplier on the half period. Vibrato on the first oscillator,
              pulse width on the second.

  dc          Constant subtracted from every sample so the impulse train has
              zero mean. Without it, the leaky integrator in the voice would
              drift.


The Impulse
-----------

Each cycle plays one sinc pulse, sin(x) / x, sampled with step `inc`:

    1.0 ┤   ╷
        │  ╱ ╲
        │ ╱   ╲
    0.0 ┼╯─────╰╮╭─╮╭──────────────────────
        │       ╰╯ ╰╯    (ripples decay as 1/x)

The pulse is exactly band-limited: sin(x)/x sampled below Nyquist contains no
energy above it.


Sine Without sin()
------------------

Calling sin() every sample is expensive. For a sine sampled at a fixed step,
the next value follows from the previous two:

    sin(x + inc) = 2·cos(inc)·sin(x) - sin(x - inc)

So each cycle computes two seeds (`sin0`, `sin1`) and the coefficient
`dsin = 2·cos(inc)` once, near the origin of the pulse. Every other sample is
one multiply and one subtract.


Ping-Pong
---------

phase_max is chosen as an odd multiple of π/2 per half cycle, so reflecting the
phase at phase_max (phase = 2·phase_max - phase, inc = -inc) lands on a point
where sin() has the same value. The recursion keeps going undisturbed while
the divisor walks back toward zero, producing the symmetric tail of the next
impulse. When the phase re-enters the region near the origin (≤ π/4), the cycle
is re-planned from the current period and modulation.


Pulse Width
-----------

`square_wave()` starts a second oscillator half a period away from a live one.
Subtracting one impulse train from the other and integrating gives a pulse
wave; detuning or modulating the second one's half period moves the edges.

Precondition: period · modulation / 2 must stay well above a few samples.
Callers clamp periods to at least 6 samples.
*/

#[derive(Debug, Clone)]
pub struct Oscillator {
    pub amplitude: f32,
    pub period: f32,
    pub modulation: f32,

    phase: f32,
    phase_max: f32,
    inc: f32,
    sin0: f32,
    sin1: f32,
    dsin: f32,
    dc: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self {
            amplitude: 1.0,
            period: 0.0,
            modulation: 1.0,

            phase: 0.0,
            phase_max: 0.0,
            inc: 0.0,
            sin0: 0.0,
            sin1: 0.0,
            dsin: 0.0,
            dc: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.inc = 0.0;
        self.phase = 0.0;

        self.sin0 = 0.0;
        self.sin1 = 0.0;
        self.dsin = 0.0;

        self.dc = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let output;

        self.phase += self.inc;

        if self.phase <= FRAC_PI_4 {
            let half_period = (self.period / 2.0) * self.modulation;

            self.phase_max = (0.5 + half_period).floor() - 0.5;
            self.dc = 0.5 * self.amplitude / self.phase_max;
            self.phase_max *= PI;

            self.inc = self.phase_max / half_period;
            self.phase = -self.phase;

            self.sin0 = self.amplitude * self.phase.sin();
            self.sin1 = self.amplitude * (self.phase - self.inc).sin();
            self.dsin = 2.0 * self.inc.cos();

            output = if self.phase * self.phase > 1e-9 {
                self.sin0 / self.phase
            } else {
                self.amplitude
            };
        } else {
            if self.phase > self.phase_max {
                self.phase = self.phase_max + self.phase_max - self.phase;
                self.inc = -self.inc;
            }

            let sinp = self.dsin * self.sin0 - self.sin1;
            self.sin1 = self.sin0;
            self.sin0 = sinp;

            output = sinp / self.phase;
        }

        output - self.dc
    }

    /// Phase-lock this oscillator half a cycle (`new_period / 2`) behind
    /// `other`, continuing in whichever direction `other` is travelling.
    pub fn square_wave(&mut self, other: &Oscillator, new_period: f32) {
        self.reset();

        if other.inc > 0.0 {
            self.phase = other.phase_max + other.phase_max - other.phase;
            self.inc = -other.inc;
        } else if other.inc < 0.0 {
            self.phase = other.phase;
            self.inc = other.inc;
        } else {
            self.phase = -PI;
            self.inc = PI;
        }

        self.phase += PI * new_period / 2.0;
        self.phase_max = self.phase;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn increment(&self) -> f32 {
        self.inc
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}
