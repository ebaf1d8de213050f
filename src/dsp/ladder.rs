use std::f32::consts::TAU;

use super::smoother::LinearSmoother;

/*
Ladder Filter
=============

The classic transistor-ladder low-pass: four one-pole stages in series with
the last stage fed back, inverted, into the input. The feedback is what gives
the ladder its resonant peak; pushed far enough the filter rings at cutoff.

Vocabulary
----------

  pole        One first-order low-pass stage (-6 dB/octave). Four in series
              roll off at -24 dB/octave.

  tap         The output of a stage. Reading after two stages gives a gentler
              12 dB/octave slope with the same resonance behaviour.

  resonance   Feedback amount, 0.0 to 1.0. Mapped to 0.1..1.0 internally so
              there's always a touch of feedback.

  drive       Input gain into the saturator. Higher drive means more tanh
              compression and grit; output gain compensates so loudness stays
              roughly constant.

  transform   Cutoff is stored as exp(-2π·fc/fs), the pole position of a
              one-pole stage. That's the quantity the per-sample math uses,
              so smoothing happens on it directly.


Signal Flow
-----------

    input ─▶ tanh ─▶(+)─▶ [pole] ─▶ [pole] ─▶ [pole] ─▶ [pole] ─┬─▶
                     ▲                  │                        │
                     │                LPF12                   LPF24
                     └──── -4·k · tanh(feedback) ◀───────────────┘

Each stage mixes its previous input and output:

    y[n] = b1·x[n-1] + a1·y[n-1] + b0·x[n]       g = 1 - a1

with b0 ≈ 0.769·g and b1 ≈ 0.231·g, a slight zero that sharpens the top end
compared to a plain one-pole.

Cutoff and resonance are ramped over 50ms so modulation at control rate
doesn't zipper.
*/

const SMOOTHING_SECONDS: f32 = 0.05;
const DEFAULT_DRIVE: f32 = 1.2;
const DEFAULT_CUTOFF_HZ: f32 = 200.0;

/// Which stage the output is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LadderMode {
    /// Two-pole tap, 12 dB/octave.
    #[default]
    Lpf12,
    /// Four-pole tap, 24 dB/octave.
    Lpf24,
}

impl LadderMode {
    fn taps(self) -> [f32; 5] {
        match self {
            LadderMode::Lpf12 => [0.0, 0.0, 1.0, 0.0, 0.0],
            LadderMode::Lpf24 => [0.0, 0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct LadderFilter {
    state: [f32; 5],
    taps: [f32; 5],
    mode: LadderMode,

    cutoff_hz: f32,
    cutoff_scaler: f32,
    cutoff_transform: LinearSmoother,
    scaled_resonance: LinearSmoother,
    cutoff_transform_value: f32,
    scaled_resonance_value: f32,

    drive: f32,
    drive2: f32,
    gain: f32,
    gain2: f32,
    comp: f32,
}

impl LadderFilter {
    pub fn new() -> Self {
        let mut filter = Self {
            state: [0.0; 5],
            taps: LadderMode::default().taps(),
            mode: LadderMode::default(),

            cutoff_hz: DEFAULT_CUTOFF_HZ,
            cutoff_scaler: 0.0,
            cutoff_transform: LinearSmoother::new(0.0),
            scaled_resonance: LinearSmoother::new(0.0),
            cutoff_transform_value: 0.0,
            scaled_resonance_value: 0.0,

            drive: 0.0,
            drive2: 0.0,
            gain: 0.0,
            gain2: 0.0,
            comp: 0.5,
        };

        filter.set_drive(DEFAULT_DRIVE);
        filter.set_resonance(0.0);
        filter.prepare(44_100.0);
        filter
    }

    /// Set the sample rate. Not realtime-safe to call while rendering.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.cutoff_scaler = -TAU / sample_rate;
        self.cutoff_transform.reset(sample_rate, SMOOTHING_SECONDS);
        self.scaled_resonance.reset(sample_rate, SMOOTHING_SECONDS);
        self.update_cutoff();
        self.reset();
    }

    /// Clear the stage memory and jump the smoothers to their targets.
    pub fn reset(&mut self) {
        self.state = [0.0; 5];

        self.cutoff_transform
            .set_current_and_target(self.cutoff_transform.target());
        self.scaled_resonance
            .set_current_and_target(self.scaled_resonance.target());
        self.cutoff_transform_value = self.cutoff_transform.current();
        self.scaled_resonance_value = self.scaled_resonance.current();
    }

    pub fn set_mode(&mut self, mode: LadderMode) {
        self.mode = mode;
        self.taps = mode.taps();
    }

    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.update_cutoff();
    }

    /// Feedback amount in 0.0..=1.0.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.scaled_resonance.set_target(0.1 + 0.9 * resonance);
    }

    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive;
        self.gain = drive.powf(-2.642) * 0.6103 + 0.3903;
        self.drive2 = drive * 0.04 + 0.96;
        self.gain2 = self.drive2.powf(-2.642) * 0.6103 + 0.3903;
    }

    /// Advance cutoff and resonance ramps by one sample.
    #[inline]
    pub fn update_smoothers(&mut self) {
        self.cutoff_transform_value = self.cutoff_transform.next_value();
        self.scaled_resonance_value = self.scaled_resonance.next_value();
    }

    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let s = &mut self.state;

        let a1 = self.cutoff_transform_value;
        let g = 1.0 - a1;
        let b0 = g * 0.769_230_77;
        let b1 = g * 0.230_769_23;

        let dx = self.gain * (self.drive * input).tanh();
        let a = dx
            + self.scaled_resonance_value
                * -4.0
                * (self.gain2 * (self.drive2 * s[4]).tanh() - dx * self.comp);

        let b = b1 * s[0] + a1 * s[1] + b0 * a;
        let c = b1 * s[1] + a1 * s[2] + b0 * b;
        let d = b1 * s[2] + a1 * s[3] + b0 * c;
        let e = b1 * s[3] + a1 * s[4] + b0 * d;

        *s = [a, b, c, d, e];

        let t = &self.taps;
        a * t[0] + b * t[1] + c * t[2] + d * t[3] + e * t[4]
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn mode(&self) -> LadderMode {
        self.mode
    }

    fn update_cutoff(&mut self) {
        self.cutoff_transform
            .set_target((self.cutoff_hz * self.cutoff_scaler).exp());
    }
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new()
    }
}
