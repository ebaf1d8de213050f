#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::envelope::EnvelopeShape;
use crate::dsp::lfo::CONTROL_INTERVAL;
use crate::synth::params::{GlideMode, PolyMode, SynthParams};

/*
Patch
=====

A patch is what a player edits: knob positions in musical units (percent,
semitones, cents, decibels). The engine never reads these directly. Calling
`to_params(sample_rate)` folds every knob into the coefficients the audio
thread consumes, so all exp() and pow() work happens once per edit instead of
once per sample.

    Patch (knobs) ──validate()──▶ to_params(fs) ──▶ SynthParams ──▶ Synth

Time Knobs
----------

Envelope and glide knobs run 0 to 100 and map to a time constant on a
logarithmic curve, then to a one-pole coefficient:

    rate        = exp(5.5 - 0.075 · knob)          (per second)
    coefficient = exp(-rate / update_rate)

The amplitude envelope updates every sample; the filter envelope only on
control ticks, so its update rate is fs / 32.
*/

const SEMITONE: f32 = 1.059_463_1;
const PITCH_SCALE: f32 = 0.057_762_265;
/// Semitone offset that puts MIDI note 0 at the right period for A440.
const TUNE_OFFSET: f32 = -36.3763;
const MIN_RELEASE_COEFFICIENT: f32 = 0.75;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("invalid patch json: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,

    /// Oscillator 2 level, percent.
    pub osc_mix: f32,
    /// Oscillator 2 offset, semitones.
    pub osc_tune: f32,
    /// Oscillator 2 offset, cents.
    pub osc_fine: f32,

    pub glide_mode: GlideMode,
    pub glide_rate: f32,
    /// Semitones.
    pub glide_bend: f32,

    pub filter_freq: f32,
    pub filter_reso: f32,
    /// Filter envelope amount, -100 to 100.
    pub filter_env: f32,
    pub filter_lfo: f32,
    /// Below -90 velocity is ignored entirely.
    pub filter_velocity: f32,

    pub filter_attack: f32,
    pub filter_decay: f32,
    pub filter_sustain: f32,
    pub filter_release: f32,

    pub env_attack: f32,
    pub env_decay: f32,
    pub env_sustain: f32,
    pub env_release: f32,

    /// 0 to 1, mapped exponentially to roughly 0.02 to 20 Hz.
    pub lfo_rate: f32,
    /// Positive values give vibrato, negative values pulse-width modulation.
    pub vibrato: f32,
    pub noise: f32,

    /// Whole octaves.
    pub octave: f32,
    /// Master tuning, cents.
    pub tuning: f32,
    /// Decibels.
    pub output_level: f32,

    pub poly_mode: PolyMode,
}

impl Default for Patch {
    fn default() -> Self {
        Self {
            name: String::from("Init"),

            osc_mix: 0.0,
            osc_tune: -12.0,
            osc_fine: 0.0,

            glide_mode: GlideMode::Off,
            glide_rate: 35.0,
            glide_bend: 0.0,

            filter_freq: 100.0,
            filter_reso: 15.0,
            filter_env: 50.0,
            filter_lfo: 0.0,
            filter_velocity: 0.0,

            filter_attack: 0.0,
            filter_decay: 30.0,
            filter_sustain: 0.0,
            filter_release: 25.0,

            env_attack: 0.0,
            env_decay: 50.0,
            env_sustain: 100.0,
            env_release: 30.0,

            lfo_rate: 0.81,
            vibrato: 0.0,
            noise: 0.0,

            octave: 0.0,
            tuning: 0.0,
            output_level: 0.0,

            poly_mode: PolyMode::Poly,
        }
    }
}

impl Patch {
    /// Parse a patch from JSON. Missing knobs take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, PatchError> {
        let patch: Patch = serde_json::from_str(json)?;
        patch.validate()?;
        Ok(patch)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, PatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every knob is finite and inside its range.
    pub fn validate(&self) -> Result<(), PatchError> {
        let knobs = [
            ("osc_mix", self.osc_mix, 0.0, 100.0),
            ("osc_tune", self.osc_tune, -24.0, 24.0),
            ("osc_fine", self.osc_fine, -50.0, 50.0),
            ("glide_rate", self.glide_rate, 0.0, 100.0),
            ("glide_bend", self.glide_bend, -36.0, 36.0),
            ("filter_freq", self.filter_freq, 0.0, 100.0),
            ("filter_reso", self.filter_reso, 0.0, 100.0),
            ("filter_env", self.filter_env, -100.0, 100.0),
            ("filter_lfo", self.filter_lfo, 0.0, 100.0),
            ("filter_velocity", self.filter_velocity, -100.0, 100.0),
            ("filter_attack", self.filter_attack, 0.0, 100.0),
            ("filter_decay", self.filter_decay, 0.0, 100.0),
            ("filter_sustain", self.filter_sustain, 0.0, 100.0),
            ("filter_release", self.filter_release, 0.0, 100.0),
            ("env_attack", self.env_attack, 0.0, 100.0),
            ("env_decay", self.env_decay, 0.0, 100.0),
            ("env_sustain", self.env_sustain, 0.0, 100.0),
            ("env_release", self.env_release, 0.0, 100.0),
            ("lfo_rate", self.lfo_rate, 0.0, 1.0),
            ("vibrato", self.vibrato, -100.0, 100.0),
            ("noise", self.noise, 0.0, 100.0),
            ("octave", self.octave, -2.0, 2.0),
            ("tuning", self.tuning, -100.0, 100.0),
            ("output_level", self.output_level, -24.0, 6.0),
        ];

        for (field, value, min, max) in knobs {
            if !value.is_finite() {
                return Err(PatchError::NotFinite { field });
            }
            if !(min..=max).contains(&value) {
                return Err(PatchError::OutOfRange {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }

        Ok(())
    }

    /// Fold the knobs into engine coefficients for `sample_rate`.
    pub fn to_params(&self, sample_rate: f32) -> SynthParams {
        let inverse_sample_rate = 1.0 / sample_rate;
        let inverse_update_rate = CONTROL_INTERVAL as f32 * inverse_sample_rate;

        let noise_mix = {
            let noise = self.noise / 100.0;
            0.06 * noise * noise
        };
        let osc_mix = self.osc_mix / 100.0;
        let filter_reso = self.filter_reso / 100.0;

        let amp_env = EnvelopeShape {
            attack: time_coefficient(self.env_attack, inverse_sample_rate),
            decay: time_coefficient(self.env_decay, inverse_sample_rate),
            sustain: self.env_sustain / 100.0,
            release: if self.env_release < 1.0 {
                MIN_RELEASE_COEFFICIENT
            } else {
                time_coefficient(self.env_release, inverse_sample_rate)
            },
        };

        let filter_sustain = self.filter_sustain / 100.0;
        let filter_env = EnvelopeShape {
            attack: time_coefficient(self.filter_attack, inverse_update_rate),
            decay: time_coefficient(self.filter_decay, inverse_update_rate),
            sustain: filter_sustain * filter_sustain,
            release: time_coefficient(self.filter_release, inverse_update_rate),
        };

        let tune_in_semitones = TUNE_OFFSET - 12.0 * self.octave - self.tuning / 100.0;

        let (ignore_velocity, velocity_sensitivity) = if self.filter_velocity < -90.0 {
            (true, 0.0)
        } else {
            (false, 0.0005 * self.filter_velocity)
        };

        let lfo_hz = (7.0 * self.lfo_rate - 4.0).exp();

        let vibrato_amount = self.vibrato / 200.0;
        let pwm_depth = 0.2 * vibrato_amount * vibrato_amount;
        let vibrato = if vibrato_amount < 0.0 { 0.0 } else { pwm_depth };

        let glide_rate = if self.glide_rate < 2.0 {
            1.0
        } else {
            1.0 - (-inverse_update_rate * (6.0 - 0.07 * self.glide_rate).exp()).exp()
        };

        let filter_lfo = self.filter_lfo / 100.0;

        SynthParams {
            noise_mix,
            amp_env,
            filter_env,
            detune: SEMITONE.powf(-self.osc_tune - 0.01 * self.osc_fine),
            osc_mix,
            tune: sample_rate * (PITCH_SCALE * tune_in_semitones).exp(),
            volume_trim: 0.0008 * (3.2 - osc_mix - 25.0 * noise_mix) * (1.5 - 0.5 * filter_reso),
            velocity_sensitivity,
            ignore_velocity,
            lfo_inc: lfo_hz * inverse_update_rate * std::f32::consts::TAU,
            vibrato,
            pwm_depth,
            glide_mode: self.glide_mode,
            glide_rate,
            glide_bend: self.glide_bend,
            filter_keytracking: 0.08 * self.filter_freq - 1.5,
            filter_q: (3.0 * filter_reso).exp(),
            filter_lfo_depth: 2.5 * filter_lfo * filter_lfo,
            filter_env_depth: 0.06 * self.filter_env,
            output_level: 10f32.powf(self.output_level / 20.0),
            poly_mode: self.poly_mode,
        }
    }
}

/// One-pole coefficient for a 0..100 time knob at the given update period.
fn time_coefficient(knob: f32, inverse_update_rate: f32) -> f32 {
    (-inverse_update_rate * (5.5 - 0.075 * knob).exp()).exp()
}
