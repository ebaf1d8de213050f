#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeShape;
use crate::patch::Patch;

/// Sample rate assumed until the host calls `allocate_resources`.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// When a new note glides from the previous one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlideMode {
    /// Every note starts at its own pitch.
    #[default]
    Off,
    /// Glide only while another key is still held.
    Legato,
    /// Always glide from the last played note.
    Always,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyMode {
    /// One voice, legato retrigger with a held-note stack.
    Mono,
    /// All voices, quietest non-attacking voice is stolen.
    #[default]
    Poly,
}

/// Engine-ready performance parameters.
///
/// Every field is already in the unit the per-sample math consumes
/// (coefficients, multipliers, samples), so the audio thread never converts.
/// Build one with [`Patch::to_params`] and hand it to the synth at a block
/// boundary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    /// Noise level added to each voice before the filter.
    pub noise_mix: f32,
    /// Amplitude envelope coefficients, per sample.
    pub amp_env: EnvelopeShape,
    /// Filter envelope coefficients, per control tick.
    pub filter_env: EnvelopeShape,
    /// Period ratio of oscillator 2 to oscillator 1.
    pub detune: f32,
    /// Oscillator 2 level relative to oscillator 1.
    pub osc_mix: f32,
    /// Period in samples of MIDI note 0.
    pub tune: f32,
    /// Level compensation for mix, noise and resonance.
    pub volume_trim: f32,
    /// Cutoff change per velocity step away from 64.
    pub velocity_sensitivity: f32,
    /// Treat every note as velocity 80.
    pub ignore_velocity: bool,
    /// LFO phase increment per control tick, radians.
    pub lfo_inc: f32,
    /// Vibrato depth applied to oscillator 1.
    pub vibrato: f32,
    /// Pulse-width modulation depth applied to oscillator 2.
    pub pwm_depth: f32,
    pub glide_mode: GlideMode,
    /// Fraction of the remaining pitch distance covered per control tick.
    pub glide_rate: f32,
    /// Semitones a new note starts above (negative: below) its pitch.
    pub glide_bend: f32,
    /// Static filter offset, natural-log units.
    pub filter_keytracking: f32,
    pub filter_q: f32,
    pub filter_lfo_depth: f32,
    pub filter_env_depth: f32,
    /// Linear output gain.
    pub output_level: f32,
    pub poly_mode: PolyMode,
}

impl Default for SynthParams {
    fn default() -> Self {
        Patch::default().to_params(DEFAULT_SAMPLE_RATE)
    }
}
