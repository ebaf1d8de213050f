use std::f32::consts::FRAC_PI_4;

use crate::dsp::{envelope::Envelope, oscillator::Oscillator};

use super::filter::Filter;

const LEAK: f32 = 0.997;
const CENTER_PAN: f32 = 0.707;
const MIN_CUTOFF_HZ: f32 = 30.0;
const MAX_CUTOFF_HZ: f32 = 20_000.0;

/// Who a voice slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceIdentity {
    /// Not assigned to any key.
    #[default]
    Free,
    /// Playing a key that is still down.
    Held(u8),
    /// Key released while the sustain pedal was down.
    Sustained(u8),
}

impl VoiceIdentity {
    pub fn note(self) -> Option<u8> {
        match self {
            VoiceIdentity::Free => None,
            VoiceIdentity::Held(note) | VoiceIdentity::Sustained(note) => Some(note),
        }
    }
}

/// One note's worth of sound: two impulse oscillators integrated into a saw or
/// pulse, a ladder low-pass, and amplitude and filter envelopes.
///
/// `render` runs per sample; `update_lfo` runs per control tick. Pitch is
/// tracked as a period in samples so glide is a simple approach toward
/// `target`.
#[derive(Debug, Clone)]
pub struct Voice {
    pub(crate) identity: VoiceIdentity,
    pub(crate) saw: f32,
    pub(crate) period: f32,
    pub(crate) target: f32,
    pub(crate) pan_left: f32,
    pub(crate) pan_right: f32,
    pub(crate) glide_rate: f32,
    pub(crate) cutoff: f32,
    pub(crate) filter_mod: f32,
    pub(crate) filter_q: f32,
    pub(crate) pitch_bend: f32,
    pub(crate) filter_env_depth: f32,

    pub(crate) osc1: Oscillator,
    pub(crate) osc2: Oscillator,
    pub(crate) filter: Filter,

    pub(crate) env: Envelope,
    pub(crate) filter_env: Envelope,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            identity: VoiceIdentity::Free,
            saw: 0.0,
            period: 0.0,
            target: 0.0,
            pan_left: CENTER_PAN,
            pan_right: CENTER_PAN,
            glide_rate: 1.0,
            cutoff: 0.0,
            filter_mod: 0.0,
            filter_q: 1.0,
            pitch_bend: 1.0,
            filter_env_depth: 0.0,

            osc1: Oscillator::new(),
            osc2: Oscillator::new(),
            filter: Filter::new(),

            env: Envelope::new(),
            filter_env: Envelope::new(),
        }
    }

    /// Return the slot to the free pool with no leftover state.
    pub fn reset(&mut self) {
        self.identity = VoiceIdentity::Free;
        self.saw = 0.0;
        self.pan_left = CENTER_PAN;
        self.pan_right = CENTER_PAN;
        self.osc1.reset();
        self.osc2.reset();
        self.env.reset();
        self.filter.reset();
        self.filter_env.reset();
    }

    /// Produce one sample. Only call while the amplitude envelope is active.
    #[inline]
    pub fn render(&mut self, noise: f32) -> f32 {
        let sample1 = self.osc1.next_sample();
        let sample2 = self.osc2.next_sample();
        self.saw = self.saw * LEAK + sample1 - sample2;

        let output = self.filter.render(self.saw + noise);
        let envelope = self.env.next_value();

        output * envelope
    }

    pub fn release(&mut self) {
        self.env.release();
        self.filter_env.release();
    }

    /// Constant-power pan, two octaves either side of middle C spread to the
    /// edges.
    pub fn update_panning(&mut self, note: u8) {
        let panning = ((note as f32 - 60.0) / 24.0).clamp(-1.0, 1.0);
        self.pan_left = (FRAC_PI_4 * (1.0 - panning)).sin();
        self.pan_right = (FRAC_PI_4 * (1.0 + panning)).sin();
    }

    /// Control-rate update: glide, filter envelope and cutoff.
    pub fn update_lfo(&mut self) {
        self.period += self.glide_rate * (self.target - self.period);

        let fenv = self.filter_env.next_value();

        let modulated_cutoff = self.cutoff
            * (self.filter_mod + self.filter_env_depth + fenv).exp()
            / self.pitch_bend;

        let modulated_cutoff = modulated_cutoff.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        self.filter
            .update_coefficients(modulated_cutoff, self.filter_q);
    }

    /// Push the gliding period, bent and detuned, into the oscillators.
    #[inline]
    pub fn apply_pitch(&mut self, pitch_bend: f32, detune: f32) {
        self.osc1.period = self.period * pitch_bend;
        self.osc2.period = self.osc1.period * detune;
    }

    pub fn identity(&self) -> VoiceIdentity {
        self.identity
    }

    pub fn note(&self) -> Option<u8> {
        self.identity.note()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.filter_env
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn target_period(&self) -> f32 {
        self.target
    }

    pub fn pan(&self) -> (f32, f32) {
        (self.pan_left, self.pan_right)
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn filter_cutoff_hz(&self) -> f32 {
        self.filter.cutoff_hz()
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::EnvelopeShape;

    fn playing_voice() -> Voice {
        let mut voice = Voice::new();
        voice.filter.prepare(48_000.0);
        voice.identity = VoiceIdentity::Held(60);
        voice.period = 100.0;
        voice.target = 100.0;
        voice.cutoff = 2_000.0;
        voice.osc1.amplitude = 0.5;
        voice.apply_pitch(1.0, 1.0);
        voice.env.set_shape(EnvelopeShape {
            attack: 0.9,
            decay: 0.999,
            sustain: 0.8,
            release: 0.99,
        });
        voice.env.attack();
        voice
    }

    #[test]
    fn panning_is_constant_power() {
        let mut voice = Voice::new();
        for note in [0u8, 36, 60, 72, 84, 127] {
            voice.update_panning(note);
            let (left, right) = voice.pan();
            assert!((left * left + right * right - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn panning_spreads_two_octaves() {
        let mut voice = Voice::new();

        voice.update_panning(60);
        let (left, right) = voice.pan();
        assert!((left - right).abs() < 1e-6);

        voice.update_panning(84);
        let (left, right) = voice.pan();
        assert!(left.abs() < 1e-6 && (right - 1.0).abs() < 1e-6);

        voice.update_panning(20);
        let (left, right) = voice.pan();
        assert!((left - 1.0).abs() < 1e-6 && right.abs() < 1e-6);
    }

    #[test]
    fn glide_approaches_target() {
        let mut voice = playing_voice();
        voice.period = 200.0;
        voice.glide_rate = 0.5;

        voice.update_lfo();
        assert!((voice.period() - 150.0).abs() < 1e-4);

        voice.update_lfo();
        assert!((voice.period() - 125.0).abs() < 1e-4);
    }

    #[test]
    fn cutoff_is_clamped_to_audible_range() {
        let mut voice = playing_voice();

        voice.filter_mod = 20.0;
        voice.update_lfo();
        assert_eq!(voice.filter_cutoff_hz(), MAX_CUTOFF_HZ);

        voice.filter_mod = -20.0;
        voice.update_lfo();
        assert_eq!(voice.filter_cutoff_hz(), MIN_CUTOFF_HZ);
    }

    #[test]
    fn pitch_bend_lowers_cutoff() {
        let mut voice = playing_voice();
        voice.pitch_bend = 2.0;

        voice.update_lfo();

        assert!((voice.filter_cutoff_hz() - 1_000.0).abs() < 1.0);
    }

    #[test]
    fn apply_pitch_detunes_second_oscillator() {
        let mut voice = playing_voice();
        voice.period = 120.0;

        voice.apply_pitch(0.5, 2.0);

        assert_eq!(voice.osc1.period, 60.0);
        assert_eq!(voice.osc2.period, 120.0);
    }

    #[test]
    fn renders_sound_while_active() {
        let mut voice = playing_voice();
        voice.update_lfo();

        let energy: f32 = (0..2_000).map(|_| voice.render(0.0).abs()).sum();

        assert!(energy > 1.0, "expected audible output, got {energy}");
    }

    #[test]
    fn release_silences_eventually() {
        let mut voice = playing_voice();
        voice.filter_env.set_shape(EnvelopeShape {
            attack: 0.5,
            decay: 0.5,
            sustain: 0.0,
            release: 0.5,
        });
        voice.filter_env.attack();
        for _ in 0..500 {
            voice.render(0.0);
        }

        voice.release();
        assert!(!voice.envelope().is_in_attack());
        assert!(!voice.filter_envelope().is_in_attack());

        let mut samples = 0;
        while voice.is_active() {
            voice.render(0.0);
            samples += 1;
            assert!(samples < 10_000);
        }
    }

    #[test]
    fn reset_frees_slot() {
        let mut voice = playing_voice();
        voice.update_panning(80);
        for _ in 0..100 {
            voice.render(0.1);
        }

        voice.reset();

        assert_eq!(voice.identity(), VoiceIdentity::Free);
        assert_eq!(voice.note(), None);
        assert!(!voice.is_active());
        assert_eq!(voice.pan(), (CENTER_PAN, CENTER_PAN));
        assert_eq!(voice.saw, 0.0);
    }
}
