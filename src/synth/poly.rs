use std::f32::consts::PI;

use log::debug;

use crate::dsp::{guard::sanitize_block, lfo::Lfo, noise::NoiseGenerator, smoother::LinearSmoother};
use crate::io::midi::{cc, MidiEvent};

use super::held::HeldNotes;
use super::message::{MessageReceiver, SynthMessage};
use super::params::{GlideMode, PolyMode, SynthParams, DEFAULT_SAMPLE_RATE};
use super::voice::{Voice, VoiceIdentity};

/*
Polyphonic Synth
================

Owns the eight voices and everything shared between them: the noise source,
the LFO, the output level ramp and the MIDI performance state. The host drives
it in two alternating steps, never overlapping:

    ┌────────────────────┐     ┌──────────────────────┐
    │ process_messages() │ ──▶ │ render(left, right)  │ ──▶ (next block)
    │ MIDI, params       │     │ per-sample voice sum │
    └────────────────────┘     └──────────────────────┘

Vocabulary
----------

  period        Pitch is stored as samples per cycle, not Hz. Higher notes have
                shorter periods; an octave up halves the period.

  tune          Period of MIDI note 0 at the current sample rate. Every other
                note is derived from it with one exp().

  analog        Each voice slot is detuned by a tiny fixed amount (0.002
                semitone per slot index) so stacked notes beat slightly.

  stealing      With every slot busy, a new note takes the quietest voice that
                is not still in its attack. If all eight are attacking, slot 0.

  legato        In mono mode, a key pressed while another is held retargets
                the one voice instead of retriggering it. Released keys fall
                back down the held-note stack.


Pitch Math
----------

    period(note) = tune · exp(-ln2/12 · (note + 0.002·slot))

doubled until both oscillators stay above 6 samples per cycle. Glide starts
the voice at

    period · 2^((note - last_note - glide_bend) / 12)

and update_lfo() walks it toward the target once per control tick.
*/

/// Number of voice slots.
pub const MAX_VOICES: usize = 8;

const PITCH_SCALE: f32 = 0.057_762_265;
const ANALOG: f32 = 0.002;
const SEMITONE: f32 = 1.059_463_1;
const MIN_PERIOD: f32 = 6.0;
const OUTPUT_RAMP_SECONDS: f32 = 0.05;
const FIXED_VELOCITY: u8 = 80;

pub struct Synth {
    params: SynthParams,
    sample_rate: f32,

    voices: [Voice; MAX_VOICES],
    noise: NoiseGenerator,
    lfo: Lfo,
    output_level: LinearSmoother,
    held_notes: HeldNotes<{ MAX_VOICES - 1 }>,

    sustain_pedal: bool,
    last_note: Option<u8>,
    pitch_bend: f32,
    mod_wheel: f32,
    pressure: f32,
    filter_ctl: f32,
    filter_zip: f32,
}

impl Synth {
    pub fn new() -> Self {
        let params = SynthParams::default();

        let mut synth = Self {
            params,
            sample_rate: DEFAULT_SAMPLE_RATE,

            voices: std::array::from_fn(|_| Voice::new()),
            noise: NoiseGenerator::new(),
            lfo: Lfo::new(),
            output_level: LinearSmoother::new(params.output_level),
            held_notes: HeldNotes::new(),

            sustain_pedal: false,
            last_note: None,
            pitch_bend: 1.0,
            mod_wheel: 0.0,
            pressure: 0.0,
            filter_ctl: 0.0,
            filter_zip: 0.0,
        };

        synth.prepare_voices();
        synth.reset();
        synth
    }

    /// Prepare for playback at `sample_rate`. Not realtime-safe.
    ///
    /// The current [`SynthParams`] were computed for some sample rate; pass
    /// a fresh `Patch::to_params(sample_rate)` afterwards if it changed.
    pub fn allocate_resources(&mut self, sample_rate: f32, max_block_size: usize) {
        debug!(
            "allocating {MAX_VOICES} voices at {sample_rate} Hz, blocks up to {max_block_size} samples"
        );

        self.sample_rate = sample_rate;
        self.prepare_voices();
    }

    pub fn deallocate_resources(&mut self) {
        debug!("releasing synth resources");
    }

    /// Silence everything and return to the power-on performance state.
    pub fn reset(&mut self) {
        debug!("resetting synth");

        self.pitch_bend = 1.0;
        self.sustain_pedal = false;
        self.output_level.reset(self.sample_rate, OUTPUT_RAMP_SECONDS);
        self.lfo.reset();
        self.mod_wheel = 0.0;
        self.last_note = None;
        self.pressure = 0.0;
        self.filter_ctl = 0.0;
        self.filter_zip = 0.0;
        self.held_notes.clear();

        for voice in &mut self.voices {
            voice.reset();
        }

        self.noise.reset();
    }

    /// Swap in a new parameter snapshot. Call between blocks only.
    pub fn set_params(&mut self, params: SynthParams) {
        self.params = params;
        self.output_level.set_target(params.output_level);
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Render one block. With `right` present both channels are written;
    /// without it `left` receives the mono sum. The two slices must be the
    /// same length.
    pub fn render(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        let pitch_bend = self.pitch_bend;
        let params = self.params;

        for voice in self.voices.iter_mut().filter(|voice| voice.is_active()) {
            voice.apply_pitch(pitch_bend, params.detune);
            voice.glide_rate = params.glide_rate;
            voice.filter_q = params.filter_q;
            voice.pitch_bend = pitch_bend;
            voice.filter_env_depth = params.filter_env_depth;
        }

        match right {
            Some(right) => {
                debug_assert_eq!(left.len(), right.len());

                for (out_left, out_right) in left.iter_mut().zip(right.iter_mut()) {
                    let (sample_left, sample_right) = self.next_frame();
                    *out_left = sample_left;
                    *out_right = sample_right;
                }

                sanitize_block(right);
            }
            None => {
                for out in left.iter_mut() {
                    let (sample_left, sample_right) = self.next_frame();
                    *out = (sample_left + sample_right) * 0.5;
                }
            }
        }

        for voice in self.voices.iter_mut().filter(|voice| !voice.is_active()) {
            voice.env.reset();
            voice.filter.reset();
        }

        sanitize_block(left);
    }

    /// Handle one raw three-byte MIDI message.
    pub fn midi_message(&mut self, status: u8, data1: u8, data2: u8) {
        if let Some(event) = MidiEvent::parse(status, data1, data2) {
            self.handle_event(event);
        }
    }

    /// All channels are treated alike.
    pub fn handle_event(&mut self, event: MidiEvent) {
        match event {
            MidiEvent::NoteOn { key, velocity, .. } => self.note_on(key, velocity),
            MidiEvent::NoteOff { key, .. } => self.note_off(key),
            MidiEvent::ControlChange {
                controller, value, ..
            } => self.control_change(controller, value),
            MidiEvent::PitchBend { value, .. } => {
                self.pitch_bend = (-0.000_014_102 * value as f32).exp();
            }
            MidiEvent::ChannelPressure { pressure, .. } => {
                let pressure = pressure as f32;
                self.pressure = 0.0001 * pressure * pressure;
            }
        }
    }

    /// Drain every pending message. Call between blocks.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            match message {
                SynthMessage::Midi([status, data1, data2]) => {
                    self.midi_message(status, data1, data2)
                }
                SynthMessage::Params(params) => self.set_params(params),
                SynthMessage::AllNotesOff => self.all_notes_off(),
            }
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let velocity = if self.params.ignore_velocity {
            FIXED_VELOCITY
        } else {
            velocity
        };

        let v = match self.params.poly_mode {
            PolyMode::Mono => {
                if let VoiceIdentity::Held(current) = self.voices[0].identity {
                    self.held_notes.push(current);
                    for voice in &mut self.voices[1..] {
                        voice.release();
                        voice.identity = VoiceIdentity::Free;
                    }
                    self.restart_mono_voice(note, Some(velocity));
                    return;
                }
                0
            }
            PolyMode::Poly => self.find_free_voice(),
        };

        self.start_voice(v, note, velocity);
    }

    pub fn note_off(&mut self, note: u8) {
        if self.params.poly_mode == PolyMode::Mono
            && self.voices[0].identity == VoiceIdentity::Held(note)
        {
            if let Some(queued) = self.held_notes.pop() {
                self.restart_mono_voice(queued, None);
            }
        }

        self.held_notes.remove(note);

        let sustain = self.sustain_pedal;
        for voice in self
            .voices
            .iter_mut()
            .filter(|voice| voice.identity == VoiceIdentity::Held(note))
        {
            if sustain {
                voice.identity = VoiceIdentity::Sustained(note);
            } else {
                voice.release();
                voice.identity = VoiceIdentity::Free;
            }
        }
    }

    pub fn control_change(&mut self, controller: u8, value: u8) {
        let amount = value as f32;

        match controller {
            cc::MOD_WHEEL => self.mod_wheel = 0.000_005 * amount * amount,
            cc::SUSTAIN => {
                self.sustain_pedal = value >= 64;
                if !self.sustain_pedal {
                    self.release_sustained();
                }
            }
            cc::BRIGHTNESS => self.filter_ctl = 0.02 * amount,
            cc::RESONANCE => self.filter_ctl = -0.03 * amount,
            controller if controller >= cc::CHANNEL_MODE => self.all_notes_off(),
            _ => {}
        }
    }

    /// Index of the slot the next poly note should take: the quietest voice
    /// not in its attack, ties to the lowest index, slot 0 if all attack.
    pub fn find_free_voice(&self) -> usize {
        let mut v = 0;
        let mut quietest = 100.0;

        for (index, voice) in self.voices.iter().enumerate() {
            let level = voice.env.level();
            if level < quietest && !voice.env.is_in_attack() {
                quietest = level;
                v = index;
            }
        }

        v
    }

    /// Oscillator period in samples for `note` played on slot `v`.
    pub fn calc_period(&self, v: usize, note: u8) -> f32 {
        debug_assert!(self.params.tune > 0.0 && self.params.detune > 0.0);

        let mut period =
            self.params.tune * (-PITCH_SCALE * (note as f32 + ANALOG * v as f32)).exp();

        while period > 0.0 && (period < MIN_PERIOD || period * self.params.detune < MIN_PERIOD) {
            period += period;
        }

        period
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn sustain_pedal(&self) -> bool {
        self.sustain_pedal
    }

    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    pub fn mod_wheel(&self) -> f32 {
        self.mod_wheel
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|voice| voice.is_active()).count()
    }

    /// Mono legato stack, oldest first.
    pub fn held_notes(&self) -> &[u8] {
        self.held_notes.as_slice()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn prepare_voices(&mut self) {
        for voice in &mut self.voices {
            voice.filter.prepare(self.sample_rate);
        }
    }

    fn start_voice(&mut self, v: usize, note: u8, velocity: u8) {
        let params = self.params;
        let period = self.calc_period(v, note);

        let glide_distance = match (self.last_note, params.glide_mode) {
            (Some(last), GlideMode::Always) => note as f32 - last as f32,
            (Some(last), GlideMode::Legato) if self.is_playing_legato_style() => {
                note as f32 - last as f32
            }
            _ => 0.0,
        };

        let velocity = velocity as f32;
        let gain = 0.004 * (velocity + 64.0) * (velocity + 64.0) - 8.0;
        let cutoff = self.sample_rate / (period * PI)
            * (params.velocity_sensitivity * (velocity - 64.0)).exp();

        let voice = &mut self.voices[v];
        voice.identity = VoiceIdentity::Held(note);
        voice.update_panning(note);
        voice.target = period;
        voice.osc1.amplitude = gain * params.volume_trim;
        voice.osc2.amplitude = voice.osc1.amplitude * params.osc_mix;
        voice.cutoff = cutoff;
        voice.period =
            (period * SEMITONE.powf(glide_distance - params.glide_bend)).max(MIN_PERIOD);

        if params.vibrato == 0.0 && params.pwm_depth > 0.0 {
            voice.osc2.square_wave(&voice.osc1, voice.period);
        }

        voice.filter_env.set_shape(params.filter_env);
        voice.filter_env.attack();

        voice.env.set_shape(params.amp_env);
        voice.env.attack();

        self.last_note = Some(note);
    }

    /// Move the mono voice to `note` without a new attack. The velocity, when
    /// known, only shapes the cutoff.
    fn restart_mono_voice(&mut self, note: u8, velocity: Option<u8>) {
        let period = self.calc_period(0, note);
        let glide_off = self.params.glide_mode == GlideMode::Off;
        let sensitivity = self.params.velocity_sensitivity;
        let cutoff = self.sample_rate / (period * PI)
            * velocity.map_or(1.0, |velocity| {
                (sensitivity * (velocity as f32 - 64.0)).exp()
            });

        let voice = &mut self.voices[0];
        voice.target = period;
        if glide_off {
            voice.period = period;
        }
        voice.cutoff = cutoff;
        voice.env.nudge();
        voice.identity = VoiceIdentity::Held(note);
        voice.update_panning(note);
    }

    fn release_sustained(&mut self) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|voice| matches!(voice.identity, VoiceIdentity::Sustained(_)))
        {
            voice.release();
            voice.identity = VoiceIdentity::Free;
        }
    }

    fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.sustain_pedal = false;
        self.held_notes.clear();
    }

    fn is_playing_legato_style(&self) -> bool {
        self.voices
            .iter()
            .any(|voice| matches!(voice.identity, VoiceIdentity::Held(_)))
    }

    #[inline]
    fn next_frame(&mut self) -> (f32, f32) {
        let noise = self.noise.next_value() * self.params.noise_mix;
        self.update_lfo();

        let mut left = 0.0;
        let mut right = 0.0;

        for voice in self.voices.iter_mut().filter(|voice| voice.is_active()) {
            let output = voice.render(noise);
            left += output * voice.pan_left;
            right += output * voice.pan_right;
        }

        let level = self.output_level.next_value();
        (left * level, right * level)
    }

    fn update_lfo(&mut self) {
        let Some(sine) = self.lfo.tick(self.params.lfo_inc) else {
            return;
        };

        let params = &self.params;
        let vibrato_mod = 1.0 + sine * (self.mod_wheel + params.vibrato);
        let pwm = 1.0 + sine * (self.mod_wheel + params.pwm_depth);
        let filter_mod = params.filter_keytracking
            + self.filter_ctl
            + (params.filter_lfo_depth + self.pressure) * sine;

        self.filter_zip += 0.005 * (filter_mod - self.filter_zip);

        let filter_zip = self.filter_zip;
        let pitch_bend = self.pitch_bend;
        let detune = self.params.detune;

        for voice in self.voices.iter_mut().filter(|voice| voice.is_active()) {
            voice.osc1.modulation = vibrato_mod;
            voice.osc2.modulation = pwm;
            voice.filter_mod = filter_zip;
            voice.update_lfo();
            voice.apply_pitch(pitch_bend, detune);
        }
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}
