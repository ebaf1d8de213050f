#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Exponential ADSR Envelope
=========================

This module implements the amplitude/filter envelope used by every voice. It
is a one-pole filter chasing a target: each sample the level closes a fixed
fraction of the distance to where it is heading.

Vocabulary
----------

  level       The envelope's current output value. Multiplies the voice signal
              (amplitude envelope) or offsets the filter cutoff (filter envelope).

  target      Where the level is heading. Changing the target is what moves the
              envelope from one segment to the next.

  multiplier  Per-sample coefficient in (0, 1). Closer to 1.0 means a slower
              approach. Precomputed from a time constant by the caller:

                  multiplier = exp(-1 / (time_constant * sample_rate))

  SILENCE     1e-4, about -80 dB. Below this the envelope counts as finished.


The Recurrence
--------------

Every segment uses the same update:

    level = multiplier * (level - target) + target

An exponential approach never quite arrives, which is why "finished" is
defined by the SILENCE floor instead of level == 0. The floor also keeps the
level out of denormal territory, where float math gets very slow.


The Overshoot Attack
--------------------

  Level
    2.0 ┤ · · · · · · · · · · · ·   (attack target, never reached)
        │
    1.0 ┤      ╭╮
        │     ╱  ╲_____________
    S   │    ╱                  ╲
        │   ╱                    ╲
    0.0 └──╱──────────────────────╲───→ Time
         Attack Decay   Sustain  Release

A plain exponential attack aimed at 1.0 would crawl the last few percent. This
envelope aims at 2.0 instead, so the curve is still steep when it crosses 1.0.
The switch to decay happens on the arithmetic crossing

    level + target > 3.0      (with target = 2.0, that's level > 1.0)

after which target becomes the sustain level and the multiplier becomes the
decay coefficient. Release sets target to 0 from whatever level we're at.

The stage tag mirrors what target already encodes (2.0 means attack), so
`is_in_attack()` and the transition agree exactly with the numeric state.
*/

/// Below this level the envelope is considered silent.
pub const SILENCE: f32 = 0.0001;

const ATTACK_TARGET: f32 = 2.0;
const DECAY_THRESHOLD: f32 = 3.0;

/// The current segment of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle,
    Attack,
    DecaySustain,
    Release,
}

/// Per-sample coefficients for the four segments.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Envelope {
    shape: EnvelopeShape,

    stage: EnvelopeStage,
    level: f32,
    target: f32,
    multiplier: f32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(shape: EnvelopeShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Load new segment coefficients. Takes effect at the next segment change.
    pub fn set_shape(&mut self, shape: EnvelopeShape) {
        self.shape = shape;
    }

    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    /// Gate high. The level bump guarantees progress even from exact zero.
    pub fn attack(&mut self) {
        self.level += SILENCE + SILENCE;
        self.target = ATTACK_TARGET;
        self.multiplier = self.shape.attack;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: head for zero from the current level.
    pub fn release(&mut self) {
        self.target = 0.0;
        self.multiplier = self.shape.release;
        self.stage = EnvelopeStage::Release;
    }

    /// Keep a retriggered envelope above the silence floor without starting
    /// a new attack.
    pub fn nudge(&mut self) {
        self.level += SILENCE + SILENCE;
    }

    /// Advance one step and return the new level.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.level = self.multiplier * (self.level - self.target) + self.target;

        if self.stage == EnvelopeStage::Attack && self.level + self.target > DECAY_THRESHOLD {
            self.multiplier = self.shape.decay;
            self.target = self.shape.sustain;
            self.stage = EnvelopeStage::DecaySustain;
        }

        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.target = 0.0;
        self.multiplier = 0.0;
        self.stage = EnvelopeStage::Idle;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.level > SILENCE
    }

    #[inline]
    pub fn is_in_attack(&self) -> bool {
        self.stage == EnvelopeStage::Attack
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
