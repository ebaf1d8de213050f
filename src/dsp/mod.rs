//! Low-level DSP primitives used by the voice engine.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They intentionally stay focused on the
//! signal-processing math so the synth layer can handle orchestration and
//! modulation.

/// Exponential attack/decay/sustain/release envelope generator.
pub mod envelope;
/// End-of-block numeric safety net.
pub mod guard;
/// Nonlinear 4-pole ladder low-pass filter.
pub mod ladder;
/// Control-rate sine LFO.
pub mod lfo;
/// Bit-built white noise source.
pub mod noise;
/// Band-limited recursive pulse oscillator.
pub mod oscillator;
/// Linear parameter ramps.
pub mod smoother;

pub use envelope::{Envelope, EnvelopeShape, EnvelopeStage};
pub use oscillator::Oscillator;
