//! Whole-synth scenario benchmarks.
//!
//! These render through `Synth` exactly as a host would, so they include
//! voice management, control-rate modulation and the output guard.

mod voices;

pub use voices::bench_voices;
