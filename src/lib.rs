pub mod dsp; // Allocation-free signal primitives
pub mod io; // MIDI wire format
pub mod patch; // Player-facing knobs and their conversion
pub mod synth; // Voices, polyphony and performance state

pub use patch::{Patch, PatchError};
pub use synth::{Synth, SynthMessage, SynthParams};

/// Largest block the bundled binary asks the engine to render at once.
pub const MAX_BLOCK_SIZE: usize = 2048;
