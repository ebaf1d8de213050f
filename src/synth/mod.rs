// Purpose: Voice management, polyphony, MIDI handling
// This layer sits above the dsp primitives and plays them as an instrument

pub mod filter;
pub mod held;
pub mod message;
pub mod params;
pub mod poly;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use params::{GlideMode, PolyMode, SynthParams, DEFAULT_SAMPLE_RATE};
pub use poly::{Synth, MAX_VOICES};
pub use voice::{Voice, VoiceIdentity};
