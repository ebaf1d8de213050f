use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::io::midi::MidiEvent;

use super::params::SynthParams;

/// Control-thread → audio-thread messages, applied between blocks.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    /// Raw three-byte MIDI message.
    Midi([u8; 3]),
    /// New parameter snapshot for the following blocks.
    Params(SynthParams),
    AllNotesOff,
}

impl SynthMessage {
    pub fn midi(status: u8, data1: u8, data2: u8) -> Self {
        SynthMessage::Midi([status, data1, data2])
    }
}

impl From<MidiEvent> for SynthMessage {
    fn from(event: MidiEvent) -> Self {
        SynthMessage::Midi(event.to_bytes())
    }
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Plain queue for offline rendering and tests.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::VoiceIdentity;
    use crate::Synth;

    #[test]
    fn midi_events_reach_the_synth() {
        let mut synth = Synth::new();
        let mut queue = VecDeque::from([
            SynthMessage::from(MidiEvent::NoteOn {
                channel: 0,
                key: 60,
                velocity: 100,
            }),
            SynthMessage::from(MidiEvent::ControlChange {
                channel: 0,
                controller: 0x40,
                value: 127,
            }),
            SynthMessage::from(MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0,
            }),
        ]);

        synth.process_messages(&mut queue);

        assert!(synth.sustain_pedal());
        assert_eq!(synth.active_voice_count(), 1);
        assert_eq!(synth.voices()[0].identity(), VoiceIdentity::Sustained(60));
    }
}
