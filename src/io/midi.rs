/// Channel voice messages the synth responds to.
///
/// Decoding works on single three-byte messages: no running status, no SysEx.
/// Note-on with velocity 0 decodes as note-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend, centered on zero (-8192..=8191).
    PitchBend { channel: u8, value: i16 },
    ChannelPressure { channel: u8, pressure: u8 },
}

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const CHANNEL_PRESSURE: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;

/// Controller numbers with special meaning to the synth.
pub mod cc {
    pub const MOD_WHEEL: u8 = 0x01;
    pub const SUSTAIN: u8 = 0x40;
    pub const BRIGHTNESS: u8 = 0x4A;
    pub const RESONANCE: u8 = 0x4B;
    /// First channel-mode controller. Everything from here up resets voices.
    pub const CHANNEL_MODE: u8 = 0x78;
    pub const ALL_NOTES_OFF: u8 = 0x7B;
}

impl MidiEvent {
    /// Decode one message. Unrecognized statuses return `None`.
    pub fn parse(status: u8, data1: u8, data2: u8) -> Option<Self> {
        let channel = status & 0x0F;
        let data1 = data1 & 0x7F;
        let data2 = data2 & 0x7F;

        match status & 0xF0 {
            NOTE_OFF => Some(MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: data2,
            }),
            NOTE_ON if data2 == 0 => Some(MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: 0,
            }),
            NOTE_ON => Some(MidiEvent::NoteOn {
                channel,
                key: data1,
                velocity: data2,
            }),
            CONTROL_CHANGE => Some(MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            CHANNEL_PRESSURE => Some(MidiEvent::ChannelPressure {
                channel,
                pressure: data1,
            }),
            PITCH_BEND => Some(MidiEvent::PitchBend {
                channel,
                value: (data1 as i16 | (data2 as i16) << 7) - 8192,
            }),
            _ => None,
        }
    }

    /// Encode back into wire bytes (unused trailing bytes are zero).
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => [NOTE_ON | channel, key, velocity],
            MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            } => [NOTE_OFF | channel, key, velocity],
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => [CONTROL_CHANGE | channel, controller, value],
            MidiEvent::ChannelPressure { channel, pressure } => {
                [CHANNEL_PRESSURE | channel, pressure, 0]
            }
            MidiEvent::PitchBend { channel, value } => {
                let raw = (value + 8192) as u16;
                [PITCH_BEND | channel, (raw & 0x7F) as u8, (raw >> 7) as u8]
            }
        }
    }
}
