//! Computer keyboard as a one-octave-and-a-bit piano.
//!
//! Terminals only report key presses, so every note gets a fixed hold time
//! that is extended by key repeat. Notes whose hold time runs out are
//! released.

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

/// How long a note sounds after the last press or repeat of its key.
const HOLD_TIME: Duration = Duration::from_millis(400);

/// Bottom row is white keys, row above is black keys, starting at C.
const PIANO_KEYS: [char; 17] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';',
];

const BASE_NOTE: i32 = 48;
const MIN_OCTAVE: i32 = -3;
const MAX_OCTAVE: i32 = 4;

pub enum KeyAction {
    NoteOn(u8),
    /// The note was already sounding; its hold time was extended.
    Repeat,
    OctaveDown,
    OctaveUp,
    ToggleSustain,
    ToggleMono,
    Quit,
    Ignored,
}

pub struct Keyboard {
    octave: i32,
    sounding: Vec<(u8, Instant)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 0,
            sounding: Vec::with_capacity(PIANO_KEYS.len()),
        }
    }

    pub fn press(&mut self, code: KeyCode, now: Instant) -> KeyAction {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char(' ') => KeyAction::ToggleSustain,
            KeyCode::Char('m') => KeyAction::ToggleMono,
            KeyCode::Char('z') => {
                self.octave = (self.octave - 1).max(MIN_OCTAVE);
                KeyAction::OctaveDown
            }
            KeyCode::Char('x') => {
                self.octave = (self.octave + 1).min(MAX_OCTAVE);
                KeyAction::OctaveUp
            }
            KeyCode::Char(c) => match self.note_for(c) {
                Some(note) => self.hold(note, now),
                None => KeyAction::Ignored,
            },
            _ => KeyAction::Ignored,
        }
    }

    /// Remove and return notes whose hold time has run out.
    pub fn expire(&mut self, now: Instant, mut release: impl FnMut(u8)) {
        self.sounding.retain(|&(note, until)| {
            if until <= now {
                release(note);
                false
            } else {
                true
            }
        });
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    fn hold(&mut self, note: u8, now: Instant) -> KeyAction {
        let until = now + HOLD_TIME;

        if let Some(entry) = self.sounding.iter_mut().find(|(held, _)| *held == note) {
            entry.1 = until;
            return KeyAction::Repeat;
        }

        self.sounding.push((note, until));
        KeyAction::NoteOn(note)
    }

    fn note_for(&self, c: char) -> Option<u8> {
        let index = PIANO_KEYS.iter().position(|&key| key == c.to_ascii_lowercase())?;
        let note = BASE_NOTE + 12 * self.octave + index as i32;
        u8::try_from(note).ok().filter(|note| *note < 128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_plays_c_major() {
        let mut keyboard = Keyboard::new();
        let now = Instant::now();

        let notes: Vec<u8> = "asdfghjk"
            .chars()
            .filter_map(|c| match keyboard.press(KeyCode::Char(c), now) {
                KeyAction::NoteOn(note) => Some(note),
                _ => None,
            })
            .collect();

        assert_eq!(notes, vec![48, 50, 52, 53, 55, 57, 59, 60]);
    }

    #[test]
    fn repeat_extends_hold() {
        let mut keyboard = Keyboard::new();
        let start = Instant::now();

        assert!(matches!(
            keyboard.press(KeyCode::Char('a'), start),
            KeyAction::NoteOn(48)
        ));
        let later = start + HOLD_TIME / 2;
        assert!(matches!(
            keyboard.press(KeyCode::Char('a'), later),
            KeyAction::Repeat
        ));

        let mut released = Vec::new();
        keyboard.expire(start + HOLD_TIME, |note| released.push(note));
        assert!(released.is_empty());

        keyboard.expire(later + HOLD_TIME, |note| released.push(note));
        assert_eq!(released, vec![48]);
    }

    #[test]
    fn octave_shift_is_clamped() {
        let mut keyboard = Keyboard::new();
        for _ in 0..10 {
            keyboard.press(KeyCode::Char('z'), Instant::now());
        }
        assert_eq!(keyboard.octave(), MIN_OCTAVE);

        assert!(matches!(
            keyboard.press(KeyCode::Char('a'), Instant::now()),
            KeyAction::NoteOn(12)
        ));
    }
}
