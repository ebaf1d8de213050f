//! Terminal front end: voice activity, output meter and key handling.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use saavy_poly::{
    io::midi::{cc, MidiEvent},
    synth::{PolyMode, VoiceIdentity, MAX_VOICES},
    Patch, Synth, SynthMessage, SynthParams,
};

use super::keyboard::{KeyAction, Keyboard};

const KEY_VELOCITY: u8 = 100;
const KEY_CHANNEL: u8 = 0;
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// One voice as the meter sees it.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceSnapshot {
    pub identity: VoiceIdentity,
    pub level: f32,
}

/// Engine state captured at the end of an audio callback (Copy, no
/// allocations).
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineSnapshot {
    pub voices: [VoiceSnapshot; MAX_VOICES],
    pub peak: f32,
    pub sustain: bool,
}

impl EngineSnapshot {
    pub fn capture(synth: &Synth, peak: f32) -> Self {
        let mut voices = [VoiceSnapshot::default(); MAX_VOICES];
        for (snapshot, voice) in voices.iter_mut().zip(synth.voices()) {
            *snapshot = VoiceSnapshot {
                identity: voice.identity(),
                level: voice.envelope().level(),
            };
        }

        Self {
            voices,
            peak,
            sustain: synth.sustain_pedal(),
        }
    }
}

pub struct UiApp {
    message_tx: Producer<SynthMessage>,
    snapshot_rx: Consumer<EngineSnapshot>,
    snapshot: EngineSnapshot,
    patch: Patch,
    params: SynthParams,
    sample_rate: f32,
    keyboard: Keyboard,
    sustain: bool,
    dropped_messages: u32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        message_tx: Producer<SynthMessage>,
        snapshot_rx: Consumer<EngineSnapshot>,
        patch: Patch,
        params: SynthParams,
        sample_rate: f32,
    ) -> Self {
        Self {
            message_tx,
            snapshot_rx,
            snapshot: EngineSnapshot::default(),
            patch,
            params,
            sample_rate,
            keyboard: Keyboard::new(),
            sustain: false,
            dropped_messages: 0,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            // Keep only the latest snapshot
            while let Ok(snapshot) = self.snapshot_rx.pop() {
                self.snapshot = snapshot;
            }

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Release {
                        let action = self.keyboard.press(key.code, Instant::now());
                        self.handle_action(action);
                    }
                }
            }

            let tx = &mut self.message_tx;
            let dropped = &mut self.dropped_messages;
            self.keyboard.expire(Instant::now(), |note| {
                let event = MidiEvent::NoteOff {
                    channel: KEY_CHANNEL,
                    key: note,
                    velocity: 0,
                };
                if tx.push(event.into()).is_err() {
                    *dropped += 1;
                }
            });
        }

        Ok(())
    }

    fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::NoteOn(note) => self.send(
                MidiEvent::NoteOn {
                    channel: KEY_CHANNEL,
                    key: note,
                    velocity: KEY_VELOCITY,
                }
                .into(),
            ),
            KeyAction::ToggleSustain => {
                self.sustain = !self.sustain;
                let value = if self.sustain { 127 } else { 0 };
                self.send(
                    MidiEvent::ControlChange {
                        channel: KEY_CHANNEL,
                        controller: cc::SUSTAIN,
                        value,
                    }
                    .into(),
                );
            }
            KeyAction::ToggleMono => {
                self.params.poly_mode = match self.params.poly_mode {
                    PolyMode::Mono => PolyMode::Poly,
                    PolyMode::Poly => PolyMode::Mono,
                };
                self.send(SynthMessage::AllNotesOff);
                self.send(SynthMessage::Params(self.params));
                self.sustain = false;
            }
            KeyAction::Quit => {
                self.send(SynthMessage::AllNotesOff);
                self.should_quit = true;
            }
            KeyAction::OctaveDown | KeyAction::OctaveUp | KeyAction::Repeat | KeyAction::Ignored => {}
        }
    }

    fn send(&mut self, message: SynthMessage) {
        if self.message_tx.push(message).is_err() {
            self.dropped_messages += 1;
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                       // Status bar
                Constraint::Length(MAX_VOICES as u16 + 2),   // Voices
                Constraint::Length(3),                       // Output meter
                Constraint::Length(1),                       // Help bar
            ])
            .split(frame.area());

        self.render_status(frame, chunks[0]);
        self.render_voices(frame, chunks[1]);
        self.render_meter(frame, chunks[2]);

        let help = Paragraph::new(
            " [A-;] Play  [Z/X] Octave  [Space] Sustain  [M] Mono/Poly  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" saavy-poly ").borders(Borders::ALL);

        let mode = match self.params.poly_mode {
            PolyMode::Mono => "MONO",
            PolyMode::Poly => "POLY",
        };

        let mut spans = vec![
            Span::styled(
                format!(" {}  ", self.patch.name),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(format!("{mode}  "), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("Octave {:+}  ", self.keyboard.octave()),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                if self.snapshot.sustain { "Sustain ON  " } else { "Sustain off  " },
                Style::default().fg(if self.snapshot.sustain {
                    Color::Green
                } else {
                    Color::DarkGray
                }),
            ),
            Span::styled(
                format!("{:.1}kHz", self.sample_rate / 1000.0),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        if self.dropped_messages > 0 {
            spans.push(Span::styled(
                format!("  {} dropped", self.dropped_messages),
                Style::default().fg(Color::Red),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_voices(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" Voices ").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1); MAX_VOICES])
            .split(inner);

        for (index, (voice, row)) in self.snapshot.voices.iter().zip(rows.iter()).enumerate() {
            let (label, color) = match voice.identity {
                VoiceIdentity::Free if voice.level > 0.0 => ("release".to_string(), Color::DarkGray),
                VoiceIdentity::Free => ("-".to_string(), Color::DarkGray),
                VoiceIdentity::Held(note) => (note_name(note), Color::Green),
                VoiceIdentity::Sustained(note) => (format!("{} (sus)", note_name(note)), Color::Yellow),
            };

            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color))
                .ratio(voice.level.clamp(0.0, 1.0) as f64)
                .label(format!("{} {label}", index + 1));
            frame.render_widget(gauge, *row);
        }
    }

    fn render_meter(&self, frame: &mut Frame, area: Rect) {
        let peak = self.snapshot.peak.clamp(0.0, 1.0);
        let color = if peak > 0.9 { Color::Red } else { Color::Cyan };

        let gauge = Gauge::default()
            .block(Block::default().title(" Output ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(color))
            .ratio(peak as f64)
            .label(format!("{peak:.2}"));
        frame.render_widget(gauge, area);
    }
}

fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}
