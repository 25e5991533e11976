// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the strum sequencer.
//!
//! Provides the audio-to-UI sync bridge the sequencer reports through, and
//! a ratatui interface with transport, timeline and chord palette views.

pub mod sync;

mod editor;
mod timeline;
mod transport;

pub use editor::Editor;
pub use sync::{DrawQueue, TimeDomain, UiUpdate};
pub use timeline::TimelineWidget;
pub use transport::TransportWidget;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::arrangement::Rhythm;
use crate::audio::VoiceEngine;
use crate::sequencer::Sequencer;

/// One measure as shown in the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureView {
    /// Chord name, "-" for a rest, "?N" for a degree missing from the key
    pub label: String,
    pub rhythm: Rhythm,
    pub rest: bool,
    /// Chord index that does not resolve in the current key
    pub stale: bool,
}

/// Everything one frame draws
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub playing: bool,
    pub bpm: u16,
    /// Key label, e.g. "C Major"
    pub key: String,
    pub looping: bool,
    pub current_step: Option<usize>,
    pub selected: usize,
    pub measures: Vec<MeasureView>,
    /// Chord names of the current key, in degree order
    pub chords: Vec<String>,
    pub show_help: bool,
    pub status_message: Option<String>,
}

impl ViewState {
    /// Read the session as the UI should show it
    pub fn capture<V: VoiceEngine>(seq: &Sequencer<V>, selected: usize) -> Self {
        let chords = seq.chords();
        let measures = seq
            .measures()
            .iter()
            .map(|measure| {
                let (label, stale) = match measure.chord_index {
                    None => ("-".to_string(), false),
                    Some(index) => match chords.get(index) {
                        Some(chord) => (chord.name.clone(), false),
                        None => (format!("?{}", index + 1), true),
                    },
                };
                MeasureView {
                    label,
                    rhythm: measure.rhythm,
                    rest: measure.is_rest(),
                    stale,
                }
            })
            .collect();

        Self {
            playing: seq.is_playing(),
            bpm: seq.bpm(),
            key: format!("{} {}", chords.root(), chords.mode()),
            looping: seq.is_looping(),
            current_step: seq.current_step(),
            selected,
            measures,
            chords: chords.chords().iter().map(|c| c.name.clone()).collect(),
            show_help: false,
            status_message: None,
        }
    }
}

/// Key event result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Quit the application
    Quit,
    TogglePlay,
    Stop,
    /// Change tempo by this many BPM
    Tempo(i32),
    ToggleLoop,
    AddMeasure,
    RemoveMeasure,
    SelectPrev,
    SelectNext,
    /// Put this chord degree (0-based) on the selected measure
    SetChord(usize),
    SetRest,
    RhythmFaster,
    RhythmSlower,
    NextRoot,
    PrevRoot,
    ToggleMode,
    /// Audition the selected measure's chord
    Preview,
    /// Reset the timeline
    Clear,
    ToggleHelp,
}

/// Map a key press to an action
pub fn key_action(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,

        // Transport
        (KeyCode::Char(' '), _) => KeyAction::TogglePlay,
        (KeyCode::Esc, _) => KeyAction::Stop,
        (KeyCode::Char('l'), _) => KeyAction::ToggleLoop,

        // Tempo
        (KeyCode::Up, KeyModifiers::SHIFT) => KeyAction::Tempo(10),
        (KeyCode::Down, KeyModifiers::SHIFT) => KeyAction::Tempo(-10),
        (KeyCode::Up, _) => KeyAction::Tempo(1),
        (KeyCode::Down, _) => KeyAction::Tempo(-1),

        // Timeline
        (KeyCode::Char('a'), _) => KeyAction::AddMeasure,
        (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => KeyAction::RemoveMeasure,
        (KeyCode::Left, _) => KeyAction::SelectPrev,
        (KeyCode::Right, _) => KeyAction::SelectNext,
        (KeyCode::Char(c @ '1'..='7'), _) => KeyAction::SetChord((c as usize) - ('1' as usize)),
        (KeyCode::Char('0'), _) | (KeyCode::Char('r'), _) => KeyAction::SetRest,
        (KeyCode::Char(']'), _) => KeyAction::RhythmFaster,
        (KeyCode::Char('['), _) => KeyAction::RhythmSlower,
        (KeyCode::Char('c'), _) => KeyAction::Clear,

        // Key
        (KeyCode::Char('k'), _) => KeyAction::NextRoot,
        (KeyCode::Char('K'), _) => KeyAction::PrevRoot,
        (KeyCode::Char('m'), _) => KeyAction::ToggleMode,
        (KeyCode::Char('p'), _) => KeyAction::Preview,

        (KeyCode::Char('?'), _) | (KeyCode::Char('h'), _) => KeyAction::ToggleHelp,

        _ => KeyAction::None,
    }
}

/// Terminal UI application
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    running: bool,
    show_help: bool,
    status: Option<(String, Instant)>,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            frame_rate: 60,
            running: true,
            show_help: false,
            status: None,
        })
    }

    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Show a message in the status bar for a few seconds
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    /// Handle a key event. Quit and help are handled here, the rest is
    /// left to the caller.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        let action = key_action(code, modifiers);
        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::ToggleHelp => self.show_help = !self.show_help,
            _ => {}
        }
        action
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Draw one frame
    pub fn draw(&mut self, state: &ViewState) -> io::Result<()> {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > Duration::from_secs(3))
        {
            self.status = None;
        }

        let mut state = state.clone();
        state.show_help = self.show_help;
        state.status_message = self.status.as_ref().map(|(msg, _)| msg.clone());

        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Transport
                    Constraint::Min(6),    // Timeline
                    Constraint::Length(3), // Chord palette
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            frame.render_widget(
                TransportWidget::new(&state)
                    .block(Block::default().borders(Borders::ALL).title(" Transport ")),
                chunks[0],
            );
            frame.render_widget(
                TimelineWidget::new(&state.measures)
                    .current(state.current_step)
                    .selected(Some(state.selected))
                    .block(Block::default().borders(Borders::ALL).title(" Timeline ")),
                chunks[1],
            );
            render_palette(frame, chunks[2], &state.chords);
            render_status_bar(frame, chunks[3], &state);

            if state.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Chord names with the digit that selects each
fn palette_line(chords: &[String]) -> Line<'_> {
    let spans: Vec<Span> = chords
        .iter()
        .enumerate()
        .flat_map(|(i, name)| {
            [
                Span::styled(format!(" {}:", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{name:<5}"), Style::default().fg(Color::Cyan)),
            ]
        })
        .collect();
    Line::from(spans)
}

fn render_palette(frame: &mut Frame, area: Rect, chords: &[String]) {
    let block = Block::default().borders(Borders::ALL).title(" Chords ");
    frame.render_widget(Paragraph::new(palette_line(chords)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Space: Play/Stop | a/d: Add/Delete | 1-7: Chord | [ ]: Rhythm | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 50.min(area.width.saturating_sub(4));
    let height = 22.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Black)),
        help_area,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Transport", bold)),
        Line::from("  Space       Play/Stop"),
        Line::from("  Esc         Stop"),
        Line::from("  Up/Down     Tempo +/- 1 BPM"),
        Line::from("  Shift+Up/Dn Tempo +/- 10 BPM"),
        Line::from("  l           Toggle loop"),
        Line::from(""),
        Line::from(Span::styled("Timeline", bold)),
        Line::from("  Left/Right  Select measure"),
        Line::from("  a / d       Add / delete measure"),
        Line::from("  1-7         Set chord degree"),
        Line::from("  0 / r       Set rest"),
        Line::from("  [ / ]       Fewer / more strums"),
        Line::from("  p           Preview chord"),
        Line::from("  c           Clear timeline"),
        Line::from(""),
        Line::from(Span::styled("Key", bold)),
        Line::from("  k / K       Root up / down"),
        Line::from("  m           Major / minor"),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::arrangement::MeasureUpdate;
    use crate::audio::TraceVoice;
    use crate::config::SessionConfig;
    use crate::music::ScaleMode;
    use crate::timing::ManualClock;

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(KeyCode::Char('q'), KeyModifiers::NONE), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Char('c'), KeyModifiers::CONTROL), KeyAction::Quit);
        assert_eq!(key_action(KeyCode::Char('c'), KeyModifiers::NONE), KeyAction::Clear);
        assert_eq!(key_action(KeyCode::Char(' '), KeyModifiers::NONE), KeyAction::TogglePlay);
        assert_eq!(key_action(KeyCode::Char('1'), KeyModifiers::NONE), KeyAction::SetChord(0));
        assert_eq!(key_action(KeyCode::Char('7'), KeyModifiers::NONE), KeyAction::SetChord(6));
        assert_eq!(key_action(KeyCode::Char('8'), KeyModifiers::NONE), KeyAction::None);
        assert_eq!(key_action(KeyCode::Up, KeyModifiers::SHIFT), KeyAction::Tempo(10));
        assert_eq!(key_action(KeyCode::Down, KeyModifiers::NONE), KeyAction::Tempo(-1));
        assert_eq!(key_action(KeyCode::Char('K'), KeyModifiers::SHIFT), KeyAction::PrevRoot);
    }

    #[test]
    fn test_capture_labels_measures() {
        let mut seq = Sequencer::new(
            TraceVoice::new(),
            Arc::new(ManualClock::new()),
            &SessionConfig::default(),
        );
        let first = seq.measures()[0].id;
        seq.update_measure(first, MeasureUpdate::Chord(Some(1)));
        let second = seq.add_measure();
        seq.update_measure(second, MeasureUpdate::Chord(Some(9)));
        seq.add_measure();
        seq.set_scale(ScaleMode::Minor);

        let view = ViewState::capture(&seq, 2);
        assert_eq!(view.key, "C Minor");
        assert_eq!(view.selected, 2);
        let labels: Vec<&str> = view.measures.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Ddim", "?10", "-"]);
        assert!(view.measures[1].stale);
        assert!(view.measures[2].rest);
        assert_eq!(view.chords.len(), 7);
        assert_eq!(view.chords[0], "Cm");
    }

    #[test]
    fn test_palette_line() {
        let chords = vec!["C".to_string(), "Dm".to_string()];
        let line = palette_line(&chords);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " 1:C     2:Dm   ");
    }
}
