// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport display widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use super::ViewState;

/// Play state, position, tempo, key and loop mode on one line
pub struct TransportWidget<'a> {
    state: &'a ViewState,
    block: Option<Block<'a>>,
}

impl<'a> TransportWidget<'a> {
    pub fn new(state: &'a ViewState) -> Self {
        Self { state, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// "step/len" with 1-based step, or dashes while stopped
pub fn position_text(step: Option<usize>, len: usize) -> String {
    match step {
        Some(step) => format!("{:>3}/{:<3}", step + 1, len),
        None => format!("---/{:<3}", len),
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(10), // Play/Stop indicator
                Constraint::Length(2),
                Constraint::Length(8), // Position
                Constraint::Length(2),
                Constraint::Length(8), // Tempo
                Constraint::Length(2),
                Constraint::Length(10), // Key
                Constraint::Length(2),
                Constraint::Length(6), // Loop
                Constraint::Min(0),
            ])
            .split(area);

        let (indicator, style) = if self.state.playing {
            ("▶ PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            ("■ STOP", Style::default().fg(Color::Yellow))
        };
        Paragraph::new(indicator).style(style).render(chunks[0], buf);

        Paragraph::new(position_text(self.state.current_step, self.state.measures.len()))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .render(chunks[2], buf);

        Paragraph::new(format!("{} BPM", self.state.bpm))
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[4], buf);

        Paragraph::new(self.state.key.as_str())
            .style(Style::default().fg(Color::White))
            .render(chunks[6], buf);

        let (mode, style) = if self.state.looping {
            ("LOOP", Style::default().fg(Color::Green))
        } else {
            ("ONCE", Style::default().fg(Color::DarkGray))
        };
        Paragraph::new(mode).style(style).render(chunks[8], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_text() {
        assert_eq!(position_text(None, 4), "---/4  ");
        assert_eq!(position_text(Some(0), 4), "  1/4  ");
        assert_eq!(position_text(Some(11), 12), " 12/12 ");
    }

    #[test]
    fn test_renders_state() {
        let state = ViewState {
            playing: true,
            bpm: 96,
            key: "A minor".to_string(),
            looping: false,
            ..Default::default()
        };
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        TransportWidget::new(&state).render(area, &mut buf);

        let text: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("PLAY"));
        assert!(text.contains("96 BPM"));
        assert!(text.contains("A minor"));
        assert!(text.contains("ONCE"));
    }
}
