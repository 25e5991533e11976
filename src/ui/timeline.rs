// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline display widget.
//!
//! Measures are laid out left to right and wrap onto further rows. The
//! playing measure is drawn inverted, the selected one gets a marker.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use super::MeasureView;

/// Width of one measure cell, including its separator
pub const CELL_WIDTH: u16 = 10;

/// Widget for the measure list
pub struct TimelineWidget<'a> {
    measures: &'a [MeasureView],
    current: Option<usize>,
    selected: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(measures: &'a [MeasureView]) -> Self {
        Self {
            measures,
            current: None,
            selected: None,
            block: None,
        }
    }

    /// Highlight the playing measure
    pub fn current(mut self, index: Option<usize>) -> Self {
        self.current = index;
        self
    }

    /// Mark the measure being edited
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Measures that fit on one row of `width` columns
pub fn cells_per_row(width: u16) -> usize {
    (width / CELL_WIDTH).max(1) as usize
}

fn cell_style(measure: &MeasureView, playing: bool) -> Style {
    let style = if measure.stale {
        Style::default().fg(Color::Red)
    } else if measure.rest {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    if playing {
        style.bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let per_row = cells_per_row(area.width);
        let mut lines = Vec::new();

        for (row, chunk) in self.measures.chunks(per_row).enumerate() {
            let mut cells = Vec::new();
            let mut markers = Vec::new();

            for (col, measure) in chunk.iter().enumerate() {
                let index = row * per_row + col;
                let text = format!("{:<5}{:>3}", measure.label, measure.rhythm.symbol());
                cells.push(Span::styled(text, cell_style(measure, self.current == Some(index))));
                cells.push(Span::raw("  "));

                let marker = if self.selected == Some(index) {
                    Span::styled(
                        format!("{:^8}", format!("^{}", index + 1)),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(format!("{:^8}", index + 1), Style::default().fg(Color::DarkGray))
                };
                markers.push(marker);
                markers.push(Span::raw("  "));
            }

            lines.push(Line::from(cells));
            lines.push(Line::from(markers));
        }

        Paragraph::new(lines).render(area, buf);
    }
}
