// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-measure step scheduling.
//!
//! On every transport tick the scheduler resolves which measure to play,
//! strums its chord the number of times its rhythm asks for, and queues the
//! matching playhead update for the UI. It reads the timeline and chord
//! table as they are at tick time, so edits land on the next pass.

use tracing::debug;

use crate::arrangement::{Measure, Rhythm};
use crate::audio::VoiceEngine;
use crate::music::{Chord, ChordTable};
use crate::ui::{DrawQueue, UiUpdate};

/// Default onset gap between consecutive notes of one strum, in seconds
pub const DEFAULT_STRUM_OFFSET: f64 = 0.03;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Measure `step` was scheduled; `notes` is the number of triggers issued
    Step { step: usize, notes: usize },
    /// A one-shot timeline ran out; a stop has been queued
    Finished,
}

/// Everything a tick reads
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Scheduled audio time of the tick
    pub time: f64,
    /// Live timeline contents
    pub measures: &'a [Measure],
    /// Live chord table
    pub chords: &'a ChordTable,
    pub looping: bool,
    /// Tick period in seconds
    pub measure_duration: f64,
}

/// Start times of the strums of one measure
pub fn strum_times(start: f64, measure_duration: f64, rhythm: Rhythm) -> impl Iterator<Item = f64> {
    let count = rhythm.strum_count();
    (0..count).map(move |k| start + k as f64 * measure_duration / count as f64)
}

/// Trigger all notes of `chord` from `time`, each one `offset` after the last
pub fn strum<V: VoiceEngine>(
    voice: &mut V,
    chord: &Chord,
    duration: f64,
    time: f64,
    offset: f64,
) -> usize {
    for (n, pitch) in chord.notes.iter().enumerate() {
        voice.trigger(*pitch, duration, time + n as f64 * offset);
    }
    chord.notes.len()
}

/// The scheduler cursor plus strum settings
#[derive(Debug, Clone)]
pub struct StepScheduler {
    /// Index of the next measure to play
    cursor: usize,
    strum_offset: f64,
}

impl StepScheduler {
    pub fn new(strum_offset: f64) -> Self {
        Self {
            cursor: 0,
            strum_offset: strum_offset.max(0.0),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn strum_offset(&self) -> f64 {
        self.strum_offset
    }

    /// Rewind to the first measure
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Process one tick
    pub fn on_tick<V: VoiceEngine>(
        &mut self,
        ctx: TickContext<'_>,
        voice: &mut V,
        ui: &mut DrawQueue,
    ) -> TickOutcome {
        let mut step = self.cursor;
        if step >= ctx.measures.len() {
            if !ctx.looping {
                debug!(step, len = ctx.measures.len(), "end of timeline");
                ui.schedule(ctx.time, UiUpdate::Stop);
                return TickOutcome::Finished;
            }
            step = 0;
        }

        let mut notes = 0;
        if let Some(measure) = ctx.measures.get(step) {
            match measure.chord_index.map(|index| (index, ctx.chords.get(index))) {
                Some((_, Some(chord))) => {
                    let count = measure.rhythm.strum_count();
                    let duration = ctx.measure_duration / count as f64;
                    for at in strum_times(ctx.time, ctx.measure_duration, measure.rhythm) {
                        notes += strum(voice, chord, duration, at, self.strum_offset);
                    }
                    debug!(step, chord = %chord, rhythm = %measure.rhythm, time = ctx.time, "tick");
                }
                Some((index, None)) => {
                    debug!(step, index, table = ctx.chords.len(), "chord index out of range, resting");
                }
                None => debug!(step, time = ctx.time, "rest"),
            }
        }

        ui.schedule(ctx.time, UiUpdate::Step(step));
        self.cursor = step + 1;
        TickOutcome::Step { step, notes }
    }
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_STRUM_OFFSET)
    }
}
