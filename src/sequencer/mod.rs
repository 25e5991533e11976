// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback session.
//!
//! [`Sequencer`] owns everything one session needs: the timeline, the chord
//! table, the transport, the step scheduler and the queue of pending UI
//! updates. The host drives it by calling [`Sequencer::pump`] regularly;
//! each pump schedules every tick that falls inside the lookahead window
//! and applies every UI update whose audio time has arrived.

pub mod scheduler;

pub use scheduler::{strum, strum_times, StepScheduler, TickContext, TickOutcome, DEFAULT_STRUM_OFFSET};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::arrangement::{IdGenerator, Measure, MeasureId, MeasureUpdate, Rhythm, SequentialIds, Timeline};
use crate::audio::{AudioError, VoiceEngine};
use crate::config::SessionConfig;
use crate::music::{Chord, ChordTable, Note, ScaleMode};
use crate::timing::{AudioClock, Transport};
use crate::ui::{DrawQueue, TimeDomain, UiUpdate};

/// One playback session driving a voice engine
pub struct Sequencer<V: VoiceEngine> {
    timeline: Timeline,
    chords: ChordTable,
    transport: Transport,
    scheduler: StepScheduler,
    draw: DrawQueue,
    voice: V,
    clock: Arc<dyn AudioClock>,
    looping: bool,
    /// Seconds ahead of the clock that ticks are taken
    lookahead: f64,
    /// Step the UI highlights; `None` while stopped
    current_step: Option<usize>,
    steps: watch::Sender<Option<usize>>,
}

impl<V: VoiceEngine> Sequencer<V> {
    /// Create a session with sequential measure ids
    pub fn new(voice: V, clock: Arc<dyn AudioClock>, config: &SessionConfig) -> Self {
        Self::with_ids(voice, clock, config, Box::new(SequentialIds::default()))
    }

    /// Create a session drawing measure ids from `ids`
    pub fn with_ids(
        voice: V,
        clock: Arc<dyn AudioClock>,
        config: &SessionConfig,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let config = config.clone().normalized();
        let (steps, _) = watch::channel(None);
        Self {
            timeline: Timeline::new(ids),
            chords: ChordTable::new(config.root, config.scale),
            transport: Transport::new(config.bpm),
            scheduler: StepScheduler::new(config.strum_offset()),
            draw: DrawQueue::new(TimeDomain::new(config.output_latency())),
            voice,
            clock,
            looping: config.looping,
            lookahead: config.lookahead(),
            current_step: None,
            steps,
        }
    }

    // Editing

    /// Append a rest measure and return its id
    pub fn add_measure(&mut self) -> MeasureId {
        self.timeline.append()
    }

    /// Remove a measure. The last remaining measure is never removed.
    /// Stops playback if a measure was removed while playing.
    pub fn remove_measure(&mut self, id: MeasureId) -> bool {
        let removed = self.timeline.remove(id);
        if removed && self.is_playing() {
            debug!(%id, "measure removed during playback");
            self.stop();
        }
        removed
    }

    /// Change one field of a measure; false if `id` is unknown
    pub fn update_measure(&mut self, id: MeasureId, update: MeasureUpdate) -> bool {
        self.timeline.update(id, update)
    }

    /// Stop playback and start over with a single rest measure
    pub fn reset_timeline(&mut self) -> MeasureId {
        if self.is_playing() {
            self.stop();
        }
        let id = self.timeline.reset();
        info!(%id, "timeline cleared");
        id
    }

    pub fn set_root(&mut self, root: Note) {
        if root != self.chords.root() {
            self.chords.set_root(root);
            info!(key = %root, mode = %self.chords.mode(), "key changed");
        }
    }

    pub fn set_scale(&mut self, mode: ScaleMode) {
        if mode != self.chords.mode() {
            self.chords.set_mode(mode);
            info!(key = %self.chords.root(), %mode, "key changed");
        }
    }

    /// Change tempo, live if playing. Returns the clamped tempo.
    pub fn set_bpm(&mut self, bpm: u16) -> u16 {
        let now = self.clock.now();
        self.transport.set_bpm(bpm, now)
    }

    pub fn set_looping(&mut self, looping: bool) {
        if looping != self.looping {
            self.looping = looping;
            info!(looping, "loop mode changed");
        }
    }

    // Playback

    /// Start playback from the first measure. The voice engine must already
    /// be ready; prefer [`Sequencer::play`]. Returns false if already playing.
    pub fn start(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        self.scheduler.reset();
        self.draw.clear();
        let now = self.clock.now();
        self.transport.start(now);
        self.schedule_ahead();
        true
    }

    /// Wait for the voice engine, then start. Nothing changes if the
    /// engine cannot be made ready.
    pub async fn play(&mut self) -> Result<bool, AudioError> {
        if self.is_playing() {
            return Ok(false);
        }
        self.voice.ensure_ready().await?;
        Ok(self.start())
    }

    /// Stop if playing, otherwise start
    pub async fn toggle_play(&mut self) -> Result<(), AudioError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.play().await.map(|_| ())
        }
    }

    /// Halt playback and drop every pending UI update. Idempotent.
    pub fn stop(&mut self) {
        self.transport.stop();
        self.draw.clear();
        self.set_step(None);
    }

    /// Strum `chord` right now for a half note, whether or not playing
    pub fn preview_chord(&mut self, chord: &Chord) -> usize {
        let duration = Rhythm::Half.duration(self.transport.bpm() as f64);
        let now = self.clock.now();
        debug!(%chord, now, "preview");
        strum(&mut self.voice, chord, duration, now, self.scheduler.strum_offset())
    }

    /// Preview the chord at `index` in the current table
    pub fn preview_degree(&mut self, index: usize) -> bool {
        match self.chords.get(index).cloned() {
            Some(chord) => {
                self.preview_chord(&chord);
                true
            }
            None => false,
        }
    }

    /// Process every tick due within the lookahead window
    pub fn schedule_ahead(&mut self) -> Vec<TickOutcome> {
        let horizon = self.clock.now() + self.lookahead;
        let mut outcomes = Vec::new();

        while let Some(time) = self.transport.poll(horizon) {
            let snapshot = self.timeline.snapshot();
            let ctx = TickContext {
                time,
                measures: snapshot.measures(),
                chords: &self.chords,
                looping: self.looping,
                measure_duration: self.transport.measure_duration(),
            };
            let outcome = self.scheduler.on_tick(ctx, &mut self.voice, &mut self.draw);
            outcomes.push(outcome);

            if outcome == TickOutcome::Finished {
                self.transport.finish();
                break;
            }
        }

        outcomes
    }

    /// Apply every UI update whose audio time has been reached
    pub fn apply_ui_updates(&mut self) -> Vec<UiUpdate> {
        let now = self.clock.now();
        let mut applied = Vec::new();

        for update in self.draw.drain_due(now) {
            applied.push(update);
            match update {
                UiUpdate::Step(step) => self.set_step(Some(step)),
                UiUpdate::Stop => {
                    self.stop();
                    break;
                }
            }
        }

        applied
    }

    /// Schedule ahead, then catch the UI up to the clock
    pub fn pump(&mut self) -> Vec<UiUpdate> {
        self.schedule_ahead();
        self.apply_ui_updates()
    }

    /// How long the host may sleep before the next pump has work
    pub fn time_until_next_event(&self) -> Option<Duration> {
        let now = self.clock.now();
        let tick = self.transport.time_until_next_tick(now + self.lookahead);
        let draw = self
            .draw
            .next_due()
            .map(|due| Duration::from_secs_f64((due - now).max(0.0)));

        match (tick, draw) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn set_step(&mut self, step: Option<usize>) {
        if self.current_step != step {
            self.current_step = step;
            self.steps.send_replace(step);
        }
    }

    // Observation

    /// Highlighted step, `None` while stopped
    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    /// Receiver notified on every change of the highlighted step
    pub fn subscribe_steps(&self) -> watch::Receiver<Option<usize>> {
        self.steps.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn bpm(&self) -> u16 {
        self.transport.bpm()
    }

    pub fn chords(&self) -> &ChordTable {
        &self.chords
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn measures(&self) -> &[Measure] {
        self.timeline.measures()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    pub fn voice_mut(&mut self) -> &mut V {
        &mut self.voice
    }
}
