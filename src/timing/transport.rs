// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Measure-rate transport clock.
//!
//! The transport owns play state and tempo and fires one tick per measure.
//! It is polled rather than driving a thread: [`Transport::poll`] hands out
//! every tick whose scheduled time falls inside the caller's lookahead
//! horizon, each carrying its exact scheduled time.

use std::time::Duration;

use tracing::{debug, info};

use crate::arrangement::measure_duration;

/// Transport run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    /// No more ticks will fire; playback ends once the pending stop lands
    Finishing,
}

/// Play state and tempo, with a repeating measure clock
#[derive(Debug, Clone)]
pub struct Transport {
    /// Tempo in beats per minute
    bpm: u16,
    state: ClockState,
    /// Scheduled time of the most recently fired tick
    last_tick: Option<f64>,
    /// Scheduled time of the next tick
    next_tick: Option<f64>,
    ticks_fired: u64,
}

impl Transport {
    pub const MIN_BPM: u16 = 40;
    pub const MAX_BPM: u16 = 220;

    /// Create a stopped transport at the specified tempo
    pub fn new(bpm: u16) -> Self {
        Self {
            bpm: bpm.clamp(Self::MIN_BPM, Self::MAX_BPM),
            state: ClockState::Stopped,
            last_tick: None,
            next_tick: None,
            ticks_fired: 0,
        }
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// True from `start` until `stop`, including while finishing
    pub fn is_playing(&self) -> bool {
        self.state != ClockState::Stopped
    }

    /// Ticks fired since the last start
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    /// Tick period in seconds (one 4/4 measure)
    pub fn measure_duration(&self) -> f64 {
        measure_duration(self.bpm as f64)
    }

    /// Scheduled time of the next tick, if the clock is running
    pub fn next_tick(&self) -> Option<f64> {
        self.next_tick
    }

    /// Change tempo without disturbing phase.
    ///
    /// While running, the part of the current measure still ahead of `now`
    /// is rescaled to the new tempo; already-fired ticks are unaffected.
    pub fn set_bpm(&mut self, bpm: u16, now: f64) -> u16 {
        let bpm = bpm.clamp(Self::MIN_BPM, Self::MAX_BPM);
        if bpm == self.bpm {
            return bpm;
        }

        if let Some(next) = self.next_tick {
            let anchor = self.last_tick.map_or(now, |last| last.max(now));
            if next > anchor {
                let ratio = self.bpm as f64 / bpm as f64;
                self.next_tick = Some(anchor + (next - anchor) * ratio);
            }
        }

        debug!(from = self.bpm, to = bpm, next_tick = ?self.next_tick, "tempo changed");
        self.bpm = bpm;
        bpm
    }

    /// Begin ticking with the first tick at `at`. Returns false, changing
    /// nothing, if already playing.
    pub fn start(&mut self, at: f64) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = ClockState::Running;
        self.last_tick = None;
        self.next_tick = Some(at);
        self.ticks_fired = 0;
        info!(bpm = self.bpm, at, "transport started");
        true
    }

    /// Stop ticking but stay in the playing state until `stop`
    pub fn finish(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Finishing;
            self.next_tick = None;
            debug!(ticks = self.ticks_fired, "transport finishing");
        }
    }

    /// Halt the clock. Idempotent.
    pub fn stop(&mut self) {
        if self.state != ClockState::Stopped {
            info!(ticks = self.ticks_fired, "transport stopped");
        }
        self.state = ClockState::Stopped;
        self.last_tick = None;
        self.next_tick = None;
    }

    /// Take the next tick if it is scheduled at or before `horizon`
    pub fn poll(&mut self, horizon: f64) -> Option<f64> {
        if self.state != ClockState::Running {
            return None;
        }
        let due = self.next_tick.filter(|&t| t <= horizon)?;
        self.last_tick = Some(due);
        self.next_tick = Some(due + self.measure_duration());
        self.ticks_fired += 1;
        Some(due)
    }

    /// Time until the next tick becomes due relative to `horizon`
    pub fn time_until_next_tick(&self, horizon: f64) -> Option<Duration> {
        if self.state != ClockState::Running {
            return None;
        }
        self.next_tick
            .map(|next| Duration::from_secs_f64((next - horizon).max(0.0)))
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(80)
    }
}
