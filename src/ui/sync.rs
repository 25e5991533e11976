// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bridge from the audio scheduling domain to the UI domain.
//!
//! Ticks are processed ahead of real time, so anything user-visible they
//! produce is queued with its audio timestamp and applied only once the
//! UI side observes the audio clock reaching that time. Updates come out
//! in timestamp order, ties in the order they were queued.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A deferred mutation of UI-visible playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiUpdate {
    /// Highlight a timeline step
    Step(usize),
    /// End playback
    Stop,
}

/// Translation between audio time and the instant the UI may act on it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeDomain {
    /// Delay between scheduling a sample and hearing it, in seconds
    pub output_latency: f64,
}

impl TimeDomain {
    pub fn new(output_latency: f64) -> Self {
        Self {
            output_latency: output_latency.max(0.0),
        }
    }

    /// Audio-clock reading at which an event scheduled for `audio_time`
    /// becomes audible
    pub fn to_ui(&self, audio_time: f64) -> f64 {
        audio_time + self.output_latency
    }
}

#[derive(Debug, Clone)]
struct PendingUpdate {
    due: f64,
    seq: u64,
    update: UiUpdate,
}

// For BinaryHeap - we want earliest due first, then FIFO
impl Eq for PendingUpdate {}

impl PartialEq for PendingUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for PendingUpdate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PendingUpdate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Queue of UI updates waiting for their audio time to arrive
#[derive(Debug, Default)]
pub struct DrawQueue {
    queue: BinaryHeap<PendingUpdate>,
    domain: TimeDomain,
    next_seq: u64,
}

impl DrawQueue {
    pub fn new(domain: TimeDomain) -> Self {
        Self {
            queue: BinaryHeap::new(),
            domain,
            next_seq: 0,
        }
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    /// Defer `update` until the audio clock reaches `audio_time`
    pub fn schedule(&mut self, audio_time: f64, update: UiUpdate) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(PendingUpdate {
            due: self.domain.to_ui(audio_time),
            seq,
            update,
        });
    }

    /// Pop every update that is due at audio-clock reading `now`, in order
    pub fn drain_due(&mut self, now: f64) -> Vec<UiUpdate> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|pending| pending.due <= now) {
            if let Some(pending) = self.queue.pop() {
                due.push(pending.update);
            }
        }
        due
    }

    /// Audio-clock reading at which the next update falls due
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|pending| pending.due)
    }

    /// Drop everything still pending
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
