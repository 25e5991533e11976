// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The ordered list of measures the sequencer plays.
//!
//! Edits are copy-on-write: readers hold an [`Arc`] snapshot that never
//! changes underneath them, and every edit publishes a new version. The
//! timeline is never empty.

use std::sync::Arc;

use tracing::debug;

use super::measure::{IdGenerator, Measure, MeasureId, MeasureUpdate, SequentialIds};

/// A read-only version of the timeline
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    version: u64,
    measures: Arc<Vec<Measure>>,
}

impl TimelineSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Measure> {
        self.measures.get(index)
    }
}

/// Timeline store
pub struct Timeline {
    measures: Arc<Vec<Measure>>,
    version: u64,
    ids: Box<dyn IdGenerator>,
}

impl Timeline {
    /// Create a timeline holding one default rest
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        let mut timeline = Self {
            measures: Arc::new(Vec::new()),
            version: 0,
            ids,
        };
        let first = Measure::rest(timeline.ids.next_id());
        Arc::make_mut(&mut timeline.measures).push(first);
        timeline
    }

    /// Current version; readers taken now keep seeing it after later edits
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            version: self.version,
            measures: Arc::clone(&self.measures),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn get(&self, id: MeasureId) -> Option<&Measure> {
        self.measures.iter().find(|m| m.id == id)
    }

    pub fn position(&self, id: MeasureId) -> Option<usize> {
        self.measures.iter().position(|m| m.id == id)
    }

    /// Append a default rest, returning its id
    pub fn append(&mut self) -> MeasureId {
        let id = self.ids.next_id();
        self.edit().push(Measure::rest(id));
        debug!(%id, len = self.len(), "measure appended");
        id
    }

    /// Remove a measure. Returns false, leaving the timeline untouched, when
    /// the id is unknown or it is the last remaining measure.
    pub fn remove(&mut self, id: MeasureId) -> bool {
        if self.measures.len() <= 1 {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        self.edit().remove(index);
        debug!(%id, len = self.len(), "measure removed");
        true
    }

    /// Replace one field of a measure. Chord indices are not checked here;
    /// they are resolved against the chord table at play time.
    pub fn update(&mut self, id: MeasureId, update: MeasureUpdate) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let measures = self.edit();
        measures[index] = measures[index].with(update);
        true
    }

    /// Replace everything with a single default rest
    pub fn reset(&mut self) -> MeasureId {
        let id = self.ids.next_id();
        self.measures = Arc::new(vec![Measure::rest(id)]);
        self.version += 1;
        debug!(%id, "timeline reset");
        id
    }

    fn edit(&mut self) -> &mut Vec<Measure> {
        self.version += 1;
        Arc::make_mut(&mut self.measures)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Box::new(SequentialIds::default()))
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("version", &self.version)
            .field("measures", &self.measures)
            .finish()
    }
}
