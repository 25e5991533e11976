// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline arrangement.
//!
//! This module provides:
//! - Measures: a rest or a chord degree with a rhythmic subdivision
//! - Timeline: the ordered, never-empty measure list with snapshots
//! - Id generators for stable measure identity

pub mod measure;
pub mod timeline;

pub use measure::{
    measure_duration, IdGenerator, Measure, MeasureId, MeasureUpdate, RandomIds, Rhythm,
    SequentialIds, BEATS_PER_MEASURE,
};
pub use timeline::{Timeline, TimelineSnapshot};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_with_random_ids() {
        let mut timeline = Timeline::new(Box::new(RandomIds::default()));
        let id = timeline.append();
        assert!(timeline.get(id).is_some());
        assert_eq!(timeline.len(), 2);
    }
}
