// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Measures, rhythms and measure identity.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Number of beats in one measure (4/4)
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// Stable identity of a measure, never reused within a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeasureId(pub u64);

impl fmt::Display for MeasureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{:x}", self.0)
    }
}

/// Source of fresh measure identifiers
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> MeasureId;
}

/// Deterministic ids counting up from a starting value
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> MeasureId {
        let id = MeasureId(self.next);
        self.next += 1;
        id
    }
}

/// Random 64-bit ids; remembers what it handed out so none repeat
#[derive(Debug, Default)]
pub struct RandomIds {
    issued: HashSet<u64>,
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> MeasureId {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen::<u64>();
            if self.issued.insert(candidate) {
                return MeasureId(candidate);
            }
        }
    }
}

/// Rhythmic subdivision of a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rhythm {
    #[serde(rename = "1n")]
    Whole,
    #[serde(rename = "2n")]
    Half,
    #[default]
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
}

impl Rhythm {
    pub const ALL: [Rhythm; 5] = [
        Rhythm::Whole,
        Rhythm::Half,
        Rhythm::Quarter,
        Rhythm::Eighth,
        Rhythm::Sixteenth,
    ];

    /// Number of strums that fit in one measure
    pub fn strum_count(self) -> u32 {
        match self {
            Rhythm::Whole => 1,
            Rhythm::Half => 2,
            Rhythm::Quarter => 4,
            Rhythm::Eighth => 8,
            Rhythm::Sixteenth => 16,
        }
    }

    /// Nominal note length in seconds at `bpm`
    pub fn duration(self, bpm: f64) -> f64 {
        measure_duration(bpm) / self.strum_count() as f64
    }

    /// Notation symbol, e.g. "4n"
    pub fn symbol(self) -> &'static str {
        match self {
            Rhythm::Whole => "1n",
            Rhythm::Half => "2n",
            Rhythm::Quarter => "4n",
            Rhythm::Eighth => "8n",
            Rhythm::Sixteenth => "16n",
        }
    }
}

impl FromStr for Rhythm {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1n" | "1" | "whole" => Ok(Rhythm::Whole),
            "2n" | "2" | "half" => Ok(Rhythm::Half),
            "4n" | "4" | "quarter" => Ok(Rhythm::Quarter),
            "8n" | "8" | "eighth" => Ok(Rhythm::Eighth),
            "16n" | "16" | "sixteenth" => Ok(Rhythm::Sixteenth),
            _ => Err(ParseError::Rhythm(s.to_string())),
        }
    }
}

impl fmt::Display for Rhythm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Length of one 4/4 measure in seconds
pub fn measure_duration(bpm: f64) -> f64 {
    BEATS_PER_MEASURE * 60.0 / bpm
}

/// One slot of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub id: MeasureId,
    /// Zero-indexed scale degree into the chord table; `None` is a rest
    pub chord_index: Option<usize>,
    pub rhythm: Rhythm,
}

impl Measure {
    /// A rest with the default rhythm
    pub fn rest(id: MeasureId) -> Self {
        Self {
            id,
            chord_index: None,
            rhythm: Rhythm::default(),
        }
    }

    pub fn is_rest(&self) -> bool {
        self.chord_index.is_none()
    }

    /// Copy of this measure with one field replaced
    pub fn with(mut self, update: MeasureUpdate) -> Self {
        match update {
            MeasureUpdate::Chord(chord_index) => self.chord_index = chord_index,
            MeasureUpdate::Rhythm(rhythm) => self.rhythm = rhythm,
        }
        self
    }
}

/// A single-field edit to a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureUpdate {
    Chord(Option<usize>),
    Rhythm(Rhythm),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strum_counts() {
        let counts: Vec<u32> = Rhythm::ALL.iter().map(|r| r.strum_count()).collect();
        assert_eq!(counts, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn test_rhythm_durations() {
        // 120 bpm: a measure is 2 seconds, a quarter is half a second
        assert!((measure_duration(120.0) - 2.0).abs() < 1e-12);
        assert!((Rhythm::Quarter.duration(120.0) - 0.5).abs() < 1e-12);
        assert!((Rhythm::Half.duration(60.0) - 2.0).abs() < 1e-12);
        assert!((Rhythm::Sixteenth.duration(240.0) - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_rhythm_parse() {
        assert_eq!("4n".parse::<Rhythm>().unwrap(), Rhythm::Quarter);
        assert_eq!("16".parse::<Rhythm>().unwrap(), Rhythm::Sixteenth);
        assert_eq!("Whole".parse::<Rhythm>().unwrap(), Rhythm::Whole);
        assert!("3n".parse::<Rhythm>().is_err());
        for rhythm in Rhythm::ALL {
            assert_eq!(rhythm.to_string().parse::<Rhythm>().unwrap(), rhythm);
        }
    }

    #[test]
    fn test_default_measure_is_quarter_rest() {
        let m = Measure::rest(MeasureId(7));
        assert!(m.is_rest());
        assert_eq!(m.rhythm, Rhythm::Quarter);
    }

    #[test]
    fn test_update_preserves_other_fields() {
        let m = Measure::rest(MeasureId(1)).with(MeasureUpdate::Chord(Some(3)));
        assert_eq!(m.chord_index, Some(3));
        assert_eq!(m.rhythm, Rhythm::Quarter);

        let m = m.with(MeasureUpdate::Rhythm(Rhythm::Eighth));
        assert_eq!(m.id, MeasureId(1));
        assert_eq!(m.chord_index, Some(3));
        assert_eq!(m.rhythm, Rhythm::Eighth);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::starting_at(10);
        assert_eq!(ids.next_id(), MeasureId(10));
        assert_eq!(ids.next_id(), MeasureId(11));
    }

    #[test]
    fn test_random_ids_unique() {
        let mut ids = RandomIds::default();
        let drawn: HashSet<MeasureId> = (0..256).map(|_| ids.next_id()).collect();
        assert_eq!(drawn.len(), 256);
    }
}
