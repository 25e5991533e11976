// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities.
//!
//! This module provides pitch classes, concrete pitches, the major and
//! natural minor modes, and the diatonic chord table the sequencer plays from.

pub mod chord;
pub mod scale;

pub use chord::{derive_chords, Chord, ChordQuality, ChordTable, REFERENCE_OCTAVE};
pub use scale::{MidiNote, Note, Pitch, ScaleMode};
