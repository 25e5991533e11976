// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Diatonic triads for a key.
//!
//! Every scale degree yields one three-note chord voiced in close position
//! with its root at [`REFERENCE_OCTAVE`]. The third and fifth move into the
//! next octave when their pitch class wraps past B.

use std::fmt;

use super::scale::{Note, Pitch, ScaleMode};

/// Octave the chord roots are voiced in
pub const REFERENCE_OCTAVE: i8 = 4;

/// Triad quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Quality of the triad on a zero-indexed scale degree
    pub fn for_degree(mode: ScaleMode, degree: usize) -> Self {
        match (mode, degree) {
            (ScaleMode::Major, 1 | 2 | 5) => ChordQuality::Minor,
            (ScaleMode::Major, 6) => ChordQuality::Diminished,
            (ScaleMode::Minor, 0 | 3 | 4) => ChordQuality::Minor,
            (ScaleMode::Minor, 1) => ChordQuality::Diminished,
            _ => ChordQuality::Major,
        }
    }

    /// Semitones from root to third
    pub fn third(self) -> u8 {
        match self {
            ChordQuality::Major => 4,
            ChordQuality::Minor | ChordQuality::Diminished => 3,
        }
    }

    /// Semitones from root to fifth
    pub fn fifth(self) -> u8 {
        match self {
            ChordQuality::Diminished => 6,
            ChordQuality::Major | ChordQuality::Minor => 7,
        }
    }

    /// Suffix appended to the root name
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
        }
    }
}

/// An immutable diatonic triad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    /// Display label, e.g. "C", "Dm", "Bdim"
    pub name: String,
    /// Root, third and fifth
    pub notes: [Pitch; 3],
    /// Pitch class of the root
    pub root: Note,
    pub quality: ChordQuality,
}

impl Chord {
    /// Build the triad of `quality` on `root` in `octave`.
    ///
    /// Returns `None` if any chord tone falls outside the MIDI range.
    pub fn triad(root: Note, quality: ChordQuality, octave: i8) -> Option<Self> {
        let base = Pitch::new(root, octave)?;
        Some(Self {
            name: format!("{}{}", root, quality.suffix()),
            notes: [base, base.up(quality.third())?, base.up(quality.fifth())?],
            root,
            quality,
        })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Derive the seven diatonic triads of `root` in `mode`, in degree order
pub fn derive_chords(root: Note, mode: ScaleMode) -> Vec<Chord> {
    mode.degrees(root)
        .iter()
        .enumerate()
        .filter_map(|(degree, &note)| {
            Chord::triad(note, ChordQuality::for_degree(mode, degree), REFERENCE_OCTAVE)
        })
        .collect()
}

/// Cached chord table for the current key.
///
/// Regenerated wholesale whenever the root or mode changes; lookups by
/// index never fail, they return `None` for out-of-range degrees.
#[derive(Debug, Clone)]
pub struct ChordTable {
    root: Note,
    mode: ScaleMode,
    chords: Vec<Chord>,
}

impl ChordTable {
    pub fn new(root: Note, mode: ScaleMode) -> Self {
        Self {
            root,
            mode,
            chords: derive_chords(root, mode),
        }
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    /// Change the key root, re-deriving only on an actual change
    pub fn set_root(&mut self, root: Note) {
        if root != self.root {
            self.root = root;
            self.chords = derive_chords(self.root, self.mode);
        }
    }

    /// Change the scale mode, re-deriving only on an actual change
    pub fn set_mode(&mut self, mode: ScaleMode) {
        if mode != self.mode {
            self.mode = mode;
            self.chords = derive_chords(self.root, self.mode);
        }
    }

    /// Chord for a zero-indexed degree
    pub fn get(&self, index: usize) -> Option<&Chord> {
        self.chords.get(index)
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

impl Default for ChordTable {
    fn default() -> Self {
        Self::new(Note::C, ScaleMode::Major)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chords: &[Chord]) -> Vec<&str> {
        chords.iter().map(|c| c.name.as_str()).collect()
    }

    fn pitches(chord: &Chord) -> Vec<String> {
        chord.notes.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_c_major_chords() {
        let chords = derive_chords(Note::C, ScaleMode::Major);
        assert_eq!(
            names(&chords),
            vec!["C", "Dm", "Em", "F", "G", "Am", "Bdim"]
        );
        assert_eq!(pitches(&chords[0]), vec!["C4", "E4", "G4"]);
        assert_eq!(pitches(&chords[1]), vec!["D4", "F4", "A4"]);
        assert_eq!(pitches(&chords[6]), vec!["B4", "D5", "F5"]);
    }

    #[test]
    fn test_a_minor_chords() {
        let chords = derive_chords(Note::A, ScaleMode::Minor);
        assert_eq!(
            names(&chords),
            vec!["Am", "Bdim", "C", "Dm", "Em", "F", "G"]
        );
        assert_eq!(pitches(&chords[0]), vec!["A4", "C5", "E5"]);
        assert_eq!(pitches(&chords[2]), vec!["C4", "E4", "G4"]);
    }

    #[test]
    fn test_chord_roots_follow_scale() {
        let chords = derive_chords(Note::Fs, ScaleMode::Major);
        let roots: Vec<Note> = chords.iter().map(|c| c.root).collect();
        assert_eq!(roots, ScaleMode::Major.degrees(Note::Fs).to_vec());
        assert_eq!(chords[0].name, "F#");
        assert_eq!(chords[6].name, "Fdim");
    }

    #[test]
    fn test_every_key_yields_seven_triads() {
        for root in Note::ALL {
            for mode in [ScaleMode::Major, ScaleMode::Minor] {
                let chords = derive_chords(root, mode);
                assert_eq!(chords.len(), 7);
                for chord in &chords {
                    let root_midi = chord.notes[0].midi();
                    assert_eq!(chord.notes[0].octave(), REFERENCE_OCTAVE);
                    assert_eq!(chord.notes[1].midi() - root_midi, chord.quality.third());
                    assert_eq!(chord.notes[2].midi() - root_midi, chord.quality.fifth());
                }
            }
        }
    }

    #[test]
    fn test_triad_out_of_range() {
        assert!(Chord::triad(Note::G, ChordQuality::Major, 9).is_none());
        assert!(Chord::triad(Note::C, ChordQuality::Major, 9).is_some());
    }

    #[test]
    fn test_quality_by_degree() {
        use ChordQuality::*;
        let major: Vec<_> = (0..7).map(|d| ChordQuality::for_degree(ScaleMode::Major, d)).collect();
        assert_eq!(major, vec![Major, Minor, Minor, Major, Major, Minor, Diminished]);
        let minor: Vec<_> = (0..7).map(|d| ChordQuality::for_degree(ScaleMode::Minor, d)).collect();
        assert_eq!(minor, vec![Minor, Diminished, Major, Minor, Minor, Major, Major]);
    }

    #[test]
    fn test_chord_table_caches_until_change() {
        let mut table = ChordTable::default();
        assert_eq!(table.get(0).map(|c| c.name.as_str()), Some("C"));
        assert!(table.get(7).is_none());

        table.set_root(Note::G);
        assert_eq!(table.get(0).map(|c| c.name.as_str()), Some("G"));

        table.set_mode(ScaleMode::Minor);
        assert_eq!(table.get(0).map(|c| c.name.as_str()), Some("Gm"));
        assert_eq!(table.len(), 7);
    }
}
