// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes, concrete pitches and the two diatonic scale modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Transpose upward by semitones, wrapping within the octave
    pub fn transpose(self, semitones: u8) -> Self {
        Note::from_pitch_class(self.pitch_class() + semitones % 12)
    }

    /// Display name using sharps
    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "D#",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "G#",
            Note::A => "A",
            Note::As => "A#",
            Note::B => "B",
        }
    }
}

impl FromStr for Note {
    type Err = ParseError;

    /// Parse note from string (e.g., "C", "C#", "Db", "F#")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" | "B#" => Ok(Note::C),
            "C#" | "CS" | "DB" => Ok(Note::Cs),
            "D" => Ok(Note::D),
            "D#" | "DS" | "EB" => Ok(Note::Ds),
            "E" | "FB" => Ok(Note::E),
            "F" | "E#" | "ES" => Ok(Note::F),
            "F#" | "FS" | "GB" => Ok(Note::Fs),
            "G" => Ok(Note::G),
            "G#" | "GS" | "AB" => Ok(Note::Gs),
            "A" => Ok(Note::A),
            "A#" | "AS" | "BB" => Ok(Note::As),
            "B" | "CB" => Ok(Note::B),
            _ => Err(ParseError::Note(s.to_string())),
        }
    }
}

impl TryFrom<String> for Note {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.name().to_string()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete pitch: pitch class plus octave, stored as a MIDI note number.
///
/// Octaves follow scientific pitch notation, so middle C is `C4` (MIDI 60).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(MidiNote);

impl Pitch {
    /// Build a pitch from a note and octave. Returns `None` outside MIDI range.
    pub fn new(note: Note, octave: i8) -> Option<Self> {
        let midi = (octave as i16 + 1) * 12 + note.pitch_class() as i16;
        if !(0..=127).contains(&midi) {
            return None;
        }
        Some(Pitch(midi as MidiNote))
    }

    /// Wrap a raw MIDI note number
    pub fn from_midi(midi: MidiNote) -> Option<Self> {
        (midi <= 127).then_some(Pitch(midi))
    }

    pub fn midi(self) -> MidiNote {
        self.0
    }

    pub fn note(self) -> Note {
        Note::from_pitch_class(self.0 % 12)
    }

    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Raise by semitones, `None` if the result leaves the MIDI range
    pub fn up(self, semitones: u8) -> Option<Self> {
        Pitch::from_midi(self.0.checked_add(semitones)?)
    }

    /// Equal-tempered frequency with A4 = 440 Hz
    pub fn frequency(self) -> f64 {
        440.0 * 2f64.powf((self.0 as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note(), self.octave())
    }
}

impl FromStr for Pitch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| ParseError::Pitch(s.to_string()))?;
        let (name, octave) = s.split_at(split);
        let note: Note = name.parse().map_err(|_| ParseError::Pitch(s.to_string()))?;
        let octave: i8 = octave.parse().map_err(|_| ParseError::Pitch(s.to_string()))?;
        Pitch::new(note, octave).ok_or_else(|| ParseError::Pitch(s.to_string()))
    }
}

/// Scale modes a key can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    #[default]
    Major,
    /// Natural minor (Aeolian)
    Minor,
}

impl ScaleMode {
    /// Get the intervals (semitones from root) for this mode
    pub fn intervals(self) -> [u8; 7] {
        match self {
            ScaleMode::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleMode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Get a human-readable name for this mode
    pub fn name(self) -> &'static str {
        match self {
            ScaleMode::Major => "Major",
            ScaleMode::Minor => "Minor",
        }
    }

    /// Get the parallel minor/major mode
    pub fn parallel(self) -> Self {
        match self {
            ScaleMode::Major => ScaleMode::Minor,
            ScaleMode::Minor => ScaleMode::Major,
        }
    }

    /// Pitch classes of the seven scale degrees built on `root`
    pub fn degrees(self, root: Note) -> [Note; 7] {
        self.intervals().map(|interval| root.transpose(interval))
    }
}

impl FromStr for ScaleMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match normalized.as_str() {
            "major" | "ionian" | "maj" => Ok(ScaleMode::Major),
            "minor" | "naturalminor" | "aeolian" | "min" => Ok(ScaleMode::Minor),
            _ => Err(ParseError::ScaleMode(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_pitch_class_roundtrip() {
        for (pc, note) in Note::ALL.iter().enumerate() {
            assert_eq!(note.pitch_class(), pc as u8);
            assert_eq!(Note::from_pitch_class(pc as u8), *note);
        }
    }

    #[test]
    fn test_note_from_str() {
        assert_eq!("C".parse::<Note>().unwrap(), Note::C);
        assert_eq!("c#".parse::<Note>().unwrap(), Note::Cs);
        assert_eq!("Db".parse::<Note>().unwrap(), Note::Cs);
        assert_eq!(" F# ".parse::<Note>().unwrap(), Note::Fs);
        assert!("H".parse::<Note>().is_err());
    }

    #[test]
    fn test_note_transpose_wraps() {
        assert_eq!(Note::A.transpose(3), Note::C);
        assert_eq!(Note::B.transpose(1), Note::C);
        assert_eq!(Note::C.transpose(12), Note::C);
    }

    #[test]
    fn test_pitch_display_and_octave() {
        let c4 = Pitch::new(Note::C, 4).unwrap();
        assert_eq!(c4.midi(), 60);
        assert_eq!(c4.to_string(), "C4");

        let a4 = Pitch::new(Note::A, 4).unwrap();
        assert_eq!(a4.midi(), 69);
        assert!((a4.frequency() - 440.0).abs() < 1e-9);

        let c5 = a4.up(3).unwrap();
        assert_eq!(c5.to_string(), "C5");
        assert_eq!(c5.octave(), 5);
    }

    #[test]
    fn test_pitch_parse() {
        assert_eq!("C#4".parse::<Pitch>().unwrap().midi(), 61);
        assert_eq!("A-1".parse::<Pitch>().unwrap().midi(), 9);
        assert!("C".parse::<Pitch>().is_err());
        assert!("X4".parse::<Pitch>().is_err());
        assert!("G9".parse::<Pitch>().is_ok());
        assert!("A9".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_scale_mode_degrees() {
        let c_major = ScaleMode::Major.degrees(Note::C);
        assert_eq!(
            c_major,
            [Note::C, Note::D, Note::E, Note::F, Note::G, Note::A, Note::B]
        );

        let a_minor = ScaleMode::Minor.degrees(Note::A);
        assert_eq!(
            a_minor,
            [Note::A, Note::B, Note::C, Note::D, Note::E, Note::F, Note::G]
        );
    }

    #[test]
    fn test_scale_mode_parse_and_parallel() {
        assert_eq!("major".parse::<ScaleMode>().unwrap(), ScaleMode::Major);
        assert_eq!("Natural Minor".parse::<ScaleMode>().unwrap(), ScaleMode::Minor);
        assert!("dorian".parse::<ScaleMode>().is_err());
        assert_eq!(ScaleMode::Major.parallel(), ScaleMode::Minor);
    }

    #[test]
    fn test_note_serde() {
        let yaml = serde_yaml::to_string(&Note::Fs).unwrap();
        assert_eq!(yaml.trim(), "F#");
        let parsed: Note = serde_yaml::from_str("Bb").unwrap();
        assert_eq!(parsed, Note::As);
    }
}
