// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Parse errors shared by the music and arrangement types.

use thiserror::Error;

/// Failure to parse a user-supplied musical symbol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not one of the twelve pitch-class names
    #[error("unknown note name: {0:?}")]
    Note(String),
    /// Not a supported scale mode
    #[error("unknown scale mode: {0:?} (expected major or minor)")]
    ScaleMode(String),
    /// Not a supported rhythm symbol
    #[error("unknown rhythm: {0:?} (expected 1n, 2n, 4n, 8n or 16n)")]
    Rhythm(String),
    /// Not a pitch in scientific notation, or outside the MIDI range
    #[error("invalid pitch: {0:?}")]
    Pitch(String),
}
