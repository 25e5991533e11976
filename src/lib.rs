// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Strum sequencer.
//!
//! A chord-progression step sequencer: a timeline of measures, each a rest
//! or a diatonic chord strummed at a rhythmic subdivision, played in a loop
//! or once through a voice engine. Ticks are scheduled ahead of the audio
//! clock and the visible playhead follows the audio, not the scheduler.

pub mod arrangement;
pub mod audio;
pub mod config;
pub mod error;
pub mod music;
pub mod sequencer;
pub mod timing;
pub mod ui;

pub use error::ParseError;
