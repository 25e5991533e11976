// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice engines for the sequencer.
//!
//! This module provides:
//! - The [`VoiceEngine`] boundary the step scheduler triggers notes through
//! - A software synth rendered to the default device via cpal
//! - A headless engine that only logs what it would play

pub mod output;
pub mod synth;

pub use output::{default_device_name, list_devices, AudioConfig, AudioOutput};
pub use synth::{StreamClock, Synth, SynthParams};

use std::future::Future;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::debug;

use crate::music::Pitch;

/// Audio error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// No audio device available
    #[error("no audio output device available")]
    NoDevice,
    /// Failed to build or start the audio stream
    #[error("audio stream failed: {0}")]
    StreamFailed(String),
    /// The environment refused to activate audio
    #[error("audio unavailable: {0}")]
    Unavailable(String),
}

/// Something that can sound a pitch at a point in audio time.
///
/// Triggers are fire-and-forget. `time` is on the same clock the sequencer
/// schedules against, and may lie in the future.
pub trait VoiceEngine {
    /// Sound `pitch` starting at `time` and release it `duration` seconds later
    fn trigger(&mut self, pitch: Pitch, duration: f64, time: f64);

    /// Resolves once the engine is able to play scheduled notes
    fn ensure_ready(&mut self) -> impl Future<Output = Result<(), AudioError>> {
        std::future::ready(Ok(()))
    }

    /// Silence everything and release the output
    fn shutdown(&mut self) {}
}

/// Software synth on the default output device
pub struct AudioEngine {
    synth: Arc<Mutex<Synth>>,
    clock: StreamClock,
    output: Option<AudioOutput>,
    config: AudioConfig,
}

impl AudioEngine {
    /// Create an engine; the device is not opened until `start`
    pub fn new(config: AudioConfig, params: SynthParams) -> Self {
        let synth = Synth::new(config.sample_rate, params);
        let clock = synth.clock();
        Self {
            synth: Arc::new(Mutex::new(synth)),
            clock,
            output: None,
            config,
        }
    }

    /// Clock driven by the rendered sample count
    pub fn clock(&self) -> StreamClock {
        self.clock.clone()
    }

    /// Open the output stream if it is not already running
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.output.is_some() {
            return Ok(());
        }

        let synth = Arc::clone(&self.synth);
        let output = AudioOutput::open(self.config, move |buffer, channels| {
            if let Ok(mut synth) = synth.lock() {
                synth.render(buffer, channels);
            }
        })?;

        self.output = Some(output);
        Ok(())
    }

    /// Close the output stream
    pub fn stop(&mut self) {
        self.output = None;
    }

    pub fn is_running(&self) -> bool {
        self.output.is_some()
    }

    /// Silence every sounding and pending note
    pub fn all_notes_off(&self) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.all_notes_off();
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}

impl VoiceEngine for AudioEngine {
    fn trigger(&mut self, pitch: Pitch, duration: f64, time: f64) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.note(pitch, duration, time);
        }
    }

    fn ensure_ready(&mut self) -> impl Future<Output = Result<(), AudioError>> {
        std::future::ready(self.start())
    }

    fn shutdown(&mut self) {
        self.all_notes_off();
        self.stop();
    }
}

/// Headless engine: logs each note instead of sounding it
#[derive(Debug, Default)]
pub struct TraceVoice {
    triggered: u64,
}

impl TraceVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes triggered so far
    pub fn triggered(&self) -> u64 {
        self.triggered
    }
}

impl VoiceEngine for TraceVoice {
    fn trigger(&mut self, pitch: Pitch, duration: f64, time: f64) {
        self.triggered += 1;
        debug!(%pitch, duration, time, "note");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::Note;
    use crate::timing::AudioClock;

    #[test]
    fn test_audio_engine_starts_closed() {
        let engine = AudioEngine::new(AudioConfig::default(), SynthParams::default());
        assert!(!engine.is_running());
        assert_eq!(engine.clock().now(), 0.0);
    }

    #[test]
    fn test_audio_engine_queues_notes_before_start() {
        let mut engine = AudioEngine::new(AudioConfig::default(), SynthParams::default());
        let c4 = Pitch::new(Note::C, 4).unwrap();
        engine.trigger(c4, 0.5, 0.0);
        engine.trigger(c4, 0.5, 0.5);
        assert_eq!(engine.synth.lock().unwrap().voice_count(), 2);

        engine.shutdown();
        assert_eq!(engine.synth.lock().unwrap().voice_count(), 0);
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_trace_voice_is_always_ready() {
        let mut voice = TraceVoice::new();
        assert!(voice.ensure_ready().await.is_ok());
        voice.trigger(Pitch::new(Note::E, 4).unwrap(), 0.25, 1.0);
        assert_eq!(voice.triggered(), 1);
    }

    #[test]
    fn test_audio_error_messages() {
        assert_eq!(
            AudioError::NoDevice.to_string(),
            "no audio output device available"
        );
        assert!(AudioError::Unavailable("blocked".into())
            .to_string()
            .contains("blocked"));
    }
}
