// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Polyphonic software synth.
//!
//! Each note is a triangle carrier amplitude-modulated by a square wave at
//! `harmonicity` times the carrier frequency, shaped by an ADSR envelope.
//! Notes are scheduled in stream time (seconds since the first rendered
//! frame) and start on the exact sample they fall on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::music::Pitch;
use crate::timing::AudioClock;

/// Voices beyond this steal the quietest sounding voice
const MAX_VOICES: usize = 64;

/// Longest attack, decay or release accepted, in seconds
const MAX_STAGE: f64 = 10.0;

/// Timbre and envelope settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthParams {
    /// Output level in decibels
    pub volume_db: f64,
    /// Envelope attack in seconds
    pub attack: f64,
    /// Envelope decay in seconds
    pub decay: f64,
    /// Sustain level (0.0 - 1.0)
    pub sustain: f64,
    /// Envelope release in seconds
    pub release: f64,
    /// Modulator to carrier frequency ratio
    pub harmonicity: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            volume_db: -6.0,
            attack: 0.01,
            decay: 0.3,
            sustain: 0.8,
            release: 1.5,
            harmonicity: 3.0,
        }
    }
}

impl SynthParams {
    /// Clamp every value into its supported range.
    /// Non-finite values fall back to their defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let bounded = |value: f64, default: f64, min: f64, max: f64| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                default
            }
        };
        Self {
            volume_db: bounded(self.volume_db, defaults.volume_db, -96.0, 24.0),
            attack: bounded(self.attack, defaults.attack, 0.0, MAX_STAGE),
            decay: bounded(self.decay, defaults.decay, 0.0, MAX_STAGE),
            sustain: bounded(self.sustain, defaults.sustain, 0.0, 1.0),
            release: bounded(self.release, defaults.release, 0.0, MAX_STAGE),
            harmonicity: bounded(self.harmonicity, defaults.harmonicity, 0.0, 32.0),
        }
    }

    /// Linear gain for `volume_db`
    pub fn gain(&self) -> f64 {
        10f64.powf(self.volume_db / 20.0)
    }

    /// Envelope level `t` seconds after note start for a note held `hold` seconds
    pub fn envelope(&self, t: f64, hold: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t < hold {
            return self.gate_level(t);
        }
        let released = t - hold;
        if self.release <= 0.0 || released >= self.release {
            return 0.0;
        }
        self.gate_level(hold) * (1.0 - released / self.release)
    }

    fn gate_level(&self, t: f64) -> f64 {
        let sustain = self.sustain.clamp(0.0, 1.0);
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 - (1.0 - sustain) * (t - self.attack) / self.decay
        } else {
            sustain
        }
    }
}

/// Stream time derived from the number of frames rendered
#[derive(Debug, Clone)]
pub struct StreamClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl AudioClock for StreamClock {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Clone)]
struct Voice {
    frequency: f64,
    start: f64,
    hold: f64,
    carrier_phase: f64,
    modulator_phase: f64,
}

impl Voice {
    fn finished(&self, t: f64, params: &SynthParams) -> bool {
        t >= self.start + self.hold + params.release
    }

    /// Envelope level at `t`; voices that have not started yet rank loudest
    fn level(&self, t: f64, params: &SynthParams) -> f64 {
        if t < self.start {
            f64::INFINITY
        } else {
            params.envelope(t - self.start, self.hold)
        }
    }
}

/// Software synth rendering scheduled notes
#[derive(Debug)]
pub struct Synth {
    params: SynthParams,
    sample_rate: u32,
    voices: Vec<Voice>,
    frames: Arc<AtomicU64>,
}

impl Synth {
    /// Create a synth at the specified sample rate
    pub fn new(sample_rate: u32, params: SynthParams) -> Self {
        Self {
            params,
            sample_rate: sample_rate.max(1),
            voices: Vec::with_capacity(MAX_VOICES),
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Clock that advances as this synth renders
    pub fn clock(&self) -> StreamClock {
        StreamClock {
            frames: Arc::clone(&self.frames),
            sample_rate: self.sample_rate,
        }
    }

    /// Current stream time in seconds
    pub fn time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    /// Number of voices started or waiting to start
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Schedule `pitch` to sound at stream time `time` for `duration` seconds
    pub fn note(&mut self, pitch: Pitch, duration: f64, time: f64) {
        if self.voices.len() >= MAX_VOICES {
            let now = self.time();
            let params = self.params;
            let quietest = self
                .voices
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.level(now, &params).total_cmp(&b.level(now, &params)))
                .map(|(index, _)| index);
            if let Some(index) = quietest {
                self.voices.remove(index);
            }
        }
        self.voices.push(Voice {
            frequency: pitch.frequency(),
            start: time,
            hold: duration.max(0.0),
            carrier_phase: 0.0,
            modulator_phase: 0.0,
        });
    }

    /// Silence everything immediately
    pub fn all_notes_off(&mut self) {
        self.voices.clear();
    }

    /// Mix all voices into an interleaved buffer and advance stream time
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = buffer.len() / channels;
        let first_frame = self.frames.load(Ordering::Acquire);
        let rate = self.sample_rate as f64;
        let gain = self.params.gain() / 4.0;

        for (i, frame) in buffer.chunks_mut(channels).enumerate() {
            let t = (first_frame + i as u64) as f64 / rate;
            let mut mix = 0.0;
            for voice in &mut self.voices {
                let local = t - voice.start;
                if local < 0.0 {
                    continue;
                }
                let level = self.params.envelope(local, voice.hold);
                let carrier = 4.0 * (voice.carrier_phase - 0.5).abs() - 1.0;
                let modulator = if voice.modulator_phase < 0.5 { 1.0 } else { -1.0 };
                mix += carrier * (0.75 + 0.25 * modulator) * level;

                voice.carrier_phase = (voice.carrier_phase + voice.frequency / rate).fract();
                voice.modulator_phase = (voice.modulator_phase
                    + voice.frequency * self.params.harmonicity / rate)
                    .fract();
            }
            let sample = (mix * gain).clamp(-1.0, 1.0) as f32;
            for out in frame.iter_mut() {
                *out = sample;
            }
        }

        let end = (first_frame + frames as u64) as f64 / rate;
        let params = self.params;
        self.voices.retain(|voice| !voice.finished(end, &params));
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::Note;

    fn a4() -> Pitch {
        Pitch::new(Note::A, 4).unwrap()
    }

    #[test]
    fn test_envelope_shape() {
        let params = SynthParams::default();
        assert_eq!(params.envelope(-0.1, 1.0), 0.0);
        assert!((params.envelope(0.005, 1.0) - 0.5).abs() < 1e-9);
        assert!((params.envelope(0.01, 1.0) - 1.0).abs() < 1e-9);
        assert!((params.envelope(0.5, 1.0) - 0.8).abs() < 1e-9);
        // Halfway through the release
        assert!((params.envelope(1.75, 1.0) - 0.4).abs() < 1e-9);
        assert_eq!(params.envelope(2.5, 1.0), 0.0);
    }

    #[test]
    fn test_gain_from_db() {
        let params = SynthParams {
            volume_db: 0.0,
            ..Default::default()
        };
        assert!((params.gain() - 1.0).abs() < 1e-12);
        assert!((SynthParams::default().gain() - 0.501).abs() < 0.001);
    }

    #[test]
    fn test_render_advances_clock() {
        let mut synth = Synth::new(1000, SynthParams::default());
        let clock = synth.clock();
        let mut buffer = vec![0.0f32; 200];
        synth.render(&mut buffer, 2);
        assert!((clock.now() - 0.1).abs() < 1e-12);
        assert!((synth.time() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_silent_before_note_start() {
        let mut synth = Synth::new(1000, SynthParams::default());
        synth.note(a4(), 0.5, 0.05);

        let mut buffer = vec![0.0f32; 50];
        synth.render(&mut buffer, 1);
        assert!(buffer.iter().all(|&s| s == 0.0));

        let mut buffer = vec![0.0f32; 50];
        synth.render(&mut buffer, 1);
        assert!(buffer.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_voices_released_after_tail() {
        let params = SynthParams {
            release: 0.1,
            ..Default::default()
        };
        let mut synth = Synth::new(1000, params);
        synth.note(a4(), 0.1, 0.0);
        assert_eq!(synth.voice_count(), 1);

        let mut buffer = vec![0.0f32; 300];
        synth.render(&mut buffer, 1);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn test_voice_limit() {
        let mut synth = Synth::new(1000, SynthParams::default());
        for i in 0..(MAX_VOICES + 10) {
            synth.note(a4(), 1.0, i as f64);
        }
        assert_eq!(synth.voice_count(), MAX_VOICES);
        synth.all_notes_off();
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn test_voice_limit_steals_released_tail() {
        let mut synth = Synth::new(1000, SynthParams::default());
        synth.note(a4(), 10.0, 0.0);
        synth.note(a4(), 0.05, 0.0);
        for _ in 2..MAX_VOICES {
            synth.note(a4(), 10.0, 0.0);
        }

        // At 0.5s the short note is releasing below the sustain level
        let mut buffer = vec![0.0f32; 500];
        synth.render(&mut buffer, 1);
        synth.note(a4(), 0.5, 1.0);

        assert_eq!(synth.voice_count(), MAX_VOICES);
        assert!(synth.voices.iter().all(|voice| voice.hold != 0.05));
        assert_eq!(synth.voices.iter().filter(|voice| voice.hold == 10.0).count(), MAX_VOICES - 1);
    }

    #[test]
    fn test_params_normalized() {
        let params = SynthParams {
            release: f64::INFINITY,
            decay: 1.0e9,
            sustain: 2.0,
            volume_db: f64::NAN,
            ..Default::default()
        }
        .normalized();
        assert_eq!(params.release, 1.5);
        assert_eq!(params.decay, MAX_STAGE);
        assert_eq!(params.sustain, 1.0);
        assert_eq!(params.volume_db, -6.0);
    }

    #[test]
    fn test_output_is_bounded() {
        let params = SynthParams {
            volume_db: 24.0,
            ..Default::default()
        };
        let mut synth = Synth::new(8000, params);
        for _ in 0..MAX_VOICES {
            synth.note(a4(), 1.0, 0.0);
        }
        let mut buffer = vec![0.0f32; 1600];
        synth.render(&mut buffer, 2);
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
