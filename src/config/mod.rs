// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session configuration.
//!
//! Key, tempo, playback and synth settings loaded from YAML. The timeline
//! itself is never stored here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::{AudioConfig, SynthParams};
use crate::music::{Note, ScaleMode};
use crate::timing::Transport;

/// Root configuration for a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Key root (e.g., "C", "F#", "Bb")
    #[serde(default = "default_root")]
    pub root: Note,
    /// Scale mode ("major" or "minor")
    #[serde(default)]
    pub scale: ScaleMode,
    /// Tempo in BPM (40 - 220)
    #[serde(default = "default_bpm")]
    pub bpm: u16,
    /// Start over at the first measure after the last one
    #[serde(default = "default_looping")]
    pub looping: bool,
    /// Gap between the notes of one strum, in milliseconds
    #[serde(default = "default_strum_offset_ms")]
    pub strum_offset_ms: f64,
    /// How far ahead of the audio clock measures are scheduled, in milliseconds
    #[serde(default = "default_lookahead_ms")]
    pub lookahead_ms: f64,
    /// Extra delay before the playhead follows the audio, in milliseconds
    #[serde(default)]
    pub output_latency_ms: f64,
    /// Synth timbre
    #[serde(default)]
    pub synth: SynthParams,
    /// Output device settings
    #[serde(default)]
    pub audio: AudioConfig,
}

const MAX_STRUM_OFFSET_MS: f64 = 1000.0;
const MAX_LOOKAHEAD_MS: f64 = 1000.0;
const MAX_OUTPUT_LATENCY_MS: f64 = 1000.0;

fn bounded(value: f64, default: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        default
    }
}

fn default_root() -> Note {
    Note::C
}
fn default_bpm() -> u16 {
    80
}
fn default_looping() -> bool {
    true
}
fn default_strum_offset_ms() -> f64 {
    30.0
}
fn default_lookahead_ms() -> f64 {
    100.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            scale: ScaleMode::default(),
            bpm: default_bpm(),
            looping: default_looping(),
            strum_offset_ms: default_strum_offset_ms(),
            lookahead_ms: default_lookahead_ms(),
            output_latency_ms: 0.0,
            synth: SynthParams::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load a session configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a session configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        Ok(config.normalized())
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Clamp every value into its supported range.
    /// Non-finite durations fall back to their defaults.
    pub fn normalized(mut self) -> Self {
        self.bpm = self.bpm.clamp(Transport::MIN_BPM, Transport::MAX_BPM);
        self.strum_offset_ms =
            bounded(self.strum_offset_ms, default_strum_offset_ms(), MAX_STRUM_OFFSET_MS);
        self.lookahead_ms = bounded(self.lookahead_ms, default_lookahead_ms(), MAX_LOOKAHEAD_MS);
        self.output_latency_ms = bounded(self.output_latency_ms, 0.0, MAX_OUTPUT_LATENCY_MS);
        self.synth = self.synth.normalized();
        self
    }

    /// Strum offset in seconds
    pub fn strum_offset(&self) -> f64 {
        self.strum_offset_ms / 1000.0
    }

    /// Lookahead in seconds
    pub fn lookahead(&self) -> f64 {
        self.lookahead_ms / 1000.0
    }

    /// Output latency in seconds
    pub fn output_latency(&self) -> f64 {
        self.output_latency_ms / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = SessionConfig::default();
        assert_eq!(config.root, Note::C);
        assert_eq!(config.scale, ScaleMode::Major);
        assert_eq!(config.bpm, 80);
        assert!(config.looping);
        assert!((config.strum_offset() - 0.03).abs() < 1e-12);
        assert!((config.lookahead() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
root: "F#"
scale: minor
bpm: 132
looping: false
synth:
  release: 0.5
"#;
        let config = SessionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.root, Note::Fs);
        assert_eq!(config.scale, ScaleMode::Minor);
        assert_eq!(config.bpm, 132);
        assert!(!config.looping);
        assert_eq!(config.synth.release, 0.5);
        assert_eq!(config.synth.attack, SynthParams::default().attack);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SessionConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = SessionConfig::from_yaml("bpm: 400\nstrum_offset_ms: -5\n").unwrap();
        assert_eq!(config.bpm, 220);
        assert_eq!(config.strum_offset_ms, 0.0);
    }

    #[test]
    fn test_unbounded_durations_are_limited() {
        let yaml = r#"
lookahead_ms: 1.0e9
output_latency_ms: .inf
strum_offset_ms: .nan
synth:
  release: .inf
  attack: 1.0e9
"#;
        let config = SessionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.lookahead_ms, 1000.0);
        assert_eq!(config.output_latency_ms, 0.0);
        assert_eq!(config.strum_offset_ms, 30.0);
        assert_eq!(config.synth.release, SynthParams::default().release);
        assert_eq!(config.synth.attack, 10.0);

        let config = SessionConfig::from_yaml("output_latency_ms: 1.0e9
").unwrap();
        assert_eq!(config.output_latency(), 1.0);
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        assert!(SessionConfig::from_yaml("root: H\n").is_err());
        assert!(SessionConfig::from_yaml("scale: lydian\n").is_err());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.yaml");

        let config = SessionConfig {
            root: Note::As,
            scale: ScaleMode::Minor,
            bpm: 96,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SessionConfig::load("/nonexistent/session.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("session.yaml"));
    }
}
