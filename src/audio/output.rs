// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device and pulls interleaved f32 frames from
//! a render callback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::AudioError;

/// Audio output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Buffer size in frames
    pub buffer_size: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 512,
            channels: 2,
        }
    }
}

impl AudioConfig {
    /// Buffer latency in seconds
    pub fn latency(&self) -> f64 {
        self.buffer_size as f64 / self.sample_rate.max(1) as f64
    }
}

/// A running output stream. Dropping it stops playback.
pub struct AudioOutput {
    _stream: Stream,
    config: AudioConfig,
}

impl AudioOutput {
    /// Open the default device and start pulling from `callback`
    pub fn open<F>(config: AudioConfig, mut callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };
        let channels = config.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    callback(data, channels);
                },
                move |err| {
                    warn!(%err, "audio stream error");
                },
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("failed to build stream: {e}")))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("failed to start stream: {e}")))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate,
            buffer = config.buffer_size,
            "audio output started"
        );

        Ok(Self {
            _stream: stream,
            config,
        })
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}

/// List available audio output devices
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.output_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_config_default() {
        let config = AudioConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.channels, 2);
    }

    #[test]
    fn test_latency_calculation() {
        let config = AudioConfig::default();
        assert!((config.latency() * 1000.0 - 11.6).abs() < 0.1); // ~11.6ms
    }

    #[test]
    fn test_device_queries_do_not_panic() {
        // May be empty in CI
        let _ = list_devices();
        let _ = default_device_name();
    }
}
