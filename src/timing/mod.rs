// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the audio-domain clocks and the measure-rate
//! transport that drives the step scheduler.

pub mod clock;
pub mod transport;

pub use clock::{AudioClock, ManualClock, SystemClock};
pub use transport::{ClockState, Transport};
