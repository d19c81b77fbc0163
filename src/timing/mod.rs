// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo detection from incoming MIDI clock.

pub mod tempo;

pub use tempo::TempoEstimator;

/// Pulses Per Quarter Note - MIDI clock standard is 24
pub const PPQN: u32 = 24;
