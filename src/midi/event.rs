// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Captured MIDI events.

use serde::Serialize;

use super::{messages, MidiMessage};

/// A single captured MIDI event.
///
/// Immutable once created. `timestamp` is monotonic milliseconds from the
/// session clock; only monotonicity is assumed, not wall-clock accuracy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiEvent {
    /// Monotonic milliseconds at arrival
    pub timestamp: f64,
    /// Raw status/data bytes, exactly as received (1-3 bytes)
    pub raw: Vec<u8>,
    /// Parsed message, derived from `raw` once at ingestion
    #[serde(skip)]
    pub message: MidiMessage,
    /// Originating device name, de-duplicated per session
    pub source: String,
}

impl MidiEvent {
    /// Create an event from raw bytes. Returns None for empty input.
    pub fn from_raw(timestamp: f64, raw: &[u8], source: impl Into<String>) -> Option<Self> {
        let message = MidiMessage::parse(raw)?;
        Some(Self {
            timestamp,
            raw: raw.to_vec(),
            message,
            source: source.into(),
        })
    }

    /// Raw status byte
    pub fn status(&self) -> u8 {
        self.raw[0]
    }

    /// Channel nibble. Only meaningful for channel-voice messages.
    pub fn channel(&self) -> Option<u8> {
        if self.status() < 0xF0 {
            Some(self.status() & 0x0F)
        } else {
            None
        }
    }

    /// Command nibble (0x80-0xE0). Only meaningful for channel-voice messages.
    pub fn command(&self) -> Option<u8> {
        if self.status() < 0xF0 {
            Some(self.status() & 0xF0)
        } else {
            None
        }
    }

    /// First data byte, when present
    pub fn note(&self) -> Option<u8> {
        self.raw.get(1).copied()
    }

    /// Second data byte, when present
    pub fn velocity(&self) -> Option<u8> {
        self.raw.get(2).copied()
    }

    /// Whether the raw status byte is in the realtime range (>= 0xF8)
    pub fn is_realtime(&self) -> bool {
        self.status() >= messages::REALTIME_START
    }

    /// Whether the status byte is in the channel-voice range (0x80-0xEF)
    pub fn is_channel_voice(&self) -> bool {
        (0x80..=0xEF).contains(&self.status())
    }
}
