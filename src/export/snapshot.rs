// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! JSON snapshot output.
//!
//! A snapshot carries the capture window verbatim, with raw bytes intact,
//! so a take can be inspected or re-processed without parsing SMF. Field
//! names are camelCase to match the companion tooling that consumes them.

use chrono::Local;
use serde::Serialize;

use crate::capture::CaptureMode;
use crate::config::Settings;
use crate::midi::MidiEvent;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub metadata: Metadata,
    pub events: Vec<SnapshotEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub session: String,
    pub track: String,
    pub mode: String,
    pub length_seconds: u32,
    pub bpm: f64,
    pub timestamp: String,
    pub app_version: String,
}

/// One captured event, normalized so the first event sits at time zero
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEvent {
    pub offset_ms: f64,
    pub data: Vec<u8>,
    pub source: String,
}

impl Snapshot {
    pub fn build(
        settings: &Settings,
        mode: CaptureMode,
        length_seconds: u32,
        bpm: f64,
        events: &[MidiEvent],
    ) -> Self {
        let t0 = events.first().map(|e| e.timestamp).unwrap_or(0.0);
        Self {
            metadata: Metadata {
                session: settings.session_name.clone(),
                track: settings.track_tag.clone(),
                mode: mode.to_string(),
                length_seconds,
                bpm,
                timestamp: Local::now().to_rfc3339(),
                app_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            events: events
                .iter()
                .map(|e| SnapshotEvent {
                    offset_ms: e.timestamp - t0,
                    data: e.raw.clone(),
                    source: e.source.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
