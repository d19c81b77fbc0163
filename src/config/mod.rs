// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Settings for a capture session.
//!
//! Settings load from a YAML file with defaults for missing keys, and are
//! validated with clamping: out-of-range values are corrected and the
//! corrections reported so the caller can surface them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which encodings a capture produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// Standard MIDI File only
    Midi,
    /// JSON snapshot only
    Json,
    /// Both encodings
    Both,
}

impl SaveFormat {
    pub fn wants_midi(&self) -> bool {
        matches!(self, SaveFormat::Midi | SaveFormat::Both)
    }

    pub fn wants_json(&self) -> bool {
        matches!(self, SaveFormat::Json | SaveFormat::Both)
    }
}

impl Default for SaveFormat {
    fn default() -> Self {
        SaveFormat::Midi
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Session label used in filenames and markers
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Track label used in filenames and markers
    #[serde(default = "default_track_tag")]
    pub track_tag: String,
    /// Capture length in seconds (1-300)
    #[serde(default = "default_max_capture_seconds")]
    pub max_capture_seconds: u32,
    /// Pre-roll before the window start in milliseconds (0-10000)
    #[serde(default = "default_pre_roll_ms")]
    pub pre_roll_ms: u32,
    /// Manual tempo used when no MIDI clock is live (40-300)
    #[serde(default = "default_manual_bpm")]
    pub manual_bpm: f64,
    /// Capture forward from the trigger instead of backward
    #[serde(default)]
    pub forward_mode: bool,
    /// Drop realtime messages (status >= 0xF8) before buffering
    #[serde(default = "default_true")]
    pub ignore_realtime: bool,
    /// Derive tempo from incoming MIDI clock
    #[serde(default = "default_true")]
    pub enable_auto_bpm: bool,
    /// Note number that fires a capture
    #[serde(default = "default_trigger_note")]
    pub trigger_note: u8,
    /// Channel the trigger note must arrive on
    #[serde(default)]
    pub trigger_channel: u8,
    /// Which encodings to produce
    #[serde(default)]
    pub save_format: SaveFormat,
    /// Maximum buffered event age in milliseconds
    #[serde(default = "default_buffer_max_ms")]
    pub buffer_max_ms: u32,
    /// Directory captures are saved into
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
}

fn default_session_name() -> String {
    "Session".to_string()
}
fn default_track_tag() -> String {
    "Track".to_string()
}
fn default_max_capture_seconds() -> u32 {
    30
}
fn default_pre_roll_ms() -> u32 {
    3000
}
fn default_manual_bpm() -> f64 {
    120.0
}
fn default_true() -> bool {
    true
}
fn default_trigger_note() -> u8 {
    60
}
fn default_buffer_max_ms() -> u32 {
    90_000
}
fn default_save_dir() -> PathBuf {
    PathBuf::from("DJ Captures")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_name: default_session_name(),
            track_tag: default_track_tag(),
            max_capture_seconds: default_max_capture_seconds(),
            pre_roll_ms: default_pre_roll_ms(),
            manual_bpm: default_manual_bpm(),
            forward_mode: false,
            ignore_realtime: true,
            enable_auto_bpm: true,
            trigger_note: default_trigger_note(),
            trigger_channel: 0,
            save_format: SaveFormat::default(),
            buffer_max_ms: default_buffer_max_ms(),
            save_dir: default_save_dir(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse settings YAML")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize settings to YAML")
    }

    /// Save settings to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }

    /// Clamp all values into their allowed ranges.
    ///
    /// Returns one message per corrected field.
    pub fn validate(&mut self) -> Vec<String> {
        let mut corrections = Vec::new();

        if self.max_capture_seconds < 1 || self.max_capture_seconds > 300 {
            self.max_capture_seconds = self.max_capture_seconds.clamp(1, 300);
            corrections.push(format!(
                "max_capture_seconds limited to 1-300 (now {})",
                self.max_capture_seconds
            ));
        }
        if self.pre_roll_ms > 10_000 {
            self.pre_roll_ms = 10_000;
            corrections.push("pre_roll_ms limited to 10000".to_string());
        }
        if self.manual_bpm < 40.0 || self.manual_bpm > 300.0 {
            self.manual_bpm = self.manual_bpm.clamp(40.0, 300.0);
            corrections.push(format!("manual_bpm limited to 40-300 (now {})", self.manual_bpm));
        }
        if self.trigger_note > 127 {
            self.trigger_note = 127;
            corrections.push("trigger_note limited to 127".to_string());
        }
        if self.trigger_channel > 15 {
            self.trigger_channel = 15;
            corrections.push("trigger_channel limited to 15".to_string());
        }

        corrections
    }

    /// Capture window length in milliseconds
    pub fn max_capture_ms(&self) -> f64 {
        self.max_capture_seconds as f64 * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.max_capture_seconds, 30);
        assert_eq!(settings.pre_roll_ms, 3000);
        assert_eq!(settings.manual_bpm, 120.0);
        assert_eq!(settings.trigger_note, 60);
        assert_eq!(settings.trigger_channel, 0);
        assert!(settings.ignore_realtime);
        assert!(settings.enable_auto_bpm);
        assert!(!settings.forward_mode);
        assert_eq!(settings.save_format, SaveFormat::Midi);
        assert_eq!(settings.buffer_max_ms, 90_000);
    }

    #[test]
    fn test_parse_with_missing_keys() {
        let yaml = r#"
session_name: "Club Night"
max_capture_seconds: 60
save_format: both
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.session_name, "Club Night");
        assert_eq!(settings.max_capture_seconds, 60);
        assert_eq!(settings.save_format, SaveFormat::Both);
        // Missing keys take defaults
        assert_eq!(settings.pre_roll_ms, 3000);
        assert_eq!(settings.track_tag, "Track");
    }

    #[test]
    fn test_validate_clamps_out_of_range() {
        let mut settings = Settings {
            max_capture_seconds: 500,
            pre_roll_ms: 20_000,
            manual_bpm: 10.0,
            ..Settings::default()
        };

        let corrections = settings.validate();
        assert_eq!(settings.max_capture_seconds, 300);
        assert_eq!(settings.pre_roll_ms, 10_000);
        assert_eq!(settings.manual_bpm, 40.0);
        assert_eq!(corrections.len(), 3);
    }

    #[test]
    fn test_validate_accepts_boundaries() {
        let mut settings = Settings {
            max_capture_seconds: 300,
            pre_roll_ms: 10_000,
            manual_bpm: 300.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_empty());

        let mut settings = Settings {
            max_capture_seconds: 1,
            pre_roll_ms: 0,
            manual_bpm: 40.0,
            ..Settings::default()
        };
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_save_format_wants() {
        assert!(SaveFormat::Midi.wants_midi());
        assert!(!SaveFormat::Midi.wants_json());
        assert!(SaveFormat::Json.wants_json());
        assert!(!SaveFormat::Json.wants_midi());
        assert!(SaveFormat::Both.wants_midi());
        assert!(SaveFormat::Both.wants_json());
    }

    #[test]
    fn test_round_trip() {
        let original = Settings {
            session_name: "Warehouse".to_string(),
            track_tag: "Deck-B".to_string(),
            max_capture_seconds: 120,
            save_format: SaveFormat::Both,
            ..Settings::default()
        };

        let yaml = original.to_yaml().unwrap();
        let parsed = Settings::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }
}
