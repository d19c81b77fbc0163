// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Capture session orchestration.
//!
//! A session owns the storm guard, tempo estimator, and rolling buffer,
//! and runs every incoming event through them in a fixed order:
//!
//!   guard -> tempo estimator -> realtime filter -> buffer -> trigger
//!
//! Trigger events either capture a backward window immediately (rolling
//! mode) or arm a forward window that a later `poll` call finalizes.

use anyhow::Result;
use tracing::{info, warn};

use crate::capture::buffer::RollingBuffer;
use crate::capture::guard::{GuardTransition, StormGuard};
use crate::capture::{CaptureError, CaptureMode};
use crate::config::{SaveFormat, Settings};
use crate::export::{build_filename, SmfEncoder, Snapshot};
use crate::midi::{MidiEvent, MidiMessage};
use crate::storage::Storage;
use crate::timing::TempoEstimator;

/// Grace period past a forward window's end before finalizing, so events
/// timestamped right at the boundary are already in the buffer.
const FORWARD_SLACK_MS: f64 = 50.0;

/// Capture progress relative to trigger events
#[derive(Debug, Clone, Copy, PartialEq)]
enum CaptureState {
    Idle,
    ForwardActive {
        start_ts: f64,
        until_ts: f64,
        due_ts: f64,
    },
}

/// External control surface commands, mirroring what the hardware
/// trigger pad does
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Act exactly as if the configured trigger note arrived now
    Trigger,
    /// Apply a capture-length / pre-roll preset
    Preset {
        max_capture_seconds: Option<u32>,
        pre_roll_ms: Option<u32>,
    },
    /// Switch the save format
    SetFormat(SaveFormat),
    /// Discard everything buffered and cancel any pending capture
    Clear,
}

/// One-shot status signals produced by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    StormOverload,
    StormRecovered,
    TempoLost,
    ForwardStarted { until_ts: f64 },
    Captured(SaveReport),
    NothingToCapture,
    SaveFailed(String),
}

/// Outcome of a save attempt, per format
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub midi_file: Option<String>,
    pub json_file: Option<String>,
    pub event_count: usize,
    pub length_seconds: u32,
    pub bpm: f64,
    pub mode: CaptureMode,
}

/// Counters surfaced to the monitor display
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub buffered: usize,
    pub captures: u32,
    pub dropped: u64,
    pub frozen: bool,
    pub bpm: Option<f64>,
}

/// The capture engine: wires guard, estimator, buffer and trigger
/// handling together over a storage backend.
pub struct CaptureSession<S: Storage> {
    settings: Settings,
    storage: S,
    guard: StormGuard,
    tempo: TempoEstimator,
    buffer: RollingBuffer,
    state: CaptureState,
    capture_count: u32,
    dropped: u64,
}

impl<S: Storage> CaptureSession<S> {
    pub fn new(settings: Settings, storage: S) -> Self {
        Self {
            settings,
            storage,
            guard: StormGuard::default(),
            tempo: TempoEstimator::new(),
            buffer: RollingBuffer::new(),
            state: CaptureState::Idle,
            capture_count: 0,
            dropped: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The storage backend, mainly for inspection in tests
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            buffered: self.buffer.len(),
            captures: self.capture_count,
            dropped: self.dropped,
            frozen: self.guard.is_frozen(),
            bpm: self.tempo.bpm(),
        }
    }

    /// Feed one raw message through the pipeline. Returns any one-shot
    /// notices raised while handling it.
    pub fn handle_raw(&mut self, timestamp: f64, bytes: &[u8], source: &str) -> Vec<Notice> {
        let mut notices = Vec::new();

        // The guard sees every arrival, admitted or not
        let admission = self.guard.admit(timestamp);
        match admission.transition {
            Some(GuardTransition::Overloaded) => {
                warn!("input storm detected, dropping events");
                notices.push(Notice::StormOverload);
            }
            Some(GuardTransition::Recovered) => {
                info!("input rate back to normal");
                notices.push(Notice::StormRecovered);
            }
            None => {}
        }
        if !admission.admitted {
            self.dropped += 1;
            return notices;
        }

        let Some(event) = MidiEvent::from_raw(timestamp, bytes, source) else {
            return notices;
        };

        // Realtime messages drive the tempo estimator before any filter
        // can drop them
        if self.settings.enable_auto_bpm {
            match event.message {
                MidiMessage::TimingClock => self.tempo.handle_clock(timestamp),
                MidiMessage::Start => self.tempo.handle_start(),
                MidiMessage::Stop => self.tempo.handle_stop(),
                _ => {}
            }
        }

        if self.settings.ignore_realtime && event.is_realtime() {
            return notices;
        }

        let is_trigger = self.is_trigger(&event);

        self.buffer.append(event);
        self.buffer
            .evict_older_than(timestamp - self.settings.buffer_max_ms as f64);

        if is_trigger {
            notices.extend(self.fire_trigger(timestamp));
        }

        notices
    }

    /// Advance time-driven behavior: forward-capture completion and
    /// tempo staleness. Call regularly from the event loop.
    pub fn poll(&mut self, now: f64) -> Vec<Notice> {
        let mut notices = Vec::new();

        if self.tempo.poll(now) {
            info!("MIDI clock stale, auto BPM deactivated");
            notices.push(Notice::TempoLost);
        }

        if let CaptureState::ForwardActive {
            start_ts,
            until_ts,
            due_ts,
        } = self.state
        {
            if now >= due_ts {
                self.state = CaptureState::Idle;
                let from = (start_ts - self.settings.pre_roll_ms as f64).max(0.0);
                notices.push(self.capture_window(from, until_ts, CaptureMode::Forward));
            }
        }

        notices
    }

    /// Apply a control-surface command
    pub fn handle_control(&mut self, command: ControlCommand, now: f64) -> Vec<Notice> {
        match command {
            ControlCommand::Trigger => self.fire_trigger(now),
            ControlCommand::Preset {
                max_capture_seconds,
                pre_roll_ms,
            } => {
                if let Some(secs) = max_capture_seconds {
                    self.settings.max_capture_seconds = secs.clamp(1, 300);
                }
                if let Some(ms) = pre_roll_ms {
                    self.settings.pre_roll_ms = ms.min(10_000);
                }
                info!(
                    max_capture_seconds = self.settings.max_capture_seconds,
                    pre_roll_ms = self.settings.pre_roll_ms,
                    "preset applied"
                );
                Vec::new()
            }
            ControlCommand::SetFormat(format) => {
                self.settings.save_format = format;
                Vec::new()
            }
            ControlCommand::Clear => {
                self.clear();
                Vec::new()
            }
        }
    }

    /// Drop all buffered events, thaw the guard, and cancel any pending
    /// forward capture
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.guard.reset();
        self.state = CaptureState::Idle;
        info!("buffer cleared");
    }

    fn is_trigger(&self, event: &MidiEvent) -> bool {
        match event.message {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                velocity > 0
                    && channel == self.settings.trigger_channel
                    && note == self.settings.trigger_note
            }
            _ => false,
        }
    }

    fn fire_trigger(&mut self, now: f64) -> Vec<Notice> {
        // A trigger during an active forward capture is ignored; the
        // window already in flight wins.
        if matches!(self.state, CaptureState::ForwardActive { .. }) {
            return Vec::new();
        }

        if self.settings.forward_mode {
            let until_ts = now + self.settings.max_capture_ms();
            self.state = CaptureState::ForwardActive {
                start_ts: now,
                until_ts,
                due_ts: until_ts + FORWARD_SLACK_MS,
            };
            info!(until_ts, "forward capture armed");
            vec![Notice::ForwardStarted { until_ts }]
        } else {
            let from = now - self.settings.max_capture_ms() - self.settings.pre_roll_ms as f64;
            vec![self.capture_window(from, now, CaptureMode::Rolling)]
        }
    }

    fn capture_window(&mut self, from: f64, to: f64, mode: CaptureMode) -> Notice {
        let events = self.buffer.select_window(from, to);
        if events.is_empty() {
            warn!(from, to, "capture window is empty, nothing saved");
            return Notice::NothingToCapture;
        }

        match self.save(&events, mode) {
            Ok(report) => {
                self.capture_count += 1;
                info!(
                    events = report.event_count,
                    length_seconds = report.length_seconds,
                    mode = %report.mode,
                    "capture saved"
                );
                Notice::Captured(report)
            }
            Err(err) => {
                warn!(error = %err, "capture save failed");
                Notice::SaveFailed(err.to_string())
            }
        }
    }

    fn save(&mut self, events: &[MidiEvent], mode: CaptureMode) -> Result<SaveReport> {
        let first = events[0].timestamp;
        let last = events[events.len() - 1].timestamp;
        let length_seconds = (((last - first) / 1000.0).round() as u32).max(1);

        let bpm = self.tempo.resolve(self.settings.manual_bpm);
        let marker = format!(
            "Session:{} | Track:{} | Mode:{} | Len:{}s",
            self.settings.session_name, self.settings.track_tag, mode, length_seconds
        );

        let mut report = SaveReport {
            midi_file: None,
            json_file: None,
            event_count: events.len(),
            length_seconds,
            bpm,
            mode,
        };
        let mut last_error: Option<anyhow::Error> = None;

        if self.settings.save_format.wants_midi() {
            let filename = build_filename(
                &self.settings.session_name,
                &self.settings.track_tag,
                mode,
                length_seconds,
                "mid",
            );
            let bytes = SmfEncoder::new(bpm).with_marker(marker.as_str()).encode(events);
            match self.storage.save(&filename, &bytes) {
                Ok(()) => report.midi_file = Some(filename),
                Err(err) => {
                    warn!(error = %err, "MIDI save failed");
                    last_error = Some(err);
                }
            }
        }

        if self.settings.save_format.wants_json() {
            let filename = build_filename(
                &self.settings.session_name,
                &self.settings.track_tag,
                mode,
                length_seconds,
                "json",
            );
            let snapshot = Snapshot::build(&self.settings, mode, length_seconds, bpm, events);
            match snapshot.to_json() {
                Ok(json) => match self.storage.save(&filename, json.as_bytes()) {
                    Ok(()) => report.json_file = Some(filename),
                    Err(err) => {
                        warn!(error = %err, "JSON save failed");
                        last_error = Some(err);
                    }
                },
                Err(err) => {
                    warn!(error = %err, "JSON encode failed");
                    last_error = Some(err.into());
                }
            }
        }

        // A capture succeeds when at least one format made it to disk
        if report.midi_file.is_none() && report.json_file.is_none() {
            return Err(last_error.unwrap_or_else(|| CaptureError::SaveFailed.into()));
        }

        Ok(report)
    }
}
