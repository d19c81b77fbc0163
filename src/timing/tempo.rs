// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Auto-BPM estimation from MIDI clock pulses.
//!
//! Incoming Clock messages arrive at 24 pulses per quarter note. The
//! estimator keeps a ring of recent inter-pulse deltas (one beat's worth),
//! derives an instantaneous BPM from their mean, and smooths it with an
//! exponential moving average. The estimate goes stale 2 seconds after the
//! last pulse.

use std::collections::VecDeque;

use tracing::debug;

use super::PPQN;

/// Ring capacity: one quarter note of clock pulses
const PULSE_WINDOW: usize = PPQN as usize;

/// Milliseconds without a Clock pulse before the estimate is discarded
pub const STALENESS_MS: f64 = 2000.0;

/// Smoothing factor: weight kept from the previous estimate
const SMOOTHING: f64 = 0.95;

/// Tempo estimate driven by MIDI realtime messages.
#[derive(Debug, Clone)]
pub struct TempoEstimator {
    /// Smoothed estimate; None until the first usable pulse pair
    bpm: Option<f64>,
    /// Whether a clock source is currently considered live
    active: bool,
    /// Timestamp of the last Clock pulse
    last_pulse: Option<f64>,
    /// Recent inter-pulse deltas in milliseconds, oldest first
    deltas: VecDeque<f64>,
}

impl TempoEstimator {
    pub fn new() -> Self {
        Self {
            bpm: None,
            active: false,
            last_pulse: None,
            deltas: VecDeque::with_capacity(PULSE_WINDOW),
        }
    }

    /// Smoothed estimate, if one exists
    pub fn bpm(&self) -> Option<f64> {
        self.bpm
    }

    /// Whether a clock source is live
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Tempo to use for encoding: the live estimate while active, the
    /// manual fallback otherwise.
    pub fn resolve(&self, manual_bpm: f64) -> f64 {
        match (self.active, self.bpm) {
            (true, Some(bpm)) => bpm,
            _ => manual_bpm,
        }
    }

    /// Handle a MIDI Start: mark active, reset pulse history.
    pub fn handle_start(&mut self) {
        self.active = true;
        self.last_pulse = None;
        self.deltas.clear();
        debug!("MIDI clock start, tempo estimation armed");
    }

    /// Handle a MIDI Stop: deactivate and discard the estimate.
    pub fn handle_stop(&mut self) {
        self.reset();
        debug!("MIDI clock stop, reverting to manual tempo");
    }

    /// Handle a Clock pulse at `now` milliseconds.
    ///
    /// A single isolated pulse produces no estimate; a short ring is still
    /// averaged, accepting early jitter rather than blocking detection.
    pub fn handle_clock(&mut self, now: f64) {
        if let Some(last) = self.last_pulse {
            let delta = now - last;
            if self.deltas.len() >= PULSE_WINDOW {
                self.deltas.pop_front();
            }
            self.deltas.push_back(delta);

            let avg = self.deltas.iter().sum::<f64>() / self.deltas.len() as f64;
            if avg > 0.0 {
                let instant = 60_000.0 / (avg * PPQN as f64);
                self.bpm = Some(match self.bpm {
                    Some(prev) => prev * SMOOTHING + instant * (1.0 - SMOOTHING),
                    None => instant,
                });
            }
        }

        self.last_pulse = Some(now);
        self.active = true;
    }

    /// Check staleness at `now`. Returns true if the estimator just went
    /// inactive because no pulse arrived within the timeout.
    pub fn poll(&mut self, now: f64) -> bool {
        if !self.active {
            return false;
        }
        match self.last_pulse {
            Some(last) if now - last >= STALENESS_MS => {
                self.reset();
                debug!("MIDI clock stale, reverting to manual tempo");
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.bpm = None;
        self.last_pulse = None;
        self.deltas.clear();
    }
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self::new()
    }
}
