// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Event capture: rolling buffer, storm guard, and the trigger-driven
//! capture session.

pub mod buffer;
pub mod guard;
pub mod session;

pub use buffer::RollingBuffer;
pub use guard::{Admission, GuardTransition, StormGuard};
pub use session::{CaptureSession, ControlCommand, Notice, SaveReport, SessionStats};

use thiserror::Error;

/// How a capture window was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Backward window ending at the trigger
    Rolling,
    /// Forward window starting at the trigger
    Forward,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Rolling => "rolling",
            CaptureMode::Forward => "forward",
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capture failures surfaced to the caller.
///
/// None of these are retried; each is reported once.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No events fell inside the selected window; no encoder was invoked
    #[error("nothing to capture: no events in the selected window")]
    NothingToCapture,
    /// Every requested encoding failed to save
    #[error("save failed for all requested formats")]
    SaveFailed,
}
