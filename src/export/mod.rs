// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Capture serialization: Standard MIDI File and JSON snapshot output,
//! plus the shared filename convention.

pub mod smf;
pub mod snapshot;

pub use smf::{SmfEncoder, TPQN};
pub use snapshot::Snapshot;

use chrono::Local;

use crate::capture::CaptureMode;

/// Build a capture filename:
/// `{YYYY-MM-DD_HH-MM-SS}__{Session}__{Track}__{mode}_{len}s.{ext}`
///
/// Session and track labels have whitespace runs collapsed to a single
/// `-` so filenames stay shell-friendly.
pub fn build_filename(
    session: &str,
    track: &str,
    mode: CaptureMode,
    length_seconds: u32,
    extension: &str,
) -> String {
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!(
        "{}__{}__{}__{}_{}s.{}",
        stamp,
        sanitize(session),
        sanitize(track),
        mode,
        length_seconds,
        extension
    )
}

fn sanitize(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_shape() {
        let name = build_filename("Warehouse Set", "Deck A", CaptureMode::Rolling, 30, "mid");
        let parts: Vec<&str> = name.split("__").collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1], "Warehouse-Set");
        assert_eq!(parts[2], "Deck-A");
        assert_eq!(parts[3], "rolling_30s.mid");
    }

    #[test]
    fn test_filename_timestamp_format() {
        let name = build_filename("S", "T", CaptureMode::Forward, 5, "json");
        let stamp = name.split("__").next().unwrap();
        // YYYY-MM-DD_HH-MM-SS is exactly 19 chars
        assert_eq!(stamp.len(), 19);
        assert_eq!(stamp.as_bytes()[10], b'_');
        assert!(name.ends_with("forward_5s.json"));
    }

    #[test]
    fn test_sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize("a  b\tc"), "a-b-c");
        assert_eq!(sanitize(" padded "), "padded");
        assert_eq!(sanitize("plain"), "plain");
    }
}
