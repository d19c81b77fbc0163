// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI File encoding.
//!
//! Produces a byte-exact SMF Type 0 file: one track at 480 ticks per
//! quarter note, a tempo and 4/4 time-signature meta, an optional marker,
//! a default Program Change, then the captured events with VLQ-encoded
//! delta times.

use std::io::{self, Write};

use crate::midi::MidiEvent;

/// Ticks per quarter note for encoded files
pub const TPQN: u16 = 480;

/// SMF Type-0 encoder for a capture window.
pub struct SmfEncoder {
    bpm: f64,
    marker: Option<String>,
}

impl SmfEncoder {
    /// Create an encoder at the resolved tempo
    pub fn new(bpm: f64) -> Self {
        Self { bpm, marker: None }
    }

    /// Attach a marker meta-event carrying capture metadata text
    pub fn with_marker(mut self, text: impl Into<String>) -> Self {
        self.marker = Some(text.into());
        self
    }

    /// Encode a window to bytes.
    ///
    /// An empty window produces an empty byte sequence, never a
    /// malformed file; the save procedure aborts before reaching the
    /// encoder in that case.
    pub fn encode(&self, events: &[MidiEvent]) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, events)
            .expect("write to vec should not fail");
        buffer
    }

    /// Write an encoded window to `writer`
    pub fn write<W: Write>(&self, writer: &mut W, events: &[MidiEvent]) -> io::Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        // Defensive re-sort; the buffer is ordered but the encoder must
        // not assume this from its caller. Only channel-voice messages
        // belong in a track chunk, so anything else is dropped here.
        let mut sorted: Vec<&MidiEvent> = events.iter().filter(|e| e.is_channel_voice()).collect();
        sorted.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        if sorted.is_empty() {
            return Ok(());
        }
        let t0 = sorted[0].timestamp;

        let mut track = Vec::new();

        // Tempo meta: microseconds per quarter note
        let micro_per_qn = (60_000_000.0 / self.bpm).round() as u32;
        track.extend_from_slice(&[
            0x00,
            0xFF,
            0x51,
            0x03,
            ((micro_per_qn >> 16) & 0xFF) as u8,
            ((micro_per_qn >> 8) & 0xFF) as u8,
            (micro_per_qn & 0xFF) as u8,
        ]);

        // Time signature fixed at 4/4
        track.extend_from_slice(&[0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08]);

        // Optional capture marker
        if let Some(marker) = self.marker.as_deref().filter(|m| !m.is_empty()) {
            let bytes = marker.as_bytes();
            track.extend_from_slice(&[0x00, 0xFF, 0x06]);
            write_variable_length(&mut track, bytes.len() as u32)?;
            track.extend_from_slice(bytes);
        }

        // Default instrument voice: Program Change, channel 0, program 0
        track.extend_from_slice(&[0x00, 0xC0, 0x00]);

        let mut last_ticks = 0u64;
        for event in &sorted {
            let ms = (event.timestamp - t0).max(0.0);
            let ticks = (ms * TPQN as f64 * self.bpm / 60_000.0).round() as u64;
            // Monotonic tick progression is a hard invariant of the format
            let delta = ticks.saturating_sub(last_ticks);
            last_ticks = ticks;

            write_variable_length(&mut track, delta as u32)?;
            track.extend_from_slice(&event.raw);
        }

        // End of track
        track.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

        self.write_header(writer)?;
        writer.write_all(b"MTrk")?;
        writer.write_all(&(track.len() as u32).to_be_bytes())?;
        writer.write_all(&track)?;

        Ok(())
    }

    /// Write the MThd chunk: format 0, one track, 480 TPQN
    fn write_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"MThd")?;
        writer.write_all(&[0, 0, 0, 6])?;
        writer.write_all(&0u16.to_be_bytes())?;
        writer.write_all(&1u16.to_be_bytes())?;
        writer.write_all(&TPQN.to_be_bytes())?;
        Ok(())
    }
}

/// Write a variable-length quantity: 7 bits per byte, continuation bit on
/// all but the final byte, most-significant byte first.
pub fn write_variable_length<W: Write>(writer: &mut W, mut value: u32) -> io::Result<()> {
    let mut bytes = Vec::with_capacity(4);

    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    writer.write_all(&bytes)
}
