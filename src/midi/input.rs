// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input handling for receiving raw bytes from controllers.
//!
//! Each connected port runs a midir callback that timestamps the bytes
//! against the session clock and forwards them over a channel; the
//! processing loop drains that channel non-blocking.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use anyhow::{anyhow, Result};
use midir::{MidiInput, MidiInputConnection};
use tracing::{debug, warn};

/// A raw input delivery: timestamp, bytes and originating device.
#[derive(Debug, Clone)]
pub struct RawInput {
    /// Monotonic milliseconds since the capture started
    pub timestamp: f64,
    /// Raw MIDI bytes exactly as received
    pub bytes: Vec<u8>,
    /// Resolved device name
    pub source: String,
}

/// Per-session device name registry.
///
/// Names are de-duplicated within a session: a port with an empty name
/// becomes `MIDI Device #n`, and a repeated name gets a numeric suffix so
/// two identical controllers remain distinguishable.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    resolved: HashMap<String, String>,
    taken: Vec<String>,
    counter: usize,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a stable display name for a port, registering it on first use.
    pub fn resolve(&mut self, port_id: &str, port_name: &str) -> String {
        if let Some(name) = self.resolved.get(port_id) {
            return name.clone();
        }

        let trimmed = port_name.trim();
        let mut name = if trimmed.is_empty() {
            self.counter += 1;
            format!("MIDI Device #{}", self.counter)
        } else {
            trimmed.to_string()
        };

        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{} #{}", trimmed, suffix);
            suffix += 1;
        }

        self.taken.push(name.clone());
        self.resolved.insert(port_id.to_string(), name.clone());
        name
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    /// Whether no device has been registered yet
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}

/// MIDI capture handle: open connections plus the raw input channel.
pub struct MidiCapture {
    _connections: Vec<MidiInputConnection<()>>,
    receiver: Receiver<RawInput>,
    epoch: Instant,
}

impl MidiCapture {
    /// Connect to every available MIDI input port.
    ///
    /// Ports that fail to connect are skipped with a warning; the capture
    /// keeps running on whatever remains.
    pub fn connect_all() -> Result<Self> {
        let (tx, rx): (Sender<RawInput>, Receiver<RawInput>) = mpsc::channel();
        let epoch = Instant::now();
        let mut registry = DeviceRegistry::new();
        let mut connections = Vec::new();

        let probe = MidiInput::new("midicap")?;
        let port_count = probe.ports().len();
        drop(probe);

        for index in 0..port_count {
            let input = MidiInput::new("midicap")?;
            let ports = input.ports();
            let Some(port) = ports.get(index) else {
                continue;
            };

            let port_name = input.port_name(port).unwrap_or_default();
            let source = registry.resolve(&format!("port-{}", index), &port_name);
            let tx = tx.clone();
            let source_for_cb = source.clone();

            match input.connect(
                port,
                "midicap-in",
                move |_ts, bytes, _| {
                    let timestamp = epoch.elapsed().as_secs_f64() * 1000.0;
                    let _ = tx.send(RawInput {
                        timestamp,
                        bytes: bytes.to_vec(),
                        source: source_for_cb.clone(),
                    });
                },
                (),
            ) {
                Ok(conn) => {
                    debug!(device = %source, "connected MIDI input");
                    connections.push(conn);
                }
                Err(e) => {
                    warn!(device = %source, error = %e, "failed to connect MIDI input");
                }
            }
        }

        if connections.is_empty() && port_count > 0 {
            return Err(anyhow!("no MIDI input port could be connected"));
        }

        Ok(Self {
            _connections: connections,
            receiver: rx,
            epoch,
        })
    }

    /// Current session time in monotonic milliseconds
    pub fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Try to receive the next raw input (non-blocking)
    pub fn try_recv(&self) -> Option<RawInput> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending raw inputs
    pub fn recv_all(&self) -> Vec<RawInput> {
        let mut inputs = Vec::new();
        while let Some(raw) = self.try_recv() {
            inputs.push(raw);
        }
        inputs
    }

    /// Number of connected ports
    pub fn connection_count(&self) -> usize {
        self._connections.len()
    }
}

/// List all available MIDI input ports
pub fn list_sources() -> Result<Vec<(usize, String)>> {
    let input = MidiInput::new("midicap")?;
    let mut result = Vec::new();

    for (i, port) in input.ports().iter().enumerate() {
        let name = input
            .port_name(port)
            .unwrap_or_else(|_| format!("Unknown {}", i));
        result.push((i, name));
    }

    Ok(result)
}

/// Print all available MIDI input ports to stdout
pub fn print_sources() -> Result<()> {
    let sources = list_sources()?;
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_stable_names() {
        let mut registry = DeviceRegistry::new();
        let a = registry.resolve("id-1", "DDJ-400");
        let b = registry.resolve("id-1", "DDJ-400");
        assert_eq!(a, "DDJ-400");
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_names_unnamed_ports() {
        let mut registry = DeviceRegistry::new();
        let a = registry.resolve("id-1", "  ");
        let b = registry.resolve("id-2", "");
        assert_eq!(a, "MIDI Device #1");
        assert_eq!(b, "MIDI Device #2");
    }

    #[test]
    fn test_registry_deduplicates_equal_names() {
        let mut registry = DeviceRegistry::new();
        let a = registry.resolve("id-1", "DDJ-400");
        let b = registry.resolve("id-2", "DDJ-400");
        assert_eq!(a, "DDJ-400");
        assert_eq!(b, "DDJ-400 #2");
    }

    #[test]
    fn test_list_sources_does_not_panic() {
        // Environment-dependent; just verify the call shape
        if let Ok(sources) = list_sources() {
            println!("Found {} sources", sources.len());
        }
    }
}
