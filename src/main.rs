// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use midicap::capture::{CaptureSession, Notice};
use midicap::config::Settings;
use midicap::midi::{print_sources, MidiCapture};
use midicap::storage::FsStorage;

fn print_usage() {
    println!("MIDICAP - Rolling MIDI Capture for DJ Performance");
    println!();
    println!("Usage: midicap [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --list-sources    List available MIDI sources (inputs)");
    println!("  --monitor         Print incoming MIDI from all sources for 30 seconds");
    println!("  --run [CONFIG]    Run the capture engine (default config: midicap.yaml)");
    println!("  --init [CONFIG]   Write a default config file and exit");
    println!("  --help            Show this help message");
}

fn monitor_input() -> Result<()> {
    let capture = MidiCapture::connect_all()?;
    println!(
        "Monitoring {} MIDI source(s) for 30 seconds (press Ctrl+C to stop)...",
        capture.connection_count()
    );
    println!();

    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    while std::time::Instant::now() < deadline {
        for raw in capture.recv_all() {
            println!("{:10.1}ms  {:02X?}  [{}]", raw.timestamp, raw.bytes, raw.source);
        }
        thread::sleep(Duration::from_millis(1));
    }

    println!();
    println!("Monitor complete!");
    Ok(())
}

fn run(config_path: &str) -> Result<()> {
    let mut settings = if Path::new(config_path).exists() {
        Settings::load(config_path)?
    } else {
        println!("No config at {}, using defaults", config_path);
        Settings::default()
    };
    for correction in settings.validate() {
        println!("Config adjusted: {}", correction);
    }

    let capture = MidiCapture::connect_all()?;
    println!(
        "Capturing from {} MIDI source(s). Trigger: note {} on channel {}.",
        capture.connection_count(),
        settings.trigger_note,
        settings.trigger_channel + 1
    );
    println!("Saving to {:?}. Press Ctrl+C to stop.", settings.save_dir);

    let storage = FsStorage::new(&settings.save_dir);
    let mut session = CaptureSession::new(settings, storage);

    loop {
        for raw in capture.recv_all() {
            for notice in session.handle_raw(raw.timestamp, &raw.bytes, &raw.source) {
                report(&notice);
            }
        }
        for notice in session.poll(capture.now_ms()) {
            report(&notice);
        }
        thread::sleep(Duration::from_millis(1));
    }
}

fn report(notice: &Notice) {
    match notice {
        Notice::StormOverload => println!("!! Input storm: dropping events"),
        Notice::StormRecovered => println!("Input rate back to normal"),
        Notice::TempoLost => println!("MIDI clock lost, falling back to manual BPM"),
        Notice::ForwardStarted { .. } => println!("Recording forward capture..."),
        Notice::Captured(r) => {
            println!(
                "Captured {} events ({}s at {:.1} BPM): {}",
                r.event_count,
                r.length_seconds,
                r.bpm,
                r.midi_file
                    .as_deref()
                    .or(r.json_file.as_deref())
                    .unwrap_or("?")
            );
        }
        Notice::NothingToCapture => println!("Nothing to capture: window is empty"),
        Notice::SaveFailed(err) => eprintln!("Save failed: {}", err),
    }
}

fn init_config(config_path: &str) -> Result<()> {
    let settings = Settings::default();
    settings.save(config_path)?;
    println!("Wrote default config to {}", config_path);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "midicap=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("MIDICAP - Rolling MIDI Capture for DJ Performance");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--list-sources" => {
            print_sources()?;
        }
        "--monitor" => {
            monitor_input()?;
        }
        "--run" => {
            let config_path = args.get(2).map(String::as_str).unwrap_or("midicap.yaml");
            info!(config = config_path, "starting capture engine");
            run(config_path)?;
        }
        "--init" => {
            let config_path = args.get(2).map(String::as_str).unwrap_or("midicap.yaml");
            init_config(config_path)?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
