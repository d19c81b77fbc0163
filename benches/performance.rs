// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot-path benchmarks: the per-event pipeline must comfortably outrun a
//! MIDI storm (hundreds of events per second across several devices).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use midicap::capture::{CaptureSession, RollingBuffer, StormGuard};
use midicap::config::Settings;
use midicap::export::SmfEncoder;
use midicap::midi::{MidiEvent, MidiMessage};
use midicap::storage::MemStorage;

fn bench_message_parse(c: &mut Criterion) {
    c.bench_function("parse_note_on", |b| {
        b.iter(|| MidiMessage::parse(black_box(&[0x90, 60, 100])))
    });
    c.bench_function("parse_realtime", |b| {
        b.iter(|| MidiMessage::parse(black_box(&[0xF8])))
    });
}

fn bench_guard_admit(c: &mut Criterion) {
    c.bench_function("guard_admit_steady_rate", |b| {
        let mut guard = StormGuard::default();
        let mut now = 0.0;
        b.iter(|| {
            now += 10.0;
            black_box(guard.admit(now))
        })
    });
}

fn bench_buffer_append_evict(c: &mut Criterion) {
    c.bench_function("buffer_append_and_evict", |b| {
        let mut buffer = RollingBuffer::new();
        let mut now = 0.0;
        b.iter(|| {
            now += 5.0;
            if let Some(event) = MidiEvent::from_raw(now, &[0x90, 60, 100], "bench") {
                buffer.append(event);
            }
            buffer.evict_older_than(now - 90_000.0);
            black_box(buffer.len())
        })
    });
}

fn bench_window_select(c: &mut Criterion) {
    let mut buffer = RollingBuffer::new();
    for i in 0..10_000 {
        if let Some(event) = MidiEvent::from_raw(i as f64 * 9.0, &[0x90, 60, 100], "bench") {
            buffer.append(event);
        }
    }
    c.bench_function("select_30s_window_from_10k_events", |b| {
        b.iter(|| black_box(buffer.select_window(60_000.0, 90_000.0)))
    });
}

fn bench_smf_encode(c: &mut Criterion) {
    let events: Vec<MidiEvent> = (0..1_000)
        .filter_map(|i| {
            MidiEvent::from_raw(i as f64 * 30.0, &[0x90, 36 + (i % 48) as u8, 100], "bench")
        })
        .collect();
    let encoder = SmfEncoder::new(128.0).with_marker("Session:Bench | Track:A | Mode:rolling | Len:30s");
    c.bench_function("smf_encode_1k_events", |b| {
        b.iter(|| black_box(encoder.encode(&events)))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    c.bench_function("session_handle_raw", |b| {
        let mut session = CaptureSession::new(Settings::default(), MemStorage::new());
        let mut now = 0.0;
        b.iter(|| {
            now += 10.0;
            black_box(session.handle_raw(now, &[0x90, 40, 100], "bench"))
        })
    });
}

criterion_group!(
    benches,
    bench_message_parse,
    bench_guard_admit,
    bench_buffer_append_evict,
    bench_window_select,
    bench_smf_encode,
    bench_full_pipeline
);
criterion_main!(benches);
