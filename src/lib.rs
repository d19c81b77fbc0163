// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDICAP - rolling MIDI capture for live DJ performance.
//!
//! The engine keeps a time-bounded buffer of everything played and saves
//! a window of it when a trigger note fires: backward from the trigger
//! (rolling mode) or forward from it (forward mode). Captures are written
//! as Standard MIDI Files and/or JSON snapshots.

pub mod capture;
pub mod config;
pub mod export;
pub mod midi;
pub mod storage;
pub mod timing;
