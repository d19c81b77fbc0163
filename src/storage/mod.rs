// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persistence collaborators.
//!
//! The engine hands encoded bytes to a [`Storage`] implementation and
//! treats the save as atomic; partial writes are the collaborator's
//! problem. [`FsStorage`] writes into a directory, creating it on demand.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Destination for encoded capture bytes
pub trait Storage {
    /// Save `bytes` under `filename`. Succeeds fully or fails; no retries.
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Filesystem-backed storage rooted at a directory
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory captures are written into
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Storage for FsStorage {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create save directory: {:?}", self.dir))?;
        let full = self.dir.join(filename);
        fs::write(&full, bytes).with_context(|| format!("Failed to write {:?}", full))?;
        info!(path = %full.display(), size = bytes.len(), "capture saved");
        Ok(())
    }
}

/// In-memory storage, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemStorage {
    /// Saved files in save order
    pub files: Vec<(String, Vec<u8>)>,
    /// When true, every save fails
    pub fail: bool,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every save
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Look up a saved file by name
    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl Storage for MemStorage {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        if self.fail {
            anyhow::bail!("storage unavailable");
        }
        self.files.push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}
