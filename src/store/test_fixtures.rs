//! Shared test fixtures for store tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::ConfigStore;

/// A config file in its own temporary directory.
pub struct ConfigFile {
    // Held so the directory lives as long as the fixture.
    _dir: TempDir,
    path: PathBuf,
}

impl ConfigFile {
    /// Writes `content` verbatim to a fresh `settings.cfg`.
    pub fn new(content: impl AsRef<[u8]>) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.cfg");
        std::fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    /// A path inside the temporary directory that does not exist.
    pub fn missing() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.cfg");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a store over this file.
    pub fn open(&self) -> ConfigStore {
        ConfigStore::open(&self.path).unwrap()
    }

    /// Current file content.
    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap()
    }

    /// Current file content as raw bytes.
    pub fn read_bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap()
    }

    /// Replaces the file content.
    pub fn write(&self, content: &str) {
        std::fs::write(&self.path, content).unwrap();
    }
}
