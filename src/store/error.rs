//! Error types for the configuration store.

use std::path::PathBuf;

use thiserror::Error;

use super::Kind;

/// Error type for store operations.
///
/// I/O failures come from [`ConfigStore::reload`](super::ConfigStore::reload)
/// and [`ConfigStore::save`](super::ConfigStore::save); they never leave the
/// store or the file half-updated. [`StoreError::KindMismatch`] is the only
/// error a typed accessor can return.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the configuration file.
    #[error("Failed to write config file '{}': {source}", path.display())]
    Write {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A key already bound as one kind was requested as another.
    #[error("Key '{key}' is bound as {bound}, cannot read it as {requested}")]
    KindMismatch {
        /// The configuration key
        key: String,
        /// Kind of the existing binding
        bound: Kind,
        /// Kind the caller asked for
        requested: Kind,
    },
}

impl StoreError {
    /// Returns true for file-level failures (read or write).
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}
