//! The live configuration store.
//!
//! This module provides:
//! - Parsing of `key: value // comment` files into [`Entry`] records
//! - Typed reads that bind keys to caller-owned [`Live`] variables
//! - Change detection between live variables and persisted text
//! - Write-back that patches only the changed lines ([`ConfigStore::save`])
//!
//! # File Format
//!
//! ```text
//! Character Stats: VK_8          // hotkey
//! Show Ethereal:   True, VK_E
//! Poll Rate:       0x1F
//! Base[0]:         first         // arrays are dense, zero-based
//! Group[Label]:    value         // maps use arbitrary labels
//! ```
//!
//! # Threading
//!
//! A store is used from one thread at a time; wrap it in a lock if several
//! components share it. Live variables may be changed from anywhere at any
//! time; the store only reads them while saving.

mod accessors;
mod binding;
mod detect;
mod entry;
mod error;
mod parser;
mod value;
mod writer;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
#[cfg(test)]
mod writer_tests;

pub use binding::{Kind, Live, Toggle};
pub use entry::{Entry, EntryView};
pub use error::StoreError;
pub use parser::{COMMENT_MARKER, SEPARATOR};
pub use writer::SaveSummary;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use binding::Binding;

use crate::keys::{KeyCodeResolver, VirtualKeyTable};

/// Ordered key/value store bound to a configuration file.
///
/// # Examples
///
/// ```no_run
/// use livecfg::store::{ConfigStore, Live};
///
/// let mut store = ConfigStore::open("settings.cfg")?;
/// let verbose = Live::new(false);
/// store.read_bool("Verbose", &verbose)?;
///
/// verbose.set(true);
/// store.save()?;
/// # Ok::<(), livecfg::store::StoreError>(())
/// ```
#[derive(Debug)]
pub struct ConfigStore<R = VirtualKeyTable> {
    path: PathBuf,
    resolver: R,
    entries: HashMap<String, Entry>,
    ordered_pairs: Vec<(String, String)>,
    /// Scan-based bindings by base key, kept to re-scan on reload and to
    /// find elements added after the read.
    groups: HashMap<String, Binding>,
}

impl ConfigStore<VirtualKeyTable> {
    /// Opens and parses a file using the built-in virtual-key table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(path, VirtualKeyTable::new())
    }
}

impl<R: KeyCodeResolver> ConfigStore<R> {
    /// Creates an empty store for `path` without reading it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, resolver: R) -> Self {
        Self {
            path: path.into(),
            resolver,
            entries: HashMap::new(),
            ordered_pairs: Vec::new(),
            groups: HashMap::new(),
        }
    }

    /// Opens and parses a file with a custom key resolver.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be read.
    pub fn open_with(path: impl Into<PathBuf>, resolver: R) -> Result<Self, StoreError> {
        let mut store = Self::new(path, resolver);
        store.reload()?;
        Ok(store)
    }

    /// Re-parses the file, replacing every entry, then re-applies existing bindings.
    ///
    /// Bound live variables receive the reloaded values. If the file cannot be
    /// read the store is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be read.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let scalars: Vec<(String, Binding)> = self
            .entries
            .drain()
            .filter_map(|(key, entry)| match entry.binding() {
                Some(binding) if binding.is_alive() && !binding.kind().is_scan_based() => {
                    Some((key, binding.clone()))
                }
                _ => None,
            })
            .collect();

        let parsed = parser::parse_text(&bytes);
        self.entries = parsed.entries;
        self.ordered_pairs = parsed.ordered_pairs;
        self.groups.retain(|_, binding| binding.is_alive());

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            rebound = scalars.len() + self.groups.len(),
            "Parsed config file"
        );

        self.rebind(scalars);
        Ok(())
    }

    /// Re-runs the typed reads behind remembered bindings.
    fn rebind(&mut self, scalars: Vec<(String, Binding)>) {
        let groups: Vec<(String, Binding)> = self
            .groups
            .iter()
            .map(|(base, binding)| (base.clone(), binding.clone()))
            .collect();

        for (key, binding) in scalars.into_iter().chain(groups) {
            if let Err(e) = self.reapply(&key, &binding) {
                tracing::warn!(key = %key, "Binding dropped on reload: {e}");
            }
        }
    }

    fn reapply(&mut self, key: &str, binding: &Binding) -> Result<(), StoreError> {
        match binding {
            Binding::Bool(w) => reread(w, |live| self.read_bool(key, &live).map(drop)),
            Binding::Int(w) => reread(w, |live| self.read_int(key, &live).map(drop)),
            Binding::UInt(w) => reread(w, |live| self.read_uint(key, &live).map(drop)),
            Binding::Str(w) => reread(w, |live| self.read_string(key, &live).map(drop)),
            Binding::Key { target, fallback } => {
                reread(target, |live| self.read_key(key, fallback, &live).map(drop))
            }
            Binding::Toggle {
                target,
                fallback,
                enabled,
            } => reread(target, |live| {
                self.read_toggle(key, fallback, *enabled, &live).map(drop)
            }),
            Binding::Array(w) => reread(w, |live| self.read_array(key, &live).map(drop)),
            Binding::AssocString(w) => {
                reread(w, |live| self.read_assoc_string(key, &live).map(drop))
            }
            Binding::AssocInt(w) => reread(w, |live| self.read_assoc_int(key, &live).map(drop)),
            Binding::AssocBool(w) => {
                reread(w, |live| self.read_assoc_bool(key, &live).map(drop))
            }
        }
    }

    /// Distinct keys with bracket suffixes stripped, in no particular order.
    #[must_use]
    pub fn list_defined_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .keys()
            .map(|key| value::base_key(key))
            .filter(|base| seen.insert(*base))
            .map(str::to_owned)
            .collect()
    }

    /// Looks up an entry by its full key.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Iterates over all entries in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Raw `(key, value)` pairs in file order, as of the last parse.
    #[must_use]
    pub fn ordered_pairs(&self) -> &[(String, String)] {
        &self.ordered_pairs
    }

    /// Key to persisted value, sorted by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .values()
            .map(|entry| (entry.key().to_owned(), entry.value().to_owned()))
            .collect()
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs `read` against a still-alive binding target; dead targets are skipped.
fn reread<T>(
    weak: &std::sync::Weak<std::sync::RwLock<T>>,
    read: impl FnOnce(Live<T>) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    Live::upgrade(weak).map_or(Ok(()), read)
}
