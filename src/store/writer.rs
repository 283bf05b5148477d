//! Selective write-back of changed values.
//!
//! The file is re-read line by line; only lines whose key has a pending change
//! are touched. Everything else, comments and blank lines included, is copied
//! through unchanged.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::Entry;
use super::accessors::AssocText;
use super::binding::{Binding, Live};
use super::detect::{Change, detect};
use super::parser::{parse_line, split_lines};
use super::value::{composite_key, sub_key_of};
use super::{ConfigStore, StoreError};
use crate::keys::KeyCodeResolver;

/// Outcome of a [`ConfigStore::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveSummary {
    /// Lines whose value was replaced in place.
    pub updated: usize,
    /// New lines added at the end of the file.
    pub appended: usize,
    /// Lines removed because their element no longer exists.
    pub purged: usize,
}

impl SaveSummary {
    /// Returns true if the file was left untouched.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.updated == 0 && self.appended == 0 && self.purged == 0
    }
}

/// An element present in a live container but absent from the store.
struct Grown {
    key: String,
    value: String,
    binding: Binding,
}

impl<R: KeyCodeResolver> ConfigStore<R> {
    /// Persists every detected change to the backing file.
    ///
    /// Changed values are spliced into their original lines. Lines whose new
    /// value is empty, or whose element was removed from a live array or map,
    /// are dropped. Keys that are not in the file yet are appended. The file
    /// is replaced atomically and only when at least one line differs; the
    /// store records the new text only after the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file cannot be re-read (nothing is
    /// written), or [`StoreError::Write`] if the new content cannot be stored.
    pub fn save(&mut self) -> Result<SaveSummary, StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let (mut lines, ending) = split_lines(&bytes);

        self.adopt_group_elements();
        let mut pending: BTreeMap<String, Change> = self
            .entries
            .values()
            .filter_map(|entry| detect(entry, &self.resolver).map(|c| (entry.key().to_owned(), c)))
            .collect();
        let grown = self.grown_elements();
        for element in &grown {
            pending.insert(element.key.clone(), Change::Set(element.value.clone()));
        }

        if pending.is_empty() {
            tracing::debug!(path = %self.path.display(), "No config changes to save");
            return Ok(SaveSummary::default());
        }

        let mut summary = SaveSummary::default();
        let mut persisted = Vec::new();
        let mut purged = HashSet::new();
        for (index, line) in lines.iter_mut().enumerate() {
            let Some((key, span)) = parse_line(line).map(|p| (p.key.into_owned(), p.value_span)) else {
                continue;
            };
            let Some(change) = pending.remove(&key) else {
                continue;
            };

            match change {
                Change::Set(value) if !value.is_empty() => {
                    let mut patched = line[..span.start].to_vec();
                    patched.extend_from_slice(value.as_bytes());
                    patched.extend_from_slice(&line[span.end..]);
                    *line = patched;
                    summary.updated += 1;
                    persisted.push((key, value));
                }
                // An empty value removes the line.
                Change::Set(_) | Change::Purge => {
                    purged.insert(index);
                    summary.purged += 1;
                    persisted.push((key, String::new()));
                }
            }
        }

        // Keep a final terminator final.
        let insert_at = if lines.last().is_some_and(Vec::is_empty) {
            lines.len() - 1
        } else {
            lines.len()
        };
        let mut appended = Vec::new();
        for (key, change) in pending {
            match change {
                Change::Set(value) if !value.is_empty() => {
                    appended.push(format!("{key}: {value}").into_bytes());
                    persisted.push((key, value));
                }
                Change::Set(_) => persisted.push((key, String::new())),
                Change::Purge => {}
            }
        }
        summary.appended = appended.len();
        lines.splice(insert_at..insert_at, appended);

        if summary.is_noop() {
            tracing::debug!(path = %self.path.display(), "Pending changes matched no lines");
            self.commit(persisted, grown);
            return Ok(summary);
        }

        let content = lines
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !purged.contains(index))
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join(ending.as_bytes());
        write_atomic(&self.path, &content)?;
        self.commit(persisted, grown);

        tracing::debug!(
            path = %self.path.display(),
            updated = summary.updated,
            appended = summary.appended,
            purged = summary.purged,
            "Saved config file"
        );
        Ok(summary)
    }

    /// Applies a finished write to the entries.
    fn commit(&mut self, persisted: Vec<(String, String)>, grown: Vec<Grown>) {
        for (key, value) in persisted {
            self.set_persisted(&key, value);
        }
        for element in grown {
            if let Some(entry) = self.entries.get_mut(&element.key) {
                entry.bind(element.binding);
            }
        }
    }

    /// Records the new persisted text, creating the entry for appended keys.
    fn set_persisted(&mut self, key: &str, value: String) {
        self.entries
            .entry(key.to_owned())
            .or_insert_with(|| Entry::synthesized(key, String::new()))
            .set_value(value);
    }

    /// Binds array elements that exist in the store but were hidden from the
    /// last scan, so a grown array updates them instead of appending twice.
    fn adopt_group_elements(&mut self) {
        for (base, binding) in &self.groups {
            let Binding::Array(weak) = binding else {
                continue;
            };
            let Some(live) = Live::upgrade(weak) else {
                continue;
            };
            let len = live.read().len();
            for index in 0..len {
                if let Some(entry) = self.entries.get_mut(&composite_key(base, index)) {
                    if entry.binding().is_none() {
                        entry.bind(binding.clone());
                    }
                }
            }
        }
    }

    /// Collects elements of live containers that have no entry yet.
    fn grown_elements(&self) -> Vec<Grown> {
        let mut grown = Vec::new();

        for (base, binding) in &self.groups {
            match binding {
                Binding::Array(weak) => {
                    let Some(live) = Live::upgrade(weak) else {
                        continue;
                    };
                    for (index, value) in live.read().iter().enumerate() {
                        let key = composite_key(base, index);
                        if !self.entries.contains_key(&key) {
                            grown.push(Grown {
                                key,
                                value: value.clone(),
                                binding: binding.clone(),
                            });
                        }
                    }
                }
                Binding::AssocString(weak) => {
                    self.grown_labels(base, binding, weak, str::to_owned, &mut grown);
                }
                Binding::AssocInt(weak) => {
                    self.grown_labels(base, binding, weak, str::to_owned, &mut grown);
                }
                Binding::AssocBool(weak) => {
                    self.grown_labels(base, binding, weak, str::to_lowercase, &mut grown);
                }
                _ => {}
            }
        }

        grown
    }

    fn grown_labels<T: AssocText>(
        &self,
        base: &str,
        binding: &Binding,
        weak: &std::sync::Weak<std::sync::RwLock<std::collections::HashMap<String, T>>>,
        normalize: impl Fn(&str) -> String,
        grown: &mut Vec<Grown>,
    ) {
        let Some(live) = Live::upgrade(weak) else {
            return;
        };
        let known: HashSet<String> = self
            .entries
            .keys()
            .filter_map(|key| sub_key_of(key, base).map(&normalize))
            .collect();

        for (label, value) in live.read().iter() {
            if !known.contains(&normalize(label)) {
                grown.push(Grown {
                    key: composite_key(base, label),
                    value: value.to_text(),
                    binding: binding.clone(),
                });
            }
        }
    }
}

/// Writes to `<path>.tmp`, then renames over `path`.
///
/// The temporary file is removed again if the rename fails.
pub(super) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let to_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Append .tmp instead of replacing the extension (settings.cfg -> settings.cfg.tmp)
    let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&temp_path, content).map_err(to_error)?;
    if let Err(source) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(to_error(source));
    }
    Ok(())
}
