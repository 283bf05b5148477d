//! Command execution.
//!
//! One-shot commands (`show`, `keys`, `get`, `set`) run synchronously against
//! a freshly opened store and write to the given output. `watch` runs an async
//! polling loop that hot-reloads the store until a shutdown signal arrives.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tokio::signal;
use tokio::time::MissedTickBehavior;

use livecfg::cli::{Command, FilterArgs, ReadAs, expand_home};
use livecfg::filter::{FilterChain, FilterError, KeyFilter};
use livecfg::store::{ConfigStore, Entry, Live, StoreError};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The store could not read or write its file.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A filter pattern is not a valid regex.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The requested key is not defined in the file.
    #[error("Key '{0}' is not defined")]
    UnknownKey(String),

    /// Writing the command output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing entries to JSON failed.
    #[error("Failed to serialize entries: {0}")]
    Json(#[from] serde_json::Error),
}

impl RunError {
    /// Returns true for errors caused by invalid user input rather than runtime conditions.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Filter(_) | Self::UnknownKey(_))
    }
}

/// A difference between two store snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChange {
    /// A key that appeared.
    Added { key: String, value: String },
    /// A key that disappeared.
    Removed { key: String, value: String },
    /// A key whose persisted text changed.
    Changed { key: String, old: String, new: String },
}

/// Executes a parsed command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, a filter pattern
/// is invalid, or the output cannot be written.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: Command) -> Result<(), RunError> {
    let path = expand_home(command.file());
    let mut out = std::io::stdout();

    match command {
        Command::Show { filter, json, .. } => show(&path, &filter, json, &mut out),
        Command::Keys { filter, .. } => keys(&path, &filter, &mut out),
        Command::Get { key, read_as, .. } => get(&path, &key, read_as, &mut out),
        Command::Set { key, value, .. } => set(&path, &key, value),
        Command::Watch { interval, .. } => watch(&path, Duration::from_secs(interval)).await,
    }
}

/// Prints entries in file order; seeded entries without a line come last.
fn show(path: &Path, args: &FilterArgs, json: bool, out: &mut impl Write) -> Result<(), RunError> {
    let filter = FilterChain::from_patterns(&args.includes, &args.excludes)?;
    let store = ConfigStore::open(path)?;
    let entries = entries_in_file_order(&store, &filter);

    if json {
        let views: Vec<_> = entries.iter().map(|entry| entry.view()).collect();
        serde_json::to_writer_pretty(&mut *out, &views)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in entries {
        let line = entry.line().map_or_else(|| "-".to_owned(), |n| n.to_string());
        if entry.comment().is_empty() {
            writeln!(out, "{line:>5}  {}: {}", entry.key(), entry.value())?;
        } else {
            writeln!(out, "{line:>5}  {}: {}  {}", entry.key(), entry.value(), entry.comment())?;
        }
    }
    Ok(())
}

fn entries_in_file_order<'a>(store: &'a ConfigStore, filter: &impl KeyFilter) -> Vec<&'a Entry> {
    let mut entries: Vec<&Entry> = store.entries().filter(|e| filter.matches(e.key())).collect();
    entries.sort_by(|a, b| {
        let order = |e: &Entry| e.line().unwrap_or(usize::MAX);
        order(a).cmp(&order(b)).then_with(|| a.key().cmp(b.key()))
    });
    entries
}

/// Prints distinct base keys, sorted.
fn keys(path: &Path, args: &FilterArgs, out: &mut impl Write) -> Result<(), RunError> {
    let filter = FilterChain::from_patterns(&args.includes, &args.excludes)?;
    let store = ConfigStore::open(path)?;

    let mut keys = store.list_defined_keys();
    keys.retain(|key| filter.matches(key));
    keys.sort();

    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

/// Reads one key through the requested accessor and prints the result.
fn get(path: &Path, key: &str, read_as: ReadAs, out: &mut impl Write) -> Result<(), RunError> {
    let mut store = ConfigStore::open(path)?;

    let defined = match read_as {
        ReadAs::Array | ReadAs::Assoc => store.list_defined_keys().iter().any(|k| k == key),
        ReadAs::Bool | ReadAs::Int | ReadAs::String => store.entry(key).is_some(),
    };
    if !defined {
        return Err(RunError::UnknownKey(key.to_owned()));
    }

    match read_as {
        ReadAs::Bool => writeln!(out, "{}", store.read_bool(key, &Live::new(false))?)?,
        ReadAs::Int => writeln!(out, "{}", store.read_int(key, &Live::new(0))?)?,
        ReadAs::String => writeln!(out, "{}", store.read_string(key, &Live::new(String::new()))?)?,
        ReadAs::Array => {
            for (index, item) in store.read_array(key, &Live::new(Vec::new()))?.iter().enumerate() {
                writeln!(out, "[{index}] {item}")?;
            }
        }
        ReadAs::Assoc => {
            let map = store.read_assoc_string(key, &Live::new(HashMap::new()))?;
            let sorted: BTreeMap<_, _> = map.iter().collect();
            for (label, value) in sorted {
                writeln!(out, "[{label}] {value}")?;
            }
        }
    }
    Ok(())
}

/// Assigns a string value to a key and saves the file.
fn set(path: &Path, key: &str, value: String) -> Result<(), RunError> {
    let mut store = ConfigStore::open(path)?;
    let live = Live::new(String::new());
    store.read_string(key, &live)?;
    live.set(value);

    let summary = store.save()?;
    if summary.is_noop() {
        tracing::info!("{key} already has that value, file left untouched");
    } else {
        tracing::info!(
            "Saved {}: {} updated, {} appended, {} removed",
            path.display(),
            summary.updated,
            summary.appended,
            summary.purged,
        );
    }
    Ok(())
}

/// Reloads the store whenever the file's modification time changes.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
async fn watch(path: &Path, interval: Duration) -> Result<(), RunError> {
    let mut store = ConfigStore::open(path)?;
    let mut last_modified = modified_time(path);
    tracing::info!(
        "Watching {} ({} keys, every {}s)",
        path.display(),
        store.len(),
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            _ = ticker.tick() => {
                let modified = modified_time(path);
                if modified == last_modified {
                    continue;
                }
                last_modified = modified;
                reload_and_report(&mut store);
            }
        }
    }
}

/// Reloads the store and logs what changed. A failed reload keeps the old state.
fn reload_and_report(store: &mut ConfigStore) -> Vec<KeyChange> {
    let before = store.snapshot();
    if let Err(e) = store.reload() {
        tracing::warn!("Reload failed, keeping previous contents: {e}");
        return Vec::new();
    }

    let changes = diff_snapshots(&before, &store.snapshot());
    if changes.is_empty() {
        tracing::debug!("File touched but no values changed");
    }
    for change in &changes {
        match change {
            KeyChange::Added { key, value } => tracing::info!("+ {key}: {value}"),
            KeyChange::Removed { key, value } => tracing::info!("- {key}: {value}"),
            KeyChange::Changed { key, old, new } => tracing::info!("~ {key}: {old} -> {new}"),
        }
    }
    changes
}

/// Compares two snapshots; changes come out sorted by key.
fn diff_snapshots(before: &BTreeMap<String, String>, after: &BTreeMap<String, String>) -> Vec<KeyChange> {
    let mut changes = Vec::new();

    for (key, old) in before {
        match after.get(key) {
            None => changes.push(KeyChange::Removed {
                key: key.clone(),
                value: old.clone(),
            }),
            Some(new) if new != old => changes.push(KeyChange::Changed {
                key: key.clone(),
                old: old.clone(),
                new: new.clone(),
            }),
            Some(_) => {}
        }
    }
    for (key, value) in after {
        if !before.contains_key(key) {
            changes.push(KeyChange::Added {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.key().cmp(b.key()));
    changes
}

impl KeyChange {
    /// The key this change applies to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Added { key, .. } | Self::Removed { key, .. } | Self::Changed { key, .. } => key,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
