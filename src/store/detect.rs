//! Change detection between live variables and persisted text.

use std::collections::HashMap;
use std::sync::{RwLock, Weak};

use super::Entry;
use super::accessors::{AssocText, parse_toggle};
use super::binding::{Binding, Live};
use super::value::{format_bool, format_int, is_hex, parse_bool, parse_i32, parse_u32, split_composite};
use crate::keys::KeyCodeResolver;

/// What the writer should do with an entry's line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Change {
    /// Replace the value with this text.
    Set(String),
    /// The element no longer exists upstream; drop the line.
    Purge,
}

/// Compares an entry's live variable with its persisted text.
///
/// Returns `None` when the entry is unbound, its variable is gone, or the
/// values are equal after conversion (`5` and `0x5` are equal).
pub(crate) fn detect(entry: &Entry, resolver: &impl KeyCodeResolver) -> Option<Change> {
    let stored = entry.value();

    match entry.binding()? {
        Binding::Bool(w) => {
            let current = current(w)?;
            (current != parse_bool(stored)).then(|| Change::Set(format_bool(current).to_owned()))
        }
        Binding::Int(w) => {
            let current = current(w)?;
            let persisted = parse_i32(stored).unwrap_or_default();
            (current != persisted).then(|| Change::Set(format_int(current, is_hex(stored))))
        }
        Binding::UInt(w) => int_change(current(w)?, stored),
        Binding::Str(w) => {
            let current = current(w)?;
            (current != stored).then_some(Change::Set(current))
        }
        Binding::Key { target, fallback } => {
            let current = current(target)?;
            let mut persisted = resolver.by_name(stored);
            if persisted.is_none() {
                persisted = resolver.by_name(fallback);
            }
            (current != persisted.value).then(|| Change::Set(resolver.by_code(current).name))
        }
        Binding::Toggle { target, .. } => {
            let current = current(target)?;
            (current != parse_toggle(stored, resolver)).then(|| {
                Change::Set(format!(
                    "{}, {}",
                    format_bool(current.enabled),
                    resolver.by_code(current.code).name
                ))
            })
        }
        Binding::Array(w) => array_change(w, entry.key(), stored),
        Binding::AssocString(w) => {
            let current = element(w, label(entry.key()))?;
            current.map_or(Some(Change::Purge), |value| {
                (value != stored).then_some(Change::Set(value))
            })
        }
        Binding::AssocInt(w) => element(w, label(entry.key()))?
            .map_or(Some(Change::Purge), |value| int_change(value, stored)),
        Binding::AssocBool(w) => element(w, label(entry.key()).to_lowercase())?
            .map_or(Some(Change::Purge), |value| {
                (value != parse_bool(stored)).then(|| Change::Set(value.to_text()))
            }),
    }
}

fn current<T: Clone>(weak: &Weak<RwLock<T>>) -> Option<T> {
    Live::upgrade(weak).map(|live| live.get())
}

/// Looks a label up in a live map. Outer `None`: binding is dead; inner `None`: label removed.
fn element<T: Clone>(
    weak: &Weak<RwLock<HashMap<String, T>>>,
    label: impl AsRef<str>,
) -> Option<Option<T>> {
    let live = Live::upgrade(weak)?;
    let map = live.read();
    Some(map.get(label.as_ref()).cloned())
}

fn label(key: &str) -> &str {
    split_composite(key).map_or("", |(_, sub)| sub)
}

fn int_change(current: u32, stored: &str) -> Option<Change> {
    let persisted = parse_u32(stored).unwrap_or_default();
    (current != persisted).then(|| Change::Set(format_int(current, is_hex(stored))))
}

fn array_change(weak: &Weak<RwLock<Vec<String>>>, key: &str, stored: &str) -> Option<Change> {
    let live = Live::upgrade(weak)?;
    let values = live.read();
    let index: usize = label(key).parse().ok()?;

    match values.get(index) {
        None => Some(Change::Purge),
        Some(current) if current != stored => Some(Change::Set(current.clone())),
        Some(_) => None,
    }
}
