//! Typed reads that bind configuration keys to live variables.
//!
//! Every read follows the same steps: seed an entry from the caller's current
//! value when the key is missing, bind the entry, convert the persisted text
//! and store the result in the live variable.

use std::collections::HashMap;

use super::binding::{Binding, Kind, Live, Toggle};
use super::value::{
    composite_key, format_bool, format_int, is_bool_literal, parse_bool, parse_i32, parse_u32,
    sub_key_of,
};
use super::{ConfigStore, Entry, StoreError};
use crate::keys::KeyCodeResolver;

impl<R: KeyCodeResolver> ConfigStore<R> {
    /// Reads a boolean and binds `live` to `key`.
    ///
    /// `1`, `y`, `yes` and `true` (any case) read as `true`; anything else is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_bool(&mut self, key: &str, live: &Live<bool>) -> Result<bool, StoreError> {
        let text = self.bind_scalar(key, Binding::Bool(live.downgrade()), || {
            format_bool(live.get()).to_owned()
        })?;

        if !is_bool_literal(&text) {
            tracing::warn!(key, value = %text, "Not a boolean literal, reading as false");
        }
        let value = parse_bool(&text);
        live.set(value);
        Ok(value)
    }

    /// Reads a string verbatim and binds `live` to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_string(&mut self, key: &str, live: &Live<String>) -> Result<String, StoreError> {
        let text = self.bind_scalar(key, Binding::Str(live.downgrade()), || live.get())?;
        live.set(text.clone());
        Ok(text)
    }

    /// Reads a signed integer (decimal or `0x` hex) and binds `live` to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_int(&mut self, key: &str, live: &Live<i32>) -> Result<i32, StoreError> {
        let text = self.bind_scalar(key, Binding::Int(live.downgrade()), || {
            live.get().to_string()
        })?;
        let value = int_or_zero(key, &text, parse_i32);
        live.set(value);
        Ok(value)
    }

    /// Reads an unsigned integer (decimal or `0x` hex) and binds `live` to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_uint(&mut self, key: &str, live: &Live<u32>) -> Result<u32, StoreError> {
        let text = self.bind_scalar(key, Binding::UInt(live.downgrade()), || {
            live.get().to_string()
        })?;
        let value = int_or_zero(key, &text, parse_u32);
        live.set(value);
        Ok(value)
    }

    /// Reads a hotkey name and binds its code to `live`.
    ///
    /// A missing key is seeded with `default_name`. A name the resolver does
    /// not know falls back to the code of `default_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_key(
        &mut self,
        key: &str,
        default_name: &str,
        live: &Live<u32>,
    ) -> Result<u32, StoreError> {
        let binding = Binding::Key {
            target: live.downgrade(),
            fallback: default_name.to_owned(),
        };
        let text = self.bind_scalar(key, binding, || default_name.to_owned())?;

        let mut code = self.resolver.by_name(&text);
        if code.is_none() {
            tracing::warn!(key, value = %text, fallback = default_name, "Unknown key name");
            code = self.resolver.by_name(default_name);
        }
        live.set(code.value);
        Ok(code.value)
    }

    /// Reads a `<bool>, <key name>` toggle and binds `live` to `key`.
    ///
    /// A missing key is seeded from `default_state` and `default_name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if `key` is bound as another kind.
    pub fn read_toggle(
        &mut self,
        key: &str,
        default_name: &str,
        default_state: bool,
        live: &Live<Toggle>,
    ) -> Result<Toggle, StoreError> {
        let binding = Binding::Toggle {
            target: live.downgrade(),
            fallback: default_name.to_owned(),
            enabled: default_state,
        };
        let text = self.bind_scalar(key, binding, || {
            format!("{}, {default_name}", format_bool(default_state))
        })?;

        let toggle = parse_toggle(&text, &self.resolver);
        live.set(toggle);
        Ok(toggle)
    }

    /// Reads the dense array `key[0]`, `key[1]`, ... into `live`.
    ///
    /// Scanning stops at the first missing index. The live vector is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if an element is bound as another kind.
    pub fn read_array(&mut self, key: &str, live: &Live<Vec<String>>) -> Result<Vec<String>, StoreError> {
        let binding = Binding::Array(live.downgrade());
        self.check_group(key, &binding)?;

        let mut keys = Vec::new();
        for index in 0.. {
            let element = composite_key(key, index);
            let Some(entry) = self.entries.get(&element) else {
                break;
            };
            check_kind(entry, Kind::ArrayElement)?;
            keys.push(element);
        }

        let values = self.bind_all(&keys, &binding);
        self.groups.insert(key.to_owned(), binding);
        live.set(values.clone());
        Ok(values)
    }

    /// Reads every `key[label]` entry into the string map `live`.
    ///
    /// Labels keep their case. Existing map values for the same label are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if an element is bound as another kind.
    pub fn read_assoc_string(
        &mut self,
        key: &str,
        live: &Live<HashMap<String, String>>,
    ) -> Result<HashMap<String, String>, StoreError> {
        let binding = Binding::AssocString(live.downgrade());
        self.read_assoc(key, live, &binding, str::to_owned, |_, text| text.to_owned())
    }

    /// Reads every `key[label]` entry into the integer map `live`.
    ///
    /// Labels keep their case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if an element is bound as another kind.
    pub fn read_assoc_int(
        &mut self,
        key: &str,
        live: &Live<HashMap<String, u32>>,
    ) -> Result<HashMap<String, u32>, StoreError> {
        let binding = Binding::AssocInt(live.downgrade());
        self.read_assoc(key, live, &binding, str::to_owned, |element, text| {
            int_or_zero(element, text, parse_u32)
        })
    }

    /// Reads every `key[label]` entry into the boolean map `live`.
    ///
    /// Labels are lower-cased, so `Flag[ON]` is exposed as `on`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KindMismatch`] if an element is bound as another kind.
    pub fn read_assoc_bool(
        &mut self,
        key: &str,
        live: &Live<HashMap<String, bool>>,
    ) -> Result<HashMap<String, bool>, StoreError> {
        let binding = Binding::AssocBool(live.downgrade());
        self.read_assoc(key, live, &binding, str::to_lowercase, |_, text| {
            parse_bool(text)
        })
    }

    /// Returns `(label, value)` for every `key[label]` line in file order.
    ///
    /// Unlike the map reads this keeps duplicates and order, converts nothing
    /// and binds nothing.
    #[must_use]
    pub fn read_ordered_pairs(&self, key: &str) -> Vec<(String, String)> {
        self.ordered_pairs
            .iter()
            .filter_map(|(full, value)| {
                sub_key_of(full, key).map(|label| (label.to_owned(), value.clone()))
            })
            .collect()
    }

    /// Seeds, kind-checks and binds a scalar entry, returning its text.
    fn bind_scalar(
        &mut self,
        key: &str,
        binding: Binding,
        seed: impl FnOnce() -> String,
    ) -> Result<String, StoreError> {
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| Entry::synthesized(key, seed()));
        check_kind(entry, binding.kind())?;
        entry.bind(binding);
        Ok(entry.value().to_owned())
    }

    /// Rejects a scan-based binding whose base is already bound as another kind.
    fn check_group(&self, base: &str, binding: &Binding) -> Result<(), StoreError> {
        match self.groups.get(base) {
            Some(existing) if existing.kind() != binding.kind() => Err(StoreError::KindMismatch {
                key: base.to_owned(),
                bound: existing.kind(),
                requested: binding.kind(),
            }),
            _ => Ok(()),
        }
    }

    /// Binds every listed entry and returns their values in the same order.
    fn bind_all(&mut self, keys: &[String], binding: &Binding) -> Vec<String> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.bind(binding.clone());
                values.push(entry.value().to_owned());
            }
        }
        values
    }

    /// Shared scan for the three map kinds.
    ///
    /// Labels already in the live map but absent from the file are seeded as
    /// entries so they only get written once they change.
    fn read_assoc<T: Clone + AssocText>(
        &mut self,
        base: &str,
        live: &Live<HashMap<String, T>>,
        binding: &Binding,
        normalize: impl Fn(&str) -> String,
        convert: impl Fn(&str, &str) -> T,
    ) -> Result<HashMap<String, T>, StoreError> {
        self.check_group(base, binding)?;

        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|full| sub_key_of(full, base).is_some())
            .cloned()
            .collect();
        for full in &keys {
            if let Some(entry) = self.entries.get(full) {
                check_kind(entry, binding.kind())?;
            }
        }

        let values = self.bind_all(&keys, binding);
        let mut map = live.get();
        for (full, text) in keys.iter().zip(&values) {
            if let Some(label) = sub_key_of(full, base) {
                map.insert(normalize(label), convert(full, text));
            }
        }

        let known: Vec<String> = keys
            .iter()
            .filter_map(|full| sub_key_of(full, base).map(&normalize))
            .collect();
        for (label, value) in &map {
            if known.contains(label) {
                continue;
            }
            let mut entry = Entry::synthesized(composite_key(base, label), value.to_text());
            entry.bind(binding.clone());
            self.entries.insert(entry.key().to_owned(), entry);
        }

        self.groups.insert(base.to_owned(), binding.clone());
        live.set(map.clone());
        Ok(map)
    }
}

/// Text form of a map value when it is seeded or appended.
pub(crate) trait AssocText {
    fn to_text(&self) -> String;
}

impl AssocText for String {
    fn to_text(&self) -> String {
        self.clone()
    }
}

impl AssocText for u32 {
    fn to_text(&self) -> String {
        format_int(*self, false)
    }
}

impl AssocText for bool {
    fn to_text(&self) -> String {
        format_bool(*self).to_owned()
    }
}

fn check_kind(entry: &Entry, requested: Kind) -> Result<(), StoreError> {
    match entry.kind() {
        Some(bound) if bound != requested => Err(StoreError::KindMismatch {
            key: entry.key().to_owned(),
            bound,
            requested,
        }),
        _ => Ok(()),
    }
}

/// Parses an integer, logging and returning zero when the text is not a number.
fn int_or_zero<T: Default>(key: &str, text: &str, parse: impl Fn(&str) -> Option<T>) -> T {
    parse(text).unwrap_or_else(|| {
        tracing::warn!(key, value = %text, "Not an integer, reading as 0");
        T::default()
    })
}

/// Splits `<bool>, <key name>` at the first comma.
pub(crate) fn parse_toggle(text: &str, resolver: &impl KeyCodeResolver) -> Toggle {
    let (state, name) = text.split_once(',').unwrap_or((text, ""));
    Toggle::new(resolver.by_name(name.trim()).value, parse_bool(state))
}
