//! A single configuration record.

use serde::Serialize;

use super::binding::{Binding, Kind};

/// One configuration key with its persisted text.
///
/// `value` is the last parsed or last written text and is what the change
/// detector compares the live variable against.
#[derive(Debug, Clone)]
pub struct Entry {
    key: String,
    value: String,
    comment: String,
    line: Option<usize>,
    binding: Option<Binding>,
}

impl Entry {
    pub(crate) fn parsed(key: &str, value: &str, comment: &str, line: usize) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_owned(),
            comment: comment.to_owned(),
            line: Some(line),
            binding: None,
        }
    }

    /// An entry that does not come from the file (seeded default or appended key).
    pub(crate) fn synthesized(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: String::new(),
            line: None,
            binding: None,
        }
    }

    /// The configuration key, including any bracket suffix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The persisted text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The trailing comment, including its marker; empty if none.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// 1-based source line at parse time; `None` for synthesized entries.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        self.line
    }

    /// The kind fixed by the first typed read, if any.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.binding.as_ref().map(Binding::kind)
    }

    /// Returns true while the entry is bound to a live variable that still exists.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is_alive)
    }

    pub(crate) const fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub(crate) fn bind(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    pub(crate) fn set_value(&mut self, value: String) {
        self.value = value;
    }

    /// Serializable view used for structured output.
    #[must_use]
    pub fn view(&self) -> EntryView<'_> {
        EntryView {
            key: &self.key,
            value: &self.value,
            comment: &self.comment,
            line: self.line,
            kind: self.kind().map(|kind| kind.to_string()),
        }
    }
}

/// Borrowed, serializable snapshot of an [`Entry`].
#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
    /// Configuration key
    pub key: &'a str,
    /// Persisted text
    pub value: &'a str,
    /// Trailing comment
    #[serde(skip_serializing_if = "is_blank")]
    pub comment: &'a str,
    /// Source line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Bound kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_blank(text: &&str) -> bool {
    text.is_empty()
}
