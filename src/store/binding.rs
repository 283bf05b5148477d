//! Live variables and the typed bindings that link them to entries.
//!
//! A caller owns its settings as [`Live`] handles. The store only keeps a
//! [`Weak`] reference per binding, so dropping every handle turns the binding
//! dead instead of dangling. The binding's variant is its [`Kind`]; there is
//! no way to read a bound variable as a different type.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// The fixed value category of a bound entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `True`/`False` style flag.
    Boolean,
    /// Verbatim text.
    String,
    /// Signed or unsigned integer, decimal or `0x` hex.
    Integer,
    /// Symbolic key name resolved to a key code.
    Key,
    /// `<bool>, <key name>` pair.
    Toggle,
    /// One `Base[i]` element of a dense array.
    ArrayElement,
    /// One `Base[label]` element of a string map.
    AssocString,
    /// One `Base[label]` element of an integer map.
    AssocInt,
    /// One `Base[label]` element of a boolean map with lower-cased labels.
    AssocBool,
}

impl Kind {
    /// Returns true for kinds read by scanning `Base[...]` keys.
    #[must_use]
    pub const fn is_scan_based(self) -> bool {
        matches!(
            self,
            Self::ArrayElement | Self::AssocString | Self::AssocInt | Self::AssocBool
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Key => "key",
            Self::Toggle => "toggle",
            Self::ArrayElement => "array element",
            Self::AssocString => "string map",
            Self::AssocInt => "integer map",
            Self::AssocBool => "boolean map",
        };
        name.fmt(f)
    }
}

/// A hotkey with an enabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Toggle {
    /// Key code of the hotkey.
    pub code: u32,
    /// Whether the feature behind the hotkey is enabled.
    pub enabled: bool,
}

impl Toggle {
    /// Creates a toggle.
    #[must_use]
    pub const fn new(code: u32, enabled: bool) -> Self {
        Self { code, enabled }
    }
}

/// A caller-owned live variable that configuration keys can be bound to.
///
/// Clones share the same value. The store observes the value only while at
/// least one handle is alive.
///
/// # Examples
///
/// ```
/// use livecfg::store::Live;
///
/// let enabled = Live::new(false);
/// let ui_handle = enabled.clone();
/// ui_handle.set(true);
/// assert!(enabled.get());
/// ```
#[derive(Debug, Default)]
pub struct Live<T>(Arc<RwLock<T>>);

impl<T> Live<T> {
    /// Wraps an initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        *self.write() = value;
    }

    /// Mutates the value in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.write())
    }

    /// Locks the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the value for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<RwLock<T>> {
        Arc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(weak: &Weak<RwLock<T>>) -> Option<Self> {
        weak.upgrade().map(Self)
    }
}

impl<T: Clone> Live<T> {
    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Live<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Link from an entry to the live variable it mirrors.
///
/// Key and toggle bindings also remember the caller's defaults so a reload can
/// re-run the read with the same arguments.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Bool(Weak<RwLock<bool>>),
    Int(Weak<RwLock<i32>>),
    UInt(Weak<RwLock<u32>>),
    Str(Weak<RwLock<String>>),
    Key {
        target: Weak<RwLock<u32>>,
        fallback: String,
    },
    Toggle {
        target: Weak<RwLock<Toggle>>,
        fallback: String,
        enabled: bool,
    },
    Array(Weak<RwLock<Vec<String>>>),
    AssocString(Weak<RwLock<HashMap<String, String>>>),
    AssocInt(Weak<RwLock<HashMap<String, u32>>>),
    AssocBool(Weak<RwLock<HashMap<String, bool>>>),
}

impl Binding {
    pub(crate) const fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Boolean,
            Self::Int(_) | Self::UInt(_) => Kind::Integer,
            Self::Str(_) => Kind::String,
            Self::Key { .. } => Kind::Key,
            Self::Toggle { .. } => Kind::Toggle,
            Self::Array(_) => Kind::ArrayElement,
            Self::AssocString(_) => Kind::AssocString,
            Self::AssocInt(_) => Kind::AssocInt,
            Self::AssocBool(_) => Kind::AssocBool,
        }
    }

    /// Returns false once every caller handle has been dropped.
    pub(crate) fn is_alive(&self) -> bool {
        match self {
            Self::Bool(w) => w.strong_count() > 0,
            Self::Int(w) => w.strong_count() > 0,
            Self::UInt(w) | Self::Key { target: w, .. } => w.strong_count() > 0,
            Self::Str(w) => w.strong_count() > 0,
            Self::Toggle { target, .. } => target.strong_count() > 0,
            Self::Array(w) => w.strong_count() > 0,
            Self::AssocString(w) => w.strong_count() > 0,
            Self::AssocInt(w) => w.strong_count() > 0,
            Self::AssocBool(w) => w.strong_count() > 0,
        }
    }
}
