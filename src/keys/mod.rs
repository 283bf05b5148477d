//! Key code resolution for hotkey-bearing configuration values.
//!
//! The store never interprets key names itself. It asks a [`KeyCodeResolver`]
//! to translate between symbolic names (`VK_8`, `VK_F5`) and numeric codes.
//! [`VirtualKeyTable`] is the built-in resolver covering the virtual-key names.

mod table;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use table::VirtualKeyTable;

/// The numeric value reported for names the resolver does not know.
pub const NULL_CODE: u32 = 0;

/// Name reported for [`NULL_CODE`] and for codes the resolver does not know.
pub const NULL_NAME: &str = "None";

/// A resolved key: its canonical symbolic name and numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCode {
    /// Canonical symbolic name (e.g. `VK_8`).
    pub name: String,
    /// Numeric input-device code; [`NULL_CODE`] when unresolved.
    pub value: u32,
}

impl KeyCode {
    /// Creates a key code from a name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The null key code.
    #[must_use]
    pub fn none() -> Self {
        Self::new(NULL_NAME, NULL_CODE)
    }

    /// Returns true if this is the null key code.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.value == NULL_CODE
    }
}

/// Maps symbolic key names to numeric codes and back.
///
/// Implementations return [`KeyCode::none`] for anything they cannot resolve;
/// resolution never fails.
pub trait KeyCodeResolver: Send + Sync {
    /// Resolves a symbolic name to a key code.
    fn by_name(&self, name: &str) -> KeyCode;

    /// Resolves a numeric code back to its canonical name.
    fn by_code(&self, code: u32) -> KeyCode;
}

impl<R: KeyCodeResolver + ?Sized> KeyCodeResolver for &R {
    fn by_name(&self, name: &str) -> KeyCode {
        (**self).by_name(name)
    }

    fn by_code(&self, code: u32) -> KeyCode {
        (**self).by_code(code)
    }
}
