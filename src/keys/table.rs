//! Built-in virtual-key name table.

use std::collections::HashMap;

use super::{KeyCode, KeyCodeResolver};

/// Named keys outside the generated ranges (digits, letters, numpad, function keys).
const NAMED_KEYS: &[(&str, u32)] = &[
    ("VK_LBUTTON", 0x01),
    ("VK_RBUTTON", 0x02),
    ("VK_CANCEL", 0x03),
    ("VK_MBUTTON", 0x04),
    ("VK_XBUTTON1", 0x05),
    ("VK_XBUTTON2", 0x06),
    ("VK_BACK", 0x08),
    ("VK_TAB", 0x09),
    ("VK_CLEAR", 0x0C),
    ("VK_RETURN", 0x0D),
    ("VK_SHIFT", 0x10),
    ("VK_CONTROL", 0x11),
    ("VK_MENU", 0x12),
    ("VK_PAUSE", 0x13),
    ("VK_CAPITAL", 0x14),
    ("VK_ESCAPE", 0x1B),
    ("VK_SPACE", 0x20),
    ("VK_PRIOR", 0x21),
    ("VK_NEXT", 0x22),
    ("VK_END", 0x23),
    ("VK_HOME", 0x24),
    ("VK_LEFT", 0x25),
    ("VK_UP", 0x26),
    ("VK_RIGHT", 0x27),
    ("VK_DOWN", 0x28),
    ("VK_SELECT", 0x29),
    ("VK_PRINT", 0x2A),
    ("VK_EXECUTE", 0x2B),
    ("VK_SNAPSHOT", 0x2C),
    ("VK_INSERT", 0x2D),
    ("VK_DELETE", 0x2E),
    ("VK_HELP", 0x2F),
    ("VK_LWIN", 0x5B),
    ("VK_RWIN", 0x5C),
    ("VK_APPS", 0x5D),
    ("VK_SLEEP", 0x5F),
    ("VK_MULTIPLY", 0x6A),
    ("VK_ADD", 0x6B),
    ("VK_SEPARATOR", 0x6C),
    ("VK_SUBTRACT", 0x6D),
    ("VK_DECIMAL", 0x6E),
    ("VK_DIVIDE", 0x6F),
    ("VK_NUMLOCK", 0x90),
    ("VK_SCROLL", 0x91),
    ("VK_LSHIFT", 0xA0),
    ("VK_RSHIFT", 0xA1),
    ("VK_LCONTROL", 0xA2),
    ("VK_RCONTROL", 0xA3),
    ("VK_LMENU", 0xA4),
    ("VK_RMENU", 0xA5),
    ("VK_OEM_1", 0xBA),
    ("VK_OEM_PLUS", 0xBB),
    ("VK_OEM_COMMA", 0xBC),
    ("VK_OEM_MINUS", 0xBD),
    ("VK_OEM_PERIOD", 0xBE),
    ("VK_OEM_2", 0xBF),
    ("VK_OEM_3", 0xC0),
    ("VK_OEM_4", 0xDB),
    ("VK_OEM_5", 0xDC),
    ("VK_OEM_6", 0xDD),
    ("VK_OEM_7", 0xDE),
];

const VK_0: u32 = 0x30;
const VK_A: u32 = 0x41;
const VK_NUMPAD0: u32 = 0x60;
const VK_F1: u32 = 0x70;

/// Virtual-key name table.
///
/// Name lookup is case-insensitive (`vk_f1` resolves like `VK_F1`); reverse
/// lookup always yields the canonical upper-case name.
///
/// # Examples
///
/// ```
/// use livecfg::keys::{KeyCodeResolver, VirtualKeyTable};
///
/// let table = VirtualKeyTable::new();
/// assert_eq!(table.by_name("VK_8").value, 0x38);
/// assert_eq!(table.by_code(0x70).name, "VK_F1");
/// assert!(table.by_name("VK_NOPE").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct VirtualKeyTable {
    by_name: HashMap<String, u32>,
    by_code: HashMap<u32, String>,
}

impl VirtualKeyTable {
    /// Builds the full table.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self {
            by_name: HashMap::with_capacity(192),
            by_code: HashMap::with_capacity(192),
        };

        for &(name, code) in NAMED_KEYS {
            table.insert(name.to_string(), code);
        }
        for (offset, c) in ('0'..='9').enumerate() {
            table.insert(format!("VK_{c}"), VK_0 + offset as u32);
        }
        for (offset, c) in ('A'..='Z').enumerate() {
            table.insert(format!("VK_{c}"), VK_A + offset as u32);
        }
        for n in 0..10 {
            table.insert(format!("VK_NUMPAD{n}"), VK_NUMPAD0 + n);
        }
        for n in 1..=24 {
            table.insert(format!("VK_F{n}"), VK_F1 + n - 1);
        }

        table
    }

    /// Returns the number of known names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the table has no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn insert(&mut self, name: String, code: u32) {
        self.by_code.entry(code).or_insert_with(|| name.clone());
        self.by_name.insert(name, code);
    }
}

impl Default for VirtualKeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyCodeResolver for VirtualKeyTable {
    fn by_name(&self, name: &str) -> KeyCode {
        let canonical = name.trim().to_ascii_uppercase();
        self.by_name
            .get(&canonical)
            .map_or_else(KeyCode::none, |&code| KeyCode::new(canonical, code))
    }

    fn by_code(&self, code: u32) -> KeyCode {
        self.by_code
            .get(&code)
            .map_or_else(KeyCode::none, |name| KeyCode::new(name.clone(), code))
    }
}
