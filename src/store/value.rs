//! Text conversions shared by the accessors and the change detector.
//!
//! Parsing is permissive: text that does not convert yields zero/false and the
//! caller decides whether to log it.

/// Literals read as `true` (compared case-insensitively).
const TRUE_LITERALS: &[&str] = &["1", "y", "yes", "true"];

/// Literals read as `false` without being reported as a mismatch.
const FALSE_LITERALS: &[&str] = &["0", "n", "no", "false", ""];

const HEX_PREFIX: &str = "0x";

/// Reads a boolean literal.
pub(crate) fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    TRUE_LITERALS.iter().any(|lit| text.eq_ignore_ascii_case(lit))
}

/// Returns true if the text is a recognised boolean literal of either polarity.
pub(crate) fn is_bool_literal(text: &str) -> bool {
    let text = text.trim();
    TRUE_LITERALS
        .iter()
        .chain(FALSE_LITERALS)
        .any(|lit| text.eq_ignore_ascii_case(lit))
}

/// Canonical boolean literal for write-back.
pub(crate) const fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Returns true if the text is `0x`-prefixed hexadecimal.
pub(crate) fn is_hex(text: &str) -> bool {
    let text = text.trim();
    text.get(..HEX_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEX_PREFIX))
}

fn hex_digits(text: &str) -> &str {
    &text.trim()[HEX_PREFIX.len()..]
}

/// Parses an unsigned integer in decimal or `0x` hex.
pub(crate) fn parse_u32(text: &str) -> Option<u32> {
    if is_hex(text) {
        u32::from_str_radix(hex_digits(text), 16).ok()
    } else {
        text.trim().parse().ok()
    }
}

/// Parses a signed integer in decimal or `0x` hex.
///
/// Hex text is read as a 32-bit pattern, so `0xffffffff` is `-1`.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn parse_i32(text: &str) -> Option<i32> {
    if is_hex(text) {
        u32::from_str_radix(hex_digits(text), 16)
            .ok()
            .map(|bits| bits as i32)
    } else {
        text.trim().parse().ok()
    }
}

/// Formats an integer, keeping hex when the previous text was hex.
pub(crate) fn format_int<T: std::fmt::Display + std::fmt::LowerHex>(value: T, hex: bool) -> String {
    if hex {
        format!("{HEX_PREFIX}{value:x}")
    } else {
        value.to_string()
    }
}

/// Splits `Base[Sub]` into `("Base", "Sub")`.
///
/// Only the first `[` counts; a missing closing bracket leaves the rest as the
/// sub-key.
pub(crate) fn split_composite(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let rest = &key[open + 1..];
    Some((&key[..open], rest.strip_suffix(']').unwrap_or(rest)))
}

/// Returns the key without any bracket suffix.
pub(crate) fn base_key(key: &str) -> &str {
    split_composite(key).map_or(key, |(base, _)| base)
}

/// Returns the sub-key of `key` when it belongs to `base`.
pub(crate) fn sub_key_of<'a>(key: &'a str, base: &str) -> Option<&'a str> {
    match split_composite(key) {
        Some((b, sub)) if b == base => Some(sub),
        _ => None,
    }
}

/// Builds `Base[Sub]`.
pub(crate) fn composite_key(base: &str, sub: impl std::fmt::Display) -> String {
    format!("{base}[{sub}]")
}
