//! Line parser for the `key: value // comment` format.
//!
//! Each line is cut at the first comment marker, then split at the first `:`.
//! Lines without a separator or with an empty key are skipped, never errors.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use super::Entry;

/// Marker that starts a trailing comment.
pub const COMMENT_MARKER: &str = "//";

/// Separator between key and value.
pub const SEPARATOR: u8 = b':';

/// A single `key: value` line, decoded from the raw bytes.
///
/// Invalid UTF-8 is decoded lossily for the key, value and comment text, but
/// `value_span` always indexes the raw bytes so untouched bytes survive a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedLine<'a> {
    pub key: Cow<'a, str>,
    pub value: Cow<'a, str>,
    /// Byte range of `value` within the raw line.
    pub value_span: Range<usize>,
    /// Everything from the comment marker to the end of the line.
    pub comment: Cow<'a, str>,
}

/// Parses one raw line (without its terminator).
pub(crate) fn parse_line(raw: &[u8]) -> Option<ParsedLine<'_>> {
    let comment_start = raw
        .windows(COMMENT_MARKER.len())
        .position(|window| window == COMMENT_MARKER.as_bytes())
        .unwrap_or(raw.len());
    let body = &raw[..comment_start];

    let colon = body.iter().position(|&b| b == SEPARATOR)?;
    let key = body[..colon].trim_ascii();
    if key.is_empty() {
        return None;
    }

    let after = &body[colon + 1..];
    let value = after.trim_ascii();
    let value_start = colon + 1 + (after.len() - after.trim_ascii_start().len());

    Some(ParsedLine {
        key: String::from_utf8_lossy(key),
        value: String::from_utf8_lossy(value),
        value_span: value_start..value_start + value.len(),
        comment: String::from_utf8_lossy(&raw[comment_start..]),
    })
}

/// Line terminator used when writing a file back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Terminator of the running platform.
    pub(crate) const fn platform() -> Self {
        if cfg!(windows) { Self::CrLf } else { Self::Lf }
    }

    pub(crate) const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Splits raw bytes into lines and detects the terminator.
///
/// A final terminator yields a trailing empty line, so joining the result
/// with the detected terminator reproduces the input.
pub(crate) fn split_lines(bytes: &[u8]) -> (Vec<Vec<u8>>, LineEnding) {
    if bytes.is_empty() {
        return (Vec::new(), LineEnding::platform());
    }

    let ending = match bytes.iter().position(|&b| b == b'\n') {
        Some(i) if i > 0 && bytes[i - 1] == b'\r' => LineEnding::CrLf,
        Some(_) => LineEnding::Lf,
        None => LineEnding::platform(),
    };

    let lines = raw_lines(bytes).map(<[u8]>::to_vec).collect();
    (lines, ending)
}

/// Lines split at `\n` with a trailing `\r` removed.
fn raw_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Result of parsing a whole file.
#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
    pub entries: HashMap<String, Entry>,
    pub ordered_pairs: Vec<(String, String)>,
}

/// Parses raw file bytes into entries and the file-ordered pair list.
///
/// When a key appears on several lines the first one owns the entry; every
/// occurrence is still listed in `ordered_pairs`.
pub(crate) fn parse_text(bytes: &[u8]) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for (index, raw) in raw_lines(bytes).enumerate() {
        let Some(line) = parse_line(raw) else {
            continue;
        };
        let line_no = index + 1;

        parsed
            .ordered_pairs
            .push((line.key.to_string(), line.value.to_string()));

        if parsed.entries.contains_key(line.key.as_ref()) {
            tracing::debug!(key = %line.key, line = line_no, "Duplicate key ignored");
            continue;
        }
        parsed.entries.insert(
            line.key.to_string(),
            Entry::parsed(&line.key, &line.value, &line.comment, line_no),
        );
    }

    parsed
}
