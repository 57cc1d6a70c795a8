//! Recover source positions for extracted keys.
//!
//! Extraction flattens a key into `<label> : <value>` lines. Navigation needs
//! the reverse: where in the real YAML text each of those lines came from.
//! The file is re-scanned for the key's top-level line, then for the nested
//! `locale: value` lines under it, consuming the aggregated lines in order
//! until every one is placed.

use std::{path::PathBuf, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::core::catalog::{KeyDetail, escape_newlines};

/// Indented `label: value` line; groups 2-4 the label, 5 the value.
static NESTED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([ \t]+)(?:"([^"]*)"|'([^']*)'|([^\s"'#:][^#:]*?))[ \t]*:(?:[ \t]+(.*?))?[ \t]*$"#)
        .unwrap()
});

/// Position in a real locale file where one value of a key is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOccurrence {
    pub key: String,
    pub file_name: PathBuf,
    /// Byte offset of the label (locale code, or the key for bare scalars).
    pub offset: usize,
    /// Byte length of the label.
    pub length: usize,
    pub label: String,
    pub value: String,
}

/// Locate every aggregated line of `detail` in `source`, the raw text of
/// `detail.file_name`. Lines that cannot be placed are dropped.
pub fn find_occurrences(detail: &KeyDetail, source: &str) -> Vec<KeyOccurrence> {
    let mut pending: Vec<(String, String)> = detail
        .entries()
        .into_iter()
        .map(|(label, value)| (label.to_string(), value.to_string()))
        .collect();
    let mut found = Vec::new();
    if pending.is_empty() {
        return found;
    }

    let Ok(key_regex) = key_line_regex(&detail.key) else {
        return found;
    };

    for caps in key_regex.captures_iter(source) {
        let Some(key_match) = caps.get(1).or(caps.get(2)).or(caps.get(3)) else {
            continue;
        };
        let rest = caps.get(4).map_or("", |m| m.as_str()).trim();
        let occurrence = |label: String, value: String, offset: usize, length: usize| KeyOccurrence {
            key: detail.key.clone(),
            file_name: detail.file_name.clone(),
            offset,
            length,
            label,
            value,
        };

        if rest.is_empty() {
            let line_end = caps.get(0).map_or(source.len(), |m| m.end());
            let mut offset = next_line_start(source, line_end);
            for line in source[offset..].split_inclusive('\n') {
                let line_offset = offset;
                offset += line.len();

                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                if !line.starts_with([' ', '\t']) {
                    break;
                }
                let Some(nested) = NESTED_LINE_REGEX.captures(line.trim_end_matches(['\n', '\r'])) else {
                    continue;
                };
                let Some(label) = nested.get(2).or(nested.get(3)).or(nested.get(4)) else {
                    continue;
                };
                let prefix = scalar_prefix(nested.get(5).map_or("", |m| m.as_str()));
                if let Some(i) = pending
                    .iter()
                    .position(|(l, v)| l == label.as_str().trim() && v.starts_with(&prefix))
                {
                    let (l, v) = pending.remove(i);
                    found.push(occurrence(l, v, line_offset + label.start(), label.as_str().trim().len()));
                }
                if pending.is_empty() {
                    break;
                }
            }
        } else if rest.starts_with('{') {
            // flow mapping: no finer position than the key itself
            for (l, v) in pending.drain(..) {
                found.push(occurrence(l, v, key_match.start(), key_match.len()));
            }
        } else {
            let prefix = scalar_prefix(rest);
            if let Some(i) = pending.iter().position(|(_, v)| v.starts_with(&prefix)) {
                let (l, v) = pending.remove(i);
                found.push(occurrence(l, v, key_match.start(), key_match.len()));
            }
        }

        if pending.is_empty() {
            break;
        }
    }

    found
}

/// Top-level `key:` line, bare or quoted; group 4 is the remainder.
fn key_line_regex(key: &str) -> Result<Regex, regex::Error> {
    let key = regex::escape(key);
    Regex::new(&format!(
        r#"(?m)^(?:"({key})"|'({key})'|({key}))[ \t]*:(?:[ \t]+(.*?))?[ \t\r]*$"#
    ))
}

/// The part of a raw YAML scalar that is certain to start its parsed value,
/// in the same form extraction writes values.
///
/// Quoted scalars are unquoted and unescaped, plain scalars lose trailing
/// comments, and block indicators (`|`, `>`) say nothing about the value.
fn scalar_prefix(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with(['|', '>']) {
        return String::new();
    }
    if raw.starts_with('"') {
        return escape_newlines(double_quoted_prefix(raw).trim());
    }
    if let Some(inner) = raw.strip_prefix('\'') {
        return single_quoted_prefix(inner).trim().to_string();
    }
    match raw.find(" #") {
        Some(end) => raw[..end].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Decode a double-quoted scalar. One that does not close on this line
/// yields the text before its first escape.
fn double_quoted_prefix(raw: &str) -> String {
    let mut escaped = false;
    let close = raw.char_indices().skip(1).find_map(|(i, c)| {
        let closes = !escaped && c == '"';
        escaped = !escaped && c == '\\';
        closes.then_some(i)
    });
    if let Some(end) = close
        && let Ok(text) = serde_yaml::from_str::<String>(&raw[..=end])
    {
        return text;
    }
    let inner = &raw[1..];
    inner[..inner.find(['\\', '"']).unwrap_or(inner.len())].to_string()
}

/// Single-quoted content up to the closing quote; `''` is a literal quote.
fn single_quoted_prefix(inner: &str) -> String {
    let mut text = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next_if_eq(&'\'').is_none() {
            break;
        }
        text.push(c);
    }
    text
}

fn next_line_start(source: &str, from: usize) -> usize {
    match source[from..].find('\n') {
        Some(i) => from + i + 1,
        None => source.len(),
    }
}
