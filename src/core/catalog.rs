//! Catalog key extraction.
//!
//! A locale file is a two-level YAML document. Each top-level key is a
//! message key whose value is either a scalar or a mapping of locale code to
//! scalar:
//!
//! ```yaml
//! greet:
//!   en: Hello
//!   fr: Bonjour
//! farewell: Bye
//! ```
//!
//! Every key aggregates into one line per value, `<label> : <value>`, where the
//! label is the locale code, or the file stem for a bare scalar.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::{self, EnumAccess, IgnoredAny, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::core::fs::LocaleFile;
use crate::core::include::IncludeResolver;
use crate::utils::file_stem;

/// Message key -> aggregated text, in document order.
pub type KeyMap = IndexMap<String, String>;

/// One key as found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetail {
    pub key: String,
    /// Newline-joined `<label> : <value>` lines.
    pub text: String,
    pub file_name: PathBuf,
}

impl KeyDetail {
    /// The aggregated lines split back into `(label, value)` pairs.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.text.lines().filter_map(split_entry).collect()
    }
}

/// Split one aggregated line at its first `:`.
pub fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (label, value) = line.split_once(':')?;
    Some((label.trim(), value.trim()))
}

/// Parse `text` into a key map, surfacing YAML errors.
pub fn parse_catalog(text: &str, file_name: &Path) -> Result<KeyMap> {
    let document: Node = serde_yaml::from_str(text)
        .with_context(|| format!("Failed to parse locale file: {:?}", file_name))?;
    let Node::Mapping(entries) = document else {
        return Ok(KeyMap::new());
    };

    let stem = file_stem(file_name);
    let mut keys = KeyMap::new();
    for (key, value) in entries {
        let lines: Vec<String> = match value {
            Node::Mapping(locales) => locales
                .into_iter()
                .filter_map(|(locale, text)| match text {
                    Node::Scalar(text) => Some(format!("{} : {}", locale, escape_newlines(&text))),
                    _ => None,
                })
                .collect(),
            Node::Scalar(text) => vec![format!("{} : {}", stem, escape_newlines(&text))],
            _ => continue,
        };
        if !lines.is_empty() {
            keys.insert(key, lines.join("\n"));
        }
    }
    Ok(keys)
}

/// Extract keys from `text`; malformed YAML yields no keys.
pub fn extract_keys(text: &str, file_name: &Path) -> KeyMap {
    parse_catalog(text, file_name).unwrap_or_else(|err| {
        debug!(file = %file_name.display(), "no keys extracted: {err:#}");
        KeyMap::new()
    })
}

pub(crate) fn escape_newlines(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// A YAML node as locale files use it. Scalars keep their text form,
/// a repeated mapping key keeps its last value, and `<<` merge keys are
/// folded into the mapping holding them.
#[derive(Debug, PartialEq)]
enum Node {
    Scalar(String),
    Mapping(IndexMap<String, Node>),
    Sequence(Vec<Node>),
    Null,
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Scalar(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = IndexMap::new();
        while let Some((key, value)) = map.next_entry::<Node, Node>()? {
            match key {
                Node::Scalar(key) if key == "<<" => merge_into(&mut entries, value),
                Node::Scalar(key) => {
                    entries.insert(key, value);
                }
                _ => {}
            }
        }
        Ok(Node::Mapping(entries))
    }

    // `!tag value`: keep the value
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Node, A::Error> {
        let (_, variant) = data.variant::<IgnoredAny>()?;
        variant.newtype_variant()
    }
}

/// Merged entries never replace keys the mapping already has; later
/// explicit keys replace merged ones.
fn merge_into(entries: &mut IndexMap<String, Node>, source: Node) {
    match source {
        Node::Mapping(merged) => {
            for (key, value) in merged {
                entries.entry(key).or_insert(value);
            }
        }
        Node::Sequence(sources) => {
            for source in sources {
                merge_into(entries, source);
            }
        }
        _ => {}
    }
}

/// Key extraction across a locale file and everything it includes.
pub struct Catalog<'a> {
    resolver: IncludeResolver<'a>,
}

impl<'a> Catalog<'a> {
    pub fn new(resolver: IncludeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Every key of `root` and its includes. Included files come before the
    /// files including them; each file contributes once.
    pub fn details(&self, root: &LocaleFile) -> Vec<KeyDetail> {
        self.collect(root, |_| true)
    }

    /// Every occurrence of `key` reachable from `root`, includes first.
    pub fn lookup(&self, root: &LocaleFile, key: &str) -> Vec<KeyDetail> {
        self.collect(root, |k| k == key)
    }

    fn collect(&self, root: &LocaleFile, wanted: impl Fn(&str) -> bool) -> Vec<KeyDetail> {
        let mut details = Vec::new();
        self.resolver.walk().visit_post_order(root, &mut |file| {
            for (key, text) in extract_keys(&file.raw_text, &file.path) {
                if wanted(&key) {
                    details.push(KeyDetail {
                        key,
                        text,
                        file_name: file.path.clone(),
                    });
                }
            }
        });
        details
    }
}
