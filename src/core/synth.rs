//! Virtual declaration synthesis.
//!
//! The runtime library ships a template declaring a placeholder data object
//! and a placeholder key union:
//!
//! ```ts
//! const Keys = {}
//! type MessageKeys = keyof typeof Keys
//! ```
//!
//! Both lines are replaced with declarations generated from a locale file's
//! keys and includes, so the key-taking functions the template exports accept
//! exactly the catalog's keys.

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result, bail};
use regex::{NoExpand, Regex};

use crate::core::catalog::{KeyMap, extract_keys};
use crate::core::fs::LocaleFile;
use crate::core::include::{IncludeGraph, IncludeResolver};
use crate::utils::to_slash;

static KEYS_DECLARATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^const\s+Keys\s*=.+$").unwrap());

static KEYS_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^type\s+MessageKeys\s*=.+$").unwrap());

/// Build the virtual module for `file_name`.
///
/// `includes` are the files whose own `MessageKeys` join this file's union.
/// Unless `strict`, or when there is nothing to type at all, the union also
/// admits any string.
///
/// Fails when the template lacks either placeholder.
pub fn synthesize(
    template: &str,
    file_name: &Path,
    keys: &KeyMap,
    includes: &[PathBuf],
    strict: bool,
) -> Result<String> {
    if !KEYS_DECLARATION_REGEX.is_match(template) {
        bail!("template has no `const Keys = ...` declaration");
    }
    if !KEYS_TYPE_REGEX.is_match(template) {
        bail!("template has no `type MessageKeys = ...` alias");
    }

    let mut declaration = vec![format!("// {}", to_slash(file_name))];
    let mut union = vec!["keyof typeof Keys".to_string()];

    for (index, include) in includes.iter().enumerate() {
        let ident = format!("KeysType{}", index);
        let specifier = serde_json::to_string(&to_slash(include))?;
        declaration.push(format!(
            "import type {{ MessageKeys as {} }} from {}",
            ident, specifier
        ));
        union.push(ident);
    }

    let data = serde_json::to_string(keys).context("Failed to serialize message keys")?;
    declaration.push(String::new());
    declaration.push(format!("const Keys = {}", data));

    if !strict || (keys.is_empty() && includes.is_empty()) {
        union.push("string".to_string());
    }

    let declaration = declaration.join("\n");
    let key_type = format!("type MessageKeys = {}", union.join(" | "));

    let source = KEYS_DECLARATION_REGEX.replace(template, NoExpand(&declaration));
    let source = KEYS_TYPE_REGEX.replace(&source, NoExpand(&key_type));
    Ok(source.into_owned())
}

/// Synthesize the virtual module of `file`, with the includes `resolver`
/// reaches from it.
pub fn synthesize_locale_file(
    resolver: IncludeResolver<'_>,
    file: &LocaleFile,
    template: &str,
    strict: bool,
) -> Result<String> {
    let keys = extract_keys(&file.raw_text, &file.path);
    let graph = IncludeGraph::build(resolver, file);
    synthesize(template, &file.path, &keys, &graph.files, strict)
}
