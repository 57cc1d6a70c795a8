use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::Pattern;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::core::{AliasTable, AliasTarget, LibKind};
use crate::utils::join_normalized;

pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// `name` of the plugin entry in `compilerOptions.plugins`.
pub const PLUGIN_NAME: &str = "locale-keys";

pub const DEFAULT_EXTENSIONS: &[&str] = &[".yml", ".yaml"];

/// Normalized plugin options. Built once per configuration change and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Locale file suffixes, matched case-insensitively.
    pub extensions: Vec<String>,
    pub strict: bool,
    pub lib: LibKind,
    pub alias: Option<AliasTable>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            strict: true,
            lib: LibKind::default(),
            alias: None,
        }
    }
}

impl PluginConfig {
    /// Decode the raw options the host passes.
    ///
    /// Decoding is lenient: a field of the wrong type takes its default. When
    /// `alias` is absent or not an object, the project's `paths` stand in.
    pub fn from_value(raw: &Value, project: &ProjectSettings) -> Self {
        let extensions = match raw.get("extensions") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => default_extensions(),
        };
        let strict = raw.get("strict").and_then(Value::as_bool).unwrap_or(true);
        let lib = raw
            .get("lib")
            .and_then(Value::as_str)
            .map(LibKind::from_name)
            .unwrap_or_default();
        let alias = match raw.get("alias") {
            Some(Value::Object(map)) => {
                normalize_alias(map.iter().map(|(name, target)| (name.as_str(), target)), project)
            }
            _ => {
                let paths: Vec<(&str, Value)> = project
                    .paths
                    .iter()
                    .map(|(name, targets)| (name.as_str(), Value::from(targets.clone())))
                    .collect();
                normalize_alias(paths.iter().map(|(name, target)| (*name, target)), project)
            }
        };

        Self {
            extensions,
            strict,
            lib,
            alias,
        }
    }

    /// Whether `file_name` ends with one of the configured extensions.
    pub fn is_locale_module(&self, file_name: impl AsRef<Path>) -> bool {
        let name = file_name.as_ref().to_string_lossy().to_lowercase();
        !name.is_empty()
            && self
                .extensions
                .iter()
                .any(|ext| name.ends_with(&ext.to_lowercase()))
    }
}

/// Array targets stay relative to the TypeScript resolution root, string
/// targets become absolute against the project root. Empty entries are
/// dropped and an empty table is no table.
fn normalize_alias<'a>(
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
    project: &ProjectSettings,
) -> Option<AliasTable> {
    let mut table = Vec::new();
    for (name, target) in entries {
        if name.is_empty() {
            continue;
        }
        match target {
            Value::Array(items) => {
                let patterns: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
                if !patterns.is_empty() {
                    table.push((name.to_string(), AliasTarget::Patterns(patterns)));
                }
            }
            Value::String(path) if !path.is_empty() => {
                let path = join_normalized(&project.current_directory, path);
                table.push((name.to_string(), AliasTarget::Path(path)));
            }
            _ => {}
        }
    }
    (!table.is_empty()).then(|| AliasTable::new(table))
}

/// What the host project supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSettings {
    pub current_directory: PathBuf,
    /// `compilerOptions.baseUrl`, as written.
    pub base_url: Option<String>,
    /// `compilerOptions.paths`, in declaration order.
    pub paths: IndexMap<String, Vec<String>>,
}

impl ProjectSettings {
    pub fn new(current_directory: impl Into<PathBuf>) -> Self {
        Self {
            current_directory: current_directory.into(),
            ..Default::default()
        }
    }

    /// Root that `paths` targets are relative to: `baseUrl` when set, else
    /// the project root.
    pub fn ts_resolve_root(&self) -> PathBuf {
        match &self.base_url {
            Some(base_url) => join_normalized(&self.current_directory, base_url),
            None => self.current_directory.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, Value>,
    #[serde(default)]
    plugins: Vec<Value>,
}

pub fn find_tsconfig(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(TSCONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading project configuration for the CLI.
pub struct ConfigLoadResult {
    pub project: ProjectSettings,
    /// Raw options of the `locale-keys` plugin entry; `Null` without one.
    pub plugin_options: Value,
    /// The tsconfig read, if any.
    pub source: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn plugin_config(&self) -> PluginConfig {
        PluginConfig::from_value(&self.plugin_options, &self.project)
    }
}

/// Read the nearest `tsconfig.json` above `start_dir`. The project root is
/// the directory holding it, or `start_dir` when there is none.
pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let Some(path) = find_tsconfig(start_dir) else {
        return Ok(ConfigLoadResult {
            project: ProjectSettings::new(start_dir),
            plugin_options: Value::Null,
            source: None,
        });
    };

    let content = fs::read_to_string(&path)?;
    // tsconfig allows comments and trailing commas
    let tsconfig: TsConfig = json5::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    let options = tsconfig.compiler_options;

    let root = path.parent().unwrap_or(start_dir).to_path_buf();
    let paths = options
        .paths
        .into_iter()
        .map(|(name, targets)| {
            let targets = match targets {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            (name, targets)
        })
        .collect();
    let plugin_options = options
        .plugins
        .into_iter()
        .find(|plugin| plugin.get("name").and_then(Value::as_str) == Some(PLUGIN_NAME))
        .unwrap_or(Value::Null);

    Ok(ConfigLoadResult {
        project: ProjectSettings {
            current_directory: root,
            base_url: options.base_url,
            paths,
        },
        plugin_options,
        source: Some(path),
    })
}

/// Validate glob patterns given to `check --ignore`.
pub fn validate_ignores(ignores: &[String]) -> Result<()> {
    for pattern in ignores {
        Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern in 'ignore': \"{}\"", pattern))?;
    }
    Ok(())
}
