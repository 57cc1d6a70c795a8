//! Alias resolution for include targets and locale module specifiers.
//!
//! Two alias styles are supported, in declaration order:
//!
//! - `paths` style (tsconfig): `"@x/*": ["./src/*", "./gen/*"]`. Targets are
//!   relative to the TypeScript resolution root and each candidate must
//!   resolve to an existing file to win.
//! - Directory style: `"@x": "/abs/src"` matches `@x/...`, `"@x$": "/abs/a.yml"`
//!   matches `@x` exactly, and `"@x/*": "/abs/src/*"` follows the wildcard rules.
//!   The first matching entry wins whether or not the file exists.

use std::path::{Path, PathBuf};

use crate::core::fs::{FileSystem, LocaleFile, resolve_file};
use crate::utils::join_normalized;

/// Target side of one alias entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// Candidate patterns relative to the resolution root, tried in order.
    Patterns(Vec<String>),
    /// An absolute directory or file.
    Path(PathBuf),
}

/// Ordered alias table. Built once per configuration, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, AliasTarget)>,
}

impl AliasTable {
    pub fn new(entries: Vec<(String, AliasTarget)>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, AliasTarget)] {
        &self.entries
    }

    /// Map `module_path` to a candidate path.
    ///
    /// Without a matching alias the path is taken relative to `context`. The
    /// returned path may not exist; callers probe it.
    pub fn resolve(
        &self,
        fs: &dyn FileSystem,
        module_path: &str,
        context: &Path,
        resolve_root: &Path,
        extensions: &[String],
    ) -> PathBuf {
        let mut alias_file: Option<PathBuf> = None;

        for (alias, target) in &self.entries {
            match target {
                AliasTarget::Patterns(patterns) => {
                    let resolved = patterns
                        .iter()
                        .map(|p| p.trim())
                        .filter(|p| !p.is_empty())
                        .filter_map(|p| match_pattern(module_path, alias, p))
                        .map(|file| resolve_file(fs, &join_normalized(resolve_root, file), extensions))
                        .find(LocaleFile::is_file);
                    if let Some(file) = resolved {
                        return file.path;
                    }
                }
                AliasTarget::Path(to) => {
                    alias_file = match_directory(module_path, alias, to);
                    if alias_file.is_some() {
                        break;
                    }
                }
            }
        }

        join_normalized(context, alias_file.as_deref().unwrap_or(Path::new(module_path)))
    }
}

/// Resolve `module_path` through `table` and probe the result.
///
/// `context` is the directory a non-aliased path is relative to: the including
/// file's directory for quoted includes, the dependency root for module
/// specifiers. A miss is a `LocaleFile` with `exists == false`.
pub fn resolve_module(
    fs: &dyn FileSystem,
    table: Option<&AliasTable>,
    module_path: &str,
    context: &Path,
    resolve_root: &Path,
    extensions: &[String],
) -> LocaleFile {
    let candidate = match table {
        Some(table) => table.resolve(fs, module_path, context, resolve_root, extensions),
        None => join_normalized(context, module_path),
    };
    resolve_file(fs, &candidate, extensions)
}

/// Apply an exact or `/*` wildcard alias to `module_path`.
fn match_pattern(module_path: &str, alias: &str, to: &str) -> Option<String> {
    if module_path == alias {
        return (!to.contains('*')).then(|| to.to_string());
    }
    if !alias.ends_with("/*") {
        return None;
    }
    let rest = module_path.strip_prefix(&alias[..alias.len() - 1])?;
    if to.ends_with("/*") {
        Some(format!("{}{}", &to[..to.len() - 1], rest))
    } else if !to.contains('*') {
        Some(to.to_string())
    } else {
        None
    }
}

fn match_directory(module_path: &str, alias: &str, to: &Path) -> Option<PathBuf> {
    if alias.ends_with("/*") {
        let to = to.to_string_lossy();
        return match_pattern(module_path, alias, &to).map(PathBuf::from);
    }
    if let Some(exact) = alias.strip_suffix('$') {
        return (module_path == exact).then(|| to.to_path_buf());
    }
    module_path
        .strip_prefix(alias)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| to.join(rest))
}
