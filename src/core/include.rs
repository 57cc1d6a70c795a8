//! Include directives and the transitive include graph.
//!
//! A locale file pulls in other catalogs with comment-style directives:
//!
//! ```yaml
//! #include "./common.yml"
//! #include <@shared/locales/errors>
//! ```
//!
//! The quoted form is relative to the including file's directory; the angle
//! form is a module specifier resolved under the project's `node_modules`.
//! Both go through the alias table first.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::core::alias::AliasTable;
use crate::core::fs::{FileSystem, LocaleFile, resolve_file};
use crate::utils::join_normalized;

static DIRECTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*#include([<'" \t].*?)[ \t;\r]*$"#).unwrap()
});

/// Angle targets that start like a relative path (`<./x>`, `<../x>`, `</x>`).
static RELATIVE_ANGLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\.*[/\\]|\.{2,})").unwrap());

const FORBIDDEN_CHARS: &[char] = &['\'', '"', '<', '>', ':', '*', '?', '|'];

/// Target of one `#include` directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IncludeTarget {
    /// `#include "path"`: relative to the including file.
    Relative(String),
    /// `#include <module/path>`: a bare module specifier.
    Module(String),
}

impl IncludeTarget {
    pub fn as_str(&self) -> &str {
        match self {
            IncludeTarget::Relative(s) | IncludeTarget::Module(s) => s,
        }
    }
}

/// A directive found in a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub target: IncludeTarget,
    /// Byte offset of the directive line.
    pub offset: usize,
}

/// Scan `text` for include directives in source order.
pub fn scan_directives(text: &str) -> Vec<IncludeDirective> {
    DIRECTIVE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let line = caps.get(0)?;
            let target = parse_directive(caps.get(1)?.as_str())?;
            Some(IncludeDirective {
                target,
                offset: line.start(),
            })
        })
        .collect()
}

fn parse_directive(rest: &str) -> Option<IncludeTarget> {
    let rest = rest.trim();
    let only_punctuation = rest
        .chars()
        .all(|c| matches!(c, '\'' | '"' | '<' | '>' | '.' | '\\' | '/' | ';') || c.is_whitespace());
    if only_punctuation {
        return None;
    }

    if let Some(inner) = rest.strip_prefix('<') {
        let body = inner.strip_suffix('>')?;
        if RELATIVE_ANGLE_REGEX.is_match(body) {
            return None;
        }
        return valid_path(body).map(IncludeTarget::Module);
    }

    let body = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => rest
            .strip_prefix(quote)
            .and_then(|r| r.strip_suffix(quote))?,
        _ => rest,
    };
    valid_path(body).map(IncludeTarget::Relative)
}

fn valid_path(body: &str) -> Option<String> {
    let body = body.trim();
    (!body.is_empty() && !body.contains(FORBIDDEN_CHARS)).then(|| body.to_string())
}

/// Where include targets resolve from.
#[derive(Clone, Copy)]
pub struct IncludeResolver<'a> {
    pub fs: &'a dyn FileSystem,
    pub alias: Option<&'a AliasTable>,
    /// Project root; module specifiers resolve under its `node_modules`.
    pub project_root: &'a Path,
    /// Root for `paths`-style aliases (`baseUrl`, else the project root).
    pub resolve_root: &'a Path,
    pub extensions: &'a [String],
}

impl<'a> IncludeResolver<'a> {
    /// Candidate path of `target` included from `from_dir`, before probing.
    fn candidate(&self, target: &IncludeTarget, from_dir: &Path) -> PathBuf {
        let context = match target {
            IncludeTarget::Relative(_) => from_dir.to_path_buf(),
            IncludeTarget::Module(_) => self.project_root.join("node_modules"),
        };
        match self.alias {
            Some(table) => table.resolve(
                self.fs,
                target.as_str(),
                &context,
                self.resolve_root,
                self.extensions,
            ),
            None => join_normalized(&context, target.as_str()),
        }
    }

    pub fn walk(self) -> IncludeWalk<'a> {
        IncludeWalk::new(self)
    }
}

/// One traversal over an include graph.
///
/// Owns the visited set (keyed by absolute path) and the per-traversal
/// resolution memo, so each file contributes at most once even under cycles.
pub struct IncludeWalk<'a> {
    resolver: IncludeResolver<'a>,
    visited: HashSet<PathBuf>,
    resolved: HashMap<PathBuf, LocaleFile>,
}

impl<'a> IncludeWalk<'a> {
    pub fn new(resolver: IncludeResolver<'a>) -> Self {
        Self {
            resolver,
            visited: HashSet::new(),
            resolved: HashMap::new(),
        }
    }

    /// Resolve one directive target included from `from_dir`.
    pub fn resolve(&mut self, target: &IncludeTarget, from_dir: &Path) -> LocaleFile {
        let candidate = self.resolver.candidate(target, from_dir);
        if let Some(file) = self.resolved.get(&candidate) {
            return file.clone();
        }
        let file = resolve_file(self.resolver.fs, &candidate, self.resolver.extensions);
        self.resolved.insert(candidate, file.clone());
        self.resolved.insert(file.path.clone(), file.clone());
        file
    }

    /// Existing files directly included by `file`, first-seen order, no repeats.
    pub fn direct_includes(&mut self, file: &LocaleFile) -> Vec<LocaleFile> {
        let mut seen = HashSet::new();
        let mut includes = Vec::new();
        for directive in scan_directives(&file.raw_text) {
            let included = self.resolve(&directive.target, &file.directory);
            if included.is_file() && seen.insert(included.path.clone()) {
                includes.push(included);
            }
        }
        includes
    }

    /// Visit `root` and everything it transitively includes, includes before
    /// the including file. Each file is visited once.
    pub fn visit_post_order(&mut self, root: &LocaleFile, visit: &mut impl FnMut(&LocaleFile)) {
        self.visited.insert(root.path.clone());
        self.post_order(root, visit);
    }

    fn post_order(&mut self, file: &LocaleFile, visit: &mut impl FnMut(&LocaleFile)) {
        for included in self.direct_includes(file) {
            if self.visited.insert(included.path.clone()) {
                self.post_order(&included, visit);
            }
        }
        visit(file);
    }

    /// Every file transitively included by `root`, in first-seen (pre-)order.
    /// `root` itself is never listed.
    pub fn collect(&mut self, root: &LocaleFile) -> Vec<PathBuf> {
        let mut files = Vec::new();
        self.visited.insert(root.path.clone());
        self.pre_order(root, &mut files);
        files
    }

    fn pre_order(&mut self, file: &LocaleFile, files: &mut Vec<PathBuf>) {
        for included in self.direct_includes(file) {
            if self.visited.insert(included.path.clone()) {
                files.push(included.path.clone());
                self.pre_order(&included, files);
            }
        }
    }
}

/// Transitive includes of one root locale file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeGraph {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

impl IncludeGraph {
    pub fn build(resolver: IncludeResolver<'_>, root: &LocaleFile) -> Self {
        Self {
            root: root.path.clone(),
            files: resolver.walk().collect(root),
        }
    }
}
