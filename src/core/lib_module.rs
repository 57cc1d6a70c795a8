//! The locale runtime library the synthesized modules re-export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::fs::{FileKind, FileSystem};
use crate::utils::join_normalized;

const REACT_TEMPLATE: &str = include_str!("../../templates/react.tsx");
const VUE_TEMPLATE: &str = include_str!("../../templates/vue.ts");

const DEFAULT_TYPES: &str = "types/index.d.ts";

/// Which runtime library flavor the project uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibKind {
    #[default]
    React,
    Vue,
}

impl LibKind {
    /// Unknown names fall back to react.
    pub fn from_name(name: &str) -> Self {
        match name {
            "vue" => LibKind::Vue,
            _ => LibKind::React,
        }
    }

    pub fn package_name(self) -> &'static str {
        match self {
            LibKind::React => "@ices/react-locale",
            LibKind::Vue => "@ices/vue-locale",
        }
    }

    /// Bundled declaration template for this flavor.
    pub fn template(self) -> &'static str {
        match self {
            LibKind::React => REACT_TEMPLATE,
            LibKind::Vue => VUE_TEMPLATE,
        }
    }
}

/// A resolved runtime library package.
#[derive(Debug, Clone, PartialEq)]
pub struct LibModule {
    pub kind: LibKind,
    /// Package directory.
    pub context: PathBuf,
    /// Parsed `package.json`.
    pub package_info: Value,
    pub template_source: &'static str,
    /// The package's type declaration entry.
    pub declaration: PathBuf,
}

impl LibModule {
    /// Find the package the way node resolves `<package>/package.json`:
    /// `node_modules` of `project_root`, then of every ancestor.
    pub fn resolve(fs: &dyn FileSystem, project_root: &Path, kind: LibKind) -> Result<Self> {
        let package = kind.package_name();
        for dir in project_root.ancestors() {
            let manifest = dir.join("node_modules").join(package).join("package.json");
            if !matches!(fs.stat(&manifest), Some(FileKind::File | FileKind::Symlink)) {
                continue;
            }
            let text = fs.read_to_string(&manifest)?;
            let package_info: Value = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse package manifest: {:?}", manifest))?;

            let manifest_dir = manifest.parent().unwrap_or(dir);
            let context = fs
                .real_path(manifest_dir)
                .unwrap_or_else(|| manifest_dir.to_path_buf());
            let types = package_info
                .get("types")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TYPES);
            let declaration = join_normalized(&context, types);

            return Ok(Self {
                kind,
                context,
                package_info,
                template_source: kind.template(),
                declaration,
            });
        }
        bail!("Cannot resolve {} from {:?}", package, project_root)
    }
}
