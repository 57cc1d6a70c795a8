use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use colored::Colorize;
use tracing::debug;

use crate::cli::args::CommonArgs;
use crate::config::{PluginConfig, ProjectSettings, load_config};
use crate::core::{IncludeResolver, LibModule, LocaleFile, RealFileSystem};
use crate::plugin::PluginSnapshot;
use crate::utils::{join_normalized, relative_to};

/// Project configuration for one CLI run, read the way the plugin reads it.
pub struct ProjectContext {
    pub snapshot: PluginSnapshot,
    pub fs: RealFileSystem,
    pub verbose: bool,
    cwd: PathBuf,
}

impl ProjectContext {
    /// Load the nearest `tsconfig.json`. An unreadable one is reported and
    /// defaults apply.
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let cwd = env::current_dir()?;
        let start = match &common.root {
            Some(root) => join_normalized(&cwd, root),
            None => cwd.clone(),
        };

        let (project, raw_options) = match load_config(&start) {
            Ok(result) => {
                debug!(tsconfig = ?result.source, "project configuration loaded");
                let mut project = result.project;
                if common.root.is_some() {
                    project.current_directory = start.clone();
                }
                (project, result.plugin_options)
            }
            Err(err) => {
                eprintln!("{} {:#}", "warning:".bold().yellow(), err);
                (ProjectSettings::new(&start), serde_json::Value::Null)
            }
        };

        let config = PluginConfig::from_value(&raw_options, &project);
        let fs = RealFileSystem;
        let lib = LibModule::resolve(&fs, &project.current_directory, config.lib).ok();
        Ok(Self {
            snapshot: PluginSnapshot::new(config, project, lib),
            fs,
            verbose: common.verbose,
            cwd,
        })
    }

    pub fn root(&self) -> &Path {
        self.snapshot.project_root()
    }

    pub fn resolver(&self) -> IncludeResolver<'_> {
        self.snapshot.resolver(&self.fs)
    }

    /// Bundled template of the configured library flavor; the CLI does not
    /// need the library to be installed.
    pub fn template(&self) -> &'static str {
        match &self.snapshot.lib {
            Some(lib) => lib.template_source,
            None => self.snapshot.config.lib.template(),
        }
    }

    /// Read a locale file named on the command line.
    pub fn locale_file(&self, file: &Path) -> Result<LocaleFile> {
        let path = join_normalized(&self.cwd, file);
        let locale = LocaleFile::probe(&self.fs, &path);
        if !locale.is_file() {
            bail!("No such locale file: {}", path.display());
        }
        Ok(locale)
    }

    /// Path for display, relative to the project root.
    pub fn display_path(&self, path: &Path) -> String {
        relative_to(path, self.root())
    }
}
