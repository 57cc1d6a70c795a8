//! Plugin entry point.
//!
//! [`LocalePlugin`] owns the configuration snapshot and hands the host
//! decorators for the extension points it exposes:
//!
//! - `intercept`: source-file factory that substitutes locale files with
//!   their synthesized declarations
//! - `service`: language service answering key queries
//! - [`LocaleModuleResolver`]: module resolution for locale specifiers
//!
//! With no runtime library installed every decorator delegates untouched.

pub mod helper;
pub mod intercept;
pub mod service;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{PluginConfig, ProjectSettings};
use crate::core::{FileSystem, IncludeResolver, LibModule, alias::resolve_module};
use crate::host::{Extension, LanguageService, LanguageServiceHost, ModuleResolver, ResolvedModule, SourceFileFactory};

pub use intercept::InterceptingFactory;
pub use service::LocaleLanguageService;

/// Everything one request needs, immutable once built.
#[derive(Debug, Clone)]
pub struct PluginSnapshot {
    pub config: PluginConfig,
    pub project: ProjectSettings,
    /// `None` makes the plugin inert.
    pub lib: Option<LibModule>,
    resolve_root: PathBuf,
}

impl PluginSnapshot {
    pub fn new(config: PluginConfig, project: ProjectSettings, lib: Option<LibModule>) -> Self {
        let resolve_root = project.ts_resolve_root();
        Self {
            config,
            project,
            lib,
            resolve_root,
        }
    }

    pub fn is_locale_module(&self, file_name: impl AsRef<Path>) -> bool {
        self.config.is_locale_module(file_name)
    }

    pub fn project_root(&self) -> &Path {
        &self.project.current_directory
    }

    pub fn resolver<'a>(&'a self, fs: &'a dyn FileSystem) -> IncludeResolver<'a> {
        IncludeResolver {
            fs,
            alias: self.config.alias.as_ref(),
            project_root: &self.project.current_directory,
            resolve_root: &self.resolve_root,
            extensions: &self.config.extensions,
        }
    }
}

/// Atomically swapped snapshot cell shared by every decorator.
#[derive(Debug, Clone)]
pub struct SharedState(Arc<RwLock<Arc<PluginSnapshot>>>);

impl SharedState {
    pub fn new(snapshot: PluginSnapshot) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(snapshot))))
    }

    /// The current snapshot. Hold on to it for the whole request.
    pub fn load(&self) -> Arc<PluginSnapshot> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn store(&self, snapshot: PluginSnapshot) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }
}

pub struct LocalePlugin {
    state: SharedState,
    fs: Arc<dyn FileSystem>,
}

impl LocalePlugin {
    /// Build the plugin from the host's raw options and project settings.
    pub fn create(raw_config: &Value, project: ProjectSettings, fs: Arc<dyn FileSystem>) -> Self {
        let config = PluginConfig::from_value(raw_config, &project);
        let lib = resolve_lib(fs.as_ref(), &project, &config);
        Self {
            state: SharedState::new(PluginSnapshot::new(config, project, lib)),
            fs,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn snapshot(&self) -> Arc<PluginSnapshot> {
        self.state.load()
    }

    /// Whether a runtime library was found; an inactive plugin changes nothing.
    pub fn is_active(&self) -> bool {
        self.state.load().lib.is_some()
    }

    /// Rebuild the snapshot from new raw options. The library is only
    /// resolved again when its flavor changed.
    pub fn on_configuration_changed(&self, raw_config: &Value) {
        let current = self.state.load();
        let project = current.project.clone();
        let config = PluginConfig::from_value(raw_config, &project);
        let lib = if config.lib == current.config.lib {
            current.lib.clone()
        } else {
            resolve_lib(self.fs.as_ref(), &project, &config)
        };
        debug!(?config, "configuration changed");
        self.state.store(PluginSnapshot::new(config, project, lib));
    }

    /// Project files the host should track because they are locale modules.
    pub fn external_files(&self, project_file_names: &[PathBuf]) -> Vec<PathBuf> {
        let snapshot = self.state.load();
        if snapshot.lib.is_none() {
            return Vec::new();
        }
        let files: Vec<PathBuf> = project_file_names
            .iter()
            .filter(|file| snapshot.is_locale_module(file))
            .cloned()
            .collect();
        debug!(count = files.len(), "locale files: {:?}", files);
        files
    }

    pub fn wrap_language_service<S, H>(&self, inner: S, host: Arc<H>) -> LocaleLanguageService<S, H>
    where
        S: LanguageService,
        H: LanguageServiceHost,
    {
        LocaleLanguageService::new(inner, host, self.state.clone(), self.fs.clone())
    }

    pub fn wrap_source_file_factory<F: SourceFileFactory>(&self, inner: F) -> InterceptingFactory<F> {
        InterceptingFactory::new(inner, self.state.clone(), self.fs.clone())
    }

    pub fn wrap_module_resolver<R: ModuleResolver>(&self, inner: R) -> LocaleModuleResolver<R> {
        LocaleModuleResolver::new(inner, self.state.clone(), self.fs.clone())
    }
}

fn resolve_lib(fs: &dyn FileSystem, project: &ProjectSettings, config: &PluginConfig) -> Option<LibModule> {
    match LibModule::resolve(fs, &project.current_directory, config.lib) {
        Ok(lib) => {
            info!(lib = %lib.context.display(), "runtime library resolved");
            Some(lib)
        }
        Err(err) => {
            info!("plugin inactive: {err:#}");
            None
        }
    }
}

/// Resolves locale specifiers the host gave up on to declaration files.
pub struct LocaleModuleResolver<R> {
    inner: R,
    state: SharedState,
    fs: Arc<dyn FileSystem>,
    active: bool,
}

impl<R: ModuleResolver> LocaleModuleResolver<R> {
    pub fn new(inner: R, state: SharedState, fs: Arc<dyn FileSystem>) -> Self {
        let active = !inner.is_intercepted();
        if !active {
            debug!("module resolver already intercepted");
        }
        Self {
            inner,
            state,
            fs,
            active,
        }
    }
}

impl<R: ModuleResolver> ModuleResolver for LocaleModuleResolver<R> {
    fn resolve_module_names(&self, names: &[String], containing_file: &Path) -> Vec<Option<ResolvedModule>> {
        let resolved = self.inner.resolve_module_names(names, containing_file);
        if !self.active {
            return resolved;
        }
        let snapshot = self.state.load();
        if snapshot.lib.is_none() {
            return resolved;
        }

        let context = containing_file.parent().unwrap_or(Path::new(""));
        let resolver = snapshot.resolver(self.fs.as_ref());
        resolved
            .into_iter()
            .zip(names)
            .map(|(module, name)| {
                module.or_else(|| {
                    if !snapshot.is_locale_module(name) {
                        return None;
                    }
                    let file = resolve_module(
                        resolver.fs,
                        resolver.alias,
                        name,
                        context,
                        resolver.resolve_root,
                        resolver.extensions,
                    );
                    debug!(module = %name, file = %file.path.display(), "locale module resolved");
                    Some(ResolvedModule {
                        resolved_file_name: file.path,
                        extension: Extension::Dts,
                        is_external_library_import: false,
                    })
                })
            })
            .collect()
    }

    fn is_intercepted(&self) -> bool {
        true
    }
}
