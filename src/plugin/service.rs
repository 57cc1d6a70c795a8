//! Language service decorator.
//!
//! Every override runs inside a proxy boundary: a failure is logged and the
//! wrapped service answers instead. A host reporting [`NotImplemented`] is
//! not a failure and falls back silently.

use std::{path::Path, sync::Arc};

use anyhow::Result;
use tracing::{debug, error};

use crate::core::FileSystem;
use crate::host::{
    DefinitionInfo, DefinitionInfoAndBoundSpan, LanguageService, LanguageServiceHost, LineAndCharacter,
    NotImplemented, QuickInfo,
};
use crate::plugin::{
    PluginSnapshot, SharedState,
    helper::{HostFileSystem, ServiceHelper},
};

pub struct LocaleLanguageService<S, H> {
    inner: S,
    host: Arc<H>,
    state: SharedState,
    fs: Arc<dyn FileSystem>,
    active: bool,
}

impl<S: LanguageService, H: LanguageServiceHost> LocaleLanguageService<S, H> {
    pub fn new(inner: S, host: Arc<H>, state: SharedState, fs: Arc<dyn FileSystem>) -> Self {
        let active = !inner.is_intercepted();
        if !active {
            debug!("language service already intercepted");
        }
        Self {
            inner,
            host,
            state,
            fs,
            active,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// `None` while no runtime library is resolved, or when the wrapped
    /// service already handles locale keys.
    fn helper<'a>(&'a self, snapshot: &'a PluginSnapshot) -> Option<ServiceHelper<'a, S>> {
        if !self.active {
            return None;
        }
        let lib = snapshot.lib.as_ref()?;
        Some(ServiceHelper {
            service: &self.inner,
            host: self.host.as_ref(),
            snapshot,
            lib,
            fs: HostFileSystem {
                host: self.host.as_ref(),
                disk: self.fs.as_ref(),
            },
        })
    }

    fn guarded<T>(
        &self,
        operation: &'static str,
        file: &Path,
        position: usize,
        attempt: impl FnOnce() -> Result<T>,
        fallback: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        match attempt() {
            Ok(value) => Ok(value),
            Err(err) => {
                if err.downcast_ref::<NotImplemented>().is_none() {
                    error!(operation, file = %file.display(), position, "{err:#}");
                }
                fallback()
            }
        }
    }
}

impl<S: LanguageService, H: LanguageServiceHost> LanguageService for LocaleLanguageService<S, H> {
    fn definition_at_position(&self, file: &Path, position: usize) -> Result<Option<Vec<DefinitionInfo>>> {
        debug!("definition_at_position for {}:{}", file.display(), position);
        let snapshot = self.state.load();
        let Some(helper) = self.helper(&snapshot) else {
            return self.inner.definition_at_position(file, position);
        };

        self.guarded(
            "definition_at_position",
            file,
            position,
            || match self.inner.definition_at_position(file, position)? {
                Some(definitions) if !definitions.is_empty() => {
                    Ok(Some(helper.original_definitions(definitions)?))
                }
                other => Ok(other),
            },
            || self.inner.definition_at_position(file, position),
        )
    }

    fn definition_and_bound_span(
        &self,
        file: &Path,
        position: usize,
    ) -> Result<Option<DefinitionInfoAndBoundSpan>> {
        debug!("definition_and_bound_span for {}:{}", file.display(), position);
        let snapshot = self.state.load();
        let Some(helper) = self.helper(&snapshot) else {
            return self.inner.definition_and_bound_span(file, position);
        };

        self.guarded(
            "definition_and_bound_span",
            file,
            position,
            || {
                let found = self.inner.definition_and_bound_span(file, position)?;
                match found {
                    Some(mut bound) if !bound.definitions.is_empty() => {
                        bound.definitions = helper.original_definitions(bound.definitions)?;
                        Ok(Some(bound))
                    }
                    other => match helper.key_lookup(file, position)? {
                        Some(lookup) => Ok(Some(DefinitionInfoAndBoundSpan {
                            definitions: helper.definitions_from_details(&lookup.details),
                            text_span: lookup.text_span,
                        })),
                        None => Ok(other),
                    },
                }
            },
            || self.inner.definition_and_bound_span(file, position),
        )
    }

    fn type_definition_at_position(&self, file: &Path, position: usize) -> Result<Option<Vec<DefinitionInfo>>> {
        self.inner.type_definition_at_position(file, position)
    }

    fn quick_info_at_position(&self, file: &Path, position: usize) -> Result<Option<QuickInfo>> {
        debug!("quick_info_at_position for {}:{}", file.display(), position);
        let snapshot = self.state.load();
        let Some(helper) = self.helper(&snapshot) else {
            return self.inner.quick_info_at_position(file, position);
        };

        self.guarded(
            "quick_info_at_position",
            file,
            position,
            || {
                if let Some(info) = self.inner.quick_info_at_position(file, position)? {
                    return Ok(Some(info));
                }
                Ok(helper
                    .key_lookup(file, position)?
                    .map(|lookup| helper.quick_info(&lookup)))
            },
            || self.inner.quick_info_at_position(file, position),
        )
    }

    fn to_line_column_offset(&self, file: &Path, position: usize) -> Result<LineAndCharacter> {
        let snapshot = self.state.load();
        if let Some(helper) = self.helper(&snapshot)
            && snapshot.is_locale_module(file)
        {
            return Ok(helper.line_column(file, position).unwrap_or_default());
        }
        match self.inner.to_line_column_offset(file, position) {
            Err(err) if err.downcast_ref::<NotImplemented>().is_some() => Ok(LineAndCharacter::default()),
            other => other,
        }
    }

    fn exported_declaration_position(&self, module_file: &Path, export_name: &str) -> Result<Option<usize>> {
        self.inner.exported_declaration_position(module_file, export_name)
    }

    fn is_intercepted(&self) -> bool {
        true
    }
}
