//! Locale file substitution at parse time.
//!
//! Every create or update of a locale source file is rebuilt from the text
//! the host just handed over. Nothing is cached between calls.

use std::{borrow::Cow, sync::Arc};

use anyhow::Result;
use tracing::{debug, warn};

use crate::core::{FileSystem, LocaleFile, synth::synthesize_locale_file};
use crate::host::{ParseRequest, SourceFileFactory};
use crate::plugin::SharedState;

/// [`SourceFileFactory`] decorator substituting synthesized declarations.
///
/// Wrapping a factory that already intercepts yields a plain passthrough.
pub struct InterceptingFactory<F> {
    inner: F,
    state: SharedState,
    fs: Arc<dyn FileSystem>,
    active: bool,
}

impl<F: SourceFileFactory> InterceptingFactory<F> {
    pub fn new(inner: F, state: SharedState, fs: Arc<dyn FileSystem>) -> Self {
        let active = !inner.is_intercepted();
        if !active {
            debug!("source file factory already intercepted");
        }
        Self {
            inner,
            state,
            fs,
            active,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// The request to forward: locale files get their synthesized text and
    /// are marked as declarations; anything else passes as is.
    pub fn substitute<'r>(&self, request: ParseRequest<'r>) -> ParseRequest<'r> {
        if !self.active {
            return request;
        }
        let snapshot = self.state.load();
        let Some(lib) = &snapshot.lib else {
            return request;
        };
        if !snapshot.is_locale_module(&request.file_name) {
            return request;
        }

        let file = LocaleFile::with_text(&request.file_name, request.text.as_ref());
        let resolver = snapshot.resolver(self.fs.as_ref());
        match synthesize_locale_file(resolver, &file, lib.template_source, snapshot.config.strict) {
            Ok(text) => {
                debug!(file = %request.file_name.display(), "locale file synthesized");
                ParseRequest {
                    text: Cow::Owned(text),
                    is_declaration_file: true,
                    ..request
                }
            }
            Err(err) => {
                warn!(file = %request.file_name.display(), "synthesis failed: {err:#}");
                request
            }
        }
    }
}

impl<F: SourceFileFactory> SourceFileFactory for InterceptingFactory<F> {
    type SourceFile = F::SourceFile;

    fn create_source_file(&self, request: ParseRequest<'_>) -> Result<Self::SourceFile> {
        self.inner.create_source_file(self.substitute(request))
    }

    fn update_source_file(
        &self,
        previous: Self::SourceFile,
        request: ParseRequest<'_>,
    ) -> Result<Self::SourceFile> {
        self.inner.update_source_file(previous, self.substitute(request))
    }

    fn is_intercepted(&self) -> bool {
        true
    }
}
