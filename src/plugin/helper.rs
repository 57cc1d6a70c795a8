//! Façade helpers: definition rewriting, literal key backtracking and hover
//! rendering.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::core::{
    Catalog, FileSystem, KeyDetail, LibModule, LocaleFile,
    backtrack::find_occurrences,
    fs::FileKind,
    line_index::LineIndex,
    parsers::script::parse_script_source,
};
use crate::host::{
    DefinitionInfo, LanguageService, LanguageServiceHost, LineAndCharacter, QuickInfo, ScriptElementKind,
    SymbolDisplayPart, SymbolDisplayPartKind, TextSpan,
};
use crate::plugin::PluginSnapshot;
use crate::utils::relative_to;

/// Origins of a literal key and the span of the literal itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub text_span: TextSpan,
    /// Most specific file first.
    pub details: Vec<KeyDetail>,
}

/// File access preferring the host's buffers over the disk.
pub struct HostFileSystem<'a> {
    pub host: &'a dyn LanguageServiceHost,
    pub disk: &'a dyn FileSystem,
}

impl FileSystem for HostFileSystem<'_> {
    fn stat(&self, path: &Path) -> Option<FileKind> {
        self.disk
            .stat(path)
            .or_else(|| self.host.script_text(path).map(|_| FileKind::File))
    }

    fn real_path(&self, path: &Path) -> Option<PathBuf> {
        self.disk.real_path(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.host.script_text(path) {
            Some(text) => Ok(text),
            None => self.disk.read_to_string(path),
        }
    }
}

pub struct ServiceHelper<'a, S> {
    pub service: &'a S,
    pub host: &'a dyn LanguageServiceHost,
    pub snapshot: &'a PluginSnapshot,
    pub lib: &'a LibModule,
    pub fs: HostFileSystem<'a>,
}

impl<S: LanguageService> ServiceHelper<'_, S> {
    /// Point definitions that land in synthesized declarations somewhere
    /// useful: the locale file itself for a module, else the runtime
    /// library's export of the same name.
    pub fn original_definitions(&self, definitions: Vec<DefinitionInfo>) -> Result<Vec<DefinitionInfo>> {
        let Some(first) = definitions.first() else {
            return Ok(definitions);
        };
        if first.kind == ScriptElementKind::Module && self.snapshot.is_locale_module(&first.file_name) {
            return Ok(vec![DefinitionInfo {
                text_span: TextSpan::new(0, 0),
                original_file_name: Some(first.file_name.clone()),
                ..first.clone()
            }]);
        }
        Ok(self.lib_export_definitions(&definitions)?.unwrap_or(definitions))
    }

    /// Definitions of the runtime library export named like the first
    /// definition inside a locale file.
    pub fn lib_export_definitions(&self, definitions: &[DefinitionInfo]) -> Result<Option<Vec<DefinitionInfo>>> {
        let Some(def) = definitions
            .iter()
            .find(|def| self.snapshot.is_locale_module(&def.file_name))
        else {
            return Ok(None);
        };
        let declaration = &self.lib.declaration;
        let Some(position) = self.service.exported_declaration_position(declaration, &def.name)? else {
            return Ok(None);
        };
        let exported = self.service.definition_at_position(declaration, position)?;
        Ok(exported.filter(|defs| !defs.is_empty()))
    }

    /// Backtrack the string literal at `position` to every locale file that
    /// defines it.
    pub fn key_lookup(&self, file: &Path, position: usize) -> Result<Option<KeyLookup>> {
        let Some(text) = self.host.script_text(file) else {
            return Ok(None);
        };
        let parsed = match parse_script_source(text, &file.to_string_lossy()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(file = %file.display(), "no key lookup: {err:#}");
                return Ok(None);
            }
        };
        let Some(literal) = parsed.key_literal_at(position) else {
            return Ok(None);
        };
        let Some(locale_file) = self.locale_file_of(file, literal.anchor)? else {
            return Ok(None);
        };

        let root = LocaleFile::probe(&self.fs, &locale_file);
        if !root.is_file() {
            return Ok(None);
        }
        let mut details = Catalog::new(self.snapshot.resolver(&self.fs)).lookup(&root, &literal.text);
        if details.is_empty() {
            return Ok(None);
        }
        details.reverse();
        debug!(key = %literal.text, origins = details.len(), "key backtracked");

        Ok(Some(KeyLookup {
            text_span: TextSpan::new(literal.start, literal.length),
            details,
        }))
    }

    /// Locale file declaring the function or class used at `anchor`.
    fn locale_file_of(&self, file: &Path, anchor: usize) -> Result<Option<PathBuf>> {
        let definitions = self.service.type_definition_at_position(file, anchor)?;
        Ok(definitions.into_iter().flatten().find_map(|def| {
            (matches!(def.kind, ScriptElementKind::Function | ScriptElementKind::Class)
                && self.snapshot.is_locale_module(&def.file_name))
            .then_some(def.file_name)
        }))
    }

    /// One definition per origin file, on the first placed value line.
    pub fn definitions_from_details(&self, details: &[KeyDetail]) -> Vec<DefinitionInfo> {
        details
            .iter()
            .map(|detail| {
                let text_span = self
                    .fs
                    .read_to_string(&detail.file_name)
                    .ok()
                    .and_then(|source| find_occurrences(detail, &source).into_iter().next())
                    .map(|found| TextSpan::new(found.offset, found.length))
                    .unwrap_or_default();
                DefinitionInfo {
                    file_name: detail.file_name.clone(),
                    text_span,
                    kind: ScriptElementKind::String,
                    name: detail.key.clone(),
                    container_kind: ScriptElementKind::Unknown,
                    container_name: String::new(),
                    original_file_name: None,
                }
            })
            .collect()
    }

    /// Hover block: every origin's lines, then its project-relative path.
    pub fn quick_info(&self, lookup: &KeyLookup) -> QuickInfo {
        QuickInfo {
            kind: ScriptElementKind::String,
            kind_modifiers: String::new(),
            text_span: lookup.text_span,
            display_parts: display_parts(&lookup.details, self.snapshot.project_root()),
            documentation: Vec::new(),
        }
    }

    /// Line and character of `position` in the real text of a locale file.
    pub fn line_column(&self, file: &Path, position: usize) -> Result<LineAndCharacter> {
        let text = self
            .host
            .script_text(file)
            .ok_or_else(|| anyhow!("No script text for {:?}", file))?;
        let (line, character) = LineIndex::new(&text).line_col(position.min(text.len()));
        Ok(LineAndCharacter { line, character })
    }
}

pub fn display_parts(details: &[KeyDetail], project_root: &Path) -> Vec<SymbolDisplayPart> {
    let mut parts = Vec::new();
    for detail in details {
        if !parts.is_empty() {
            parts.push(SymbolDisplayPart::line_break());
            parts.push(SymbolDisplayPart::line_break());
        }
        for (index, line) in detail.text.split('\n').enumerate() {
            if index > 0 {
                parts.push(SymbolDisplayPart::line_break());
            }
            let (label, rest) = line.split_once(':').unwrap_or((line, ""));
            parts.push(SymbolDisplayPart::new(label, SymbolDisplayPartKind::EnumMemberName));
            parts.push(SymbolDisplayPart::new(":", SymbolDisplayPartKind::Punctuation));
            parts.push(SymbolDisplayPart::new(rest, SymbolDisplayPartKind::Text));
        }
        parts.push(SymbolDisplayPart::line_break());
        parts.push(SymbolDisplayPart::new(
            relative_to(&detail.file_name, project_root),
            SymbolDisplayPartKind::Text,
        ));
    }
    parts
}

/// Plain-text rendering of display parts.
pub fn render_parts(parts: &[SymbolDisplayPart]) -> String {
    parts.iter().map(|part| part.text.as_str()).collect()
}
