//! The editor host's language-service surface.
//!
//! The plugin never reaches into host internals. It receives these
//! capabilities at startup and hands back decorators implementing the same
//! traits. Value types serialize the way the tsserver protocol spells them.

use std::{
    borrow::Cow,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Half-open byte range into a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptElementKind {
    #[serde(rename = "module")]
    Module,
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "method")]
    Method,
    #[serde(rename = "const")]
    Const,
    #[serde(rename = "var")]
    Variable,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "alias")]
    Alias,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "", other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInfo {
    pub file_name: PathBuf,
    pub text_span: TextSpan,
    pub kind: ScriptElementKind,
    pub name: String,
    pub container_kind: ScriptElementKind,
    pub container_name: String,
    /// Set when the definition stands in for a file the host would not
    /// otherwise open as source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInfoAndBoundSpan {
    pub definitions: Vec<DefinitionInfo>,
    pub text_span: TextSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolDisplayPartKind {
    Text,
    LineBreak,
    Punctuation,
    Space,
    Keyword,
    EnumMemberName,
    StringLiteral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDisplayPart {
    pub text: String,
    pub kind: SymbolDisplayPartKind,
}

impl SymbolDisplayPart {
    pub fn new(text: impl Into<String>, kind: SymbolDisplayPartKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn line_break() -> Self {
        Self::new("\n", SymbolDisplayPartKind::LineBreak)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickInfo {
    pub kind: ScriptElementKind,
    pub kind_modifiers: String,
    pub text_span: TextSpan,
    pub display_parts: Vec<SymbolDisplayPart>,
    #[serde(default)]
    pub documentation: Vec<SymbolDisplayPart>,
}

/// Zero-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineAndCharacter {
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extension {
    #[serde(rename = ".ts")]
    Ts,
    #[serde(rename = ".tsx")]
    Tsx,
    #[serde(rename = ".d.ts")]
    Dts,
    #[serde(rename = ".js")]
    Js,
    #[serde(rename = ".jsx")]
    Jsx,
    #[serde(rename = ".json")]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModule {
    pub resolved_file_name: PathBuf,
    pub extension: Extension,
    pub is_external_library_import: bool,
}

/// The host cannot perform an operation at all.
///
/// Distinct from a failure: callers fall back without reporting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotImplemented {
    pub operation: &'static str,
}

impl fmt::Display for NotImplemented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method not implemented: {}", self.operation)
    }
}

impl std::error::Error for NotImplemented {}

pub fn not_implemented<T>(operation: &'static str) -> Result<T> {
    Err(NotImplemented { operation }.into())
}

/// Per-file queries of the host's language service.
pub trait LanguageService: Send + Sync {
    fn definition_at_position(&self, file: &Path, position: usize) -> Result<Option<Vec<DefinitionInfo>>>;

    fn definition_and_bound_span(
        &self,
        file: &Path,
        position: usize,
    ) -> Result<Option<DefinitionInfoAndBoundSpan>>;

    fn type_definition_at_position(
        &self,
        _file: &Path,
        _position: usize,
    ) -> Result<Option<Vec<DefinitionInfo>>> {
        not_implemented("type_definition_at_position")
    }

    fn quick_info_at_position(&self, file: &Path, position: usize) -> Result<Option<QuickInfo>>;

    fn to_line_column_offset(&self, _file: &Path, _position: usize) -> Result<LineAndCharacter> {
        not_implemented("to_line_column_offset")
    }

    /// A position on the name of the declaration `module_file` exports as
    /// `export_name`. `None` when the module is not in the program or has no
    /// such export.
    fn exported_declaration_position(
        &self,
        _module_file: &Path,
        _export_name: &str,
    ) -> Result<Option<usize>> {
        not_implemented("exported_declaration_position")
    }

    /// Whether locale key navigation is already layered onto this service.
    fn is_intercepted(&self) -> bool {
        false
    }
}

/// The host's view of file contents: unsaved editor buffers, else disk.
pub trait LanguageServiceHost: Send + Sync {
    /// Real text of `file`, before any interception.
    fn script_text(&self, file: &Path) -> Option<String>;
}

pub trait ModuleResolver: Send + Sync {
    /// One entry per name, `None` where the host found nothing.
    fn resolve_module_names(&self, names: &[String], containing_file: &Path) -> Vec<Option<ResolvedModule>>;

    /// Whether locale specifiers are already resolved by this resolver.
    fn is_intercepted(&self) -> bool {
        false
    }
}

/// Input of a source-file parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest<'a> {
    pub file_name: PathBuf,
    pub text: Cow<'a, str>,
    pub version: String,
    pub is_declaration_file: bool,
}

impl<'a> ParseRequest<'a> {
    pub fn new(file_name: impl Into<PathBuf>, text: impl Into<Cow<'a, str>>, version: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
            version: version.into(),
            is_declaration_file: false,
        }
    }
}

/// Creates and incrementally updates the host's parsed source files.
pub trait SourceFileFactory: Send + Sync {
    type SourceFile;

    fn create_source_file(&self, request: ParseRequest<'_>) -> Result<Self::SourceFile>;

    fn update_source_file(
        &self,
        previous: Self::SourceFile,
        request: ParseRequest<'_>,
    ) -> Result<Self::SourceFile>;

    /// Whether locale files are already substituted by this factory.
    fn is_intercepted(&self) -> bool {
        false
    }
}
