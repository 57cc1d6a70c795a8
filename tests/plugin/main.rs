//! The plugin driven through a scripted host.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{Result, anyhow};
use locale_keys::{
    config::ProjectSettings,
    core::RealFileSystem,
    host::*,
    plugin::{LocalePlugin, helper::render_parts},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

const A_YML: &str = "greet:\n  en: \"Hello\"\n  fr: \"Bonjour\"\n";
const B_YML: &str = "#include \"./a.yml\"\nfarewell: \"Bye\"\n";
const APP_TSX: &str = r#"import { useTrans, Trans } from './locales/b.yml'

const t = useTrans()
export const title = t("greet")
export const view = <Trans id="farewell" />
"#;

struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new(with_lib: bool) -> Result<Self> {
        let dir = TempDir::new()?;
        let root = dir.path().canonicalize()?;
        let write = |path: &str, content: &str| -> Result<()> {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap_or(&root))?;
            fs::write(path, content)?;
            Ok(())
        };
        write("src/locales/a.yml", A_YML)?;
        write("src/locales/b.yml", B_YML)?;
        write("src/App.tsx", APP_TSX)?;
        if with_lib {
            write(
                "node_modules/@ices/react-locale/package.json",
                r#"{"name":"@ices/react-locale","types":"lib/index.d.ts"}"#,
            )?;
        }
        Ok(Self { _dir: dir, root })
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn plugin(&self, raw: Value) -> LocalePlugin {
        LocalePlugin::create(&raw, ProjectSettings::new(&self.root), Arc::new(RealFileSystem))
    }

    fn declaration(&self) -> PathBuf {
        self.path("node_modules/@ices/react-locale/lib/index.d.ts")
    }
}

fn definition(file: &Path, start: usize, length: usize, kind: ScriptElementKind, name: &str) -> DefinitionInfo {
    DefinitionInfo {
        file_name: file.to_path_buf(),
        text_span: TextSpan::new(start, length),
        kind,
        name: name.to_string(),
        container_kind: ScriptElementKind::Unknown,
        container_name: String::new(),
        original_file_name: None,
    }
}

fn offset_of(text: &str, needle: &str) -> usize {
    text.find(needle).unwrap_or_else(|| panic!("{needle:?} not in text"))
}

/// Answers only what a test scripted; `type_definitions: None` behaves like a
/// host that lacks the capability. `broken` makes the type and export
/// queries fail outright.
#[derive(Default)]
struct FakeService {
    definitions: HashMap<(PathBuf, usize), Vec<DefinitionInfo>>,
    type_definitions: Option<HashMap<(PathBuf, usize), Vec<DefinitionInfo>>>,
    exports: HashMap<String, usize>,
    broken: bool,
    intercepted: bool,
}

impl LanguageService for FakeService {
    fn definition_at_position(&self, file: &Path, position: usize) -> Result<Option<Vec<DefinitionInfo>>> {
        Ok(self.definitions.get(&(file.to_path_buf(), position)).cloned())
    }

    fn definition_and_bound_span(&self, file: &Path, position: usize) -> Result<Option<DefinitionInfoAndBoundSpan>> {
        Ok(self
            .definition_at_position(file, position)?
            .map(|definitions| DefinitionInfoAndBoundSpan {
                definitions,
                text_span: TextSpan::new(position, 1),
            }))
    }

    fn type_definition_at_position(&self, file: &Path, position: usize) -> Result<Option<Vec<DefinitionInfo>>> {
        if self.broken {
            return Err(anyhow!("boom"));
        }
        match &self.type_definitions {
            Some(map) => Ok(map.get(&(file.to_path_buf(), position)).cloned()),
            None => not_implemented("type_definition_at_position"),
        }
    }

    fn quick_info_at_position(&self, _file: &Path, _position: usize) -> Result<Option<QuickInfo>> {
        Ok(None)
    }

    fn exported_declaration_position(&self, _module_file: &Path, export_name: &str) -> Result<Option<usize>> {
        if self.broken {
            return Err(anyhow!("boom"));
        }
        Ok(self.exports.get(export_name).copied())
    }

    fn is_intercepted(&self) -> bool {
        self.intercepted
    }
}

/// Editor buffers over the disk.
#[derive(Default)]
struct FakeHost {
    buffers: HashMap<PathBuf, String>,
}

impl LanguageServiceHost for FakeHost {
    fn script_text(&self, file: &Path) -> Option<String> {
        self.buffers
            .get(file)
            .cloned()
            .or_else(|| fs::read_to_string(file).ok())
    }
}

/// Records what it was asked to parse.
#[derive(Default)]
struct FakeFactory {
    intercepted: bool,
    seen: Mutex<Vec<(PathBuf, String, bool)>>,
}

impl SourceFileFactory for FakeFactory {
    type SourceFile = String;

    fn create_source_file(&self, request: ParseRequest<'_>) -> Result<String> {
        let text = request.text.to_string();
        self.seen
            .lock()
            .unwrap()
            .push((request.file_name, text.clone(), request.is_declaration_file));
        Ok(text)
    }

    fn update_source_file(&self, _previous: String, request: ParseRequest<'_>) -> Result<String> {
        self.create_source_file(request)
    }

    fn is_intercepted(&self) -> bool {
        self.intercepted
    }
}

/// `t("greet")` resolves to the function exported by `b.yml`.
fn service_resolving_t(project: &Project) -> FakeService {
    let app = project.path("src/App.tsx");
    let b = project.path("src/locales/b.yml");
    let call = offset_of(APP_TSX, "t(\"greet\")");
    let jsx = offset_of(APP_TSX, "<Trans") + 1;
    FakeService {
        type_definitions: Some(HashMap::from([
            ((app.clone(), call), vec![definition(&b, 0, 0, ScriptElementKind::Function, "TranslateFunction")]),
            ((app, jsx), vec![definition(&b, 0, 0, ScriptElementKind::Class, "Trans")]),
        ])),
        ..FakeService::default()
    }
}

#[test]
fn test_key_definition_backtracks_to_included_file() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    assert!(plugin.is_active());
    let service = plugin.wrap_language_service(service_resolving_t(&project), Arc::new(FakeHost::default()));

    let literal = offset_of(APP_TSX, "\"greet\"");
    let found = service
        .definition_and_bound_span(&project.path("src/App.tsx"), literal + 3)?
        .expect("key definition");

    assert_eq!(found.text_span, TextSpan::new(literal, "\"greet\"".len()));
    assert_eq!(found.definitions.len(), 1);
    let def = &found.definitions[0];
    assert_eq!(def.file_name, project.path("src/locales/a.yml"));
    assert_eq!(def.text_span, TextSpan::new(offset_of(A_YML, "en:"), 2));
    assert_eq!(def.kind, ScriptElementKind::String);
    assert_eq!(def.name, "greet");

    Ok(())
}

#[test]
fn test_hover_on_jsx_id() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(service_resolving_t(&project), Arc::new(FakeHost::default()));

    let literal = offset_of(APP_TSX, "\"farewell\"");
    let info = service
        .quick_info_at_position(&project.path("src/App.tsx"), literal + 1)?
        .expect("hover");

    assert_eq!(info.kind, ScriptElementKind::String);
    assert_eq!(info.text_span, TextSpan::new(literal, "\"farewell\"".len()));
    assert_eq!(render_parts(&info.display_parts), "b : Bye\nsrc/locales/b.yml");

    Ok(())
}

#[test]
fn test_hover_reads_unsaved_buffers() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let host = FakeHost {
        buffers: HashMap::from([(project.path("src/locales/a.yml"), "greet:\n  en: Hi there\n".to_string())]),
    };
    let service = plugin.wrap_language_service(service_resolving_t(&project), Arc::new(host));

    let literal = offset_of(APP_TSX, "\"greet\"");
    let info = service
        .quick_info_at_position(&project.path("src/App.tsx"), literal)?
        .expect("hover");
    assert_eq!(render_parts(&info.display_parts), "en : Hi there\nsrc/locales/a.yml");

    Ok(())
}

#[test]
fn test_module_definition_points_at_locale_file() -> Result<()> {
    let project = Project::new(true)?;
    let app = project.path("src/App.tsx");
    let b = project.path("src/locales/b.yml");
    let specifier = offset_of(APP_TSX, "'./locales/b.yml'");
    let service = FakeService {
        definitions: HashMap::from([(
            (app.clone(), specifier),
            vec![definition(&b, 0, 420, ScriptElementKind::Module, "\"b\"")],
        )]),
        ..FakeService::default()
    };
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(service, Arc::new(FakeHost::default()));

    let defs = service.definition_at_position(&app, specifier)?.expect("definitions");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].text_span, TextSpan::new(0, 0));
    assert_eq!(defs[0].original_file_name.as_deref(), Some(b.as_path()));

    Ok(())
}

#[test]
fn test_export_definition_redirects_to_runtime_library() -> Result<()> {
    let project = Project::new(true)?;
    let app = project.path("src/App.tsx");
    let b = project.path("src/locales/b.yml");
    let declaration = project.declaration();
    let use_trans = offset_of(APP_TSX, "useTrans()");
    let library_def = definition(&declaration, 120, 8, ScriptElementKind::Function, "useTrans");
    let service = FakeService {
        definitions: HashMap::from([
            ((app.clone(), use_trans), vec![definition(&b, 900, 8, ScriptElementKind::Function, "useTrans")]),
            ((declaration.clone(), 120), vec![library_def.clone()]),
        ]),
        exports: HashMap::from([("useTrans".to_string(), 120)]),
        ..FakeService::default()
    };
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(service, Arc::new(FakeHost::default()));

    assert_eq!(service.definition_at_position(&app, use_trans)?, Some(vec![library_def.clone()]));
    let bound = service.definition_and_bound_span(&app, use_trans)?.expect("bound span");
    assert_eq!(bound.definitions, vec![library_def]);
    assert_eq!(bound.text_span, TextSpan::new(use_trans, 1));

    Ok(())
}

#[test]
fn test_missing_capability_falls_back_silently() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(FakeService::default(), Arc::new(FakeHost::default()));

    let app = project.path("src/App.tsx");
    let literal = offset_of(APP_TSX, "\"greet\"");
    assert_eq!(service.definition_and_bound_span(&app, literal + 1)?, None);
    assert_eq!(service.quick_info_at_position(&app, literal + 1)?, None);
    assert_eq!(service.to_line_column_offset(&app, 3)?, LineAndCharacter::default());

    Ok(())
}

#[test]
fn test_host_failure_falls_back_to_inner_answer() -> Result<()> {
    let project = Project::new(true)?;
    let app = project.path("src/App.tsx");
    let b = project.path("src/locales/b.yml");
    let use_trans = offset_of(APP_TSX, "useTrans()");
    let inner_def = definition(&b, 900, 8, ScriptElementKind::Function, "useTrans");
    let service = FakeService {
        definitions: HashMap::from([((app.clone(), use_trans), vec![inner_def.clone()])]),
        broken: true,
        ..service_resolving_t(&project)
    };
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(service, Arc::new(FakeHost::default()));

    assert_eq!(service.definition_at_position(&app, use_trans)?, Some(vec![inner_def.clone()]));
    let bound = service.definition_and_bound_span(&app, use_trans)?.expect("bound span");
    assert_eq!(bound.definitions, vec![inner_def]);

    let literal = offset_of(APP_TSX, "\"greet\"");
    assert_eq!(service.definition_and_bound_span(&app, literal + 1)?, None);
    assert_eq!(service.quick_info_at_position(&app, literal + 1)?, None);

    Ok(())
}

#[test]
fn test_service_wrapped_twice_passes_through() -> Result<()> {
    let project = Project::new(true)?;
    let app = project.path("src/App.tsx");
    let literal = offset_of(APP_TSX, "\"greet\"");
    let plugin = project.plugin(json!({ "name": "locale-keys" }));

    let once = plugin.wrap_language_service(service_resolving_t(&project), Arc::new(FakeHost::default()));
    assert!(once.is_intercepted());
    let twice = plugin.wrap_language_service(once, Arc::new(FakeHost::default()));
    let found = twice.definition_and_bound_span(&app, literal + 1)?.expect("key definition");
    assert_eq!(found.definitions.len(), 1);
    assert_eq!(found.definitions[0].file_name, project.path("src/locales/a.yml"));

    let marked = FakeService {
        intercepted: true,
        ..service_resolving_t(&project)
    };
    let service = plugin.wrap_language_service(marked, Arc::new(FakeHost::default()));
    assert_eq!(service.definition_and_bound_span(&app, literal + 1)?, None);

    Ok(())
}

#[test]
fn test_line_column_of_locale_file_uses_real_text() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let service = plugin.wrap_language_service(FakeService::default(), Arc::new(FakeHost::default()));

    let position = offset_of(B_YML, "farewell") + 2;
    assert_eq!(
        service.to_line_column_offset(&project.path("src/locales/b.yml"), position)?,
        LineAndCharacter { line: 1, character: 2 }
    );

    Ok(())
}

#[test]
fn test_inactive_without_runtime_library() -> Result<()> {
    let project = Project::new(false)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    assert!(!plugin.is_active());
    assert!(plugin.external_files(&[project.path("src/locales/a.yml")]).is_empty());

    let service = plugin.wrap_language_service(service_resolving_t(&project), Arc::new(FakeHost::default()));
    let literal = offset_of(APP_TSX, "\"greet\"");
    assert_eq!(service.definition_and_bound_span(&project.path("src/App.tsx"), literal)?, None);

    let factory = plugin.wrap_source_file_factory(FakeFactory::default());
    let text = factory.create_source_file(ParseRequest::new(project.path("src/locales/a.yml"), A_YML, "1"))?;
    assert_eq!(text, A_YML);

    Ok(())
}

#[test]
fn test_factory_substitutes_locale_files() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let factory = plugin.wrap_source_file_factory(FakeFactory::default());
    assert!(factory.is_intercepted());

    let b = project.path("src/locales/b.yml");
    let text = factory.create_source_file(ParseRequest::new(&b, B_YML, "1"))?;
    assert!(text.contains(r#"const Keys = {"farewell":"b : Bye"}"#), "{text}");
    assert!(text.contains("import type { MessageKeys as KeysType0 } from"));
    assert!(text.contains("type MessageKeys = keyof typeof Keys | KeysType0\n"));

    let edited = factory.update_source_file(text, ParseRequest::new(&b, "farewell: Ciao\nok: OK\n", "2"))?;
    assert!(edited.contains(r#"const Keys = {"farewell":"b : Ciao","ok":"b : OK"}"#));
    assert!(edited.contains("type MessageKeys = keyof typeof Keys\n"));

    let app = project.path("src/App.tsx");
    assert_eq!(factory.create_source_file(ParseRequest::new(&app, APP_TSX, "1"))?, APP_TSX);

    let seen = factory.inner().seen.lock().unwrap();
    let flags: Vec<bool> = seen.iter().map(|(_, _, declaration)| *declaration).collect();
    assert_eq!(flags, vec![true, true, false]);

    Ok(())
}

#[test]
fn test_factory_wrapped_twice_passes_through() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let factory = plugin.wrap_source_file_factory(FakeFactory {
        intercepted: true,
        ..FakeFactory::default()
    });

    let b = project.path("src/locales/b.yml");
    assert_eq!(factory.create_source_file(ParseRequest::new(&b, B_YML, "1"))?, B_YML);

    Ok(())
}

#[test]
fn test_loose_configuration_applies_to_next_parse() -> Result<()> {
    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let factory = plugin.wrap_source_file_factory(FakeFactory::default());
    let a = project.path("src/locales/a.yml");

    let strict = factory.create_source_file(ParseRequest::new(&a, A_YML, "1"))?;
    assert!(strict.contains("type MessageKeys = keyof typeof Keys\n"));

    plugin.on_configuration_changed(&json!({ "name": "locale-keys", "strict": false }));
    let loose = factory.create_source_file(ParseRequest::new(&a, A_YML, "1"))?;
    assert!(loose.contains("type MessageKeys = keyof typeof Keys | string\n"));

    Ok(())
}

#[test]
fn test_module_resolver_fills_locale_specifiers() -> Result<()> {
    struct Nothing;
    impl ModuleResolver for Nothing {
        fn resolve_module_names(&self, names: &[String], _: &Path) -> Vec<Option<ResolvedModule>> {
            names.iter().map(|_| None).collect()
        }
    }

    let project = Project::new(true)?;
    let plugin = project.plugin(json!({ "name": "locale-keys" }));
    let resolver = plugin.wrap_module_resolver(Nothing);

    let names = vec!["./locales/b.yml".to_string(), "react".to_string()];
    let resolved = resolver.resolve_module_names(&names, &project.path("src/App.tsx"));
    assert_eq!(
        resolved,
        vec![
            Some(ResolvedModule {
                resolved_file_name: project.path("src/locales/b.yml"),
                extension: Extension::Dts,
                is_external_library_import: false,
            }),
            None,
        ]
    );

    Ok(())
}
