use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

#[test]
fn test_synth_replaces_template_placeholders() -> Result<()> {
    let test = CliTest::with_files(&[("locales/app.yml", "greet:\n  en: Hello\n  fr: Bonjour\nbye: Bye\n")])?;

    let out = test.run(&["synth", "locales/app.yml"])?;
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);

    let data = r#"const Keys = {"greet":"en : Hello\nfr : Bonjour","bye":"app : Bye"}"#;
    assert!(out.stdout.contains(data), "stdout: {}", out.stdout);
    assert!(out.stdout.contains("type MessageKeys = keyof typeof Keys\n"));
    assert!(out.stdout.contains("/locales/app.yml\n"));
    assert!(!out.stdout.contains("const Keys = {} "));

    Ok(())
}

#[test]
fn test_synth_imports_includes() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/common.yml", "ok: OK\n"),
        ("locales/app.yml", "#include \"./common.yml\"\ngreet: Hello\n"),
    ])?;

    let out = test.run(&["synth", "locales/app.yml"])?;
    assert_eq!(out.code, 0);

    let common = test.root().join("locales/common.yml");
    let import = format!(
        "import type {{ MessageKeys as KeysType0 }} from \"{}\"",
        common.to_string_lossy().replace('\\', "/")
    );
    assert!(out.stdout.contains(&import), "stdout: {}", out.stdout);
    assert!(out.stdout.contains("type MessageKeys = keyof typeof Keys | KeysType0\n"));

    Ok(())
}

#[test]
fn test_synth_loose_admits_any_string() -> Result<()> {
    let test = CliTest::with_files(&[("app.yml", "greet: Hello\n")])?;

    let out = test.run(&["synth", "app.yml", "--loose"])?;
    assert_eq!(out.code, 0);
    assert!(out.stdout.contains("type MessageKeys = keyof typeof Keys | string\n"));

    Ok(())
}

#[test]
fn test_synth_strict_false_from_tsconfig() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "tsconfig.json",
            r#"{
  // editor plugins
  "compilerOptions": {
    "plugins": [{ "name": "locale-keys", "strict": false }],
  },
}"#,
        ),
        ("src/app.yml", "greet: Hello\n"),
    ])?;

    let out = test.run(&["synth", "src/app.yml"])?;
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stdout.contains("| string\n"));

    Ok(())
}

#[test]
fn test_synth_empty_file_admits_any_string() -> Result<()> {
    let test = CliTest::with_files(&[("empty.yml", "")])?;

    let out = test.run(&["synth", "empty.yml"])?;
    assert_eq!(out.code, 0);
    assert!(out.stdout.contains("const Keys = {}\n"));
    assert!(out.stdout.contains("type MessageKeys = keyof typeof Keys | string\n"));

    Ok(())
}

#[test]
fn test_synth_missing_file_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let out = test.run(&["synth", "nope.yml"])?;
    assert_eq!(out.code, 2);
    assert!(out.stderr.contains("No such locale file"), "stderr: {}", out.stderr);
    assert_eq!(out.stdout, "");

    Ok(())
}

#[test]
fn test_synth_vue_template() -> Result<()> {
    let test = CliTest::with_files(&[
        ("tsconfig.json", r#"{"compilerOptions":{"plugins":[{"name":"locale-keys","lib":"vue"}]}}"#),
        ("app.yml", "greet: Hello\n"),
    ])?;

    let out = test.run(&["synth", "app.yml"])?;
    assert_eq!(out.code, 0);
    assert!(out.stdout.contains("@ices/vue-locale"));
    assert!(!out.stdout.contains("@ices/react-locale"));

    Ok(())
}
