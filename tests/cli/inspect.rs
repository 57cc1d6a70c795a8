//! `includes`, `keys` and `lookup`.

use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::CliTest;

fn layered_project() -> Result<CliTest> {
    CliTest::with_files(&[
        ("locales/base.yml", "ok:\n  en: OK\n  fr: D'accord\n"),
        ("locales/common.yml", "#include \"./base.yml\"\nsave: Save\n"),
        (
            "locales/app.yml",
            "#include \"./common.yml\"\n#include \"./base\"\n\ngreet:\n  en: Hello\nok: Fine\n",
        ),
    ])
}

#[test]
fn test_includes_lists_transitive_files() -> Result<()> {
    let test = layered_project()?;

    let out = test.run(&["includes", "locales/app.yml"])?;
    assert_eq!(out.code, 0);
    assert_snapshot!(out.stdout, @r"
    locales/common.yml
    locales/base.yml
    ");

    Ok(())
}

#[test]
fn test_includes_survive_cycles() -> Result<()> {
    let test = CliTest::with_files(&[
        ("a.yml", "#include \"./b.yml\"\nx: X\n"),
        ("b.yml", "#include \"./a.yml\"\ny: Y\n"),
    ])?;

    let out = test.run(&["includes", "a.yml"])?;
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, "b.yml\n");

    Ok(())
}

#[test]
fn test_keys_includes_first() -> Result<()> {
    let test = layered_project()?;

    let out = test.run(&["keys", "locales/app.yml"])?;
    assert_eq!(out.code, 0);
    assert_snapshot!(out.stdout, @r"
    ok  locales/base.yml
        en : OK
        fr : D'accord
    save  locales/common.yml
        common : Save
    greet  locales/app.yml
        en : Hello
    ok  locales/app.yml
        app : Fine
    ");

    Ok(())
}

#[test]
fn test_lookup_reports_every_origin() -> Result<()> {
    let test = layered_project()?;

    let out = test.run(&["lookup", "locales/app.yml", "ok"])?;
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_snapshot!(out.stdout, @r"
    --> locales/app.yml:6:1
        app : Fine

    --> locales/base.yml:2:3
        en : OK
        fr : D'accord
    ");

    Ok(())
}

#[test]
fn test_lookup_unknown_key_fails() -> Result<()> {
    let test = layered_project()?;

    let out = test.run(&["lookup", "locales/app.yml", "missing"])?;
    assert_eq!(out.code, 1);
    assert_eq!(out.stdout, "\u{2718} No definition of \"missing\"\n");

    Ok(())
}

#[test]
fn test_lookup_through_alias() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "tsconfig.json",
            r#"{"compilerOptions":{"plugins":[{"name":"locale-keys","alias":{"@shared":"shared/locales"}}]}}"#,
        ),
        ("shared/locales/errors.yml", "oops:\n  en: Something broke\n"),
        ("src/app.yml", "#include \"@shared/errors\"\n"),
    ])?;

    let out = test.run(&["lookup", "src/app.yml", "oops"])?;
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_snapshot!(out.stdout, @r"
    --> shared/locales/errors.yml:2:3
        en : Something broke
    ");

    Ok(())
}
