//! Want-annotation harness.
//!
//! Runs the registered rule over parsed fixtures and compares the reported
//! diagnostics against the `// want` annotations, the way the host linter's
//! own test driver would.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::fixture::parse_fixture;
use omitempty_lint::registry::create_plugin;

/// Checks one fixture source against its annotations. `name` only labels
/// error messages.
pub fn run_fixture_source(name: &str, source: &str, settings: Option<&Value>) -> Result<()> {
    let fixture = parse_fixture(source).with_context(|| format!("parsing fixture {name}"))?;
    let plugin = create_plugin("omitempty", settings)
        .with_context(|| format!("constructing the rule for fixture {name}"))?;
    let diagnostics = plugin.check(&fixture.file);

    let mut reported: Vec<(u32, String)> = diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.pos.line, diagnostic.message.clone()))
        .collect();
    let mut expected: Vec<(u32, String)> =
        fixture.wants.iter().map(|want| (want.line, want.message.clone())).collect();
    reported.sort();
    expected.sort();

    if reported != expected {
        let missing: Vec<&(u32, String)> =
            expected.iter().filter(|want| !reported.contains(want)).collect();
        let unexpected: Vec<&(u32, String)> =
            reported.iter().filter(|got| !expected.contains(got)).collect();
        bail!(
            "fixture {name}: diagnostics do not match want annotations\n  \
             missing: {missing:?}\n  unexpected: {unexpected:?}"
        );
    }
    debug!(fixture = name, diagnostics = reported.len(), "fixture matched");
    Ok(())
}

/// Runs every `.go` file under `dir` against its annotations, in file-name
/// order. Fails if the directory holds no fixtures at all.
pub fn run_package(dir: impl AsRef<Path>, settings: Option<&Value>) -> Result<()> {
    let dir = dir.as_ref();
    let mut checked = 0usize;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("go") {
            continue;
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        run_fixture_source(&path.display().to_string(), &source, settings)?;
        checked += 1;
    }
    ensure!(checked > 0, "no fixtures found under {}", dir.display());
    debug!(dir = %dir.display(), checked, "fixture package passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_run_fixture_source_matches_annotations() {
        let source = indoc! {r#"
            package main

            type Item struct {
                ID    int     `json:"id,omitempty"` // want `field ID: value type should not use omitempty`
                Label *string `json:"label"`        // want `field Label: pointer type should use omitempty`
                Raw   []byte  `json:"raw"`
            }
        "#};
        run_fixture_source("inline", source, None).unwrap();
    }

    #[test]
    fn test_run_fixture_source_reports_missing_wants() {
        let source = indoc! {r#"
            package main

            type Item struct {
                ID int `json:"id,omitempty"`
            }
        "#};
        let err = run_fixture_source("inline", source, None).unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn test_run_fixture_source_honors_settings() {
        let source = indoc! {r#"
            package main

            type Item struct {
                ID int `json:"id,omitempty"`
            }
        "#};
        let settings = serde_json::json!({ "unnecessary": false });
        run_fixture_source("inline", source, Some(&settings)).unwrap();
    }

    #[test]
    fn test_run_package_rejects_empty_directories() {
        let dir = std::env::temp_dir().join("omitempty-lint-empty-fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(run_package(&dir, None).is_err());
    }
}
