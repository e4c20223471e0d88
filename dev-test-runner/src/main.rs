//! Fixture runner: translates every `fixtures/*.json` case and compares the
//! emitted modules (or the error message) with what the case expects.
//!
//! Run with `cargo run -p dev-test-runner [name-filter]`.
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use mojom_translate::TranslateOptions;
use mojom_translate::batch::{SourceFile, translate_files};
use mojom_translate::emit::emit_module;

static FIXTURE_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9_\-]+\.json$").unwrap());

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Fixture {
    #[serde(default)]
    description: String,
    #[serde(default)]
    options: TranslateOptions,
    /// Parsed mojom trees; each should carry a `name`.
    modules: Vec<Value>,
    /// Module name → subset of its emitted view.
    #[serde(default)]
    expect: serde_json::Map<String, Value>,
    /// Regex the translation error must match.
    #[serde(default)]
    expect_error: Option<String>,
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

/// `expected` must be contained in `actual`: object keys are checked
/// recursively, arrays element by element and must have the same length.
fn is_subset(expected: &Value, actual: &Value, path: &str, mismatches: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            for (key, ev) in e {
                let child = format!("{path}.{key}");
                match a.get(key) {
                    Some(av) => is_subset(ev, av, &child, mismatches),
                    None => mismatches.push(format!("{child}: missing")),
                }
            }
        }
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                mismatches.push(format!("{path}: expected {} items, found {}", e.len(), a.len()));
                return;
            }
            for (i, (ev, av)) in e.iter().zip(a).enumerate() {
                is_subset(ev, av, &format!("{path}[{i}]"), mismatches);
            }
        }
        _ if expected == actual => {}
        _ => mismatches.push(format!("{path}: expected {expected}, found {actual}")),
    }
}

/// On success, returns the fixture's description.
fn run_fixture(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let de = &mut serde_json::Deserializer::from_slice(&bytes);
    let fixture: Fixture = serde_path_to_error::deserialize(de).map_err(|e| format!("bad fixture at {}: {e}", e.path()))?;

    let sources = fixture
        .modules
        .into_iter()
        .enumerate()
        .map(|(i, v)| SourceFile::from_value(&format!("module{i}.mojom"), v))
        .collect::<Result<Vec<_>, _>>();

    let result = sources.and_then(|sources| translate_files(&sources, fixture.options));
    match (result, fixture.expect_error) {
        (Err(err), Some(pattern)) => {
            let re = Regex::new(&pattern).map_err(|e| format!("bad expect_error regex: {e}"))?;
            if re.is_match(&err.to_string()) {
                Ok(fixture.description)
            } else {
                Err(format!("error `{err}` does not match /{pattern}/"))
            }
        }
        (Err(err), None) => Err(format!("unexpected error: {err}")),
        (Ok(_), Some(pattern)) => Err(format!("expected an error matching /{pattern}/, translation succeeded")),
        (Ok(modules), None) => {
            let mut mismatches = Vec::new();
            for (name, expected) in &fixture.expect {
                match modules.iter().find(|m| &m.name == name) {
                    Some(module) => is_subset(expected, &emit_module(module), name, &mut mismatches),
                    None => mismatches.push(format!("{name}: no such module")),
                }
            }
            if mismatches.is_empty() { Ok(fixture.description) } else { Err(mismatches.join("\n      ")) }
        }
    }
}

fn main() {
    let filter = std::env::args().nth(1);
    let mut entries = std::fs::read_dir(fixtures_dir())
        .expect("fixtures directory is readable")
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| FIXTURE_FILE.is_match(n)))
        .filter(|p| filter.as_deref().is_none_or(|f| p.to_string_lossy().contains(f)))
        .collect::<Vec<_>>();
    entries.sort();

    let mut failed = 0usize;
    for path in &entries {
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        match run_fixture(path) {
            Ok(description) => eprintln!("✅ {name}  {description}"),
            Err(why) => {
                failed += 1;
                eprintln!("❌ {name}\n      {why}");
            }
        }
    }
    eprintln!("—— {} fixtures, {failed} failed ——", entries.len());
    if failed > 0 {
        std::process::exit(1);
    }
}
