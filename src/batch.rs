//! Multi-file driver.
//!
//! Files are ordered by their imports and translated in dependency waves:
//! every file whose imports are already finished joins the next wave, and a
//! wave runs in parallel. Each translation keeps its own registries; imports
//! are handed over as finished, shared modules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::ast;
use crate::config::TranslateOptions;
use crate::error::{Result, TranslateError};
use crate::module::Module;

/// One decoded input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: Option<PathBuf>,
    /// Name other files import this one by.
    pub name: String,
    pub file: ast::File,
}

impl SourceFile {
    /// Read and decode a JSON mojom tree. The module name is the file's own
    /// `name` key, or else the file name with its `.json` suffix removed.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|source| TranslateError::Io { path: path.to_path_buf(), source })?;
        let display = path.to_string_lossy().to_string();
        let file = ast::File::from_json_str(&display, &source)?;
        let fallback = path
            .file_name()
            .map(|n| n.to_string_lossy().trim_end_matches(".json").to_string())
            .unwrap_or(display);
        Ok(Self {
            path: Some(path.to_path_buf()),
            name: file.name.clone().unwrap_or(fallback),
            file,
        })
    }

    pub fn from_value(default_name: &str, value: serde_json::Value) -> Result<Self> {
        let file = ast::File::from_json_value(default_name, value)?;
        Ok(Self {
            path: None,
            name: file.name.clone().unwrap_or_else(|| default_name.to_string()),
            file,
        })
    }
}

/// Translate every source, imports first. Results come back in input order.
pub fn translate_files(sources: &[SourceFile], options: TranslateOptions) -> Result<Vec<Arc<Module>>> {
    let mut names = IndexSet::new();
    for source in sources {
        if !names.insert(source.name.as_str()) {
            return Err(TranslateError::DuplicateModule { name: source.name.clone() });
        }
    }
    for source in sources {
        if let Some(missing) = source.file.imports.iter().find(|i| !names.contains(i.as_str())) {
            return Err(TranslateError::MissingImport {
                module: source.name.clone(),
                import: missing.clone(),
            });
        }
    }

    let mut done: IndexMap<String, Arc<Module>> = IndexMap::new();
    let mut remaining: Vec<usize> = (0..sources.len()).collect();
    let mut wave = 0usize;
    while !remaining.is_empty() {
        let (ready, blocked): (Vec<usize>, Vec<usize>) = remaining
            .iter()
            .partition(|&&i| sources[i].file.imports.iter().all(|dep| done.contains_key(dep)));
        if ready.is_empty() {
            return Err(TranslateError::ImportCycle {
                modules: blocked.iter().map(|&i| sources[i].name.clone()).collect(),
            });
        }
        tracing::debug!(wave, files = ready.len(), "translating wave");

        // Every file of the wave finishes; the first failure in input order wins.
        let results = ready
            .par_iter()
            .map(|&i| {
                let source = &sources[i];
                crate::translate::translate(&source.file, &source.name, &done, options)
                    .map(|module| (source.name.clone(), Arc::new(module)))
            })
            .collect::<Vec<_>>();
        let finished = results.into_iter().collect::<Result<Vec<_>>>()?;
        done.extend(finished);
        remaining = blocked;
        wave += 1;
    }

    Ok(sources
        .iter()
        .filter_map(|s| done.get(&s.name).cloned())
        .collect())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(name: &str, v: serde_json::Value) -> SourceFile {
        SourceFile::from_value(name, v).unwrap()
    }

    #[test]
    fn dependencies_translate_first() {
        // listed in reverse dependency order on purpose
        let sources = vec![
            source("app.mojom", json!({
                "namespace": "app",
                "imports": ["left.mojom", "right.mojom"],
                "structs": [ { "name": "Pair", "fields": [
                    { "name": "l", "type": "left.L" },
                    { "name": "r", "type": "right.R" }
                ]}]
            })),
            source("left.mojom", json!({
                "namespace": "left", "imports": ["base.mojom"],
                "structs": [ { "name": "L", "fields": [ { "name": "b", "type": "base.B" } ] } ]
            })),
            source("right.mojom", json!({
                "namespace": "right", "imports": ["base.mojom"],
                "structs": [ { "name": "R", "fields": [ { "name": "b", "type": "base.B" } ] } ]
            })),
            source("base.mojom", json!({
                "namespace": "base",
                "structs": [ { "name": "B", "fields": [] } ]
            })),
        ];
        let modules = translate_files(&sources, TranslateOptions::default()).unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["app.mojom", "left.mojom", "right.mojom", "base.mojom"]);

        let app = &modules[0];
        let (owner, left) = app.struct_for(app.structs[0].fields[0].kind).unwrap();
        assert_eq!(owner.name, "left.mojom");
        assert_eq!(left.name, "L");
        // base is not re-exported through left/right
        assert_eq!(app.kinds.lookup("x:base.B"), None);
    }

    #[test]
    fn import_cycle_is_reported() {
        let sources = vec![
            source("a.mojom", json!({ "imports": ["b.mojom"] })),
            source("b.mojom", json!({ "imports": ["a.mojom"] })),
            source("c.mojom", json!({})),
        ];
        let err = translate_files(&sources, TranslateOptions::default()).unwrap_err();
        match err {
            TranslateError::ImportCycle { modules } => assert_eq!(modules, vec!["a.mojom", "b.mojom"]),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn unknown_import_and_duplicate_names() {
        let err = translate_files(&[source("a.mojom", json!({ "imports": ["zzz.mojom"] }))], TranslateOptions::default())
            .unwrap_err();
        assert!(matches!(err, TranslateError::MissingImport { .. }), "{err}");

        let err = translate_files(
            &[source("a.mojom", json!({})), source("a.mojom", json!({}))],
            TranslateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::DuplicateModule { .. }), "{err}");
    }

    #[test]
    fn wave_failures_report_the_first_file() {
        let sources = vec![
            source("ok.mojom", json!({ "structs": [ { "name": "Fine", "fields": [] } ] })),
            source("first.mojom", json!({ "structs": [ { "name": "S", "fields": [ { "name": "f", "type": "Missing" } ] } ] })),
            source("second.mojom", json!({ "constants": [ { "name": "k", "type": "int32", "value": { "identifier": "nope" } } ] })),
        ];
        for _ in 0..16 {
            let err = translate_files(&sources, TranslateOptions::default()).unwrap_err();
            assert!(matches!(err, TranslateError::UnknownType { .. }), "{err}");
        }

        let swapped = vec![sources[2].clone(), sources[1].clone()];
        let err = translate_files(&swapped, TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, TranslateError::UnresolvedIdentifier { .. }), "{err}");
    }

    #[test]
    fn name_key_overrides_default() {
        let s = source("file.json", json!({ "name": "real.mojom" }));
        assert_eq!(s.name, "real.mojom");
        assert!(s.path.is_none());
    }

    #[test]
    fn load_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("mojom-translate-batch-{}.mojom.json", std::process::id()));
        std::fs::write(&path, r#"{ "namespace": "disk", "enums": [ { "name": "E", "values": [ { "name": "A" } ] } ] }"#)
            .unwrap();
        let loaded = SourceFile::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(loaded.name.ends_with(".mojom"), "{}", loaded.name);
        assert_eq!(loaded.file.namespace, "disk");

        let err = SourceFile::load(&path).unwrap_err();
        assert!(matches!(err, TranslateError::Io { .. }));
    }
}
