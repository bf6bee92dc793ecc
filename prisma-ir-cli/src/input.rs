//! JSON input documents.
//!
//! Every command reads its inputs as JSON files shaped like the IR's serde
//! representation: a table list, domain hints, a component list or a whole
//! application.

use std::path::Path;

use prisma_ir::DomainHint;
use prisma_ir::ir::{Application, Component};
use prisma_ir_agent::ReplayProducer;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CliResult, InputError};

/// Read a UTF-8 file, mapping a missing file to `InputError::NotFound`.
pub fn read_text(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and decode a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|e| InputError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Required table names: `["actors_users", ...]`.
pub fn load_tables(path: &Path) -> CliResult<Vec<String>> {
    Ok(read_json(path)?)
}

/// Domain hints: `[{"namespace": "Actors", "tables": [...]}, ...]`.
pub fn load_hints(path: &Path) -> CliResult<Vec<DomainHint>> {
    Ok(read_json(path)?)
}

/// Component list: `[{"filename": ..., "namespace": ..., "tables": [...]}, ...]`.
pub fn load_components(path: &Path) -> CliResult<Vec<Component>> {
    Ok(read_json(path)?)
}

/// Application: `{"files": [...]}`.
pub fn load_application(path: &Path) -> CliResult<Application> {
    Ok(read_json(path)?)
}

/// Free-form requirements text handed to the producer; empty when absent.
pub fn load_context(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(read_text(path)?),
        None => Ok(String::new()),
    }
}

/// Build a replay producer from `{dir}/{filename}.json` per component.
///
/// Missing candidate files are skipped; the orchestrator reports those
/// components as unavailable. The JSON is decoded lazily by the producer so
/// malformed candidates surface as producer errors.
pub fn load_candidates(dir: &Path, components: &[Component]) -> CliResult<ReplayProducer> {
    if !dir.is_dir() {
        return Err(InputError::NotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut producer = ReplayProducer::new();
    for component in components {
        let path = dir.join(format!("{}.json", component.filename));
        if !path.exists() {
            debug!(component = %component.filename, "no candidate file");
            continue;
        }
        producer = producer.with_candidate(component.filename.clone(), read_text(&path)?);
    }

    debug!(candidates = producer.len(), "candidates loaded");
    Ok(producer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_json_not_found() {
        let dir = TempDir::new().unwrap();
        let result = load_tables(&dir.path().join("missing.json"));
        assert!(matches!(
            result,
            Err(crate::error::CliError::Input(InputError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_read_json_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Vec<String>, _> = read_json(&path);
        assert!(matches!(result, Err(InputError::InvalidJson { .. })));
    }

    #[test]
    fn test_load_hints() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints.json");
        std::fs::write(
            &path,
            r#"[{"namespace": "Articles", "tables": ["bbs_articles"], "dependsOn": ["Actors"]}]"#,
        )
        .unwrap();

        let hints = load_hints(&path).unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].depends_on, vec!["Actors".to_string()]);
    }

    #[test]
    fn test_load_context_absent_is_empty() {
        assert_eq!(load_context(None).unwrap(), "");
    }

    #[test]
    fn test_load_candidates_skips_missing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("schema-01-actors.prisma.json"),
            r#"[{"name": "actors_users", "primaryField": {"name": "id"}}]"#,
        )
        .unwrap();

        let components = vec![
            Component::new("schema-01-actors.prisma", "Actors", ["actors_users"]),
            Component::new("schema-02-articles.prisma", "Articles", ["bbs_articles"]),
        ];
        let producer = load_candidates(dir.path(), &components).unwrap();
        assert_eq!(producer.len(), 1);
    }

    #[test]
    fn test_load_candidates_requires_directory() {
        let dir = TempDir::new().unwrap();
        let result = load_candidates(&dir.path().join("nope"), &[]);
        assert!(result.is_err());
    }
}
