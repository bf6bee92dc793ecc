//! Schema directory output.
//!
//! Rendered files land in one schema directory, which Prisma reads as a
//! whole. Files whose content is already on disk are left untouched, and
//! schema files in the directory that the current render did not produce are
//! reported as stale.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CliResult, WriteError};

/// What happened to one rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The file did not exist before.
    Created,
    /// The file existed with different content.
    Updated,
    /// The file already held this content and was not rewritten.
    Unchanged,
    /// Dry run: nothing was touched.
    Planned,
}

/// One rendered file and where it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub status: FileStatus,
}

/// Outcome of writing a rendered schema set.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    /// Rendered files in filename order.
    pub files: Vec<OutputFile>,

    /// Schema files in the directory that this render did not produce.
    pub stale: Vec<PathBuf>,
}

impl OutputReport {
    /// Files created or updated on disk.
    pub fn changed(&self) -> impl Iterator<Item = &OutputFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Created | FileStatus::Updated))
    }

    /// Whether anything on disk was touched.
    pub fn touched_disk(&self) -> bool {
        self.changed().next().is_some()
    }
}

/// Writes rendered schema files into one directory.
#[derive(Debug, Clone)]
pub struct SchemaWriter {
    dir: PathBuf,
    extension: String,
    dry_run: bool,
}

impl SchemaWriter {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            dry_run: false,
        }
    }

    /// Report what would happen without touching the disk.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every rendered file, in filename order.
    ///
    /// Stops at the first failure; files already written stay on disk.
    pub fn write(&self, rendered: &BTreeMap<String, String>) -> CliResult<OutputReport> {
        if !self.dry_run {
            fs::create_dir_all(&self.dir).map_err(|source| WriteError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        }

        let mut report = OutputReport::default();
        for (filename, content) in rendered {
            let path = self.dir.join(filename);
            let status = if self.dry_run {
                FileStatus::Planned
            } else {
                self.write_file(&path, content)?
            };
            debug!(file = %path.display(), ?status, "schema file");
            report.files.push(OutputFile {
                filename: filename.clone(),
                path,
                bytes: content.len(),
                status,
            });
        }

        report.stale = self.stale_files(rendered)?;
        for path in &report.stale {
            warn!(file = %path.display(), "schema file is not part of this render");
        }
        Ok(report)
    }

    fn write_file(&self, path: &Path, content: &str) -> CliResult<FileStatus> {
        let status = match fs::read_to_string(path) {
            Ok(existing) if existing == content => return Ok(FileStatus::Unchanged),
            Ok(_) => FileStatus::Updated,
            Err(e) if e.kind() == ErrorKind::NotFound => FileStatus::Created,
            Err(source) => {
                return Err(WriteError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };

        fs::write(path, content).map_err(|source| WriteError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(status)
    }

    /// Files with the schema extension that `rendered` does not name.
    fn stale_files(&self, rendered: &BTreeMap<String, String>) -> CliResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(WriteError::ReadDir {
                    path: self.dir.clone(),
                    source,
                }
                .into());
            }
        };

        let mut stale = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| WriteError::ReadDir {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            let is_schema = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str());
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if is_schema && !rendered.contains_key(name) {
                stale.push(path);
            }
        }
        stale.sort();
        Ok(stale)
    }
}

/// Write a standalone document such as a component plan, creating its
/// parent directory.
pub fn write_document(path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| WriteError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACTORS: &str = "schema-01-actors.prisma";
    const ARTICLES: &str = "schema-02-articles.prisma";

    fn rendered() -> BTreeMap<String, String> {
        BTreeMap::from([
            (ARTICLES.to_string(), "model bbs_articles {}\n".to_string()),
            (ACTORS.to_string(), "model actors_users {}\n".to_string()),
        ])
    }

    fn statuses(report: &OutputReport) -> Vec<FileStatus> {
        report.files.iter().map(|f| f.status).collect()
    }

    #[test]
    fn test_creates_directory_and_files_in_order() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/prisma");

        let report = SchemaWriter::new(&out, "prisma").write(&rendered()).unwrap();

        assert_eq!(report.files[0].filename, ACTORS);
        assert_eq!(statuses(&report), vec![FileStatus::Created; 2]);
        assert_eq!(report.files[1].bytes, "model bbs_articles {}\n".len());
        assert_eq!(
            fs::read_to_string(out.join(ARTICLES)).unwrap(),
            "model bbs_articles {}\n"
        );
        assert!(report.stale.is_empty());
    }

    #[test]
    fn test_second_write_leaves_unchanged_files() {
        let dir = TempDir::new().unwrap();
        let writer = SchemaWriter::new(dir.path(), "prisma");
        writer.write(&rendered()).unwrap();

        let mut next = rendered();
        next.insert(ARTICLES.to_string(), "model bbs_articles { x Int }\n".to_string());
        let report = writer.write(&next).unwrap();

        assert_eq!(
            statuses(&report),
            vec![FileStatus::Unchanged, FileStatus::Updated]
        );
        assert_eq!(report.changed().count(), 1);
    }

    #[test]
    fn test_reports_stale_schema_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema-03-old.prisma"), "model old {}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        let report = SchemaWriter::new(dir.path(), "prisma").write(&rendered()).unwrap();

        assert_eq!(report.stale, vec![dir.path().join("schema-03-old.prisma")]);
        assert!(dir.path().join("schema-03-old.prisma").exists());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("prisma");

        let report = SchemaWriter::new(&out, "prisma")
            .dry_run(true)
            .write(&rendered())
            .unwrap();

        assert_eq!(statuses(&report), vec![FileStatus::Planned; 2]);
        assert!(!report.touched_disk());
        assert!(!out.exists());
    }

    #[test]
    fn test_write_document_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plans/components.json");

        write_document(&path, "[]\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
