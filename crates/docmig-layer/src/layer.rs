//! Migration Layer - file boundary
//!
//! Provides the only place migrations touch the filesystem:
//! - File → Document (size-limited read, parse)
//! - Chain run on the in-memory copy
//! - Document → File (atomic replace, optional backup)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docmig_chain::{MigrationOutcome, MigrationRegistry, Version};
use docmig_tree::{Document, Fingerprint};
use rayon::prelude::*;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::LayerError;
use crate::options::MigrateOptions;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Already at the target version; not written
    UpToDate,
    /// Migrated and written back
    Migrated,
    /// Migrated in memory only
    DryRun,
}

/// Per-file migration report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub family: String,
    pub from: Version,
    pub to: Version,
    pub status: FileStatus,
    /// Number of steps applied
    pub steps: usize,
    /// Fingerprint of the text read
    pub before: Fingerprint,
    /// Fingerprint of the migrated text
    pub after: Fingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
}

/// Migration Layer - trusted file boundary
///
/// Reads a file, runs its family's chain on the in-memory document, and
/// replaces the file only after the whole chain succeeded. A failed run
/// leaves the file exactly as it was.
///
/// Runs on different files are independent. Two runs on the same file at
/// once are the caller's to prevent.
#[derive(Debug, Clone)]
pub struct MigrationLayer {
    registry: Arc<MigrationRegistry>,
    options: MigrateOptions,
}

impl MigrationLayer {
    /// Create layer with default options
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self::with_options(registry, MigrateOptions::default())
    }

    #[inline]
    #[must_use]
    pub fn with_options(registry: Arc<MigrationRegistry>, options: MigrateOptions) -> Self {
        Self { registry, options }
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &MigrateOptions {
        &self.options
    }

    /// Read and parse a file
    ///
    /// # Errors
    /// - [`LayerError::TooLarge`] if the file exceeds `max_file_size`
    /// - [`LayerError::Io`] if it cannot be read
    /// - [`LayerError::Parse`] if it is not a readable document
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, LayerError> {
        let path = path.as_ref();
        let text = self.read(path)?;
        parse(path, &text)
    }

    /// Migrate one file of schema `family` according to the layer's options
    ///
    /// # Errors
    /// Any [`LayerError`]; the file is untouched on error
    pub fn migrate_file(&self, family: &str, path: impl AsRef<Path>) -> Result<FileReport, LayerError> {
        self.run(family, path.as_ref(), self.options.dry_run)
    }

    /// Run the chain without writing, whatever the options say
    ///
    /// # Errors
    /// Any [`LayerError`] except [`LayerError::Persist`]
    pub fn check_file(&self, family: &str, path: impl AsRef<Path>) -> Result<FileReport, LayerError> {
        self.run(family, path.as_ref(), true)
    }

    /// Migrate many files in parallel; results are in input order
    pub fn migrate_files<P>(&self, family: &str, paths: &[P]) -> Vec<Result<FileReport, LayerError>>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| self.migrate_file(family, path))
            .collect()
    }

    fn read(&self, path: &Path) -> Result<String, LayerError> {
        let size = fs::metadata(path)
            .map_err(|e| LayerError::io_error(path, e))?
            .len();
        if size > self.options.max_file_size {
            return Err(LayerError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.options.max_file_size,
            });
        }
        fs::read_to_string(path).map_err(|e| LayerError::io_error(path, e))
    }

    fn run(&self, family: &str, path: &Path, dry_run: bool) -> Result<FileReport, LayerError> {
        let migration_error = |source| LayerError::Migration {
            path: path.to_path_buf(),
            source,
        };

        let text = self.read(path)?;
        let before = Fingerprint::compute(text.as_bytes());
        let doc = parse(path, &text)?;

        let chain = self.registry.chain(family).map_err(migration_error)?;
        let target = match self.options.target {
            Some(target) => target,
            None => self.registry.latest(family).map_err(migration_error)?,
        };

        let migration = match chain.migrate_to(doc, target).map_err(migration_error)? {
            MigrationOutcome::UpToDate(_) => {
                debug!(path = %path.display(), %target, "document is up to date");
                return Ok(FileReport {
                    path: path.to_path_buf(),
                    family: family.to_string(),
                    from: target,
                    to: target,
                    status: FileStatus::UpToDate,
                    steps: 0,
                    before,
                    after: before,
                    backup: None,
                });
            }
            MigrationOutcome::Migrated(migration) => migration,
        };

        let output = migration.document.to_yaml();
        let mut report = FileReport {
            path: path.to_path_buf(),
            family: family.to_string(),
            from: migration.from,
            to: migration.to,
            status: FileStatus::DryRun,
            steps: migration.applied.len(),
            before,
            after: Fingerprint::compute(output.as_bytes()),
            backup: None,
        };
        if dry_run {
            info!(path = %path.display(), from = %report.from, to = %report.to, "dry run");
            return Ok(report);
        }

        if self.options.backup {
            let backup = backup_path(path);
            fs::write(&backup, &text).map_err(|e| LayerError::persist_error(&backup, e))?;
            report.backup = Some(backup);
        }
        write_atomic(path, &output)?;
        report.status = FileStatus::Migrated;
        info!(
            path = %path.display(),
            from = %report.from,
            to = %report.to,
            steps = report.steps,
            "migrated document"
        );
        Ok(report)
    }
}

fn parse(path: &Path, text: &str) -> Result<Document, LayerError> {
    Document::parse(text).map_err(|source| LayerError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `<path>.bak`
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Replace `path` with `contents` via a temp file in the same directory
fn write_atomic(path: &Path, contents: &str) -> Result<(), LayerError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| LayerError::persist_error(path, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| LayerError::persist_error(path, e))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| LayerError::persist_error(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| LayerError::persist_error(path, e.error))?;
    Ok(())
}

/// `.yaml` and `.yml` files directly inside `dir`, sorted
///
/// # Errors
/// [`LayerError::Io`] if the directory cannot be listed
pub fn discover(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LayerError> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| LayerError::io_error(dir, e))? {
        let path = entry.map_err(|e| LayerError::io_error(dir, e))?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
