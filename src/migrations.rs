//! Loading migration files from a directory.
//!
//! Files are discovered by their `.sql` extension and processed in ascending
//! lexical order of file name. A file that cannot be read is reported and
//! skipped; the rest of the batch still compiles.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::compile;
use crate::errors::Error;
use crate::operation::Operation;

/// Extension that marks a migration file.
pub const MIGRATION_EXTENSION: &str = "sql";

/// A migration file that could not be read.
#[derive(Debug)]
pub struct FileFailure {
    /// File name of the failed migration.
    pub file: String,
    /// Why it failed.
    pub error: Error,
}

/// Result of compiling a migrations directory.
#[derive(Debug, Default)]
pub struct CompiledMigrations {
    /// Names of the files that compiled, in processing order.
    pub files: Vec<String>,
    /// Operations of all compiled files, concatenated in file order.
    pub operations: Vec<Operation>,
    /// Files that could not be read.
    pub failures: Vec<FileFailure>,
}

impl CompiledMigrations {
    /// Returns true if no file was found at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.failures.is_empty()
    }

    /// Returns true if every discovered file was read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// List the migration files of `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`Error::ReadDir`] if the directory cannot be listed.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let read_dir_error = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && path.extension() == Some(OsStr::new(MIGRATION_EXTENSION)) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read and compile a single migration file.
///
/// # Errors
///
/// Returns [`Error::ReadFile`] if the file cannot be read as UTF-8.
pub fn compile_file(path: &Path) -> Result<Vec<Operation>, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(compile(&text, &file_name(path)))
}

/// Compile every migration file in `dir`.
///
/// # Errors
///
/// Returns [`Error::ReadDir`] if the directory cannot be listed. Per-file
/// read errors are collected in [`CompiledMigrations::failures`].
pub fn compile_dir(dir: &Path) -> Result<CompiledMigrations, Error> {
    let mut compiled = CompiledMigrations::default();

    for path in discover(dir)? {
        let file = file_name(&path);
        match compile_file(&path) {
            Ok(operations) => {
                tracing::debug!(%file, operations = operations.len(), "read migration");
                compiled.operations.extend(operations);
                compiled.files.push(file);
            }
            Err(error) => {
                tracing::warn!(%file, %error, "skipping unreadable migration");
                compiled.failures.push(FileFailure { file, error });
            }
        }
    }

    Ok(compiled)
}
