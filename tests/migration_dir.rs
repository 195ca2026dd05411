//! Integration tests for loading a migrations directory from disk.

use std::fs;
use std::path::Path;

use migration_ops::migrations::{compile_file, discover};
use migration_ops::{Error, Operation, compile_dir};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) {
    fs::write(dir.join(name), contents).expect("Failed to write fixture");
}

fn columns(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter_map(|op| op.column().map(|c| format!("{}.{c}", op.table)))
        .collect()
}

#[test]
fn test_files_processed_in_name_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "010_later.sql",
        "ALTER TABLE users ADD COLUMN c TEXT;",
    );
    write(
        dir.path(),
        "002_second.sql",
        "ALTER TABLE users ADD COLUMN b TEXT;",
    );
    write(
        dir.path(),
        "001_first.sql",
        "CREATE TABLE users (a VARCHAR(10));",
    );

    let compiled = compile_dir(dir.path()).unwrap();
    assert_eq!(
        compiled.files,
        vec!["001_first.sql", "002_second.sql", "010_later.sql"]
    );
    assert_eq!(
        columns(&compiled.operations),
        vec!["users.a", "users.b", "users.c"]
    );
    assert!(compiled.is_complete());
}

#[test]
fn test_non_sql_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.sql", "CREATE TABLE t (a TEXT);");
    write(
        dir.path(),
        "README.md",
        "ALTER TABLE t ADD COLUMN nope TEXT;",
    );
    write(
        dir.path(),
        "002_backup.sql.bak",
        "ALTER TABLE t ADD COLUMN nope TEXT;",
    );
    fs::create_dir(dir.path().join("003_dir.sql")).unwrap();

    let files = discover(dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("001_init.sql"));

    let compiled = compile_dir(dir.path()).unwrap();
    assert_eq!(columns(&compiled.operations), vec!["t.a"]);
}

#[test]
fn test_unreadable_file_does_not_abort_batch() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_ok.sql", "ALTER TABLE t ADD COLUMN a TEXT;");
    write(dir.path(), "002_binary.sql", [0xFF_u8, 0xFE, 0x00, 0xC3]);
    write(dir.path(), "003_ok.sql", "ALTER TABLE t ADD COLUMN c TEXT;");

    let compiled = compile_dir(dir.path()).unwrap();
    assert_eq!(compiled.files, vec!["001_ok.sql", "003_ok.sql"]);
    assert_eq!(columns(&compiled.operations), vec!["t.a", "t.c"]);
    assert_eq!(compiled.failures.len(), 1);
    assert_eq!(compiled.failures[0].file, "002_binary.sql");
    assert!(matches!(compiled.failures[0].error, Error::ReadFile { .. }));
    assert!(!compiled.is_complete());
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let compiled = compile_dir(dir.path()).unwrap();
    assert!(compiled.is_empty());
    assert!(compiled.operations.is_empty());
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let err = compile_dir(&missing).unwrap_err();
    assert!(matches!(err, Error::ReadDir { .. }));
    assert!(err.to_string().contains("nope"), "{err}");
}

#[test]
fn test_compile_file_stamps_file_name() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "005_roles.sql",
        "CREATE INDEX idx_roles_name ON roles (name);",
    );
    let ops = compile_file(&dir.path().join("005_roles.sql")).unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].source_file, "005_roles.sql");
}
