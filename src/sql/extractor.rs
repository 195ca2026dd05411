//! Statement extractor for hand-written migration files.
//!
//! This is deliberately not a SQL grammar. After stripping `--` comments,
//! four independent pattern passes pick out the statement shapes migrations
//! actually use:
//! - `CREATE TABLE` column lists
//! - `ALTER TABLE ... ADD COLUMN`
//! - `CREATE [UNIQUE] INDEX`
//! - `INSERT INTO ... (cols) VALUES (...)`
//!
//! Each pass scans the whole text, so the result is grouped by statement
//! kind rather than by source position. Anything that does not match,
//! including statements without a terminating `;`, is skipped.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)--.*$").expect("valid comment pattern"));

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(\w+)\s*\((.*?)\);")
        .expect("valid CREATE TABLE pattern")
});

static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(\w+)\s+(\w+(?:\([^)]*\))?)\s*",
        r"(?:NOT\s+NULL|DEFAULT[^,]*)?",
        r"(?:\s+REFERENCES\s+[^\s)]+)?",
        r"(?:\s+ON\s+DELETE\s+\w+)?",
        r"(?:\s+ON\s+UPDATE\s+\w+)?",
        r"(?:,|\s*$)",
    ))
    .expect("valid field pattern")
});

static ALTER_ADD_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)ALTER\s+TABLE\s+(\w+)\s+ADD\s+COLUMN\s+(?:IF\s+NOT\s+EXISTS\s+)?(\w+)\s+([^;]+);",
    )
    .expect("valid ALTER TABLE pattern")
});

static CREATE_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)CREATE\s+(?:UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?(\w+)\s+ON\s+(\w+)\s*\(([^)]+)\);",
    )
    .expect("valid CREATE INDEX pattern")
});

static INSERT_INTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)INSERT\s+INTO\s+(\w+)\s*\(([^)]+)\)\s*VALUES\s*\(([^)]+)\);")
        .expect("valid INSERT pattern")
});

/// First tokens of `CREATE TABLE` body entries that are constraint clauses
/// rather than columns.
const SKIPPED_FIELD_NAMES: [&str; 5] = ["SERIAL", "PRIMARY", "CONSTRAINT", "INDEX", "KEY"];

/// A column definition found inside a `CREATE TABLE` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Column name as written.
    pub name: String,
    /// Type token as written, including any parameter suffix.
    pub type_name: String,
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    /// Table name as written.
    pub name: String,
    /// Surviving column definitions, in declaration order.
    pub fields: Vec<FieldDef>,
}

/// An `ALTER TABLE ... ADD COLUMN` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTable {
    /// Table name as written.
    pub table: String,
    /// Column name as written.
    pub column: String,
    /// Everything between the column name and the `;`, trimmed.
    pub type_clause: String,
}

/// A `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    /// Index name as written.
    pub name: String,
    /// Indexed table as written.
    pub table: String,
    /// Indexed columns, trimmed.
    pub columns: Vec<String>,
}

/// An `INSERT INTO` statement with an explicit column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertInto {
    /// Table name as written.
    pub table: String,
    /// Column names, trimmed.
    pub columns: Vec<String>,
    /// The raw text between the `VALUES` parentheses.
    pub values: String,
}

/// A statement recognized by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatement {
    /// `CREATE TABLE`.
    CreateTable(CreateTable),
    /// `ALTER TABLE ... ADD COLUMN`.
    AlterTable(AlterTable),
    /// `CREATE INDEX`.
    CreateIndex(CreateIndex),
    /// `INSERT INTO`.
    InsertInto(InsertInto),
}

/// Remove every `--` comment up to the end of its line.
#[must_use]
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    LINE_COMMENT.replace_all(text, "")
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|item| item.trim().into()).collect()
}

/// Extract column definitions from a `CREATE TABLE` body.
///
/// The first captured token of each match is checked against the
/// constraint keywords; a match like `PRIMARY KEY` is dropped.
#[must_use]
pub fn parse_fields(body: &str) -> Vec<FieldDef> {
    FIELD
        .captures_iter(body)
        .filter(|caps| {
            !SKIPPED_FIELD_NAMES
                .iter()
                .any(|kw| caps[1].eq_ignore_ascii_case(kw))
        })
        .map(|caps| FieldDef {
            name: caps[1].into(),
            type_name: caps[2].trim().into(),
        })
        .collect()
}

/// Run the `CREATE TABLE` pass over comment-free text.
#[must_use]
pub fn create_tables(text: &str) -> Vec<CreateTable> {
    CREATE_TABLE
        .captures_iter(text)
        .map(|caps| CreateTable {
            name: caps[1].into(),
            fields: parse_fields(&caps[2]),
        })
        .collect()
}

/// Run the `ALTER TABLE ... ADD COLUMN` pass over comment-free text.
#[must_use]
pub fn alter_tables(text: &str) -> Vec<AlterTable> {
    ALTER_ADD_COLUMN
        .captures_iter(text)
        .map(|caps| AlterTable {
            table: caps[1].into(),
            column: caps[2].into(),
            type_clause: caps[3].trim().into(),
        })
        .collect()
}

/// Run the `CREATE INDEX` pass over comment-free text.
#[must_use]
pub fn create_indexes(text: &str) -> Vec<CreateIndex> {
    CREATE_INDEX
        .captures_iter(text)
        .map(|caps| CreateIndex {
            name: caps[1].into(),
            table: caps[2].into(),
            columns: split_list(&caps[3]),
        })
        .collect()
}

/// Run the `INSERT INTO` pass over comment-free text.
#[must_use]
pub fn inserts(text: &str) -> Vec<InsertInto> {
    INSERT_INTO
        .captures_iter(text)
        .map(|caps| InsertInto {
            table: caps[1].into(),
            columns: split_list(&caps[2]),
            values: caps[3].into(),
        })
        .collect()
}

/// Strip comments and run all four passes, in pass order.
#[must_use]
pub fn extract(text: &str) -> Vec<RawStatement> {
    let text = strip_comments(text);

    let mut statements: Vec<RawStatement> = create_tables(&text)
        .into_iter()
        .map(RawStatement::CreateTable)
        .collect();
    statements.extend(
        alter_tables(&text)
            .into_iter()
            .map(RawStatement::AlterTable),
    );
    statements.extend(
        create_indexes(&text)
            .into_iter()
            .map(RawStatement::CreateIndex),
    );
    statements.extend(inserts(&text).into_iter().map(RawStatement::InsertInto));
    statements
}
