//! Schema-change operations produced by the compiler.

use core::fmt::{self, Display};

use indexmap::IndexMap;
use serde::Serialize;

use crate::sql::{FieldType, Literal};

/// Which SQL construct produced an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// A column inside `CREATE TABLE`.
    CreateTable,
    /// `ALTER TABLE ... ADD COLUMN`.
    AlterTable,
    /// `CREATE INDEX`.
    CreateIndex,
    /// `INSERT INTO`.
    InsertData,
}

impl StatementKind {
    /// The snake-case name used in logs and serialized output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::CreateTable => "create_table",
            StatementKind::AlterTable => "alter_table",
            StatementKind::CreateIndex => "create_index",
            StatementKind::InsertData => "insert_data",
        }
    }
}

impl Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The change an [`Operation`] describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// Add a column to a table.
    AddColumn {
        /// Lower-cased column name.
        column: String,
        /// SQL type text as written, trimmed.
        #[serde(rename = "data_type")]
        raw_type: String,
        /// Normalized type of `raw_type`.
        field_type: FieldType,
    },
    /// Create an index.
    CreateIndex {
        /// Lower-cased index name.
        index_name: String,
        /// Indexed columns, trimmed.
        columns: Vec<String>,
    },
    /// Insert one record.
    InsertData {
        /// Column name, as written, to value.
        data: IndexMap<String, Literal>,
    },
}

/// One schema or data change derived from migration SQL.
///
/// Operations are immutable values: built once by the compiler and consumed
/// once by an applier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// Lower-cased table name.
    pub table: String,
    /// Name of the migration file the operation came from.
    #[serde(rename = "file")]
    pub source_file: String,
    /// Which statement shape produced it.
    #[serde(rename = "source")]
    pub source: StatementKind,
    /// The change itself.
    #[serde(flatten)]
    pub change: Change,
}

impl Operation {
    /// Short name of the change kind: `add_column`, `create_index` or
    /// `insert_data`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.change {
            Change::AddColumn { .. } => "add_column",
            Change::CreateIndex { .. } => "create_index",
            Change::InsertData { .. } => "insert_data",
        }
    }

    /// The column added, for [`Change::AddColumn`].
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match &self.change {
            Change::AddColumn { column, .. } => Some(column),
            _ => None,
        }
    }

    /// The normalized field type, for [`Change::AddColumn`].
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        match &self.change {
            Change::AddColumn { field_type, .. } => Some(*field_type),
            _ => None,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            Change::AddColumn {
                column, raw_type, ..
            } => write!(f, "add_column {}.{column} {raw_type}", self.table)?,
            Change::CreateIndex {
                index_name,
                columns,
            } => write!(
                f,
                "create_index {index_name} on {} ({})",
                self.table,
                columns.join(", ")
            )?,
            Change::InsertData { data } => {
                write!(f, "insert_data {} (", self.table)?;
                for (i, (column, value)) in data.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}={value}")?;
                }
                write!(f, ")")?;
            }
        }
        write!(f, " [{} from {}]", self.source, self.source_file)
    }
}
