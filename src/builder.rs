//! Operation builder: turns extracted statements into [`Operation`]s.

use indexmap::IndexMap;

use crate::operation::{Change, Operation, StatementKind};
use crate::sql::{RawStatement, extract, map_type, parse_value_list};

/// Builds the operations of a single migration file.
///
/// # Example
///
/// ```rust
/// use migration_ops::OperationBuilder;
///
/// let ops = OperationBuilder::new("001_init.sql")
///     .build("CREATE TABLE Foo (id SERIAL PRIMARY KEY, name VARCHAR(50) NOT NULL);");
/// assert_eq!(ops.len(), 1);
/// assert_eq!(ops[0].table, "foo");
/// assert_eq!(ops[0].column(), Some("name"));
/// ```
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    source_file: String,
}

impl OperationBuilder {
    /// Create a builder for the file named `source_file`.
    #[must_use]
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
        }
    }

    /// The file name stamped on every operation.
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    fn operation(&self, table: &str, source: StatementKind, change: Change) -> Operation {
        Operation {
            table: table.to_lowercase(),
            source_file: self.source_file.clone(),
            source,
            change,
        }
    }

    fn add_column(
        &self,
        table: &str,
        column: &str,
        raw_type: &str,
        source: StatementKind,
    ) -> Operation {
        let raw_type = raw_type.trim();
        self.operation(
            table,
            source,
            Change::AddColumn {
                column: column.to_lowercase(),
                raw_type: raw_type.into(),
                field_type: map_type(raw_type),
            },
        )
    }

    /// Convert one extracted statement into zero or more operations,
    /// appending them to `out`.
    pub fn push_statement(&self, statement: RawStatement, out: &mut Vec<Operation>) {
        match statement {
            RawStatement::CreateTable(ct) => {
                out.extend(ct.fields.iter().map(|field| {
                    self.add_column(
                        &ct.name,
                        &field.name,
                        &field.type_name,
                        StatementKind::CreateTable,
                    )
                }));
            }
            RawStatement::AlterTable(alter) => {
                out.push(self.add_column(
                    &alter.table,
                    &alter.column,
                    &alter.type_clause,
                    StatementKind::AlterTable,
                ));
            }
            RawStatement::CreateIndex(index) => {
                out.push(self.operation(
                    &index.table,
                    StatementKind::CreateIndex,
                    Change::CreateIndex {
                        index_name: index.name.to_lowercase(),
                        columns: index.columns,
                    },
                ));
            }
            RawStatement::InsertInto(insert) => {
                let values = parse_value_list(&insert.values);
                if values.len() != insert.columns.len() {
                    tracing::debug!(
                        file = %self.source_file,
                        table = %insert.table,
                        columns = insert.columns.len(),
                        values = values.len(),
                        "skipping INSERT: column/value count mismatch"
                    );
                    return;
                }
                let data: IndexMap<String, _> = insert.columns.into_iter().zip(values).collect();
                out.push(self.operation(
                    &insert.table,
                    StatementKind::InsertData,
                    Change::InsertData { data },
                ));
            }
        }
    }

    /// Compile migration text into operations.
    ///
    /// Never fails: statements outside the supported subset are skipped.
    #[must_use]
    pub fn build(&self, text: &str) -> Vec<Operation> {
        let mut operations = Vec::new();
        for statement in extract(text) {
            self.push_statement(statement, &mut operations);
        }
        tracing::trace!(
            file = %self.source_file,
            operations = operations.len(),
            "compiled migration"
        );
        operations
    }
}

/// Compile the text of one migration file.
#[must_use]
pub fn compile(text: &str, source_file: &str) -> Vec<Operation> {
    OperationBuilder::new(source_file).build(text)
}

/// Compile several migration files and concatenate their operations in
/// ascending lexical order of file name, regardless of input order.
///
/// Operations repeated across files are kept.
pub fn compile_sources<I, N, T>(sources: I) -> Vec<Operation>
where
    I: IntoIterator<Item = (N, T)>,
    N: AsRef<str>,
    T: AsRef<str>,
{
    let mut sources: Vec<(N, T)> = sources.into_iter().collect();
    sources.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
    sources
        .iter()
        .flat_map(|(name, text)| compile(text.as_ref(), name.as_ref()))
        .collect()
}
