//! Lightweight SQL handling for migration files.
//!
//! Only the statement shapes hand-written migrations use are recognized:
//! - `CREATE TABLE` statements (one add-column per field)
//! - `ALTER TABLE ... ADD COLUMN` statements
//! - `CREATE INDEX` statements
//! - `INSERT INTO` statements with an explicit column list
//!
//! This is intentionally limited compared to a full SQL parser like `sqlparser`:
//! unsupported statements are skipped rather than rejected.

mod extractor;
mod literal;
mod types;

pub use extractor::{
    AlterTable, CreateIndex, CreateTable, FieldDef, InsertInto, RawStatement, alter_tables,
    create_indexes, create_tables, extract, inserts, parse_fields, strip_comments,
};
pub use literal::{Literal, parse_value_list, split_values};
pub use types::{FieldType, NormalizedType, UiInterface, base_type, map_type};
