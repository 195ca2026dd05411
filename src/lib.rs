#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod apply;
pub mod builder;
pub mod errors;
pub mod migrations;
pub mod operation;
pub mod sql;

// Re-export main types
pub use apply::{ApplyReport, BackendResponse, Outcome, SchemaBackend, apply};
pub use builder::{OperationBuilder, compile, compile_sources};
pub use migrations::{CompiledMigrations, compile_dir};
pub use operation::{Change, Operation, StatementKind};
pub use sql::{FieldType, Literal, map_type, parse_value_list};

// Re-export errors
pub use errors::Error;
