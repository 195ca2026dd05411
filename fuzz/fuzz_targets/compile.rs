//! Compiler fuzzer.
//!
//! Feeds arbitrary UTF-8 text through the full extract → build pipeline and
//! checks that it never panics, is deterministic, and only emits lower-cased
//! identifiers.

use honggfuzz::fuzz;
use migration_ops::{Change, compile};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Ok(text) = std::str::from_utf8(data) else {
                return;
            };
            let ops = compile(text, "fuzz.sql");
            assert_eq!(ops, compile(text, "fuzz.sql"));
            for op in &ops {
                assert_eq!(op.table, op.table.to_lowercase());
                match &op.change {
                    Change::AddColumn { column, .. } => assert_eq!(*column, column.to_lowercase()),
                    Change::CreateIndex { index_name, .. } => {
                        assert_eq!(*index_name, index_name.to_lowercase());
                    }
                    Change::InsertData { data } => assert!(!data.is_empty()),
                }
            }
        });
    }
}
