//! Value list fuzzer.
//!
//! The literal parser must accept any input and yield at most one literal per
//! top-level comma plus one.

use honggfuzz::fuzz;
use migration_ops::parse_value_list;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Ok(raw) = std::str::from_utf8(data) else {
                return;
            };
            let values = parse_value_list(raw);
            assert!(values.len() <= raw.matches(',').count() + 1);
        });
    }
}
