//! Fuzz target for the delimited-text reader.
//!
//! The reader must never panic on malformed input and must always return
//! a rectangular table.

#![no_main]

use libfuzzer_sys::fuzz_target;
use remold::CsvReader;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(table) = CsvReader::new().read_bytes(data) {
        for name in table.column_names() {
            assert_eq!(table.column(name).map(|c| c.len()), Some(table.row_count()));
        }
    }
});
