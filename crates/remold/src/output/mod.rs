//! CSV output for clean tables.

mod writer;

pub use writer::{append_csv, write_csv, write_to};
