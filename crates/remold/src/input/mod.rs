//! Reading raw tables from delimited files.

mod parser;
mod source;

pub use parser::{CsvReader, ReaderConfig};
pub use source::ExtractRecord;
