//! Fuzz target for value-level operations.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use remold::plan::FormatKind;
use remold::registry::{clear_value, format_value, split_value};

#[derive(Debug, Arbitrary)]
struct Input {
    value: String,
    format: u8,
}

fuzz_target!(|input: Input| {
    let cleared = clear_value(&input.value);
    assert!(cleared.is_ascii());
    assert_eq!(clear_value(&cleared), cleared);

    let kind = match input.format % 4 {
        0 => FormatKind::Cpf,
        1 => FormatKind::Cnpj,
        2 => FormatKind::Datetime,
        _ => FormatKind::Cep,
    };
    let _ = format_value(kind, &input.value);

    if let Some((prefix, number)) = split_value(&input.value) {
        assert!(prefix.map(|p| p.len() == 2).unwrap_or(true));
        assert!(number.len() == 8 || number.len() == 9);
    }
});
