//! Integration tests for the transform engine.

use std::sync::Arc;

use indexmap::IndexMap;
use remold::{
    CapturingSink, CityDirectory, OperationRegistry, PipelinePlan, RemoldError, Stage,
    StageEvent, Table, TransformEngine,
};

fn plan(json: &str) -> PipelinePlan {
    PipelinePlan::from_json_str(json).expect("plan should parse")
}

fn cities() -> Arc<CityDirectory> {
    let mut directory = CityDirectory::new();
    directory.insert("BELO HORIZONTE", "MG", "2547");
    directory.insert("RIO DE JANEIRO", "RJ", "6343");
    Arc::new(directory)
}

fn engine() -> TransformEngine {
    TransformEngine::new(OperationRegistry::with_builtins(cities()))
}

fn column<'a>(table: &'a Table, name: &str) -> Vec<Option<&'a str>> {
    table
        .column(name)
        .unwrap_or_else(|| panic!("column {} missing", name))
        .iter()
        .map(|c| c.as_deref())
        .collect()
}

// =============================================================================
// Stage Behaviour
// =============================================================================

#[test]
fn test_trim_then_upper() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "nome": {"field_destiny": "Nome", "transform": {"trim": true, "upper": true}}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[("nome", &["  ana  ", "bob"])]).unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    assert_eq!(column(&out, "Nome"), vec![Some("ANA"), Some("BOB")]);
}

#[test]
fn test_project_is_case_insensitive_and_drops_unlisted() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "CODIGO": {"field_destiny": "Codigo"},
            "nome": {"field_destiny": "Nome"}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[
        ("Nome", &["ana"]),
        ("Extra", &["x"]),
        ("codigo", &["7"]),
    ])
    .unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    let names: Vec<_> = out.column_names().collect();
    assert_eq!(names, vec!["Codigo", "Nome"]);
}

#[test]
fn test_select_keeps_matching_rows() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "status": {"field_destiny": "Status", "transform": {"select": "1"}},
            "nome": {"field_destiny": "Nome"}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[
        ("status", &["1", "0", "1"]),
        ("nome", &["a", "b", "c"]),
    ])
    .unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    assert_eq!(out.row_count(), 2);
    assert_eq!(column(&out, "Nome"), vec![Some("a"), Some("c")]);
}

#[test]
fn test_operations_follow_field_order() {
    // The second field copies the first after it has been upper-cased.
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "nome": {"field_destiny": "Nome", "transform": {"upper": true}},
            "apelido": {"field_destiny": "Apelido", "transform": {"copy": "Nome"}}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[("nome", &["ana"]), ("apelido", &["x"])]).unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    assert_eq!(column(&out, "Apelido"), vec![Some("ANA")]);
}

#[test]
fn test_switch_rename_and_prune() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "situacao": {"field_destiny": "Situacao", "transform": {
                "switch": {"str_from": ["A", "I"], "str_to": ["Ativo", "Inativo"]}
            }},
            "id": {"field_destiny": "Codigo", "transform": {"rename": true}},
            "tmp": {"field_destiny": "Tmp"}
        }, "remove": {"drop": "Tmp"}}}"#,
    );
    let raw = Table::from_text_columns(&[
        ("situacao", &["A", "I", "AI"]),
        ("id", &["1", "2", "3"]),
        ("tmp", &["x", "y", "z"]),
    ])
    .unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    let names: Vec<_> = out.column_names().collect();
    assert_eq!(names, vec!["Situacao", "Codigo_Old"]);
    assert_eq!(
        column(&out, "Situacao"),
        vec![Some("Ativo"), Some("Inativo"), Some("AI")]
    );
}

#[test]
fn test_split_and_search() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "fone": {"field_destiny": "Fone", "transform": {"split": "DDD1"}},
            "cidade": {"field_destiny": "Cidade", "transform": {"upper": true, "search": "CITY"}},
            "uf": {"field_destiny": "UF"}
        }, "remove": {"a": "Fone"}}}"#,
    );
    let raw = Table::from_text_columns(&[
        ("fone", &["11999999999", "3133334444"]),
        ("cidade", &["belo horizonte", "Niteroi"]),
        ("uf", &["MG", "RJ"]),
    ])
    .unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    let names: Vec<_> = out.column_names().collect();
    assert_eq!(
        names,
        vec!["Cidade", "UF", "DDD1", "Fone_Numero", "Codigo_Cidade"]
    );
    assert_eq!(column(&out, "DDD1"), vec![Some("11"), Some("31")]);
    assert_eq!(
        column(&out, "Fone_Numero"),
        vec![Some("999999999"), Some("33334444")]
    );
    assert_eq!(column(&out, "Codigo_Cidade"), vec![Some("2547"), None]);
}

#[test]
fn test_format_and_clear() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "cnpj": {"field_destiny": "CNPJ", "transform": {"format": "CNPJ"}},
            "cep": {"field_destiny": "CEP", "transform": {"format": "cep"}},
            "nascimento": {"field_destiny": "Nascimento", "transform": {"format": "DATETIME"}},
            "obs": {"field_destiny": "Obs", "transform": {"clear": true}}
        }}}"#,
    );
    let raw = Table::from_columns(vec![
        ("cnpj", vec![Some("12345678901234".to_string())]),
        ("cep", vec![Some("12345678".to_string())]),
        ("nascimento", vec![Some("2023/12/25".to_string())]),
        ("obs", vec![Some("Atenção: ligar às 9h!".to_string())]),
    ])
    .unwrap();

    let out = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    assert_eq!(out.get(0, "CNPJ"), Some("12.345.678/9012-34"));
    assert_eq!(out.get(0, "CEP"), Some("12345-678"));
    assert_eq!(out.get(0, "Nascimento"), Some("2023-12-25 00:00:00.000"));
    assert_eq!(out.get(0, "Obs"), Some("Atencao ligar as 9h"));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_unknown_operation_is_fatal_before_rows_change() {
    let plan = plan(
        r#"{"a": {"destiny": "A", "fields": {"x": {"field_destiny": "X"}}},
            "b": {"destiny": "B", "fields": {"x": {"field_destiny": "X", "transform": {"reverse": true}}}}}"#,
    );
    let sink = CapturingSink::shared();
    let engine = engine().with_diagnostics(sink.clone());

    let mut raw = IndexMap::new();
    raw.insert("a".to_string(), Table::from_text_columns(&[("x", &["1"])]).unwrap());
    raw.insert("b".to_string(), Table::from_text_columns(&[("x", &["1"])]).unwrap());

    let err = engine.transform(&plan, raw).unwrap_err();
    match err {
        RemoldError::UnknownOperationKind { operation, column } => {
            assert_eq!(operation, "reverse");
            assert_eq!(column, "X");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // Dataset "a" was never started either.
    assert!(sink.events().is_empty());
}

#[test]
fn test_missing_source_column_fails_at_project() {
    let plan = plan(r#"{"t": {"destiny": "T", "fields": {"cpf": {"field_destiny": "CPF"}}}}"#);
    let raw = Table::from_text_columns(&[("nome", &["ana"])]).unwrap();

    let err = engine()
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap_err();

    assert!(matches!(
        err,
        RemoldError::MissingColumn { ref column, stage: Stage::Project } if column == "cpf"
    ));
}

#[test]
fn test_operation_failure_carries_context() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "cidade": {"field_destiny": "Cidade", "transform": {"search": "CITY"}}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[("cidade", &["BELO HORIZONTE"])]).unwrap();
    let sink = CapturingSink::shared();

    let err = engine()
        .with_diagnostics(sink.clone())
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap_err();

    assert!(matches!(
        err,
        RemoldError::OperationFailed { ref operation, ref column, .. }
            if operation == "search" && column == "Cidade"
    ));
    let failure = sink
        .events()
        .into_iter()
        .find(|e| matches!(e, StageEvent::Failed { .. }))
        .expect("failure recorded");
    match failure {
        StageEvent::Failed {
            dataset,
            operation,
            column,
            ..
        } => {
            assert_eq!(dataset, "t");
            assert_eq!(operation.as_deref(), Some("search"));
            assert_eq!(column.as_deref(), Some("Cidade"));
        }
        _ => unreachable!(),
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_stage_events_in_order() {
    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "nome": {"field_destiny": "Nome", "transform": {"upper": true}}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[("nome", &["ana"])]).unwrap();
    let sink = CapturingSink::shared();

    engine()
        .with_diagnostics(sink.clone())
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();

    let stages: Vec<Stage> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            StageEvent::StageCompleted { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![Stage::Project, Stage::Rename, Stage::Operate, Stage::Prune]
    );

    let events = sink.events();
    assert!(matches!(events.first(), Some(StageEvent::TableStarted { .. })));
    assert!(matches!(events.last(), Some(StageEvent::TableFinished { .. })));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, StageEvent::OperationInvoked { operation, .. } if operation == "upper"))
    );
}

#[test]
fn test_custom_operation_via_registry() {
    let mut registry = OperationRegistry::with_builtins(cities());
    registry.register("reverse", |mut table: Table, column: &str, _params: &remold::OperationParams| {
        table.map_column(column, |v| v.chars().rev().collect())?;
        Ok(table)
    });
    let engine = TransformEngine::new(registry);

    let plan = plan(
        r#"{"t": {"destiny": "T", "fields": {
            "nome": {"field_destiny": "Nome", "transform": {"reverse": {"any": "value"}}}
        }}}"#,
    );
    let raw = Table::from_text_columns(&[("nome", &["abc"])]).unwrap();

    let out = engine
        .transform_table(plan.table("t").unwrap(), raw)
        .unwrap();
    assert_eq!(out.get(0, "Nome"), Some("cba"));
}
