use insta::assert_snapshot;
use sqlgate::metadata::{ColumnSchema, SchemaSnapshot, TableSchema};
use sqlgate::schema::{ContextFormatter, RankedTable, NO_RELEVANT_TABLES};

fn snapshot() -> SchemaSnapshot {
    SchemaSnapshot::new(vec![
        TableSchema::new("clientes")
            .with_comment("Clientes registrados")
            .with_column(ColumnSchema::new("id", "integer").not_null())
            .with_column(ColumnSchema::new("email", "text").with_comment("Correo de contacto")),
        TableSchema::new("ventas")
            .with_column(ColumnSchema::new("id", "integer").not_null())
            .with_column(ColumnSchema::new("cliente_id", "integer").not_null())
            .with_column(ColumnSchema::new("total", "numeric"))
            .with_foreign_key("cliente_id", "clientes", "id"),
    ])
    .unwrap()
}

fn ranked(names: &[&str]) -> Vec<RankedTable> {
    names
        .iter()
        .map(|name| RankedTable {
            name: name.to_string(),
            score: 0.0,
        })
        .collect()
}

#[test]
fn test_render_in_selection_order() {
    let text = ContextFormatter::default().render(&ranked(&["ventas", "clientes"]), &snapshot());
    assert_snapshot!(text, @r"
    RELEVANT DATABASE SCHEMA (ALL COLUMNS):

    --- Table: ventas ---
    Columns:
      - id (integer) NOT NULL
      - cliente_id (integer) NOT NULL
      - total (numeric)
    Relationships:
      - cliente_id → clientes.id

    --- Table: clientes ---
    Description: Clientes registrados
    Columns:
      - id (integer) NOT NULL
      - email (text)
        Comment: Correo de contacto
    ");
}

#[test]
fn test_unknown_tables_are_skipped() {
    let text = ContextFormatter::default().render(&ranked(&["missing"]), &snapshot());
    assert_eq!(text, NO_RELEVANT_TABLES);

    let text = ContextFormatter::default().render(&ranked(&["missing", "ventas"]), &snapshot());
    assert!(text.contains("--- Table: ventas ---"));
}

#[test]
fn test_output_respects_bound() {
    let snapshot = snapshot();
    let selection = ranked(&["ventas", "clientes"]);

    for max_chars in [10, 50, 120, 200, 240, 400] {
        let text = ContextFormatter::new(max_chars).render(&selection, &snapshot);
        assert!(
            text.chars().count() <= max_chars,
            "{} chars rendered for a bound of {max_chars}",
            text.chars().count()
        );
    }
}

#[test]
fn test_omitted_tables_are_counted() {
    let text = ContextFormatter::new(240).render(&ranked(&["ventas", "clientes"]), &snapshot());
    assert!(text.contains("--- Table: ventas ---"));
    assert!(text.ends_with("... (1 more tables omitted)"));
}
