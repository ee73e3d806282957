use sqlgate::metadata::{ColumnSchema, SchemaSnapshot, TableSchema};
use sqlgate::schema::SchemaIndex;

fn sales_snapshot() -> SchemaSnapshot {
    SchemaSnapshot::new(vec![
        TableSchema::new("clientes")
            .with_comment("Clientes registrados en la tienda")
            .with_column(ColumnSchema::new("id", "integer").not_null())
            .with_column(ColumnSchema::new("nombre", "text").with_comment("Nombre completo del cliente"))
            .with_column(ColumnSchema::new("created_at", "timestamp")),
        TableSchema::new("ventas")
            .with_comment("Ventas realizadas")
            .with_column(ColumnSchema::new("id", "integer").not_null())
            .with_column(ColumnSchema::new("cliente_id", "integer").not_null())
            .with_column(ColumnSchema::new("fecha_venta", "date"))
            .with_column(ColumnSchema::new("activo", "boolean"))
            .with_foreign_key("cliente_id", "clientes", "id"),
    ])
    .unwrap()
}

#[test]
fn test_metadata_fields() {
    let index = SchemaIndex::build(&sales_snapshot());
    let ventas = index.table("ventas").unwrap();

    assert_eq!(ventas.columns, vec!["id", "cliente_id", "fecha_venta", "activo"]);
    assert_eq!(ventas.relationships.len(), 1);
    assert_eq!(ventas.relationships["cliente_id"], "clientes");
    assert_eq!(ventas.description, "Ventas realizadas");
}

#[test]
fn test_keywords() {
    let index = SchemaIndex::build(&sales_snapshot());
    let ventas = &index.table("ventas").unwrap().keywords;

    for expected in ["ventas", "venta", "realizadas", "cliente_id", "cliente", "fecha_venta", "fecha"] {
        assert!(ventas.contains(expected), "missing keyword {expected}");
    }
    // stoplisted columns contribute nothing
    assert!(!ventas.contains("activo"));
    assert!(!ventas.contains("id"));

    let clientes = &index.table("clientes").unwrap().keywords;
    assert!(clientes.contains("nombre"));
    assert!(clientes.contains("completo"));
    assert!(!clientes.contains("created_at"));
    assert!(!clientes.contains("created"));
}

#[test]
fn test_inverted_index() {
    let index = SchemaIndex::build(&sales_snapshot());

    let tables: Vec<_> = index.tables_for_keyword("cliente").unwrap().iter().collect();
    assert_eq!(tables, vec!["clientes", "ventas"]);
    assert!(index.tables_for_keyword("unknown").is_none());
    assert!(index.is_consistent());
}

#[test]
fn test_empty_snapshot() {
    let index = SchemaIndex::build(&SchemaSnapshot::default());
    assert!(index.is_empty());
    assert_eq!(index.keyword_count(), 0);
    assert!(index.is_consistent());
}

#[test]
fn test_rebuild_from_same_snapshot_is_identical() {
    let snapshot = sales_snapshot();
    let first = SchemaIndex::build(&snapshot);
    let second = SchemaIndex::build(&snapshot.clone());
    assert_eq!(first, second);
    assert_eq!(snapshot.fingerprint().unwrap(), sales_snapshot().fingerprint().unwrap());
}
