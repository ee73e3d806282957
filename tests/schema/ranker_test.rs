use sqlgate::metadata::{ColumnSchema, SchemaSnapshot, TableSchema};
use sqlgate::schema::{select_relevant_tables, SchemaIndex, NAME_MATCH};

fn store_snapshot() -> SchemaSnapshot {
    SchemaSnapshot::new(vec![
        TableSchema::new("clientes")
            .with_comment("Clientes registrados")
            .with_column(ColumnSchema::new("id", "integer"))
            .with_column(ColumnSchema::new("email", "text")),
        TableSchema::new("ventas")
            .with_comment("Ventas por cliente y producto")
            .with_column(ColumnSchema::new("id", "integer"))
            .with_column(ColumnSchema::new("cliente_id", "integer"))
            .with_column(ColumnSchema::new("producto_id", "integer"))
            .with_column(ColumnSchema::new("total", "numeric"))
            .with_foreign_key("cliente_id", "clientes", "id")
            .with_foreign_key("producto_id", "productos", "id")
            .with_foreign_key("sucursal_id", "sucursales", "id"),
        TableSchema::new("productos")
            .with_column(ColumnSchema::new("id", "integer"))
            .with_column(ColumnSchema::new("precio", "numeric")),
        TableSchema::new("empleados").with_column(ColumnSchema::new("salario", "numeric")),
        TableSchema::new("audit_log").with_column(ColumnSchema::new("payload", "jsonb")),
    ])
    .unwrap()
}

#[test]
fn test_own_name_scores_at_least_name_bonus() {
    let snapshot = store_snapshot();
    let index = SchemaIndex::build(&snapshot);

    for table in snapshot.tables() {
        let selection = select_relevant_tables(&index, &table.name, 5);
        let hit = selection
            .iter()
            .find(|ranked| ranked.name == table.name)
            .unwrap_or_else(|| panic!("{} not selected", table.name));
        assert!(hit.score >= NAME_MATCH, "{} scored {}", table.name, hit.score);
    }
}

#[test]
fn test_selection_is_bounded_and_known() {
    let snapshot = store_snapshot();
    let index = SchemaIndex::build(&snapshot);

    for max in 0..=6 {
        for query in ["ventas por cliente", "precio de productos", "nothing matches", ""] {
            let selection = select_relevant_tables(&index, query, max);
            assert!(selection.len() <= max);
            assert!(selection.iter().all(|t| snapshot.contains(&t.name)));
        }
    }
}

#[test]
fn test_scores_are_descending() {
    let index = SchemaIndex::build(&store_snapshot());
    let selection = select_relevant_tables(&index, "total de ventas por cliente y producto", 5);

    assert_eq!(selection[0].name, "ventas");
    assert!(selection.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_expansion_adds_join_partners() {
    let index = SchemaIndex::build(&store_snapshot());
    let selection = select_relevant_tables(&index, "total", 3);
    let names: Vec<_> = selection.iter().map(|t| t.name.as_str()).collect();

    // "total" is only a column of ventas; its referenced tables follow, the
    // dangling "sucursales" reference is skipped.
    assert_eq!(names, vec!["ventas", "clientes", "productos"]);
}

#[test]
fn test_unmatched_query_falls_back_to_all_tables() {
    let index = SchemaIndex::build(&store_snapshot());
    let selection = select_relevant_tables(&index, "zzz", 10);
    assert_eq!(selection.len(), 5);
    assert!(selection.iter().all(|t| t.score == 0.0));
}

#[test]
fn test_empty_index_selects_nothing() {
    let index = SchemaIndex::build(&SchemaSnapshot::default());
    assert!(select_relevant_tables(&index, "ventas", 5).is_empty());
}
