use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlgate::metadata::{
    snapshot_with_timeout, ColumnInfo, ColumnSchema, ForeignKeyInfo, SchemaError, SchemaSnapshot,
    SchemaSource, SourceResult, StaticSchemaSource, TableComments, TableSchema,
};
use sqlgate::schema::SchemaCatalog;

fn snapshot(prefix: &str, count: usize) -> SchemaSnapshot {
    let tables = (0..count)
        .map(|i| {
            TableSchema::new(format!("{prefix}_{i}"))
                .with_comment(format!("shared records {prefix}"))
                .with_column(ColumnSchema::new("shared_value", "integer"))
        })
        .collect();
    SchemaSnapshot::new(tables).unwrap()
}

/// Alternates between two snapshots and can be switched to failing.
struct FlakySource {
    calls: AtomicUsize,
    failing: AtomicBool,
    even: StaticSchemaSource,
    odd: StaticSchemaSource,
}

impl FlakySource {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            even: StaticSchemaSource::new(snapshot("alpha", 4)),
            odd: StaticSchemaSource::new(snapshot("beta", 7)),
        }
    }

    fn current(&self) -> SourceResult<&StaticSchemaSource> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SchemaError::backend("connection refused"));
        }
        Ok(if self.calls.load(Ordering::SeqCst) % 2 == 0 {
            &self.even
        } else {
            &self.odd
        })
    }
}

#[async_trait]
impl SchemaSource for FlakySource {
    async fn list_tables(&self) -> SourceResult<Vec<String>> {
        self.current()?.list_tables().await
    }

    async fn get_columns(&self, table: &str) -> SourceResult<Vec<ColumnInfo>> {
        self.current()?.get_columns(table).await
    }

    async fn get_foreign_keys(&self, table: &str) -> SourceResult<Vec<ForeignKeyInfo>> {
        self.current()?.get_foreign_keys(table).await
    }

    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>> {
        self.current()?.get_comments().await
    }

    async fn snapshot(&self) -> SourceResult<SchemaSnapshot> {
        let snapshot = self.current()?.snapshot().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        snapshot
    }
}

struct SlowSource;

#[async_trait]
impl SchemaSource for SlowSource {
    async fn list_tables(&self) -> SourceResult<Vec<String>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn get_columns(&self, _table: &str) -> SourceResult<Vec<ColumnInfo>> {
        Ok(Vec::new())
    }

    async fn get_foreign_keys(&self, _table: &str) -> SourceResult<Vec<ForeignKeyInfo>> {
        Ok(Vec::new())
    }

    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>> {
        Ok(HashMap::new())
    }
}

#[tokio::test]
async fn test_failed_refresh_keeps_published_index() {
    let source = Arc::new(FlakySource::new());
    let catalog = SchemaCatalog::connect(source.clone()).await.unwrap();
    let before = catalog.current();
    assert_eq!(before.generation, 1);
    assert_eq!(before.index.table_count(), 4);

    source.failing.store(true, Ordering::SeqCst);
    let err = catalog.refresh_schema().await.unwrap_err();
    assert!(err.is_retriable());

    let after = catalog.current();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(catalog.select_relevant_tables("alpha_0", 1)[0].name, "alpha_0");
}

#[tokio::test]
async fn test_extraction_timeout_keeps_published_index() {
    let catalog = SchemaCatalog::empty(Arc::new(SlowSource))
        .with_extraction_timeout(Duration::from_millis(50));

    let err = catalog.refresh_schema().await.unwrap_err();
    assert!(matches!(err, SchemaError::Timeout(_)));
    assert_eq!(catalog.current().generation, 0);
    assert!(catalog.current().index.is_empty());
}

#[tokio::test]
async fn test_snapshot_with_timeout() {
    let err = snapshot_with_timeout(&SlowSource, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaError::Timeout(_)));

    let source = StaticSchemaSource::new(snapshot("alpha", 2));
    let taken = snapshot_with_timeout(&source, Duration::from_secs(5)).await.unwrap();
    assert_eq!(taken.len(), 2);
}

#[tokio::test]
async fn test_context_uses_published_snapshot() {
    let catalog = SchemaCatalog::connect(Arc::new(FlakySource::new()))
        .await
        .unwrap()
        .with_max_tables(2);

    let context = catalog.build_schema_context("alpha_1");
    assert!(context.starts_with("RELEVANT DATABASE SCHEMA (ALL COLUMNS):"));
    assert!(context.contains("--- Table: alpha_1 ---"));
    assert!(context.contains("Description: shared records alpha"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_one_generation_during_refresh() {
    let catalog = Arc::new(SchemaCatalog::connect(Arc::new(FlakySource::new())).await.unwrap());

    let writer = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                catalog.refresh_schema().await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let catalog = catalog.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let published = catalog.current();
                    assert!(published.index.is_consistent());

                    let selection = catalog.select_relevant_tables("shared records", 20);
                    assert!(!selection.is_empty());
                    let alpha = selection.iter().all(|t| t.name.starts_with("alpha_"));
                    let beta = selection.iter().all(|t| t.name.starts_with("beta_"));
                    assert!(alpha || beta, "mixed generations: {selection:?}");
                    assert!(selection.len() == 4 || selection.len() == 7);

                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(catalog.current().generation, 51);
}
