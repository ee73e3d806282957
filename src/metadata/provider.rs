//! SchemaSource trait definition.
//!
//! The trait abstracts over the places a schema can come from: a live
//! PostgreSQL catalog, a JSON snapshot on disk, or a composition of both.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use super::error::{SchemaError, SourceResult};
use super::types::*;

/// Trait for extracting raw schema metadata.
///
/// Implementations may block on network or database I/O. Any failure is
/// reported as a [`SchemaError`](super::SchemaError); callers never see a
/// partially assembled snapshot.
///
/// # Example
///
/// ```ignore
/// use sqlgate::metadata::SchemaSource;
///
/// async fn describe(source: &dyn SchemaSource) -> SourceResult<()> {
///     for table in source.list_tables().await? {
///         let columns = source.get_columns(&table).await?;
///         println!("{table}: {} columns", columns.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// List all base tables, in a stable order.
    async fn list_tables(&self) -> SourceResult<Vec<String>>;

    /// Get the column definitions of a table, in ordinal order.
    async fn get_columns(&self, table: &str) -> SourceResult<Vec<ColumnInfo>>;

    /// Get the foreign-key edges leaving a table.
    async fn get_foreign_keys(&self, table: &str) -> SourceResult<Vec<ForeignKeyInfo>>;

    /// Get table and column comments for every table.
    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>>;

    /// Assemble a complete snapshot.
    ///
    /// Default implementation lists the tables, then fetches columns and
    /// foreign keys for every table concurrently. The first failure aborts the
    /// whole extraction.
    async fn snapshot(&self) -> SourceResult<SchemaSnapshot> {
        let names = self.list_tables().await?;
        let comments = self.get_comments().await?;

        let fetches: Vec<_> = names
            .iter()
            .map(|name| async move {
                let columns = self.get_columns(name).await?;
                let foreign_keys = self.get_foreign_keys(name).await?;
                SourceResult::Ok((columns, foreign_keys))
            })
            .collect();

        let results = join_all(fetches).await;

        let mut tables = Vec::with_capacity(names.len());
        for (name, result) in names.iter().zip(results) {
            let (columns, foreign_keys) = result?;
            tables.push(TableSchema::assemble(
                name.as_str(),
                columns,
                foreign_keys,
                comments.get(name),
            ));
        }

        SchemaSnapshot::new(tables)
    }
}

/// Assemble a snapshot from `source`, giving up after `timeout`.
pub async fn snapshot_with_timeout(
    source: &dyn SchemaSource,
    timeout: Duration,
) -> SourceResult<SchemaSnapshot> {
    tokio::time::timeout(timeout, source.snapshot())
        .await
        .map_err(|_| SchemaError::Timeout(timeout.as_secs()))?
}
