//! A schema source backed by a fixed snapshot.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;

use super::error::{SchemaError, SourceResult};
use super::provider::SchemaSource;
use super::types::*;

/// Serves a snapshot held in memory.
///
/// Used for offline operation (a JSON dump of a production schema) and as the
/// fallback half of a [`FallbackSchemaSource`](super::FallbackSchemaSource).
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaSource {
    snapshot: SchemaSnapshot,
}

impl StaticSchemaSource {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::new(SchemaSnapshot::from_json(&content)?))
    }

    fn require(&self, table: &str) -> SourceResult<&TableSchema> {
        self.snapshot
            .table(table)
            .ok_or_else(|| SchemaError::table(table, "table not found in snapshot"))
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn list_tables(&self) -> SourceResult<Vec<String>> {
        Ok(self
            .snapshot
            .tables()
            .iter()
            .map(|t| t.name.clone())
            .collect())
    }

    async fn get_columns(&self, table: &str) -> SourceResult<Vec<ColumnInfo>> {
        Ok(self
            .require(table)?
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
                nullable: c.nullable,
            })
            .collect())
    }

    async fn get_foreign_keys(&self, table: &str) -> SourceResult<Vec<ForeignKeyInfo>> {
        Ok(self.require(table)?.foreign_keys.clone())
    }

    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>> {
        Ok(self
            .snapshot
            .tables()
            .iter()
            .map(|t| {
                let columns = t
                    .columns
                    .iter()
                    .filter_map(|c| c.comment.clone().map(|comment| (c.name.clone(), comment)))
                    .collect();
                (
                    t.name.clone(),
                    TableComments {
                        table_comment: t.comment.clone(),
                        columns,
                    },
                )
            })
            .collect())
    }

    async fn snapshot(&self) -> SourceResult<SchemaSnapshot> {
        Ok(self.snapshot.clone())
    }
}
