//! Live PostgreSQL introspection through `information_schema` and `pg_catalog`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::error::{SchemaError, SourceResult};
use super::provider::SchemaSource;
use super::types::*;

const LIST_TABLES: &str = "
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = $1
      AND table_type = 'BASE TABLE'
    ORDER BY table_name";

const LIST_COLUMNS: &str = "
    SELECT column_name::text, data_type::text, is_nullable::text
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position";

const LIST_FOREIGN_KEYS: &str = "
    SELECT
        kcu.column_name::text,
        ccu.table_name::text AS foreign_table_name,
        ccu.column_name::text AS foreign_column_name
    FROM information_schema.table_constraints AS tc
    JOIN information_schema.key_column_usage AS kcu
        ON tc.constraint_name = kcu.constraint_name
       AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage AS ccu
        ON ccu.constraint_name = tc.constraint_name
       AND ccu.table_schema = tc.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY'
      AND tc.table_schema = $1
      AND tc.table_name = $2
    ORDER BY kcu.ordinal_position";

const LIST_COMMENTS: &str = "
    SELECT
        tbl.table_name::text,
        col.column_name::text,
        pg_catalog.col_description(cl.oid, col.ordinal_position::int) AS column_comment,
        pg_catalog.obj_description(cl.oid, 'pg_class') AS table_comment
    FROM information_schema.tables tbl
    JOIN information_schema.columns col
        ON tbl.table_name = col.table_name
       AND tbl.table_schema = col.table_schema
    JOIN pg_catalog.pg_class cl ON cl.relname = tbl.table_name
    JOIN pg_catalog.pg_namespace n ON n.oid = cl.relnamespace
    WHERE tbl.table_schema = $1
      AND tbl.table_type = 'BASE TABLE'
      AND n.nspname = $1
    ORDER BY tbl.table_name, col.ordinal_position";

/// Schema source reading one PostgreSQL schema.
///
/// Table names are always bound as parameters, never interpolated.
#[derive(Debug, Clone)]
pub struct PostgresSchemaSource {
    pool: PgPool,
    schema: String,
}

impl PostgresSchemaSource {
    /// Connect a small pool to `url` and introspect `schema`.
    pub async fn connect(url: &str, schema: impl Into<String>) -> SourceResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await
            .map_err(|e| SchemaError::backend(e.to_string()))?;
        Ok(Self::with_pool(pool, schema))
    }

    /// Use an existing pool.
    pub fn with_pool(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl SchemaSource for PostgresSchemaSource {
    async fn list_tables(&self) -> SourceResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(LIST_TABLES)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SchemaError::backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn get_columns(&self, table: &str) -> SourceResult<Vec<ColumnInfo>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(LIST_COLUMNS)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SchemaError::table(table, e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable)| ColumnInfo {
                name,
                data_type,
                nullable: is_nullable == "YES",
            })
            .collect())
    }

    async fn get_foreign_keys(&self, table: &str) -> SourceResult<Vec<ForeignKeyInfo>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(LIST_FOREIGN_KEYS)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SchemaError::table(table, e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(column, ref_table, ref_column)| ForeignKeyInfo {
                column,
                ref_table,
                ref_column,
            })
            .collect())
    }

    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>> {
        let rows: Vec<(String, String, Option<String>, Option<String>)> =
            sqlx::query_as(LIST_COMMENTS)
                .bind(&self.schema)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| SchemaError::backend(e.to_string()))?;

        let mut comments: HashMap<String, TableComments> = HashMap::new();
        for (table, column, column_comment, table_comment) in rows {
            let entry = comments.entry(table).or_insert_with(|| TableComments {
                table_comment,
                columns: Default::default(),
            });
            if let Some(comment) = column_comment {
                entry.columns.insert(column, comment);
            }
        }

        Ok(comments)
    }
}
