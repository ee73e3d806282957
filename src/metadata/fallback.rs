//! Primary/fallback composition of schema sources.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use super::error::SourceResult;
use super::provider::SchemaSource;
use super::types::*;

/// Tries a primary source and re-invokes a fallback when it fails.
///
/// Typical use is a live database as primary and a JSON snapshot as
/// fallback, so a service can still start (with a possibly stale schema)
/// while the database is unreachable.
///
/// `snapshot()` falls back as a whole: the result is either entirely from the
/// primary or entirely from the fallback, never a mix of the two.
pub struct FallbackSchemaSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P: SchemaSource, F: SchemaSource> FallbackSchemaSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

macro_rules! with_fallback {
    ($self:ident, $op:literal, $call:ident ( $($arg:expr),* )) => {
        match $self.primary.$call($($arg),*).await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(operation = $op, error = %err, "primary schema source failed, using fallback");
                $self.fallback.$call($($arg),*).await
            }
        }
    };
}

#[async_trait]
impl<P: SchemaSource, F: SchemaSource> SchemaSource for FallbackSchemaSource<P, F> {
    async fn list_tables(&self) -> SourceResult<Vec<String>> {
        with_fallback!(self, "list_tables", list_tables())
    }

    async fn get_columns(&self, table: &str) -> SourceResult<Vec<ColumnInfo>> {
        with_fallback!(self, "get_columns", get_columns(table))
    }

    async fn get_foreign_keys(&self, table: &str) -> SourceResult<Vec<ForeignKeyInfo>> {
        with_fallback!(self, "get_foreign_keys", get_foreign_keys(table))
    }

    async fn get_comments(&self) -> SourceResult<HashMap<String, TableComments>> {
        with_fallback!(self, "get_comments", get_comments())
    }

    async fn snapshot(&self) -> SourceResult<SchemaSnapshot> {
        with_fallback!(self, "snapshot", snapshot())
    }
}
