//! Schema snapshot types.
//!
//! The `*Info` types mirror the shape of the individual `SchemaSource`
//! calls. `TableSchema` and `SchemaSnapshot` are the assembled, merged view.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::{SchemaError, SourceResult};
use super::hash::compute_hash;

/// A column as reported by `SchemaSource::get_columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

/// A foreign-key edge as reported by `SchemaSource::get_foreign_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    /// Local column.
    pub column: String,
    /// Referenced table.
    pub ref_table: String,
    /// Referenced column.
    pub ref_column: String,
}

/// Table and column comments for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableComments {
    #[serde(default)]
    pub table_comment: Option<String>,
    /// Column name -> comment.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

/// A column with its comment merged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnSchema {
    /// Create a nullable column without a comment.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            comment: None,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = non_empty(Some(comment.into()));
        self
    }
}

/// Everything known about one table at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Assemble a table from the raw results of the individual source calls.
    pub fn assemble(
        name: impl Into<String>,
        columns: Vec<ColumnInfo>,
        foreign_keys: Vec<ForeignKeyInfo>,
        comments: Option<&TableComments>,
    ) -> Self {
        let columns = columns
            .into_iter()
            .map(|col| {
                let comment = comments.and_then(|c| c.columns.get(&col.name).cloned());
                ColumnSchema {
                    comment: non_empty(comment),
                    name: col.name,
                    data_type: col.data_type,
                    nullable: col.nullable,
                }
            })
            .collect();

        Self {
            name: name.into(),
            comment: non_empty(comments.and_then(|c| c.table_comment.clone())),
            columns,
            foreign_keys,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = non_empty(Some(comment.into()));
        self
    }

    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyInfo {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        });
        self
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A point-in-time extraction of the database schema.
///
/// Table names are unique; construction through [`SchemaSnapshot::new`] or
/// deserialization rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr")]
pub struct SchemaSnapshot {
    tables: Vec<TableSchema>,
}

#[derive(Deserialize)]
struct SnapshotRepr {
    #[serde(default)]
    tables: Vec<TableSchema>,
}

impl TryFrom<SnapshotRepr> for SchemaSnapshot {
    type Error = SchemaError;

    fn try_from(repr: SnapshotRepr) -> Result<Self, Self::Error> {
        Self::new(repr.tables)
    }
}

impl SchemaSnapshot {
    /// Create a snapshot, rejecting duplicate table names.
    pub fn new(tables: Vec<TableSchema>) -> SourceResult<Self> {
        let mut seen = HashSet::with_capacity(tables.len());
        for table in &tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::Malformed(format!(
                    "duplicate table name '{}'",
                    table.name
                )));
            }
        }
        Ok(Self { tables })
    }

    /// Parse a snapshot from its JSON form.
    pub fn from_json(json: &str) -> SourceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Tables in extraction order.
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Content hash of the snapshot. Identical snapshots share a fingerprint.
    pub fn fingerprint(&self) -> SourceResult<String> {
        Ok(compute_hash(self)?)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
