//! The schema keyword index.
//!
//! A [`SchemaIndex`] holds per-table metadata and the inverted keyword map,
//! both derived from exactly one snapshot. The index is immutable: a refresh
//! builds a new one and replaces the old one wholesale.

use std::collections::{BTreeMap, BTreeSet};

use crate::metadata::{SchemaSnapshot, TableSchema};

use super::keywords::table_keywords;

/// Search metadata for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub name: String,
    pub keywords: BTreeSet<String>,
    /// Column names in ordinal order.
    pub columns: Vec<String>,
    /// Local column -> referenced table. Multi-column keys collapse to one
    /// entry per column.
    pub relationships: BTreeMap<String, String>,
    pub description: String,

    // Lowercased copies used by scoring.
    name_lower: String,
    columns_lower: Vec<String>,
    description_lower: String,
}

impl TableMetadata {
    /// Derive search metadata from a snapshot table.
    pub fn from_schema(table: &TableSchema) -> Self {
        let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        let relationships = table
            .foreign_keys
            .iter()
            .map(|fk| (fk.column.clone(), fk.ref_table.clone()))
            .collect();
        let description = table.comment.clone().unwrap_or_default();

        Self {
            name_lower: table.name.to_lowercase(),
            columns_lower: columns.iter().map(|c| c.to_lowercase()).collect(),
            description_lower: description.to_lowercase(),
            name: table.name.clone(),
            keywords: table_keywords(table),
            columns,
            relationships,
            description,
        }
    }

    pub(crate) fn name_lower(&self) -> &str {
        &self.name_lower
    }

    pub(crate) fn has_column(&self, token: &str) -> bool {
        self.columns_lower.iter().any(|c| c == token)
    }

    pub(crate) fn description_lower(&self) -> &str {
        &self.description_lower
    }

    /// Tables referenced through foreign keys, deduplicated.
    pub fn referenced_tables(&self) -> BTreeSet<&str> {
        self.relationships.values().map(String::as_str).collect()
    }
}

/// Table metadata plus the inverted keyword map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaIndex {
    tables: BTreeMap<String, TableMetadata>,
    keywords: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaIndex {
    /// Build an index from a snapshot.
    ///
    /// A pure function of the snapshot: identical snapshots always yield
    /// identical indexes.
    pub fn build(snapshot: &SchemaSnapshot) -> Self {
        let mut index = Self::default();

        for table in snapshot.tables() {
            let metadata = TableMetadata::from_schema(table);
            for keyword in &metadata.keywords {
                index
                    .keywords
                    .entry(keyword.clone())
                    .or_default()
                    .insert(metadata.name.clone());
            }
            index.tables.insert(metadata.name.clone(), metadata);
        }

        debug_assert!(index.is_consistent());
        index
    }

    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// All tables, ordered by name.
    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.values()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Tables carrying `keyword`.
    pub fn tables_for_keyword(&self, keyword: &str) -> Option<&BTreeSet<String>> {
        self.keywords.get(keyword)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Check that the two maps agree with each other.
    ///
    /// Every table named under a keyword exists, and every table's keywords
    /// point back at it.
    pub fn is_consistent(&self) -> bool {
        let keyword_targets_exist = self
            .keywords
            .values()
            .flatten()
            .all(|name| self.tables.contains_key(name));

        let tables_are_indexed = self.tables.values().all(|table| {
            table.keywords.iter().all(|keyword| {
                self.keywords
                    .get(keyword)
                    .is_some_and(|names| names.contains(&table.name))
            })
        });

        keyword_targets_exist && tables_are_indexed
    }
}
