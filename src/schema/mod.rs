//! Schema relevance retrieval.
//!
//! Turns a schema snapshot into a keyword index, ranks tables against a
//! natural-language question and renders the chosen tables as bounded prompt
//! context.
//!
//! # Architecture
//!
//! ```text
//! SchemaSnapshot ──► SchemaIndex::build ──► PublishedSchema (Arc, swapped on refresh)
//!                                                │
//!   "ventas por cliente" ──► tokenize_query      │
//!                                 │              ▼
//!                                 └──► RelevanceRanker::select ──► Vec<RankedTable>
//!                                                                     │
//!                                              ContextFormatter::render ◄┘
//!                                                     │
//!                                                     ▼
//!                                       "RELEVANT DATABASE SCHEMA ..."
//! ```
//!
//! Everything except [`SchemaCatalog::refresh_schema`] is a pure function of
//! one published generation and is safe to call from many tasks at once.

mod catalog;
mod context;
mod index;
mod keywords;
mod ranker;

pub use catalog::{
    PublishedSchema, SchemaCatalog, DEFAULT_EXTRACTION_TIMEOUT, DEFAULT_MAX_TABLES,
};
pub use context::{format_table, ContextFormatter, DEFAULT_MAX_CONTEXT_CHARS, NO_RELEVANT_TABLES};
pub use index::{SchemaIndex, TableMetadata};
pub use keywords::{table_keywords, tokenize_query, SKIPPED_COLUMNS, STOPWORDS};
pub use ranker::{
    score_table, select_relevant_tables, RankedTable, RelevanceRanker, COLUMN_MATCH,
    DESCRIPTION_MATCH, KEYWORD_MATCH, NAME_MATCH,
};
