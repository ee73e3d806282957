//! # sqlgate
//!
//! Schema-relevance retrieval and a SQL safety gate for natural-language to
//! SQL pipelines.
//!
//! ## Architecture
//!
//! Two independent flows share one service handle:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         SchemaSource (PostgreSQL / JSON snapshot)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [refresh_schema]
//! ┌─────────────────────────────────────────────────────────┐
//! │     SchemaIndex (table metadata + keyword index)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [select_relevant_tables]
//! ┌─────────────────────────────────────────────────────────┐
//! │     RelevanceRanker ──► ContextFormatter ──► prompt      │
//! └─────────────────────────────────────────────────────────┘
//!
//!   generated SQL
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  SqlValidator ──► SqlSanitizer ──► CostEstimator          │
//! └─────────────────────────────────────────────────────────┘
//!          │
//!          ▼
//!     executor
//! ```
//!
//! LLM calls, execution and HTTP routing live outside this crate.

pub mod config;
pub mod cost;
pub mod error;
pub mod metadata;
pub mod schema;
pub mod service;
pub mod validation;

pub use error::{Error, Result};
pub use service::SqlGate;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::cost::{estimate_cost, CostLevel};
    pub use crate::metadata::{SchemaSnapshot, SchemaSource, StaticSchemaSource};
    pub use crate::schema::{RankedTable, SchemaCatalog};
    pub use crate::validation::{
        Rejection, Rule, SanitizeError, SqlValidator, ValidationReport, Verdict,
    };
    pub use crate::SqlGate;
}
