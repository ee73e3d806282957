//! Schema metadata extraction.
//!
//! This module defines the `SchemaSource` collaborator contract and the
//! snapshot types it produces. A snapshot is a point-in-time view of tables,
//! columns, foreign keys and comments; everything downstream (keyword index,
//! relevance ranking, context rendering) is a pure function of one snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SchemaSource                             │
//! │  - list_tables()          - get_foreign_keys(table)             │
//! │  - get_columns(table)     - get_comments()                      │
//! │  - snapshot()  (provided: assembles the four calls above)       │
//! └─────────────────────────────────────────────────────────────────┘
//!        ▲                      ▲                        ▲
//!        │                      │                        │
//! ┌──────────────┐   ┌─────────────────────┐   ┌──────────────────────┐
//! │ StaticSchema │   │ PostgresSchema      │   │ FallbackSchemaSource │
//! │ Source (JSON)│   │ Source (feature)    │   │ (primary → fallback) │
//! └──────────────┘   └─────────────────────┘   └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sqlgate::metadata::{SchemaSource, StaticSchemaSource};
//!
//! let source = StaticSchemaSource::from_json_file("schema.json")?;
//! let snapshot = source.snapshot().await?;
//! println!("{} tables, fingerprint {}", snapshot.len(), snapshot.fingerprint()?);
//! ```

mod error;
mod fallback;
mod hash;
#[cfg(feature = "postgres")]
mod postgres;
mod provider;
mod static_source;
mod types;

pub use error::{SchemaError, SourceResult};
pub use fallback::FallbackSchemaSource;
pub use hash::compute_hash;
#[cfg(feature = "postgres")]
pub use postgres::PostgresSchemaSource;
pub use provider::{snapshot_with_timeout, SchemaSource};
pub use static_source::StaticSchemaSource;
pub use types::*;
