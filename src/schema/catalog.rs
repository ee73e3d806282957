//! The published schema and its refresh cycle.
//!
//! ```text
//!   refresh_schema()                      readers
//!   ─────────────────                     ───────
//!   source.snapshot()  (timeout-bounded)  current() ──► Arc<PublishedSchema>
//!         │                                  ▲           │ index
//!         ▼                                  │           │ snapshot
//!   SchemaIndex::build()                     │           │ fingerprint
//!         │                                  │           │ generation
//!         ▼                                  │
//!   swap Arc under write lock ───────────────┘
//! ```
//!
//! A rebuild happens entirely off to the side. Readers clone the `Arc` and
//! never hold the lock while ranking or rendering, so they always see one
//! complete index together with the snapshot it came from.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::metadata::{snapshot_with_timeout, SchemaSnapshot, SchemaSource, SourceResult};

use super::context::{ContextFormatter, DEFAULT_MAX_CONTEXT_CHARS};
use super::index::SchemaIndex;
use super::ranker::{RankedTable, RelevanceRanker};

/// Default bound on one schema extraction.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of tables rendered into a schema context.
pub const DEFAULT_MAX_TABLES: usize = 5;

/// One immutable generation of the schema.
#[derive(Debug)]
pub struct PublishedSchema {
    pub index: SchemaIndex,
    pub snapshot: SchemaSnapshot,
    pub fingerprint: String,
    /// Zero for the empty catalog; incremented by every successful refresh.
    pub generation: u64,
}

impl PublishedSchema {
    fn empty() -> Self {
        let snapshot = SchemaSnapshot::default();
        Self {
            index: SchemaIndex::build(&snapshot),
            fingerprint: snapshot.fingerprint().unwrap_or_default(),
            snapshot,
            generation: 0,
        }
    }
}

/// Owns a schema source and the schema currently published from it.
pub struct SchemaCatalog {
    source: Arc<dyn SchemaSource>,
    published: RwLock<Arc<PublishedSchema>>,
    refresh_lock: Mutex<()>,
    extraction_timeout: Duration,
    max_tables: usize,
    formatter: ContextFormatter,
}

impl SchemaCatalog {
    /// Create a catalog that publishes no tables until the first refresh.
    pub fn empty(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            published: RwLock::new(Arc::new(PublishedSchema::empty())),
            refresh_lock: Mutex::new(()),
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            max_tables: DEFAULT_MAX_TABLES,
            formatter: ContextFormatter::new(DEFAULT_MAX_CONTEXT_CHARS),
        }
    }

    /// Create a catalog and run the initial refresh.
    pub async fn connect(source: Arc<dyn SchemaSource>) -> SourceResult<Self> {
        let catalog = Self::empty(source);
        catalog.refresh_schema().await?;
        Ok(catalog)
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    pub fn with_max_tables(mut self, max_tables: usize) -> Self {
        self.max_tables = max_tables;
        self
    }

    pub fn with_max_context_chars(mut self, max_chars: usize) -> Self {
        self.formatter = ContextFormatter::new(max_chars);
        self
    }

    pub fn max_tables(&self) -> usize {
        self.max_tables
    }

    /// The schema readers currently see.
    pub fn current(&self) -> Arc<PublishedSchema> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Extract a fresh snapshot, index it and publish it.
    ///
    /// Refreshes are serialized. On failure or timeout the previously
    /// published schema stays in place.
    pub async fn refresh_schema(&self) -> SourceResult<()> {
        let _guard = self.refresh_lock.lock().await;

        let previous = self.current().generation;
        match self.rebuild(previous + 1).await {
            Ok(published) => {
                info!(
                    generation = published.generation,
                    tables = published.index.table_count(),
                    keywords = published.index.keyword_count(),
                    fingerprint = %published.fingerprint,
                    "schema index published"
                );
                *self
                    .published
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Arc::new(published);
                Ok(())
            }
            Err(err) => {
                error!(
                    error = %err,
                    generation = previous,
                    "schema refresh failed, keeping published index"
                );
                Err(err)
            }
        }
    }

    async fn rebuild(&self, generation: u64) -> SourceResult<PublishedSchema> {
        let snapshot = snapshot_with_timeout(self.source.as_ref(), self.extraction_timeout).await?;

        let fingerprint = snapshot.fingerprint()?;
        let index = SchemaIndex::build(&snapshot);

        Ok(PublishedSchema {
            index,
            snapshot,
            fingerprint,
            generation,
        })
    }

    /// Rank tables of the current schema against `query`.
    pub fn select_relevant_tables(&self, query: &str, max_tables: usize) -> Vec<RankedTable> {
        let published = self.current();
        RelevanceRanker::new(&published.index).select(query, max_tables)
    }

    /// Render the tables relevant to `query` as prompt context.
    ///
    /// Ranking and rendering use the same published generation.
    pub fn build_schema_context(&self, query: &str) -> String {
        let published = self.current();
        let selection = RelevanceRanker::new(&published.index).select(query, self.max_tables);
        self.formatter.render(&selection, &published.snapshot)
    }
}
