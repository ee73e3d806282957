//! The service facade.
//!
//! [`SqlGate`] is built once at process start and handed to whatever serves
//! requests. It holds no global state; every operation goes through the
//! handle.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ConnectionSettings, Driver, Settings, SettingsError};
use crate::cost::{estimate_cost, CostLevel};
use crate::error::Result;
use crate::metadata::{SchemaSource, SourceResult, StaticSchemaSource};
use crate::schema::{RankedTable, SchemaCatalog};
use crate::validation::{
    SanitizeError, SqlSanitizer, SqlValidator, ValidationReport, Verdict, DEFAULT_LIMIT,
};

/// Schema retrieval plus the SQL safety gate.
pub struct SqlGate {
    catalog: SchemaCatalog,
    validator: SqlValidator,
    default_limit: u64,
}

impl SqlGate {
    pub fn new(catalog: SchemaCatalog, validator: SqlValidator) -> Self {
        Self {
            catalog,
            validator,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Build a service over `source` configured by `settings` and load the
    /// initial schema.
    pub async fn connect(source: Arc<dyn SchemaSource>, settings: &Settings) -> SourceResult<Self> {
        let gate = Self::unloaded(source, settings);
        gate.refresh_schema().await?;
        Ok(gate)
    }

    /// Build a service whose schema stays empty until the first refresh.
    pub fn unloaded(source: Arc<dyn SchemaSource>, settings: &Settings) -> Self {
        let catalog = SchemaCatalog::empty(source)
            .with_extraction_timeout(settings.schema.extraction_timeout())
            .with_max_tables(settings.retrieval.max_tables)
            .with_max_context_chars(settings.retrieval.max_context_chars);
        let validator = SqlValidator::new(settings.validation.validator_options());

        Self::new(catalog, validator).with_default_limit(settings.validation.default_limit)
    }

    /// Open the named connection (or the default one, or the `DB_*`
    /// environment when none is configured) and load its schema.
    pub async fn from_settings(settings: &Settings, connection: Option<&str>) -> Result<Self> {
        let (name, connection) = settings.resolve_connection(connection)?;

        info!(connection = %name, driver = %connection.driver, "opening schema source");
        let source = open_source(settings, &connection).await?;
        Ok(Self::connect(source, settings).await?)
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn validator(&self) -> &SqlValidator {
        &self.validator
    }

    /// Re-extract the schema and publish a new index.
    ///
    /// On failure the previously published index keeps serving.
    pub async fn refresh_schema(&self) -> SourceResult<()> {
        self.catalog.refresh_schema().await
    }

    pub fn select_relevant_tables(&self, query: &str, max_tables: usize) -> Vec<RankedTable> {
        self.catalog.select_relevant_tables(query, max_tables)
    }

    pub fn build_schema_context(&self, query: &str) -> String {
        self.catalog.build_schema_context(query)
    }

    pub fn validate_sql(&self, sql: &str) -> Verdict {
        self.validator.validate(sql)
    }

    pub fn validate_sql_with_max_length(&self, sql: &str, max_length: usize) -> Verdict {
        self.validator.validate_with_max(sql, max_length)
    }

    /// Sanitize with the configured default limit.
    pub fn sanitize_sql(&self, sql: &str) -> std::result::Result<String, SanitizeError> {
        self.sanitize_sql_with_limit(sql, self.default_limit)
    }

    pub fn sanitize_sql_with_limit(
        &self,
        sql: &str,
        default_limit: u64,
    ) -> std::result::Result<String, SanitizeError> {
        SqlSanitizer::new(&self.validator)
            .with_limit(default_limit)
            .sanitize(sql)
    }

    pub fn get_validation_report(&self, sql: &str) -> ValidationReport {
        self.validator.report(sql)
    }

    pub fn estimate_cost(&self, sql: &str) -> CostLevel {
        estimate_cost(sql)
    }
}

/// Build the schema source a connection describes.
pub async fn open_source(
    settings: &Settings,
    connection: &ConnectionSettings,
) -> Result<Arc<dyn SchemaSource>> {
    match connection.driver_type()? {
        Driver::Snapshot => {
            let path = connection.resolved_connection_string()?;
            Ok(Arc::new(StaticSchemaSource::from_json_file(path)?))
        }
        Driver::Postgres => open_postgres(settings, connection).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(
    settings: &Settings,
    connection: &ConnectionSettings,
) -> Result<Arc<dyn SchemaSource>> {
    use crate::metadata::{FallbackSchemaSource, PostgresSchemaSource};

    let url = connection.resolved_connection_string()?;
    let schema = settings.schema_for(connection).to_string();
    let fallback = connection
        .resolved_fallback_snapshot()?
        .map(StaticSchemaSource::from_json_file)
        .transpose()?;

    let primary = match PostgresSchemaSource::connect(&url, schema).await {
        Ok(primary) => primary,
        Err(err) => match fallback {
            Some(fallback) => {
                warn!(error = %err, "database unreachable, serving the fallback snapshot");
                return Ok(Arc::new(fallback));
            }
            None => return Err(err.into()),
        },
    };

    Ok(match fallback {
        Some(fallback) => Arc::new(FallbackSchemaSource::new(primary, fallback)),
        None => Arc::new(primary),
    })
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(
    _settings: &Settings,
    connection: &ConnectionSettings,
) -> Result<Arc<dyn SchemaSource>> {
    match connection.resolved_fallback_snapshot()? {
        Some(path) => {
            warn!("built without the `postgres` feature, serving the fallback snapshot");
            Ok(Arc::new(StaticSchemaSource::from_json_file(path)?))
        }
        None => Err(SettingsError::UnsupportedDriver(format!(
            "{} (built without the `postgres` feature)",
            connection.driver
        ))
        .into()),
    }
}
