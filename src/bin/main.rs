//! sqlgate CLI - schema retrieval and SQL safety checks
//!
//! Usage:
//!   sqlgate validate [SQL] [--max-length <n>]
//!   sqlgate sanitize [SQL] [--limit <n>]
//!   sqlgate report [SQL]
//!   sqlgate cost [SQL]
//!   sqlgate rank <question> (--snapshot <file> | --connection <name>) [--max-tables <n>]
//!   sqlgate context <question> (--snapshot <file> | --connection <name>)
//!   sqlgate snapshot [--connection <name>]
//!
//! SQL is read from stdin when the argument is omitted.
//!
//! Examples:
//!   sqlgate validate "SELECT * FROM orders"
//!   echo "SELECT * FROM orders" | sqlgate sanitize --limit 100
//!   sqlgate rank "ventas por cliente" --snapshot schema.json

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlgate::config::{ConnectionSettings, Settings, SettingsError};
use sqlgate::metadata::{snapshot_with_timeout, SchemaError, SchemaSource, StaticSchemaSource};
use sqlgate::service::open_source;
use sqlgate::validation::SqlDialect;
use sqlgate::SqlGate;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(about = "sqlgate - schema retrieval and SQL safety gate for generated SQL")]
#[command(version)]
struct Cli {
    /// Path to a sqlgate.toml (defaults to the usual search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Allow only plain queries and allow-listed functions
    #[arg(long, global = true)]
    strict: bool,

    /// SQL dialect for the syntax check
    #[arg(long, global = true)]
    dialect: Option<DialectArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a SQL statement
    Validate {
        /// SQL text (read from stdin if omitted)
        sql: Option<String>,

        /// Maximum length in characters
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Validate a SQL statement and bound its row count
    Sanitize {
        /// SQL text (read from stdin if omitted)
        sql: Option<String>,

        /// LIMIT appended when none is present
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Print a JSON validation report
    Report {
        /// SQL text (read from stdin if omitted)
        sql: Option<String>,
    },

    /// Classify the cost of a SQL statement
    Cost {
        /// SQL text (read from stdin if omitted)
        sql: Option<String>,
    },

    /// Rank tables relevant to a question
    Rank {
        /// Natural-language question
        question: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of tables
        #[arg(short, long)]
        max_tables: Option<usize>,
    },

    /// Render the schema context for a question
    Context {
        /// Natural-language question
        question: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Dump a connection's schema snapshot as JSON
    Snapshot {
        /// Named connection from the config file
        #[arg(short, long)]
        connection: Option<String>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// JSON schema snapshot
    #[arg(short, long, conflicts_with = "connection")]
    snapshot: Option<PathBuf>,

    /// Named connection from the config file
    #[arg(short, long)]
    connection: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Generic,
    Mysql,
    Tsql,
    Duckdb,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for SqlDialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => SqlDialect::Postgres,
            DialectArg::Generic => SqlDialect::Generic,
            DialectArg::Mysql => SqlDialect::MySql,
            DialectArg::Tsql => SqlDialect::TSql,
            DialectArg::Duckdb => SqlDialect::DuckDb,
            DialectArg::Snowflake => SqlDialect::Snowflake,
            DialectArg::Sqlite => SqlDialect::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.logging.level);

    match cli.command {
        Commands::Validate { sql, max_length } => cmd_validate(&settings, sql, max_length),
        Commands::Sanitize { sql, limit } => cmd_sanitize(&settings, sql, limit),
        Commands::Report { sql } => cmd_report(&settings, sql),
        Commands::Cost { sql } => cmd_cost(&settings, sql),
        Commands::Rank {
            question,
            source,
            max_tables,
        } => cmd_rank(&settings, &question, source, max_tables).await,
        Commands::Context { question, source } => cmd_context(&settings, &question, source).await,
        Commands::Snapshot { connection } => cmd_snapshot(&settings, connection).await,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, SettingsError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if cli.strict {
        settings.validation.strict_mode = true;
    }
    if let Some(dialect) = &cli.dialect {
        settings.validation.dialect = dialect.clone().into();
    }
    Ok(settings)
}

/// A service without a schema, for the SQL-only commands.
fn sql_only(settings: &Settings) -> SqlGate {
    SqlGate::unloaded(Arc::new(StaticSchemaSource::default()), settings)
}

fn read_sql(sql: Option<String>) -> Result<String, io::Error> {
    match sql {
        Some(sql) => Ok(sql),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

macro_rules! read_sql_or_exit {
    ($sql:expr) => {
        match read_sql($sql) {
            Ok(sql) => sql,
            Err(e) => {
                eprintln!("Error reading SQL from stdin: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };
}

fn cmd_validate(settings: &Settings, sql: Option<String>, max_length: Option<usize>) -> ExitCode {
    let sql = read_sql_or_exit!(sql);
    let gate = sql_only(settings);

    let verdict = match max_length {
        Some(max) => gate.validate_sql_with_max_length(&sql, max),
        None => gate.validate_sql(&sql),
    };

    match verdict {
        Ok(()) => {
            println!("OK: query accepted");
            ExitCode::SUCCESS
        }
        Err(rejection) => {
            eprintln!("Rejected [{}]: {}", rejection.rule, rejection);
            ExitCode::FAILURE
        }
    }
}

fn cmd_sanitize(settings: &Settings, sql: Option<String>, limit: Option<u64>) -> ExitCode {
    let sql = read_sql_or_exit!(sql);
    let gate = sql_only(settings);

    let result = match limit {
        Some(limit) => gate.sanitize_sql_with_limit(&sql, limit),
        None => gate.sanitize_sql(&sql),
    };

    match result {
        Ok(sanitized) => {
            println!("{}", sanitized);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Sanitization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_report(settings: &Settings, sql: Option<String>) -> ExitCode {
    let sql = read_sql_or_exit!(sql);
    let report = sql_only(settings).get_validation_report(&sql);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            if report.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error encoding report: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_cost(settings: &Settings, sql: Option<String>) -> ExitCode {
    let sql = read_sql_or_exit!(sql);
    println!("{}", sql_only(settings).estimate_cost(&sql));
    ExitCode::SUCCESS
}

async fn open_gate(settings: &Settings, source: SourceArgs) -> Result<SqlGate, sqlgate::Error> {
    match (source.snapshot, source.connection) {
        (Some(path), _) => {
            let source: Arc<dyn SchemaSource> = Arc::new(StaticSchemaSource::from_json_file(path)?);
            Ok(SqlGate::connect(source, settings).await?)
        }
        (None, connection) => SqlGate::from_settings(settings, connection.as_deref()).await,
    }
}

async fn cmd_rank(
    settings: &Settings,
    question: &str,
    source: SourceArgs,
    max_tables: Option<usize>,
) -> ExitCode {
    let gate = match open_gate(settings, source).await {
        Ok(gate) => gate,
        Err(e) => {
            eprintln!("Error loading schema: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let max_tables = max_tables.unwrap_or(settings.retrieval.max_tables);
    let selection = gate.select_relevant_tables(question, max_tables);

    if selection.is_empty() {
        println!("No relevant tables found.");
    }
    for table in &selection {
        println!("{:>6.1}  {}", table.score, table.name);
    }
    ExitCode::SUCCESS
}

async fn cmd_context(settings: &Settings, question: &str, source: SourceArgs) -> ExitCode {
    match open_gate(settings, source).await {
        Ok(gate) => {
            println!("{}", gate.build_schema_context(question));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error loading schema: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_snapshot(settings: &Settings, connection: Option<String>) -> ExitCode {
    let connection = match settings.resolve_connection(connection.as_deref()) {
        Ok((_, connection)) => connection,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match dump_snapshot(settings, &connection).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error extracting schema: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dump_snapshot(
    settings: &Settings,
    connection: &ConnectionSettings,
) -> Result<String, sqlgate::Error> {
    let source = open_source(settings, connection).await?;
    let snapshot =
        snapshot_with_timeout(source.as_ref(), settings.schema.extraction_timeout()).await?;
    let json = serde_json::to_string_pretty(&snapshot).map_err(SchemaError::from)?;
    Ok(json)
}
