//! Parser dialect selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    Dialect, DuckDbDialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SQLiteDialect, SnowflakeDialect,
};

/// SQL dialect used for the syntax check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Postgres,
    Generic,
    MySql,
    TSql,
    DuckDb,
    Snowflake,
    Sqlite,
}

impl SqlDialect {
    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => "postgres",
            SqlDialect::Generic => "generic",
            SqlDialect::MySql => "mysql",
            SqlDialect::TSql => "tsql",
            SqlDialect::DuckDb => "duckdb",
            SqlDialect::Snowflake => "snowflake",
            SqlDialect::Sqlite => "sqlite",
        }
    }

    /// The sqlparser dialect to parse with.
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
            SqlDialect::Generic => Box::new(GenericDialect {}),
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::TSql => Box::new(MsSqlDialect {}),
            SqlDialect::DuckDb => Box::new(DuckDbDialect {}),
            SqlDialect::Snowflake => Box::new(SnowflakeDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "generic" | "ansi" => Ok(SqlDialect::Generic),
            "mysql" => Ok(SqlDialect::MySql),
            "tsql" | "mssql" => Ok(SqlDialect::TSql),
            "duckdb" => Ok(SqlDialect::DuckDb),
            "snowflake" => Ok(SqlDialect::Snowflake),
            "sqlite" => Ok(SqlDialect::Sqlite),
            other => Err(format!("unknown SQL dialect '{other}'")),
        }
    }
}
