//! The SQL safety gate.

use sqlparser::ast::Statement;
use sqlparser::parser::Parser;
use tracing::warn;

use super::dialect::SqlDialect;
use super::patterns::find_dangerous;
use super::rules::{Rejection, Verdict};
use super::strict::check_strict;

/// Default maximum statement length, in characters.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 10_000;

/// Validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub max_query_length: usize,
    /// Allow only plain queries and allow-listed functions.
    pub strict_mode: bool,
    pub dialect: SqlDialect,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            strict_mode: false,
            dialect: SqlDialect::default(),
        }
    }
}

/// Validates generated SQL before execution.
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. empty after trimming
/// 2. longer than the maximum length
/// 3. a deny-list pattern anywhere in the raw text
/// 4. not parseable as at least one statement
/// 5. (strict mode) not a plain query, or calls a function off the allow-list
///
/// Stateless between calls; one validator can be shared across tasks.
#[derive(Debug, Clone, Default)]
pub struct SqlValidator {
    options: ValidatorOptions,
}

impl SqlValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate against the configured maximum length.
    pub fn validate(&self, sql: &str) -> Verdict {
        self.validate_with_max(sql, self.options.max_query_length)
    }

    /// Validate against an explicit maximum length.
    pub fn validate_with_max(&self, sql: &str, max_length: usize) -> Verdict {
        let verdict = self.run_checks(sql, max_length);
        if let Err(rejection) = &verdict {
            warn!(
                rule = %rejection.rule,
                detail = %rejection.detail,
                "SQL rejected"
            );
        }
        verdict
    }

    fn run_checks(&self, sql: &str, max_length: usize) -> Verdict {
        if sql.trim().is_empty() {
            return Err(Rejection::empty());
        }

        let length = sql.chars().count();
        if length > max_length {
            return Err(Rejection::too_long(length, max_length));
        }

        if let Some(hit) = find_dangerous(sql) {
            return Err(Rejection::dangerous(hit.pattern));
        }

        let statements = self.parse(sql)?;

        if self.options.strict_mode {
            let dialect = self.options.dialect.parser_dialect();
            check_strict(sql, &statements, &*dialect)?;
        }

        Ok(())
    }

    /// Parse `sql` with the configured dialect into at least one statement.
    pub(crate) fn parse(&self, sql: &str) -> Result<Vec<Statement>, Rejection> {
        let dialect = self.options.dialect.parser_dialect();
        let statements = Parser::parse_sql(&*dialect, sql)
            .map_err(|e| Rejection::invalid_syntax(e.to_string()))?;
        if statements.is_empty() {
            return Err(Rejection::invalid_syntax("no SQL statement found"));
        }
        Ok(statements)
    }
}
