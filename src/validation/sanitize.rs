//! Row-count bounding of accepted SQL.

use sqlparser::ast::{Expr, Statement, Value};
use thiserror::Error;
use tracing::{debug, error};

use super::rules::Rejection;
use super::validator::SqlValidator;

/// Returned in place of blank input.
pub const FALLBACK_QUERY: &str = "SELECT 1";

/// Default row bound appended to statements without a LIMIT.
pub const DEFAULT_LIMIT: u64 = 1000;

/// Sanitization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// The input failed validation; the rejection is passed through as is.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The input was accepted but the bounded text was not, for instance
    /// because the added clause pushed it past the length limit.
    #[error("sanitized SQL failed re-validation ({rejection}): {sql}")]
    InvariantViolation { sql: String, rejection: Rejection },
}

/// How the row bound is applied to an accepted statement.
enum Bounding {
    /// Already bounded, or not a query; returned as is.
    Unchanged,
    /// `LIMIT n;` goes at the end of the text.
    Append,
    /// The limit is set on the AST and the statements rendered again, so it
    /// lands before a trailing locking clause.
    Render,
}

/// Appends a row bound to validated statements.
pub struct SqlSanitizer<'a> {
    validator: &'a SqlValidator,
    default_limit: u64,
}

impl<'a> SqlSanitizer<'a> {
    pub fn new(validator: &'a SqlValidator) -> Self {
        Self {
            validator,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Validate `sql` and make sure it carries a row bound.
    ///
    /// Blank input yields [`FALLBACK_QUERY`]. Text already containing
    /// `limit` anywhere (case-insensitive) is returned unchanged, as is a
    /// final statement that uses `FETCH FIRST` or is not a query. Otherwise
    /// trailing `;` are dropped and `LIMIT n;` appended, or placed before
    /// `FOR UPDATE`/`FOR SHARE` when the query locks rows. The result is
    /// validated again before it is returned.
    pub fn sanitize(&self, sql: &str) -> Result<String, SanitizeError> {
        if sql.trim().is_empty() {
            return Ok(FALLBACK_QUERY.to_string());
        }

        self.validator.validate(sql)?;

        if sql.to_lowercase().contains("limit") {
            return Ok(sql.to_string());
        }

        let mut statements = self.validator.parse(sql)?;
        let sanitized = match self.bound_last(&mut statements) {
            Bounding::Unchanged => return Ok(sql.to_string()),
            Bounding::Append => append_limit(sql, self.default_limit),
            Bounding::Render => render(&statements),
        };
        debug!(limit = self.default_limit, "added LIMIT clause");

        self.validator.validate(&sanitized).map_err(|rejection| {
            error!(
                rule = %rejection.rule,
                sql = %sanitized,
                "sanitized SQL failed re-validation"
            );
            SanitizeError::InvariantViolation {
                sql: sanitized.clone(),
                rejection,
            }
        })?;

        Ok(sanitized)
    }

    fn bound_last(&self, statements: &mut [Statement]) -> Bounding {
        let Some(Statement::Query(query)) = statements.last_mut() else {
            debug!("statement is not a query, left unbounded");
            return Bounding::Unchanged;
        };

        if query.limit.is_some() || query.fetch.is_some() {
            return Bounding::Unchanged;
        }
        if query.locks.is_empty() {
            return Bounding::Append;
        }

        query.limit = Some(Expr::Value(Value::Number(
            self.default_limit.to_string(),
            false,
        )));
        Bounding::Render
    }
}

fn append_limit(sql: &str, limit: u64) -> String {
    let body = sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    // A trailing line comment would swallow the clause.
    let in_line_comment = body.lines().last().is_some_and(|line| line.contains("--"));
    let separator = if in_line_comment { "\n" } else { " " };

    format!("{body}{separator}LIMIT {limit};")
}

fn render(statements: &[Statement]) -> String {
    let rendered: Vec<String> = statements.iter().map(ToString::to_string).collect();
    format!("{};", rendered.join("; "))
}
