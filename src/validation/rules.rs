//! Rejection kinds.

use std::fmt;

/// The check that rejected a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    EmptyQuery,
    TooLong,
    DangerousOperation,
    InvalidSyntax,
    /// Strict mode: the statement is not a plain query.
    NonSelectStatement,
    /// Strict mode: a function outside the allow-list is called.
    DisallowedFunction,
}

impl Rule {
    /// Stable machine name, as reported in `checks_failed`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::EmptyQuery => "empty_query",
            Rule::TooLong => "query_too_long",
            Rule::DangerousOperation => "dangerous_operation",
            Rule::InvalidSyntax => "invalid_syntax",
            Rule::NonSelectStatement => "non_select_query",
            Rule::DisallowedFunction => "invalid_keyword",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A statement rejected by one rule.
///
/// `detail` carries the matched deny pattern, the offending fragment or the
/// parser message, depending on the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub rule: Rule,
    pub detail: String,
}

impl Rejection {
    pub fn new(rule: Rule, detail: impl Into<String>) -> Self {
        Self {
            rule,
            detail: detail.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Rule::EmptyQuery, "")
    }

    pub fn too_long(length: usize, max: usize) -> Self {
        Self::new(Rule::TooLong, format!("{length} > {max}"))
    }

    pub fn dangerous(pattern: &str) -> Self {
        Self::new(Rule::DangerousOperation, pattern)
    }

    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::new(Rule::InvalidSyntax, message)
    }

    pub fn non_select(kind: impl Into<String>) -> Self {
        Self::new(Rule::NonSelectStatement, kind)
    }

    pub fn disallowed_function(name: impl Into<String>) -> Self {
        Self::new(Rule::DisallowedFunction, name)
    }

    /// Human-readable description.
    pub fn message(&self) -> String {
        match self.rule {
            Rule::EmptyQuery => "SQL query is empty".to_string(),
            Rule::TooLong => format!("SQL query is too long ({} characters)", self.detail),
            Rule::DangerousOperation => {
                format!("dangerous SQL operation detected (pattern {})", self.detail)
            }
            Rule::InvalidSyntax => format!("SQL query is not valid: {}", self.detail),
            Rule::NonSelectStatement => {
                format!("only SELECT queries are allowed, found {}", self.detail)
            }
            Rule::DisallowedFunction => format!("function not allowed: {}", self.detail),
        }
    }

    /// The deny pattern that matched, for dangerous-operation rejections.
    pub fn dangerous_pattern(&self) -> Option<&str> {
        (self.rule == Rule::DangerousOperation).then_some(self.detail.as_str())
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for Rejection {}

/// Outcome of validating one statement.
pub type Verdict = Result<(), Rejection>;
