//! Structured validation reports.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::cost::{estimate_cost, CostLevel};

use super::validator::SqlValidator;

/// Checks reported as passed when a statement is accepted.
pub const CHECKS: [&str; 5] = [
    "syntax_check",
    "security_patterns",
    "query_type",
    "allowed_keywords",
    "query_length",
];

const PREVIEW_CHARS: usize = 200;

static SELECT_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bselect\s+(distinct\s+)?\*").unwrap());

/// Outcome of every validation check for one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub checks_passed: Vec<&'static str>,
    pub checks_failed: Vec<&'static str>,
    pub warnings: Vec<String>,
    /// Length in characters.
    pub query_length: usize,
    pub estimated_cost: CostLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

/// Extra context for a failed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub dangerous_pattern: Option<String>,
    pub sql_preview: String,
}

impl SqlValidator {
    /// Validate `sql` and describe the outcome.
    ///
    /// Never fails: rejections are reported in `checks_failed`.
    pub fn report(&self, sql: &str) -> ValidationReport {
        let mut report = ValidationReport {
            is_valid: false,
            checks_passed: Vec::new(),
            checks_failed: Vec::new(),
            warnings: Vec::new(),
            query_length: sql.chars().count(),
            estimated_cost: estimate_cost(sql),
            error_message: None,
            error_details: None,
        };

        match self.validate(sql) {
            Ok(()) => {
                report.is_valid = true;
                report.checks_passed = CHECKS.to_vec();
                report.warnings = warnings(sql);
            }
            Err(rejection) => {
                report.checks_failed = vec![rejection.rule.as_str()];
                report.error_message = Some(rejection.message());
                report.error_details = Some(ErrorDetails {
                    dangerous_pattern: rejection.dangerous_pattern().map(str::to_string),
                    sql_preview: preview(sql),
                });
            }
        }

        report
    }
}

fn warnings(sql: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    if !sql.to_lowercase().contains("limit") {
        warnings.push("query has no LIMIT clause".to_string());
    }
    if SELECT_STAR.is_match(sql) {
        warnings.push("query selects all columns with SELECT *".to_string());
    }
    warnings
}

fn preview(sql: &str) -> String {
    if sql.chars().count() > PREVIEW_CHARS {
        let head: String = sql.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        sql.to_string()
    }
}
