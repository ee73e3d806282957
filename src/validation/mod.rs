//! SQL safety gate.
//!
//! Generated SQL passes through validation, then sanitization, before it is
//! handed to an executor:
//!
//! ```text
//! sql ──► SqlValidator::validate ──► SqlSanitizer::sanitize ──► bounded sql
//!             │  empty                   │  append LIMIT
//!             │  too long                │  re-validate
//!             │  deny-list               ▼
//!             │  syntax            SanitizeError
//!             │  (strict) query type / functions
//!             ▼
//!         Rejection { rule, detail }
//! ```
//!
//! The deny-list scans raw text and is deliberately conservative: it fires
//! inside string literals and comments too. Strict mode adds AST-based
//! allow-listing on top of it.
//!
//! # Example
//!
//! ```ignore
//! use sqlgate::validation::{SqlSanitizer, SqlValidator};
//!
//! let validator = SqlValidator::default();
//! validator.validate("SELECT * FROM orders")?;
//! let bounded = SqlSanitizer::new(&validator).with_limit(100).sanitize("SELECT * FROM orders")?;
//! assert_eq!(bounded, "SELECT * FROM orders LIMIT 100;");
//! ```

mod dialect;
mod patterns;
mod report;
mod rules;
mod sanitize;
mod strict;
mod validator;

pub use dialect::SqlDialect;
pub use patterns::{find_dangerous, PatternMatch, DANGEROUS_PATTERNS};
pub use report::{ErrorDetails, ValidationReport, CHECKS};
pub use rules::{Rejection, Rule, Verdict};
pub use sanitize::{SanitizeError, SqlSanitizer, DEFAULT_LIMIT, FALLBACK_QUERY};
pub use strict::ALLOWED_FUNCTIONS;
pub use validator::{SqlValidator, ValidatorOptions, DEFAULT_MAX_QUERY_LENGTH};
