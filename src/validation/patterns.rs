//! The dangerous-operation deny-list.
//!
//! Patterns are matched case-insensitively against the raw statement text, so
//! they also fire inside string literals and comments.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Deny-list pattern sources, in match order.
pub const DANGEROUS_PATTERNS: [&str; 23] = [
    r"DROP\s+TABLE",
    r"DELETE\s+FROM",
    r"UPDATE\s+\w+\s+SET",
    r"INSERT\s+INTO",
    r"CREATE\s+TABLE",
    r"ALTER\s+TABLE",
    r"GRANT\s+",
    r"REVOKE\s+",
    r"TRUNCATE\s+TABLE",
    r"EXECUTE\s+",
    r"EXEC\s+",
    r"CREATE\s+FUNCTION",
    r"CREATE\s+PROCEDURE",
    r"CREATE\s+VIEW",
    r"VACUUM\s+",
    r"ANALYZE\s+",
    r"REINDEX\s+",
    r"LOCK\s+TABLE",
    r"UNLOCK\s+TABLE",
    r"BEGIN\s+TRANSACTION",
    r"COMMIT\s+TRANSACTION",
    r"ROLLBACK",
    r"SAVEPOINT",
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DANGEROUS_PATTERNS
        .iter()
        .map(|&source| {
            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .unwrap();
            (source, regex)
        })
        .collect()
});

/// A deny-list hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: &'static str,
    pub fragment: String,
}

/// Find the first deny-list pattern present in `sql`.
pub fn find_dangerous(sql: &str) -> Option<PatternMatch> {
    COMPILED.iter().find_map(|&(pattern, ref regex)| {
        regex.find(sql).map(|m| PatternMatch {
            pattern,
            fragment: m.as_str().to_string(),
        })
    })
}
