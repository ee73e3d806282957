//! Strict-mode allow-listing.
//!
//! Runs after the deny-list and syntax checks have passed. Statement kinds
//! are checked on the parsed AST; function names are checked on the token
//! stream so calls nested anywhere in the statement are seen.

use std::collections::HashSet;

use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::Dialect;
use sqlparser::tokenizer::{Token, Tokenizer};

use super::rules::{Rejection, Verdict};

/// Functions callable in strict mode.
pub const ALLOWED_FUNCTIONS: &[&str] = &[
    "count", "sum", "avg", "min", "max", "coalesce", "nullif", "greatest", "least", "now",
    "current_date", "current_time", "current_timestamp", "date_part", "extract", "to_char",
    "to_date", "to_timestamp", "upper", "lower", "trim", "ltrim", "rtrim", "length",
    "substring", "concat", "replace", "round", "ceil", "floor", "abs", "mod", "power", "sqrt",
    "random", "row_number", "rank", "dense_rank", "lag", "lead", "cast",
];

/// Words that may precede `(` without being a function call.
const STRUCTURAL_WORDS: &[&str] = &[
    "select", "from", "where", "join", "on", "using", "and", "or", "not", "in", "exists",
    "any", "all", "some", "as", "union", "intersect", "except", "with", "recursive",
    "lateral", "over", "filter", "within", "group", "by", "having", "when", "then", "else",
    "case", "values", "distinct", "array", "row", "rollup", "cube", "sets", "interval",
];

pub(crate) fn check_strict(sql: &str, statements: &[Statement], dialect: &dyn Dialect) -> Verdict {
    let mut cte_names = HashSet::new();
    for statement in statements {
        check_statement(statement)?;
        if let Statement::Query(query) = statement {
            collect_cte_names(query, &mut cte_names);
        }
    }
    check_functions(sql, dialect, &cte_names)
}

fn check_statement(statement: &Statement) -> Verdict {
    match statement {
        Statement::Query(query) => check_query(query),
        other => Err(Rejection::non_select(leading_word(&other.to_string()))),
    }
}

fn check_query(query: &Query) -> Verdict {
    if !query.locks.is_empty() {
        return Err(Rejection::non_select("SELECT ... FOR UPDATE"));
    }
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            check_query(&cte.query)?;
        }
    }
    check_set_expr(&query.body)
}

fn check_set_expr(body: &SetExpr) -> Verdict {
    match body {
        SetExpr::Select(select) if select.into.is_some() => {
            Err(Rejection::non_select("SELECT ... INTO"))
        }
        SetExpr::Select(_) | SetExpr::Values(_) | SetExpr::Table(_) => Ok(()),
        SetExpr::Query(query) => check_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            check_set_expr(left)?;
            check_set_expr(right)
        }
        other => Err(Rejection::non_select(leading_word(&other.to_string()))),
    }
}

fn collect_cte_names(query: &Query, names: &mut HashSet<String>) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            names.insert(cte.alias.name.value.to_lowercase());
            collect_cte_names(&cte.query, names);
        }
    }
}

/// Reject the first called function outside [`ALLOWED_FUNCTIONS`].
///
/// A call is a word directly followed by `(`. Words after `AS` or `::` are
/// type names and are skipped; a qualified call is judged by its last segment.
fn check_functions(sql: &str, dialect: &dyn Dialect, cte_names: &HashSet<String>) -> Verdict {
    let tokens = Tokenizer::new(dialect, sql)
        .tokenize()
        .map_err(|e| Rejection::invalid_syntax(e.to_string()))?;

    let significant: Vec<&Token> = tokens
        .iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect();

    for (i, token) in significant.iter().enumerate() {
        let Token::Word(word) = token else {
            continue;
        };
        if !matches!(significant.get(i + 1), Some(Token::LParen)) {
            continue;
        }

        let name = word.value.to_lowercase();
        let previous = i.checked_sub(1).and_then(|p| significant.get(p));
        let after_as = matches!(previous, Some(Token::Word(w)) if w.value.eq_ignore_ascii_case("as"));
        let after_cast = matches!(previous, Some(Token::DoubleColon));

        if after_as
            || after_cast
            || STRUCTURAL_WORDS.contains(&name.as_str())
            || cte_names.contains(&name)
            || ALLOWED_FUNCTIONS.contains(&name.as_str())
        {
            continue;
        }
        return Err(Rejection::disallowed_function(name));
    }

    Ok(())
}

fn leading_word(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
