//! Keyword relevance ranking.
//!
//! Scores tables against the tokens of a natural-language query and expands
//! the best matches along foreign-key edges so the selection carries the
//! tables needed to join them.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use super::index::{SchemaIndex, TableMetadata};
use super::keywords::tokenize_query;

/// Bonus when a token is a substring of the table name.
pub const NAME_MATCH: f64 = 10.0;
/// Bonus when a token is one of the table's keywords.
pub const KEYWORD_MATCH: f64 = 5.0;
/// Bonus when a token equals a column name.
pub const COLUMN_MATCH: f64 = 3.0;
/// Bonus when a token appears in the table description.
pub const DESCRIPTION_MATCH: f64 = 1.0;

/// A selected table and its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
    pub name: String,
    pub score: f64,
}

/// Ranks the tables of one index.
pub struct RelevanceRanker<'a> {
    index: &'a SchemaIndex,
}

impl<'a> RelevanceRanker<'a> {
    pub fn new(index: &'a SchemaIndex) -> Self {
        Self { index }
    }

    /// Select at most `max_tables` tables relevant to `query`.
    ///
    /// Results are ordered by score descending, then table name ascending.
    /// Every returned table exists in the index.
    pub fn select(&self, query: &str, max_tables: usize) -> Vec<RankedTable> {
        if max_tables == 0 || self.index.is_empty() {
            return Vec::new();
        }

        let tokens = tokenize_query(query);

        let mut candidates: BTreeSet<&str> = tokens
            .iter()
            .filter_map(|token| self.index.tables_for_keyword(token))
            .flatten()
            .map(String::as_str)
            .collect();
        if candidates.is_empty() {
            candidates = self.index.table_names().collect();
        }

        let mut primary = self.rank(candidates, &tokens);
        primary.truncate(max_tables);

        let expanded = self.expand(&primary, max_tables.saturating_mul(2));

        let mut selection = self.rank(expanded, &tokens);
        selection.truncate(max_tables);

        debug!(
            query,
            tables = ?selection.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "selected relevant tables"
        );

        selection
    }

    /// Add tables referenced by the primary selection until `limit` distinct
    /// tables are held. References to tables outside the index are skipped.
    fn expand<'s>(&'s self, primary: &'s [RankedTable], limit: usize) -> BTreeSet<&'s str> {
        let mut working = BTreeSet::new();

        for ranked in primary {
            working.insert(ranked.name.as_str());

            let Some(table) = self.index.table(&ranked.name) else {
                continue;
            };
            for referenced in table.relationships.values() {
                if working.len() >= limit {
                    break;
                }
                if self.index.contains_table(referenced) {
                    working.insert(referenced.as_str());
                }
            }
        }

        working
    }

    fn rank<'s, I>(&self, names: I, tokens: &[String]) -> Vec<RankedTable>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut ranked: Vec<RankedTable> = names
            .into_iter()
            .filter_map(|name| self.index.table(name))
            .map(|table| RankedTable {
                name: table.name.clone(),
                score: score_table(table, tokens),
            })
            .collect();

        ranked.sort_by(compare_ranked);
        ranked
    }
}

/// Score one table against the query tokens.
///
/// A token may earn several bonuses for the same table.
pub fn score_table(table: &TableMetadata, tokens: &[String]) -> f64 {
    tokens.iter().map(|token| score_token(table, token)).sum()
}

fn score_token(table: &TableMetadata, token: &str) -> f64 {
    let mut score = 0.0;
    if table.name_lower().contains(token) {
        score += NAME_MATCH;
    }
    if table.keywords.contains(token) {
        score += KEYWORD_MATCH;
    }
    if table.has_column(token) {
        score += COLUMN_MATCH;
    }
    if table.description_lower().contains(token) {
        score += DESCRIPTION_MATCH;
    }
    score
}

/// Score descending, then name ascending.
fn compare_ranked(a: &RankedTable, b: &RankedTable) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
}

/// Convenience wrapper around [`RelevanceRanker::select`].
pub fn select_relevant_tables(index: &SchemaIndex, query: &str, max_tables: usize) -> Vec<RankedTable> {
    RelevanceRanker::new(index).select(query, max_tables)
}
