//! Keyword extraction and query tokenization.
//!
//! Both sides are lowercase-normalized so that index lookups are
//! case-insensitive.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::TableSchema;

/// Words of four or more characters, used for comment text.
static COMMENT_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w{4,}\b").unwrap());

/// Words of three or more characters, used for query text.
static QUERY_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w{3,}\b").unwrap());

/// Columns that say nothing about what a table holds.
pub const SKIPPED_COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "activo"];

/// Short connective words dropped from queries (Spanish and English).
pub const STOPWORDS: &[&str] = &[
    "los", "las", "del", "para", "con", "por", "que", "una", "este", "esta", "estos", "estas",
    "ese", "esa", "esos", "esas", "the", "and", "for", "with", "that", "this", "these", "those",
];

/// Words taken from a table comment.
const TABLE_COMMENT_WORDS: usize = 10;

/// Words taken from each column comment.
const COLUMN_COMMENT_WORDS: usize = 5;

/// Extract the keyword set of a table.
///
/// Keywords are the table name, its underscore tokens and a naive singular
/// (trailing `s` stripped); the leading words of the table comment; every
/// column name outside [`SKIPPED_COLUMNS`] plus its underscore tokens; and
/// the leading words of each column comment.
pub fn table_keywords(table: &TableSchema) -> BTreeSet<String> {
    let mut keywords = BTreeSet::new();

    let name = table.name.to_lowercase();
    insert_keyword(&mut keywords, name.trim_end_matches('s'));
    insert_name_tokens(&mut keywords, &name);

    if let Some(comment) = &table.comment {
        keywords.extend(leading_words(comment, TABLE_COMMENT_WORDS));
    }

    for column in &table.columns {
        let column_name = column.name.to_lowercase();
        if !SKIPPED_COLUMNS.contains(&column_name.as_str()) {
            insert_name_tokens(&mut keywords, &column_name);
        }
    }

    for column in &table.columns {
        if let Some(comment) = &column.comment {
            keywords.extend(leading_words(comment, COLUMN_COMMENT_WORDS));
        }
    }

    keywords
}

/// Split a natural-language query into lowercase search tokens.
///
/// Order and repetition are preserved; a repeated word counts twice when
/// scoring.
pub fn tokenize_query(query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    QUERY_WORD
        .find_iter(&query)
        .map(|m| m.as_str())
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Insert a name and its underscore-delimited parts.
fn insert_name_tokens(keywords: &mut BTreeSet<String>, name: &str) {
    insert_keyword(keywords, name);
    for part in name.split('_') {
        insert_keyword(keywords, part);
    }
}

fn insert_keyword(keywords: &mut BTreeSet<String>, word: &str) {
    if !word.is_empty() {
        keywords.insert(word.to_string());
    }
}

fn leading_words(text: &str, limit: usize) -> Vec<String> {
    let text = text.to_lowercase();
    COMMENT_WORD
        .find_iter(&text)
        .take(limit)
        .map(|m| m.as_str().to_string())
        .collect()
}
