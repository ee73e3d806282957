//! Rendering selected tables into a bounded schema description.

use crate::metadata::{SchemaSnapshot, TableSchema};

use super::ranker::RankedTable;

/// Returned when nothing was selected.
pub const NO_RELEVANT_TABLES: &str = "No relevant tables found.";

const HEADER: &str = "RELEVANT DATABASE SCHEMA (ALL COLUMNS):";

const TRUNCATION_MARKER: &str = "\n... (truncated)\n";

/// Default bound on the rendered text, in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 12_000;

/// Renders schema context text for prompt construction.
#[derive(Debug, Clone, Copy)]
pub struct ContextFormatter {
    max_chars: usize,
}

impl Default for ContextFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_CHARS)
    }
}

impl ContextFormatter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Render the selected tables in selection order.
    ///
    /// Whole tables are appended while they fit in the budget, with room
    /// kept for the markers. A first table that alone exceeds it is cut
    /// short; later tables that do not fit are omitted and counted. Selected
    /// names missing from the snapshot are skipped. The result never exceeds
    /// `max_chars` characters; a budget smaller than the header and markers
    /// cuts the text mid-line.
    pub fn render(&self, selection: &[RankedTable], snapshot: &SchemaSnapshot) -> String {
        let tables: Vec<&TableSchema> = selection
            .iter()
            .filter_map(|ranked| snapshot.table(&ranked.name))
            .collect();

        if tables.is_empty() {
            return NO_RELEVANT_TABLES.to_string();
        }

        let mut out = format!("{HEADER}\n\n");
        let mut used = out.chars().count();
        let mut written = 0;

        for (i, table) in tables.iter().enumerate() {
            let block = format_table(table);
            let len = block.chars().count() + 1;
            let reserve = omission_marker(tables.len() - i - 1).chars().count();

            if used + len + reserve <= self.max_chars {
                out.push_str(&block);
                out.push('\n');
                used += len;
                written += 1;
                continue;
            }

            if written == 0 {
                let reserve = TRUNCATION_MARKER.chars().count()
                    + omission_marker(tables.len() - 1).chars().count();
                let room = self.max_chars.saturating_sub(used + reserve);
                out.extend(block.chars().take(room));
                out.push_str(TRUNCATION_MARKER);
                written = 1;
            }
            break;
        }

        out.push_str(&omission_marker(tables.len() - written));

        out.trim_end().chars().take(self.max_chars).collect()
    }
}

fn omission_marker(omitted: usize) -> String {
    if omitted == 0 {
        String::new()
    } else {
        format!("... ({omitted} more tables omitted)\n")
    }
}

/// Render one table block.
///
/// ```text
/// --- Table: orders ---
/// Description: Customer purchase orders
/// Columns:
///   - id (integer) NOT NULL
///   - total (numeric)
///     Comment: Gross amount
/// Relationships:
///   - customer_id → customers.id
/// ```
pub fn format_table(table: &TableSchema) -> String {
    let mut out = format!("--- Table: {} ---\n", table.name);

    if let Some(comment) = &table.comment {
        out.push_str(&format!("Description: {comment}\n"));
    }

    out.push_str("Columns:\n");
    for column in &table.columns {
        out.push_str(&format!("  - {} ({})", column.name, column.data_type));
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if let Some(comment) = &column.comment {
            out.push_str(&format!("\n    Comment: {comment}"));
        }
        out.push('\n');
    }

    if !table.foreign_keys.is_empty() {
        out.push_str("Relationships:\n");
        for fk in &table.foreign_keys {
            out.push_str(&format!(
                "  - {} → {}.{}\n",
                fk.column, fk.ref_table, fk.ref_column
            ));
        }
    }

    out
}
