//! Heuristic cost classification for validated SQL.

use std::fmt;

use serde::Serialize;

/// Complexity indicators and their weights.
///
/// Each indicator counts once, however often it occurs.
pub const INDICATORS: &[(&str, u32)] = &[
    ("JOIN", 2),
    ("WHERE", 1),
    ("GROUP BY", 2),
    ("ORDER BY", 1),
    ("DISTINCT", 1),
    ("UNION", 3),
    ("HAVING", 2),
];

/// Score at or above which a statement is `high`.
pub const HIGH_THRESHOLD: u32 = 5;
/// Score at or above which a statement is `medium`.
pub const MEDIUM_THRESHOLD: u32 = 3;

/// Coarse cost class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostLevel {
    Low,
    Medium,
    High,
}

impl CostLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            CostLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            CostLevel::Medium
        } else {
            CostLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostLevel::Low => "low",
            CostLevel::Medium => "medium",
            CostLevel::High => "high",
        }
    }
}

impl fmt::Display for CostLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost estimate with the indicators that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    pub score: u32,
    pub level: CostLevel,
    pub indicators: Vec<&'static str>,
}

/// Scores SQL text against a weighted indicator table.
pub struct CostEstimator<'a> {
    indicators: &'a [(&'static str, u32)],
}

impl Default for CostEstimator<'static> {
    fn default() -> Self {
        Self::new(INDICATORS)
    }
}

impl<'a> CostEstimator<'a> {
    pub fn new(indicators: &'a [(&'static str, u32)]) -> Self {
        Self { indicators }
    }

    /// Case-insensitive substring scan; the matched weights are summed.
    pub fn estimate(&self, sql: &str) -> CostEstimate {
        let upper = sql.to_uppercase();
        let matched: Vec<(&'static str, u32)> = self
            .indicators
            .iter()
            .copied()
            .filter(|(indicator, _)| upper.contains(indicator))
            .collect();

        let score = matched.iter().map(|(_, weight)| weight).sum();
        CostEstimate {
            score,
            level: CostLevel::from_score(score),
            indicators: matched.into_iter().map(|(indicator, _)| indicator).collect(),
        }
    }
}

/// Classify `sql` with the default indicator table.
pub fn estimate_cost(sql: &str) -> CostLevel {
    CostEstimator::default().estimate(sql).level
}
