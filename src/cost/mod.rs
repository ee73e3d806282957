//! Query cost estimation.
//!
//! A keyword heuristic, not a planner: it never touches the database and
//! only classifies statements as `low`, `medium` or `high`.

mod estimator;

pub use estimator::{
    estimate_cost, CostEstimate, CostEstimator, CostLevel, HIGH_THRESHOLD, INDICATORS,
    MEDIUM_THRESHOLD,
};
