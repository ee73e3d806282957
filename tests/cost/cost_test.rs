use sqlgate::cost::{estimate_cost, CostEstimator, CostLevel};

#[test]
fn test_plain_select_is_low() {
    assert_eq!(estimate_cost("SELECT * FROM orders"), CostLevel::Low);
    assert_eq!(estimate_cost("SELECT * FROM orders WHERE id = 1"), CostLevel::Low);
}

#[test]
fn test_join_with_filter_is_medium() {
    // JOIN (2) + WHERE (1)
    let sql = "SELECT * FROM ventas v JOIN clientes c ON c.id = v.cliente_id WHERE v.total > 0";
    let estimate = CostEstimator::default().estimate(sql);
    assert_eq!(estimate.score, 3);
    assert_eq!(estimate.level, CostLevel::Medium);
    assert_eq!(estimate.indicators, vec!["JOIN", "WHERE"]);
}

#[test]
fn test_aggregation_report_is_high() {
    let sql = "SELECT c.ciudad, SUM(v.total) FROM ventas v \
               JOIN clientes c ON c.id = v.cliente_id \
               GROUP BY c.ciudad HAVING SUM(v.total) > 100 ORDER BY 2 DESC";
    let estimate = CostEstimator::default().estimate(sql);
    assert_eq!(estimate.score, 7);
    assert_eq!(estimate.level, CostLevel::High);
}

#[test]
fn test_union_alone_is_medium() {
    assert_eq!(
        estimate_cost("SELECT id FROM a UNION SELECT id FROM b"),
        CostLevel::Medium
    );
}

#[test]
fn test_indicators_are_case_insensitive_and_counted_once() {
    let sql = "select * from a left join b on true inner join c on true join d on true";
    let estimate = CostEstimator::default().estimate(sql);
    assert_eq!(estimate.score, 2);
    assert_eq!(estimate.level, CostLevel::Low);
}

#[test]
fn test_substring_matches_count() {
    // "JOINED" contains JOIN; "ORDERS" alone is not ORDER BY
    let estimate = CostEstimator::default().estimate("SELECT joined_at FROM orders");
    assert_eq!(estimate.indicators, vec!["JOIN"]);
}

#[test]
fn test_custom_indicator_table() {
    let weights = [("LATERAL", 5)];
    let estimator = CostEstimator::new(&weights);
    assert_eq!(
        estimator.estimate("SELECT * FROM a, LATERAL (SELECT 1) b").level,
        CostLevel::High
    );
    assert_eq!(estimator.estimate("SELECT * FROM a JOIN b ON true").score, 0);
}

#[test]
fn test_levels_order() {
    assert!(CostLevel::Low < CostLevel::Medium);
    assert!(CostLevel::Medium < CostLevel::High);
    assert_eq!(CostLevel::from_score(0), CostLevel::Low);
    assert_eq!(CostLevel::from_score(3), CostLevel::Medium);
    assert_eq!(CostLevel::from_score(5), CostLevel::High);
    assert_eq!(CostLevel::High.to_string(), "high");
}
