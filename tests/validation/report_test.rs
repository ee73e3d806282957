use serde_json::json;
use sqlgate::cost::CostLevel;
use sqlgate::validation::{SqlValidator, CHECKS};

#[test]
fn test_safe_select_passes_every_check() {
    let report = SqlValidator::default().report("SELECT id, total FROM orders LIMIT 10");

    assert!(report.is_valid);
    assert_eq!(report.checks_passed, CHECKS.to_vec());
    assert!(report.checks_failed.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.query_length, 37);
    assert_eq!(report.estimated_cost, CostLevel::Low);
    assert_eq!(report.error_message, None);
    assert_eq!(report.error_details, None);
}

#[test]
fn test_dangerous_statement_report() {
    let report = SqlValidator::default().report("DELETE FROM x");

    assert!(!report.is_valid);
    assert!(report.checks_passed.is_empty());
    assert_eq!(report.checks_failed, vec!["dangerous_operation"]);

    let details = report.error_details.as_ref().unwrap();
    assert_eq!(details.dangerous_pattern.as_deref(), Some(r"DELETE\s+FROM"));
    assert_eq!(details.sql_preview, "DELETE FROM x");
    assert_eq!(
        report.error_message.as_deref(),
        Some(r"dangerous SQL operation detected (pattern DELETE\s+FROM)")
    );
}

#[test]
fn test_warnings_on_unbounded_select_star() {
    let report = SqlValidator::default().report("SELECT DISTINCT * FROM ventas");

    assert!(report.is_valid);
    assert_eq!(
        report.warnings,
        vec![
            "query has no LIMIT clause".to_string(),
            "query selects all columns with SELECT *".to_string(),
        ]
    );
}

#[test]
fn test_long_statement_preview_is_cut() {
    let sql = format!("SELECT ({}", "a + ".repeat(100));
    let report = SqlValidator::default().report(&sql);

    assert_eq!(report.checks_failed, vec!["invalid_syntax"]);
    let details = report.error_details.unwrap();
    assert_eq!(details.dangerous_pattern, None);
    assert_eq!(details.sql_preview.chars().count(), 203);
    assert!(details.sql_preview.ends_with("..."));
}

#[test]
fn test_report_json_shape() {
    let validator = SqlValidator::default();

    let accepted = serde_json::to_value(validator.report(
        "SELECT c.nombre, COUNT(*) FROM clientes c JOIN ventas v ON v.cliente_id = c.id GROUP BY c.nombre LIMIT 20",
    ))
    .unwrap();
    assert_eq!(
        accepted,
        json!({
            "is_valid": true,
            "checks_passed": [
                "syntax_check",
                "security_patterns",
                "query_type",
                "allowed_keywords",
                "query_length"
            ],
            "checks_failed": [],
            "warnings": [],
            "query_length": 105,
            "estimated_cost": "medium"
        })
    );

    let rejected = serde_json::to_value(validator.report("   ")).unwrap();
    assert_eq!(rejected["checks_failed"][0], "empty_query");
    assert_eq!(rejected["error_message"], "SQL query is empty");
    assert_eq!(rejected["error_details"]["sql_preview"], "   ");
    assert!(rejected["error_details"]["dangerous_pattern"].is_null());
}
