use sqlgate::validation::{
    Rule, SanitizeError, SqlSanitizer, SqlValidator, ValidatorOptions, FALLBACK_QUERY,
};

fn sanitize(sql: &str) -> Result<String, SanitizeError> {
    let validator = SqlValidator::default();
    SqlSanitizer::new(&validator).sanitize(sql)
}

#[test]
fn test_appends_default_limit() {
    assert_eq!(
        sanitize("SELECT * FROM orders").unwrap(),
        "SELECT * FROM orders LIMIT 1000;"
    );
    assert_eq!(
        sanitize("SELECT * FROM orders;\n").unwrap(),
        "SELECT * FROM orders LIMIT 1000;"
    );
}

#[test]
fn test_custom_limit() {
    let validator = SqlValidator::default();
    let sanitized = SqlSanitizer::new(&validator)
        .with_limit(25)
        .sanitize("SELECT id FROM clientes")
        .unwrap();
    assert_eq!(sanitized, "SELECT id FROM clientes LIMIT 25;");
}

#[test]
fn test_existing_limit_is_kept() {
    for sql in [
        "SELECT * FROM orders LIMIT 50",
        "select * from orders limit 5 offset 10",
        // any occurrence of the word counts, even inside an identifier
        "SELECT credit_limit FROM accounts",
    ] {
        assert_eq!(sanitize(sql).unwrap(), sql);
    }
}

#[test]
fn test_blank_input() {
    assert_eq!(sanitize("").unwrap(), FALLBACK_QUERY);
    assert_eq!(sanitize(" \n ").unwrap(), FALLBACK_QUERY);
}

#[test]
fn test_trailing_line_comment() {
    assert_eq!(
        sanitize("SELECT id FROM orders -- recent first").unwrap(),
        "SELECT id FROM orders -- recent first\nLIMIT 1000;"
    );
}

#[test]
fn test_rejected_input() {
    let err = sanitize("DROP TABLE users").unwrap_err();
    assert_eq!(
        err.to_string(),
        r"dangerous SQL operation detected (pattern DROP\s+TABLE)"
    );
    match err {
        SanitizeError::Rejected(rejection) => assert_eq!(rejection.rule, Rule::DangerousOperation),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(matches!(
        sanitize("SELEC * FORM users"),
        Err(SanitizeError::Rejected(r)) if r.rule == Rule::InvalidSyntax
    ));
}

#[test]
fn test_row_locks_keep_their_position() {
    assert_eq!(
        sanitize("SELECT * FROM orders FOR UPDATE").unwrap(),
        "SELECT * FROM orders LIMIT 1000 FOR UPDATE;"
    );
    assert_eq!(
        sanitize("SELECT id FROM orders WHERE total > 0 FOR SHARE;").unwrap(),
        "SELECT id FROM orders WHERE total > 0 LIMIT 1000 FOR SHARE;"
    );
}

#[test]
fn test_fetch_first_is_already_bounded() {
    let sql = "SELECT * FROM orders ORDER BY id FETCH FIRST 5 ROWS ONLY";
    assert_eq!(sanitize(sql).unwrap(), sql);
}

#[test]
fn test_appended_limit_past_length_bound_is_internal() {
    // 9995 characters; the clause adds 11 more
    let sql = format!("SELECT '{}'", "x".repeat(9986));
    assert_eq!(sql.chars().count(), 9995);
    assert_eq!(SqlValidator::default().validate(&sql), Ok(()));

    match sanitize(&sql).unwrap_err() {
        SanitizeError::InvariantViolation { rejection, .. } => {
            assert_eq!(rejection.rule, Rule::TooLong)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_sanitized_output_revalidates() {
    let validators = [
        SqlValidator::default(),
        SqlValidator::new(ValidatorOptions {
            strict_mode: true,
            ..ValidatorOptions::default()
        }),
    ];

    let queries = [
        "SELECT * FROM orders",
        "SELECT cliente_id, SUM(total) FROM ventas GROUP BY cliente_id ORDER BY 2 DESC",
        "WITH t AS (SELECT id FROM orders) SELECT * FROM t;",
        "SELECT id FROM orders WHERE estado = 'pagado' -- pagados",
        "SELECT DISTINCT ciudad FROM clientes;;",
        "SELECT * FROM orders OFFSET 20",
        "SELECT * FROM orders FOR UPDATE",
        "SELECT * FROM orders FOR SHARE",
        "SELECT * FROM orders FETCH FIRST 5 ROWS ONLY",
        "SELECT a FROM t UNION SELECT a FROM u",
    ];

    for sql in queries {
        assert_eq!(validators[0].validate(sql), Ok(()), "{sql}");
    }

    for validator in &validators {
        let sanitizer = SqlSanitizer::new(validator);
        for sql in queries {
            // strict mode refuses row locks up front
            if validator.validate(sql).is_err() {
                continue;
            }
            let sanitized = sanitizer.sanitize(sql).unwrap();
            assert_eq!(validator.validate(&sanitized), Ok(()), "{sanitized}");
        }
    }
}
