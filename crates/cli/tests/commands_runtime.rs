use std::env;
use std::sync::{Mutex, OnceLock, PoisonError};

use serde_json::Value;
use storefront_cli::commands::{self, catalog, config, recommend, simulate};
use storefront_core::config::AppConfig;

#[test]
fn recommend_returns_demo_ranking() {
    with_config(&[], |app_config| {
        let result = recommend::run(app_config);
        assert_eq!(result.exit_code, 0, "expected successful recommend run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "ok");
        assert_eq!(product_ids(&payload["data"]["recommendations"]), vec![6, 8, 2, 5, 7, 9, 10]);
        assert_eq!(payload["data"]["recommendations"][0]["type"], "content-based");
        assert_eq!(payload["data"]["recommendations"][2]["match"], "30% match");
    });
}

#[test]
fn recommend_honors_max_results_from_env() {
    with_config(&[("STOREFRONT_RECOMMENDATIONS_MAX_RESULTS", "3")], |app_config| {
        let result = recommend::run(app_config);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(product_ids(&payload["data"]["recommendations"]), vec![6, 8, 2]);
    });
}

#[test]
fn recommend_returns_config_failure_for_invalid_env() {
    with_env(&[("STOREFRONT_RECOMMENDATIONS_MAX_RESULTS", "0")], || {
        let result = match commands::load_config("recommend") {
            Ok(_) => panic!("max_results = 0 should fail validation"),
            Err(failure) => failure,
        };
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn simulate_purchase_updates_profile_and_recommendations() {
    with_config(&[], |app_config| {
        let events = ["purchase:6".to_string(), "view:9".to_string()];
        let result = simulate::run(app_config, &events, false);
        assert_eq!(result.exit_code, 0, "expected successful simulate run");

        let payload = parse_payload(&result.output);
        let data = &payload["data"];
        assert_eq!(data["outcomes"][0]["outcome"], "applied");
        assert_eq!(data["profile"]["purchase_history"], serde_json::json!([1, 3, 4, 6]));
        let electronics = data["profile"]["preferences"]["electronics"].as_f64().unwrap_or(0.0);
        assert!((electronics - 1.0).abs() < 1e-9);
        assert_eq!(data["profile"]["browsing_history"], serde_json::json!([1, 2, 3, 6, 7, 9]));
        assert!(!product_ids(&data["recommendations"]).contains(&6));
    });
}

#[test]
fn simulate_reports_unknown_products_without_failing() {
    with_config(&[], |app_config| {
        let result = simulate::run(app_config, &["view:404".to_string()], false);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["outcomes"][0]["outcome"], "unknown_product");
        assert_eq!(product_ids(&payload["data"]["recommendations"]), vec![6, 8, 2, 5, 7, 9, 10]);
    });
}

#[test]
fn simulate_checkout_records_purchases() {
    with_config(&[], |app_config| {
        let events = ["cart_add:7".to_string(), "cart-add:7".to_string()];
        let result = simulate::run(app_config, &events, true);
        assert_eq!(result.exit_code, 0, "expected successful checkout");

        let payload = parse_payload(&result.output);
        let data = &payload["data"];
        assert_eq!(data["checkout"]["total"], "99.98");
        assert_eq!(data["checkout"]["lines"][0]["quantity"], 2);
        assert_eq!(data["cart"]["item_count"], 0);
        assert_eq!(data["profile"]["purchase_history"], serde_json::json!([1, 3, 4, 7]));
    });
}

#[test]
fn simulate_rejects_malformed_events() {
    with_config(&[], |app_config| {
        for raw in ["view8", "dance:3", "view:eight"] {
            let result = simulate::run(app_config, &[raw.to_string()], false);
            assert_eq!(result.exit_code, 1, "expected input error for `{raw}`");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["error_class"], "invalid_event");
        }
    });
}

#[test]
fn simulate_maps_domain_errors_to_error_classes() {
    with_config(&[], |app_config| {
        let unknown = simulate::run(app_config, &["cart_add:999".to_string()], false);
        assert_eq!(unknown.exit_code, 1);
        assert_eq!(parse_payload(&unknown.output)["error_class"], "unknown_product");

        let empty = simulate::run(app_config, &[], true);
        assert_eq!(empty.exit_code, 1);
        assert_eq!(parse_payload(&empty.output)["error_class"], "empty_cart");
    });
}

#[test]
fn catalog_filters_by_term_and_category() {
    let result = catalog::run(Some("WIRELESS"), Some("electronics"));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(ids_at(&payload["data"]["products"], "id"), vec![1, 6, 8]);
    assert_eq!(payload["data"]["categories"].as_array().map(Vec::len), Some(6));
    assert_eq!(payload["data"]["featured"], serde_json::json!([1, 3, 6]));

    let everything = parse_payload(&catalog::run(None, Some("all")).output);
    assert_eq!(everything["data"]["products"].as_array().map(Vec::len), Some(10));
}

#[test]
fn catalog_rows_expose_product_ids_under_id() {
    let payload = parse_payload(&catalog::run(Some("lamp"), None).output);
    let rows = &payload["data"]["products"];

    assert_eq!(ids_at(rows, "id"), vec![10]);
    assert!(ids_at(rows, "product_id").is_empty());
}

#[test]
fn config_reports_sources() {
    with_config(&[("STOREFRONT_LOG_LEVEL", "warn")], |app_config| {
        let result = config::run(app_config);
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains("- recommendations.max_results = 8 (source: default)"));
        assert!(result
            .output
            .contains("- logging.level = warn (source: env (STOREFRONT_LOG_LEVEL))"));
    });
}

#[test]
fn config_returns_failure_for_invalid_recompute_mode() {
    with_env(&[("STOREFRONT_SESSION_RECOMPUTE", "eventually")], || {
        let result = match commands::load_config("config") {
            Ok(_) => panic!("unknown recompute mode should fail validation"),
            Err(failure) => failure,
        };
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn parse_event_accepts_action_and_id() {
    let event = simulate::parse_event("purchase:5").expect("valid event");
    assert_eq!(event.product_id.0, 5);
    assert_eq!(event.kind.as_str(), "purchase");
}

fn product_ids(rows: &Value) -> Vec<u64> {
    ids_at(rows, "product_id")
}

fn ids_at(rows: &Value, field: &str) -> Vec<u64> {
    rows.as_array()
        .map(|rows| rows.iter().filter_map(|row| row[field].as_u64()).collect())
        .unwrap_or_default()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_config(vars: &[(&str, &str)], test_fn: impl FnOnce(&AppConfig)) {
    with_env(vars, || match commands::load_config("test") {
        Ok(app_config) => test_fn(&app_config),
        Err(failure) => panic!("config should load: {}", failure.output),
    });
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    // A failed assertion in one test must not poison the lock for the rest.
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(PoisonError::into_inner);

    let keys = [
        "STOREFRONT_RECOMMENDATIONS_MAX_RESULTS",
        "STOREFRONT_RECOMMENDATIONS_COLLABORATIVE_WEIGHT",
        "STOREFRONT_RECOMMENDATIONS_CONTENT_WEIGHT",
        "STOREFRONT_RECOMMENDATIONS_TRENDING_WEIGHT",
        "STOREFRONT_RECOMMENDATIONS_CONTENT_THRESHOLD",
        "STOREFRONT_RECOMMENDATIONS_TRENDING_THRESHOLD",
        "STOREFRONT_SESSION_BROWSING_HISTORY_LIMIT",
        "STOREFRONT_SESSION_RECOMPUTE",
        "STOREFRONT_SESSION_RECOMPUTE_DELAY_MS",
        "STOREFRONT_SESSION_RESTOCK_INCREMENT",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
