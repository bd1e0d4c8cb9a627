use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use storefront_core::config::AppConfig;
use toml::Value;

use crate::commands::CommandResult;

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run(config: &AppConfig) -> CommandResult {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string()
    ];
    for field in effective_fields(config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn effective_fields(config: &AppConfig) -> Vec<ConfigField> {
    let recommendations = &config.recommendations;
    let session = &config.session;

    vec![
        ConfigField {
            key_path: "recommendations.max_results",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_MAX_RESULTS"],
            value: recommendations.max_results.to_string(),
        },
        ConfigField {
            key_path: "recommendations.collaborative_weight",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_COLLABORATIVE_WEIGHT"],
            value: recommendations.collaborative_weight.to_string(),
        },
        ConfigField {
            key_path: "recommendations.content_weight",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_CONTENT_WEIGHT"],
            value: recommendations.content_weight.to_string(),
        },
        ConfigField {
            key_path: "recommendations.trending_weight",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_TRENDING_WEIGHT"],
            value: recommendations.trending_weight.to_string(),
        },
        ConfigField {
            key_path: "recommendations.content_threshold",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_CONTENT_THRESHOLD"],
            value: recommendations.content_threshold.to_string(),
        },
        ConfigField {
            key_path: "recommendations.trending_threshold",
            env_keys: &["STOREFRONT_RECOMMENDATIONS_TRENDING_THRESHOLD"],
            value: recommendations.trending_threshold.to_string(),
        },
        ConfigField {
            key_path: "session.browsing_history_limit",
            env_keys: &["STOREFRONT_SESSION_BROWSING_HISTORY_LIMIT"],
            value: session.browsing_history_limit.to_string(),
        },
        ConfigField {
            key_path: "session.recompute",
            env_keys: &["STOREFRONT_SESSION_RECOMPUTE"],
            value: format!("{:?}", session.recompute),
        },
        ConfigField {
            key_path: "session.recompute_delay_ms",
            env_keys: &["STOREFRONT_SESSION_RECOMPUTE_DELAY_MS"],
            value: session.recompute_delay_ms.to_string(),
        },
        ConfigField {
            key_path: "session.restock_increment",
            env_keys: &["STOREFRONT_SESSION_RESTOCK_INCREMENT"],
            value: session.restock_increment.to_string(),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn file_source_is_reported_for_present_keys() {
        let doc: Value = "[session]\nrecompute = \"immediate\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "session.recompute"));
        assert!(!contains_path(&doc, "session.restock_increment"));
        assert_eq!(
            field_source("session.recompute", &["STOREFRONT_TEST_UNSET_KEY"], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(
            field_source("logging.level", &["STOREFRONT_TEST_UNSET_KEY"], Some(&doc), None),
            "default"
        );
    }
}
