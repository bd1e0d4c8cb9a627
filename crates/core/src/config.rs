use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::profile::DEFAULT_BROWSING_HISTORY_LIMIT;
use crate::recommendations::{
    CONTENT_SIMILARITY_THRESHOLD, DEFAULT_MAX_RECOMMENDATIONS, DEFAULT_WEIGHTS, TRENDING_THRESHOLD,
};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub recommendations: RecommendationConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationConfig {
    pub max_results: usize,
    pub collaborative_weight: f64,
    pub content_weight: f64,
    pub trending_weight: f64,
    pub content_threshold: f64,
    pub trending_threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub browsing_history_limit: usize,
    pub recompute: RecomputeMode,
    /// Delay a UI host should wait before draining the session queue.
    pub recompute_delay_ms: u64,
    pub restock_increment: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// When recommendations are rebuilt after an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeMode {
    /// Queue a recompute task; it runs on the next flush or read.
    Deferred,
    /// Recompute inside the interaction call.
    Immediate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub max_results: Option<usize>,
    pub recompute: Option<RecomputeMode>,
    pub browsing_history_limit: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recommendations: RecommendationConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RECOMMENDATIONS,
            collaborative_weight: DEFAULT_WEIGHTS.collaborative,
            content_weight: DEFAULT_WEIGHTS.content_based,
            trending_weight: DEFAULT_WEIGHTS.trending,
            content_threshold: CONTENT_SIMILARITY_THRESHOLD,
            trending_threshold: TRENDING_THRESHOLD,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browsing_history_limit: DEFAULT_BROWSING_HISTORY_LIMIT,
            recompute: RecomputeMode::Deferred,
            recompute_delay_ms: 100,
            restock_increment: 10,
        }
    }
}

impl std::str::FromStr for RecomputeMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deferred" => Ok(Self::Deferred),
            "immediate" => Ok(Self::Immediate),
            other => Err(ConfigError::Validation(format!(
                "unsupported recompute mode `{other}` (expected deferred|immediate)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("storefront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(recommendations) = patch.recommendations {
            if let Some(max_results) = recommendations.max_results {
                self.recommendations.max_results = max_results;
            }
            if let Some(weight) = recommendations.collaborative_weight {
                self.recommendations.collaborative_weight = weight;
            }
            if let Some(weight) = recommendations.content_weight {
                self.recommendations.content_weight = weight;
            }
            if let Some(weight) = recommendations.trending_weight {
                self.recommendations.trending_weight = weight;
            }
            if let Some(threshold) = recommendations.content_threshold {
                self.recommendations.content_threshold = threshold;
            }
            if let Some(threshold) = recommendations.trending_threshold {
                self.recommendations.trending_threshold = threshold;
            }
        }

        if let Some(session) = patch.session {
            if let Some(limit) = session.browsing_history_limit {
                self.session.browsing_history_limit = limit;
            }
            if let Some(recompute) = session.recompute {
                self.session.recompute = recompute;
            }
            if let Some(delay) = session.recompute_delay_ms {
                self.session.recompute_delay_ms = delay;
            }
            if let Some(increment) = session.restock_increment {
                self.session.restock_increment = increment;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_MAX_RESULTS") {
            self.recommendations.max_results =
                parse_usize("STOREFRONT_RECOMMENDATIONS_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_COLLABORATIVE_WEIGHT") {
            self.recommendations.collaborative_weight =
                parse_f64("STOREFRONT_RECOMMENDATIONS_COLLABORATIVE_WEIGHT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_CONTENT_WEIGHT") {
            self.recommendations.content_weight =
                parse_f64("STOREFRONT_RECOMMENDATIONS_CONTENT_WEIGHT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_TRENDING_WEIGHT") {
            self.recommendations.trending_weight =
                parse_f64("STOREFRONT_RECOMMENDATIONS_TRENDING_WEIGHT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_CONTENT_THRESHOLD") {
            self.recommendations.content_threshold =
                parse_f64("STOREFRONT_RECOMMENDATIONS_CONTENT_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_RECOMMENDATIONS_TRENDING_THRESHOLD") {
            self.recommendations.trending_threshold =
                parse_f64("STOREFRONT_RECOMMENDATIONS_TRENDING_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_SESSION_BROWSING_HISTORY_LIMIT") {
            self.session.browsing_history_limit =
                parse_usize("STOREFRONT_SESSION_BROWSING_HISTORY_LIMIT", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_SESSION_RECOMPUTE") {
            self.session.recompute = value.parse()?;
        }
        if let Some(value) = read_env("STOREFRONT_SESSION_RECOMPUTE_DELAY_MS") {
            self.session.recompute_delay_ms =
                parse_u64("STOREFRONT_SESSION_RECOMPUTE_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_SESSION_RESTOCK_INCREMENT") {
            self.session.restock_increment =
                parse_u32("STOREFRONT_SESSION_RESTOCK_INCREMENT", &value)?;
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(max_results) = overrides.max_results {
            self.recommendations.max_results = max_results;
        }
        if let Some(recompute) = overrides.recompute {
            self.session.recompute = recompute;
        }
        if let Some(limit) = overrides.browsing_history_limit {
            self.session.browsing_history_limit = limit;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_recommendations(&self.recommendations)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_recommendations(config: &RecommendationConfig) -> Result<(), ConfigError> {
    if config.max_results == 0 || config.max_results > 50 {
        return Err(ConfigError::Validation(
            "recommendations.max_results must be in range 1..=50".to_string(),
        ));
    }

    let unit_fields = [
        ("recommendations.collaborative_weight", config.collaborative_weight),
        ("recommendations.content_weight", config.content_weight),
        ("recommendations.trending_weight", config.trending_weight),
        ("recommendations.content_threshold", config.content_threshold),
        ("recommendations.trending_threshold", config.trending_threshold),
    ];
    for (key, value) in unit_fields {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!("{key} must be in range 0.0..=1.0")));
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.browsing_history_limit == 0 {
        return Err(ConfigError::Validation(
            "session.browsing_history_limit must be greater than zero".to_string(),
        ));
    }

    if session.recompute_delay_ms > 10_000 {
        return Err(ConfigError::Validation(
            "session.recompute_delay_ms must be in range 0..=10000".to_string(),
        ));
    }

    if session.restock_increment == 0 {
        return Err(ConfigError::Validation(
            "session.restock_increment must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    recommendations: Option<RecommendationPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationPatch {
    max_results: Option<usize>,
    collaborative_weight: Option<f64>,
    content_weight: Option<f64>,
    trending_weight: Option<f64>,
    content_threshold: Option<f64>,
    trending_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    browsing_history_limit: Option<usize>,
    recompute: Option<RecomputeMode>,
    recompute_delay_ms: Option<u64>,
    restock_increment: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
