pub mod catalog;
pub mod config;
pub mod recommend;
pub mod simulate;

use serde::Serialize;
use serde_json::Value;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::errors::ApplicationError;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    /// Success payload carrying a structured `data` document.
    pub fn success_with(command: &str, message: impl Into<String>, data: &impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::success_with_data(command, message, value),
            Err(error) => Self::failure(
                command,
                "serialization",
                format!("failed to serialize command output: {error}"),
                3,
            ),
        }
    }

    fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Configuration failures exit with code 2, domain input errors with code 1.
    pub fn from_application_error(command: &str, error: &ApplicationError) -> Self {
        let exit_code = match error {
            ApplicationError::Configuration(_) => 2,
            ApplicationError::Domain(_) => 1,
        };
        Self::failure(command, error.error_class(), error.to_string(), exit_code)
    }
}

/// Load the layered config once per invocation; failures become the `command` payload.
pub fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::from_application_error(
            command,
            &ApplicationError::Configuration(error.to_string()),
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
