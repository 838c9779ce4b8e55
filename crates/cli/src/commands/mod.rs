pub mod config;
pub mod decide;
pub mod doctor;
pub mod export;
pub mod requests;
pub mod summary;
pub mod watch;
pub mod workers;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;
use zoomx_core::config::{AppConfig, LoadOptions};
use zoomx_core::errors::ApplicationError;
use zoomx_core::notification::AlertSink;
use zoomx_dispatch::{Confirmer, Console, ViewBindings};

use crate::view::TerminalSurface;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_SESSION: u8 = 3;
pub const EXIT_REQUEST: u8 = 4;
pub const EXIT_CANCELLED: u8 = 5;

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
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_payload(command, message.into(), None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::success_payload(command, message.into(), Some(data)),
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_FAILURE),
        }
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

    pub fn cancelled(command: &str) -> Self {
        Self::failure(command, "cancelled", "operator declined the confirmation", EXIT_CANCELLED)
    }

    /// Maps an application failure onto the CLI exit-code contract.
    pub fn from_error(command: &str, error: ApplicationError) -> Self {
        let exit_code = match &error {
            ApplicationError::SessionExpired { .. } => EXIT_SESSION,
            ApplicationError::Configuration(_) => EXIT_CONFIG,
            ApplicationError::Domain(_)
            | ApplicationError::Validation(_)
            | ApplicationError::Request { .. }
            | ApplicationError::Integration(_) => EXIT_REQUEST,
        };
        let message = error.toast_message();
        let interface = error.into_interface(command);
        Self::failure(command, interface.error_class(), message, exit_code)
    }

    fn success_payload(command: &str, message: String, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            data,
        };
        Self { exit_code: EXIT_OK, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime",
            format!("failed to initialize async runtime: {error}"),
            EXIT_FAILURE,
        )
    })
}

pub(crate) fn open_console(
    command: &str,
    config: AppConfig,
    confirmer: Arc<dyn Confirmer>,
    alert: Arc<dyn AlertSink>,
) -> Result<Console, CommandResult> {
    let bindings = ViewBindings { surface: Arc::new(TerminalSurface), confirmer, alert };
    Console::bootstrap(config, bindings).map_err(|error| {
        CommandResult::failure(command, "service_unavailable", error.to_string(), EXIT_REQUEST)
    })
}

/// Config, runtime and console for a one-shot command that never prompts.
pub(crate) fn prepare(
    command: &str,
    options: &LoadOptions,
) -> Result<(Runtime, Console), CommandResult> {
    let config = load_config(command, options)?;
    let runtime = runtime(command)?;
    let console = open_console(
        command,
        config,
        Arc::new(zoomx_dispatch::AutoConfirm(false)),
        Arc::new(crate::view::LogAlert),
    )?;
    Ok((runtime, console))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use zoomx_core::errors::{ApplicationError, ValidationError};

    use super::{CommandResult, EXIT_REQUEST, EXIT_SESSION};

    fn payload(result: &CommandResult) -> Value {
        serde_json::from_str(&result.output).expect("valid json")
    }

    #[test]
    fn session_errors_exit_with_session_code() {
        let result = CommandResult::from_error(
            "requests",
            ApplicationError::SessionExpired { status: Some(403) },
        );

        assert_eq!(result.exit_code, EXIT_SESSION);
        assert_eq!(payload(&result)["error_class"], "session_expired");
    }

    #[test]
    fn validation_errors_exit_with_request_code() {
        let result = CommandResult::from_error(
            "approve",
            ApplicationError::Validation(ValidationError::MissingWorker),
        );

        assert_eq!(result.exit_code, EXIT_REQUEST);
        let payload = payload(&result);
        assert_eq!(payload["error_class"], "bad_request");
        assert_eq!(payload["status"], "error");
    }

    #[test]
    fn server_messages_are_passed_through() {
        let result = CommandResult::from_error(
            "reject",
            ApplicationError::Request { status: Some(409), message: "já recusada".to_string() },
        );

        assert_eq!(payload(&result)["message"], "já recusada");
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let result = CommandResult::success("summary", "done");
        assert!(payload(&result).get("data").is_none());
    }
}
