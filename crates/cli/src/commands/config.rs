use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;
use zoomx_core::config::{AppConfig, LoadOptions};

use super::{CommandResult, EXIT_CONFIG};

struct Field {
    key: &'static str,
    env_key: &'static str,
    value: String,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "api.base_url",
            env_key: "ZOOMX_API_BASE_URL",
            value: config.api.base_url.clone(),
        },
        Field {
            key: "api.timeout_secs",
            env_key: "ZOOMX_API_TIMEOUT_SECS",
            value: config.api.timeout_secs.to_string(),
        },
        Field {
            key: "session.token",
            env_key: "ZOOMX_SESSION_TOKEN",
            value: redact_token(config.session.token.expose_secret()),
        },
        Field {
            key: "session.operator_code",
            env_key: "ZOOMX_SESSION_OPERATOR_CODE",
            value: config
                .session
                .operator_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "session.redirect_delay_ms",
            env_key: "ZOOMX_SESSION_REDIRECT_DELAY_MS",
            value: config.session.redirect_delay_ms.to_string(),
        },
        Field {
            key: "polling.refresh_interval_secs",
            env_key: "ZOOMX_POLLING_REFRESH_INTERVAL_SECS",
            value: config.polling.refresh_interval_secs.to_string(),
        },
        Field {
            key: "view.page_size",
            env_key: "ZOOMX_VIEW_PAGE_SIZE",
            value: config.view.page_size.to_string(),
        },
        Field {
            key: "view.reset_page_on_filter_change",
            env_key: "ZOOMX_VIEW_RESET_PAGE_ON_FILTER_CHANGE",
            value: config.view.reset_page_on_filter_change.to_string(),
        },
        Field {
            key: "view.toast_secs",
            env_key: "ZOOMX_VIEW_TOAST_SECS",
            value: config.view.toast_secs.to_string(),
        },
        Field {
            key: "notification.policy",
            env_key: "ZOOMX_NOTIFICATION_POLICY",
            value: format!("{:?}", config.notification.policy),
        },
        Field {
            key: "notification.bell",
            env_key: "ZOOMX_NOTIFICATION_BELL",
            value: config.notification.bell.to_string(),
        },
        Field {
            key: "logging.level",
            env_key: "ZOOMX_LOGGING_LEVEL",
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_key: "ZOOMX_LOGGING_FORMAT",
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("zoomx.toml"), PathBuf::from("config/zoomx.toml")]
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
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
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

/// Keeps the last four characters so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
