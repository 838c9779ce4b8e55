use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::AlertPolicy;
use crate::projection::PageResetPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub polling: PollingConfig,
    pub view: ViewConfig,
    pub notification: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub token: SecretString,
    pub operator_code: Option<u64>,
    pub redirect_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub refresh_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ViewConfig {
    pub page_size: usize,
    pub reset_page_on_filter_change: bool,
    pub toast_secs: u64,
}

#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub policy: AlertPolicy,
    pub bell: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
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
    pub api_base_url: Option<String>,
    pub session_token: Option<String>,
    pub operator_code: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub page_size: Option<usize>,
    pub notification_policy: Option<AlertPolicy>,
    pub log_level: Option<String>,
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
            api: ApiConfig { base_url: "http://localhost:3000".to_string(), timeout_secs: 15 },
            session: SessionConfig {
                token: String::new().into(),
                operator_code: None,
                redirect_delay_ms: 2_000,
            },
            polling: PollingConfig { refresh_interval_secs: 12 },
            view: ViewConfig { page_size: 10, reset_page_on_filter_change: true, toast_secs: 3 },
            notification: NotificationConfig { policy: AlertPolicy::EverySnapshot, bell: true },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SessionConfig {
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl PollingConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl ViewConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }

    pub fn page_reset_policy(&self) -> PageResetPolicy {
        if self.reset_page_on_filter_change {
            PageResetPolicy::ResetOnFilterChange
        } else {
            PageResetPolicy::Preserve
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for AlertPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "every_snapshot" => Ok(Self::EverySnapshot),
            "new_pending_only" => Ok(Self::NewPendingOnly),
            other => Err(ConfigError::Validation(format!(
                "unsupported notification policy `{other}` (expected every_snapshot|new_pending_only)"
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("zoomx.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(api) = patch.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(token) = session.token {
                self.session.token = secret_value(token);
            }
            if let Some(operator_code) = session.operator_code {
                self.session.operator_code = Some(operator_code);
            }
            if let Some(redirect_delay_ms) = session.redirect_delay_ms {
                self.session.redirect_delay_ms = redirect_delay_ms;
            }
        }

        if let Some(polling) = patch.polling {
            if let Some(refresh_interval_secs) = polling.refresh_interval_secs {
                self.polling.refresh_interval_secs = refresh_interval_secs;
            }
        }

        if let Some(view) = patch.view {
            if let Some(page_size) = view.page_size {
                self.view.page_size = page_size;
            }
            if let Some(reset) = view.reset_page_on_filter_change {
                self.view.reset_page_on_filter_change = reset;
            }
            if let Some(toast_secs) = view.toast_secs {
                self.view.toast_secs = toast_secs;
            }
        }

        if let Some(notification) = patch.notification {
            if let Some(policy) = notification.policy {
                self.notification.policy = policy;
            }
            if let Some(bell) = notification.bell {
                self.notification.bell = bell;
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
        if let Some(value) = read_env("ZOOMX_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = read_env("ZOOMX_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("ZOOMX_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ZOOMX_SESSION_TOKEN") {
            self.session.token = secret_value(value);
        }
        if let Some(value) = read_env("ZOOMX_SESSION_OPERATOR_CODE") {
            self.session.operator_code = Some(parse_u64("ZOOMX_SESSION_OPERATOR_CODE", &value)?);
        }
        if let Some(value) = read_env("ZOOMX_SESSION_REDIRECT_DELAY_MS") {
            self.session.redirect_delay_ms = parse_u64("ZOOMX_SESSION_REDIRECT_DELAY_MS", &value)?;
        }

        if let Some(value) = read_env("ZOOMX_POLLING_REFRESH_INTERVAL_SECS") {
            self.polling.refresh_interval_secs =
                parse_u64("ZOOMX_POLLING_REFRESH_INTERVAL_SECS", &value)?;
        }

        if let Some(value) = read_env("ZOOMX_VIEW_PAGE_SIZE") {
            self.view.page_size = parse_usize("ZOOMX_VIEW_PAGE_SIZE", &value)?;
        }
        if let Some(value) = read_env("ZOOMX_VIEW_RESET_PAGE_ON_FILTER_CHANGE") {
            self.view.reset_page_on_filter_change =
                parse_bool("ZOOMX_VIEW_RESET_PAGE_ON_FILTER_CHANGE", &value)?;
        }
        if let Some(value) = read_env("ZOOMX_VIEW_TOAST_SECS") {
            self.view.toast_secs = parse_u64("ZOOMX_VIEW_TOAST_SECS", &value)?;
        }

        if let Some(value) = read_env("ZOOMX_NOTIFICATION_POLICY") {
            self.notification.policy = value.parse()?;
        }
        if let Some(value) = read_env("ZOOMX_NOTIFICATION_BELL") {
            self.notification.bell = parse_bool("ZOOMX_NOTIFICATION_BELL", &value)?;
        }

        let log_level = read_env("ZOOMX_LOGGING_LEVEL").or_else(|| read_env("ZOOMX_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("ZOOMX_LOGGING_FORMAT").or_else(|| read_env("ZOOMX_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.api_base_url {
            self.api.base_url = base_url;
        }
        if let Some(token) = overrides.session_token {
            self.session.token = secret_value(token);
        }
        if let Some(operator_code) = overrides.operator_code {
            self.session.operator_code = Some(operator_code);
        }
        if let Some(refresh_interval_secs) = overrides.refresh_interval_secs {
            self.polling.refresh_interval_secs = refresh_interval_secs;
        }
        if let Some(page_size) = overrides.page_size {
            self.view.page_size = page_size;
        }
        if let Some(policy) = overrides.notification_policy {
            self.notification.policy = policy;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api(&self.api)?;
        validate_session(&self.session)?;
        validate_polling(&self.polling)?;
        validate_view(&self.view)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("zoomx.toml"), PathBuf::from("config/zoomx.toml")]
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

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    let base_url = api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "api.base_url must start with http:// or https://".to_string(),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > 120 {
        return Err(ConfigError::Validation("api.timeout_secs must be in range 1..=120".to_string()));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    let token = session.token.expose_secret();
    if token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "session.token is required. Sign in to the ZoomX admin panel and copy the bearer token, or set ZOOMX_SESSION_TOKEN".to_string(),
        ));
    }
    if token.trim().to_ascii_lowercase().starts_with("bearer ") {
        return Err(ConfigError::Validation(
            "session.token must be the raw token without the `Bearer ` prefix".to_string(),
        ));
    }

    if session.redirect_delay_ms > 60_000 {
        return Err(ConfigError::Validation(
            "session.redirect_delay_ms must be at most 60000".to_string(),
        ));
    }

    Ok(())
}

fn validate_polling(polling: &PollingConfig) -> Result<(), ConfigError> {
    if polling.refresh_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "polling.refresh_interval_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_view(view: &ViewConfig) -> Result<(), ConfigError> {
    if view.page_size == 0 || view.page_size > 500 {
        return Err(ConfigError::Validation("view.page_size must be in range 1..=500".to_string()));
    }

    if view.toast_secs == 0 {
        return Err(ConfigError::Validation(
            "view.toast_secs must be greater than zero".to_string(),
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

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    api: Option<ApiPatch>,
    session: Option<SessionPatch>,
    polling: Option<PollingPatch>,
    view: Option<ViewPatch>,
    notification: Option<NotificationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    token: Option<String>,
    operator_code: Option<u64>,
    redirect_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PollingPatch {
    refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ViewPatch {
    page_size: Option<usize>,
    reset_page_on_filter_change: Option<bool>,
    toast_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationPatch {
    policy: Option<AlertPolicy>,
    bell: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::notification::AlertPolicy;
    use crate::projection::PageResetPolicy;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_dashboard_behavior() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_SESSION_TOKEN", "tok-default");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.polling.refresh_interval_secs == 12, "poll every 12 seconds")?;
            ensure(config.view.page_size == 10, "ten requests per page")?;
            ensure(
                config.view.page_reset_policy() == PageResetPolicy::ResetOnFilterChange,
                "filter changes should reset the page",
            )?;
            ensure(
                config.notification.policy == AlertPolicy::EverySnapshot,
                "alert on every snapshot with pending requests",
            )?;
            ensure(config.session.redirect_delay_ms == 2_000, "redirect after two seconds")?;
            Ok(())
        })();

        clear_vars(&["ZOOMX_SESSION_TOKEN"]);
        result
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ZOOMX_TOKEN", "tok-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("zoomx.toml");
            fs::write(
                &path,
                r#"
[session]
token = "${TEST_ZOOMX_TOKEN}"
operator_code = 7

[notification]
policy = "new_pending_only"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.session.token.expose_secret() == "tok-from-env",
                "token should be loaded from environment",
            )?;
            ensure(config.session.operator_code == Some(7), "operator code from file")?;
            ensure(
                config.notification.policy == AlertPolicy::NewPendingOnly,
                "notification policy from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_ZOOMX_TOKEN"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_SESSION_TOKEN", "tok-test");
        env::set_var("ZOOMX_LOG_LEVEL", "warn");
        env::set_var("ZOOMX_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["ZOOMX_SESSION_TOKEN", "ZOOMX_LOG_LEVEL", "ZOOMX_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_API_BASE_URL", "https://env.zoomx.test");
        env::set_var("ZOOMX_SESSION_TOKEN", "tok-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("zoomx.toml");
            fs::write(
                &path,
                r#"
[api]
base_url = "https://file.zoomx.test"

[session]
token = "tok-from-file"

[polling]
refresh_interval_secs = 30

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    api_base_url: Some("https://override.zoomx.test".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.api.base_url == "https://override.zoomx.test",
                "override base url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.session.token.expose_secret() == "tok-from-env",
                "env token should win over file and defaults",
            )?;
            ensure(config.polling.refresh_interval_secs == 30, "file value beats default")?;
            Ok(())
        })();

        clear_vars(&["ZOOMX_API_BASE_URL", "ZOOMX_SESSION_TOKEN"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&["ZOOMX_SESSION_TOKEN"]);

        let error = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("session.token")
        );
        ensure(has_message, "validation failure should mention session.token")
    }

    #[test]
    fn bearer_prefixed_token_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_SESSION_TOKEN", "Bearer abc");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected bearer-prefixed token to be rejected".to_string()),
            Err(ConfigError::Validation(message)) => {
                ensure(message.contains("Bearer"), "message should explain the prefix")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["ZOOMX_SESSION_TOKEN"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_SESSION_TOKEN", "tok-test");
        env::set_var("ZOOMX_VIEW_PAGE_SIZE", "ten");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid page size to fail".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "ZOOMX_VIEW_PAGE_SIZE", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["ZOOMX_SESSION_TOKEN", "ZOOMX_VIEW_PAGE_SIZE"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ZOOMX_SESSION_TOKEN", "tok-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("tok-secret-value"), "debug output should not contain token")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["ZOOMX_SESSION_TOKEN"]);
        result
    }
}
