use std::sync::Arc;

use serde::Serialize;
use zoomx_api::{AdminApi, ApiError, HttpAdminApi};
use zoomx_core::config::{AppConfig, LoadOptions};
use zoomx_core::session::Session;

use super::{CommandResult, EXIT_CONFIG, EXIT_REQUEST, EXIT_SESSION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
    #[serde(skip)]
    exit_code: u8,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = report.exit_code;

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_operator(&config));

            let reachability = check_api_reachability(&config);
            if let Err(code) = reachability.1 {
                exit_code = code;
            }
            checks.push(reachability.0);
        }
        Err(error) => {
            exit_code = EXIT_CONFIG;
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "operator_identity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "admin_api_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks, exit_code }
}

fn check_operator(config: &AppConfig) -> DoctorCheck {
    match config.session.operator_code {
        Some(code) => DoctorCheck {
            name: "operator_identity",
            status: CheckStatus::Pass,
            details: format!("decisions will be recorded for operator {code}"),
        },
        None => DoctorCheck {
            name: "operator_identity",
            status: CheckStatus::Skipped,
            details: "session.operator_code is unset; approve is unavailable".to_string(),
        },
    }
}

fn check_api_reachability(config: &AppConfig) -> (DoctorCheck, Result<(), u8>) {
    const NAME: &str = "admin_api_reachability";

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return (
                DoctorCheck {
                    name: NAME,
                    status: CheckStatus::Fail,
                    details: format!("failed to initialize async runtime: {error}"),
                },
                Err(super::EXIT_FAILURE),
            );
        }
    };

    let session = Arc::new(Session::from_config(&config.session));
    let result = HttpAdminApi::from_config(&config.api, session)
        .and_then(|api| runtime.block_on(async move { api.list_requests().await }));

    match result {
        Ok(requests) => (
            DoctorCheck {
                name: NAME,
                status: CheckStatus::Pass,
                details: format!(
                    "listed {} requests from `{}`",
                    requests.len(),
                    config.api.base_url
                ),
            },
            Ok(()),
        ),
        Err(ApiError::SessionExpired { status }) => (
            DoctorCheck {
                name: NAME,
                status: CheckStatus::Fail,
                details: format!(
                    "session token rejected (status {})",
                    status.map(|status| status.to_string()).unwrap_or_else(|| "n/a".to_string())
                ),
            },
            Err(EXIT_SESSION),
        ),
        Err(error) => (
            DoctorCheck { name: NAME, status: CheckStatus::Fail, details: error.to_string() },
            Err(EXIT_REQUEST),
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
