use std::sync::Arc;

use serde::Serialize;
use zoomx_core::config::LoadOptions;
use zoomx_core::domain::request::RequestCode;
use zoomx_core::domain::worker::{OperatorCode, WorkerCode};
use zoomx_core::errors::{ApplicationError, ValidationError};
use zoomx_dispatch::{AutoConfirm, Confirmer, WorkflowOutcome};

use super::{load_config, open_console, runtime, CommandResult};
use crate::view::{LogAlert, StdinConfirmer};

#[derive(Serialize)]
struct DecisionPayload {
    request: RequestCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    worker: Option<WorkerCode>,
    refreshed: bool,
}

fn confirmer(assume_yes: bool) -> Arc<dyn Confirmer> {
    if assume_yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(StdinConfirmer)
    }
}

pub fn approve(
    options: &LoadOptions,
    code: RequestCode,
    worker: Option<WorkerCode>,
    assume_yes: bool,
) -> CommandResult {
    const COMMAND: &str = "approve";

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let Some(operator) = config.session.operator_code.map(OperatorCode) else {
        return CommandResult::from_error(
            COMMAND,
            ApplicationError::Validation(ValidationError::MissingOperator),
        );
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let console = match open_console(COMMAND, config, confirmer(assume_yes), Arc::new(LogAlert)) {
        Ok(console) => console,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        console.store.initial_load().await.map_err(ApplicationError::from)?;
        console.workflow.approve(code, worker, operator).await
    });

    match outcome {
        Ok(WorkflowOutcome::Approved { refreshed }) => CommandResult::success_with_data(
            COMMAND,
            format!("request {code} accepted"),
            DecisionPayload { request: code, worker, refreshed },
        ),
        Ok(WorkflowOutcome::Cancelled) => CommandResult::cancelled(COMMAND),
        Ok(other) => CommandResult::failure(
            COMMAND,
            "internal",
            format!("unexpected workflow outcome {other:?}"),
            super::EXIT_FAILURE,
        ),
        Err(error) => CommandResult::from_error(COMMAND, error),
    }
}

pub fn reject(options: &LoadOptions, code: RequestCode, assume_yes: bool) -> CommandResult {
    const COMMAND: &str = "reject";

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let console = match open_console(COMMAND, config, confirmer(assume_yes), Arc::new(LogAlert)) {
        Ok(console) => console,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        console.store.initial_load().await.map_err(ApplicationError::from)?;
        console.workflow.reject(code).await
    });

    match outcome {
        Ok(WorkflowOutcome::Rejected { refreshed }) => CommandResult::success_with_data(
            COMMAND,
            format!("request {code} refused"),
            DecisionPayload { request: code, worker: None, refreshed },
        ),
        Ok(WorkflowOutcome::Cancelled) => CommandResult::cancelled(COMMAND),
        Ok(other) => CommandResult::failure(
            COMMAND,
            "internal",
            format!("unexpected workflow outcome {other:?}"),
            super::EXIT_FAILURE,
        ),
        Err(error) => CommandResult::from_error(COMMAND, error),
    }
}
