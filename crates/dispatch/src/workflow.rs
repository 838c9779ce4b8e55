use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;
use zoomx_api::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey};
use zoomx_core::domain::request::{RequestCode, RequestStatus};
use zoomx_core::domain::worker::{OperatorCode, Worker, WorkerCode};
use zoomx_core::errors::{ApplicationError, ValidationError};

use crate::store::RequestStore;
use crate::view::{ConfirmationPrompt, Confirmer, Decision};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// `refreshed` reports whether the follow-up list refresh succeeded.
    Approved { refreshed: bool },
    Rejected { refreshed: bool },
    Cancelled,
}

/// Approve and reject decisions for pending requests.
///
/// Every decision is checked against the store's current snapshot before it
/// leaves the console, then sent once with its own idempotency key. Nothing
/// is retried; a successful decision triggers exactly one list refresh.
pub struct ApprovalWorkflow {
    api: Arc<dyn AdminApi>,
    store: Arc<RequestStore>,
    confirmer: Arc<dyn Confirmer>,
    workers: RwLock<Option<Arc<Vec<Worker>>>>,
}

impl ApprovalWorkflow {
    pub fn new(
        api: Arc<dyn AdminApi>,
        store: Arc<RequestStore>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self { api, store, confirmer, workers: RwLock::new(None) }
    }

    pub fn store(&self) -> &Arc<RequestStore> {
        &self.store
    }

    /// Fetches the assignable-worker directory and caches it.
    pub async fn load_workers(&self) -> Result<Arc<Vec<Worker>>, ApplicationError> {
        let correlation_id = Uuid::new_v4().to_string();
        match self.api.list_active_workers().await {
            Ok(workers) => {
                let workers = Arc::new(workers);
                *self.workers.write().await = Some(Arc::clone(&workers));
                info!(
                    event_name = "dispatch.workflow.workers_loaded",
                    correlation_id = %correlation_id,
                    count = workers.len(),
                    "assignable workers loaded"
                );
                Ok(workers)
            }
            Err(error) => Err(self.surface_api_error(error, &correlation_id)),
        }
    }

    async fn workers(&self) -> Result<Arc<Vec<Worker>>, ApplicationError> {
        if let Some(workers) = self.workers.read().await.as_ref() {
            return Ok(Arc::clone(workers));
        }
        self.load_workers().await
    }

    pub async fn approve(
        &self,
        code: RequestCode,
        worker: Option<WorkerCode>,
        operator: OperatorCode,
    ) -> Result<WorkflowOutcome, ApplicationError> {
        let correlation_id = Uuid::new_v4().to_string();

        let Some(worker) = worker else {
            return Err(self.reject_locally(ValidationError::MissingWorker.into(), &correlation_id));
        };
        self.check_transition(code, RequestStatus::Aceita, &correlation_id).await?;

        let directory = self.workers().await?;
        if directory.is_empty() {
            return Err(
                self.reject_locally(ValidationError::NoAssignableWorkers.into(), &correlation_id)
            );
        }
        if !directory.iter().any(|candidate| candidate.code == worker) {
            return Err(self.reject_locally(
                ValidationError::UnknownWorker { worker }.into(),
                &correlation_id,
            ));
        }

        let prompt =
            ConfirmationPrompt { decision: Decision::Approve, request: code, worker: Some(worker) };
        if !self.confirmer.confirm(&prompt).await {
            return Ok(self.cancelled(&prompt, &correlation_id));
        }

        let key = IdempotencyKey::generate();
        let assignment = ApprovalAssignment { worker, operator };
        info!(
            event_name = "dispatch.workflow.approve_submitted",
            correlation_id = %correlation_id,
            request = %code,
            worker = %worker,
            operator = %operator,
            idempotency_key = %key,
            "submitting approval"
        );
        if let Err(error) = self.api.approve_request(code, &assignment, &key).await {
            return Err(self.surface_api_error(error, &correlation_id));
        }

        self.store.notifier().success(format!("Solicitação {code} aceita com sucesso"));
        let refreshed = self.refresh_after_decision(&correlation_id).await;
        Ok(WorkflowOutcome::Approved { refreshed })
    }

    pub async fn reject(&self, code: RequestCode) -> Result<WorkflowOutcome, ApplicationError> {
        let correlation_id = Uuid::new_v4().to_string();
        self.check_transition(code, RequestStatus::Recusada, &correlation_id).await?;

        let prompt = ConfirmationPrompt { decision: Decision::Reject, request: code, worker: None };
        if !self.confirmer.confirm(&prompt).await {
            return Ok(self.cancelled(&prompt, &correlation_id));
        }

        let key = IdempotencyKey::generate();
        info!(
            event_name = "dispatch.workflow.reject_submitted",
            correlation_id = %correlation_id,
            request = %code,
            idempotency_key = %key,
            "submitting rejection"
        );
        if let Err(error) = self.api.reject_request(code, &key).await {
            return Err(self.surface_api_error(error, &correlation_id));
        }

        self.store.notifier().success(format!("Solicitação {code} recusada"));
        let refreshed = self.refresh_after_decision(&correlation_id).await;
        Ok(WorkflowOutcome::Rejected { refreshed })
    }

    async fn check_transition(
        &self,
        code: RequestCode,
        next: RequestStatus,
        correlation_id: &str,
    ) -> Result<(), ApplicationError> {
        let Some(request) = self.store.find(code).await else {
            return Err(
                self.reject_locally(ValidationError::UnknownRequest { code }.into(), correlation_id)
            );
        };

        let mut candidate = request;
        candidate
            .transition_to(next)
            .map_err(|error| self.reject_locally(error.into(), correlation_id))
    }

    fn reject_locally(&self, error: ApplicationError, correlation_id: &str) -> ApplicationError {
        warn!(
            event_name = "dispatch.workflow.rejected_locally",
            correlation_id = %correlation_id,
            error = %error,
            "decision refused before reaching the admin api"
        );
        self.store.notifier().error(error.toast_message());
        error
    }

    fn surface_api_error(&self, error: ApiError, correlation_id: &str) -> ApplicationError {
        if error.is_session_expired() {
            return self.store.handle_session_expired(error.status(), correlation_id).into();
        }

        warn!(
            event_name = "dispatch.workflow.request_failed",
            correlation_id = %correlation_id,
            error = %error,
            "admin api refused the operation"
        );
        let error = ApplicationError::from(error);
        self.store.notifier().error(error.toast_message());
        error
    }

    fn cancelled(&self, prompt: &ConfirmationPrompt, correlation_id: &str) -> WorkflowOutcome {
        info!(
            event_name = "dispatch.workflow.cancelled",
            correlation_id = %correlation_id,
            request = %prompt.request,
            decision = %prompt.decision,
            "operator declined the confirmation"
        );
        WorkflowOutcome::Cancelled
    }

    async fn refresh_after_decision(&self, correlation_id: &str) -> bool {
        match self.store.refresh().await {
            Ok(_) => true,
            Err(error) => {
                warn!(
                    event_name = "dispatch.workflow.refresh_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "decision applied but the list refresh failed"
                );
                false
            }
        }
    }
}
