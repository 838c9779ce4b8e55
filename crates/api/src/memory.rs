use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use zoomx_core::domain::request::{Request, RequestCode, RequestStatus};
use zoomx_core::domain::worker::Worker;

use crate::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    ListRequests,
    ListWorkers,
    Approve { code: RequestCode, assignment: ApprovalAssignment, key: IdempotencyKey },
    Reject { code: RequestCode, key: IdempotencyKey },
}

impl ApiCall {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Approve { .. } | Self::Reject { .. })
    }
}

/// Backend double that applies approvals and rejections to an in-process list
/// and records every call it receives.
#[derive(Default)]
pub struct InMemoryAdminApi {
    requests: RwLock<Vec<Request>>,
    workers: RwLock<Vec<Worker>>,
    calls: RwLock<Vec<ApiCall>>,
    failures: RwLock<VecDeque<ApiError>>,
    listing_failures: RwLock<VecDeque<ApiError>>,
    applied_keys: RwLock<HashSet<String>>,
}

impl InMemoryAdminApi {
    pub fn new(requests: Vec<Request>, workers: Vec<Worker>) -> Self {
        Self {
            requests: RwLock::new(requests),
            workers: RwLock::new(workers),
            ..Self::default()
        }
    }

    /// Queues an error returned by the next call, whatever it is.
    pub async fn fail_next(&self, error: ApiError) {
        self.failures.write().await.push_back(error);
    }

    /// Queues an error returned by the next request-list fetch only.
    pub async fn fail_next_listing(&self, error: ApiError) {
        self.listing_failures.write().await.push_back(error);
    }

    pub async fn replace_requests(&self, requests: Vec<Request>) {
        *self.requests.write().await = requests;
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().await.clone()
    }

    pub async fn count_calls(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|call| predicate(call)).count()
    }

    pub async fn request(&self, code: RequestCode) -> Option<Request> {
        self.requests.read().await.iter().find(|request| request.code == code).cloned()
    }

    async fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.write().await.push(call);
        match self.failures.write().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn transition(
        &self,
        code: RequestCode,
        next: RequestStatus,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        if self.applied_keys.read().await.contains(key.as_str()) {
            return Ok(());
        }

        let mut requests = self.requests.write().await;
        let request = requests.iter_mut().find(|request| request.code == code).ok_or_else(|| {
            ApiError::Http { status: 404, message: format!("Solicitação {code} não encontrada") }
        })?;
        request
            .transition_to(next)
            .map_err(|error| ApiError::Http { status: 409, message: error.to_string() })?;
        drop(requests);

        self.applied_keys.write().await.insert(key.as_str().to_string());
        Ok(())
    }
}

#[async_trait]
impl AdminApi for InMemoryAdminApi {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError> {
        self.record(ApiCall::ListRequests).await?;
        if let Some(error) = self.listing_failures.write().await.pop_front() {
            return Err(error);
        }
        Ok(self.requests.read().await.clone())
    }

    async fn list_active_workers(&self) -> Result<Vec<Worker>, ApiError> {
        self.record(ApiCall::ListWorkers).await?;
        Ok(self.workers.read().await.clone())
    }

    async fn approve_request(
        &self,
        code: RequestCode,
        assignment: &ApprovalAssignment,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::Approve { code, assignment: *assignment, key: key.clone() }).await?;

        let known_worker =
            self.workers.read().await.iter().any(|worker| worker.code == assignment.worker);
        if !known_worker {
            return Err(ApiError::Http {
                status: 400,
                message: format!("Funcionário {} não está ativo", assignment.worker),
            });
        }

        self.transition(code, RequestStatus::Aceita, key).await
    }

    async fn reject_request(
        &self,
        code: RequestCode,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::Reject { code, key: key.clone() }).await?;
        self.transition(code, RequestStatus::Recusada, key).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use zoomx_core::domain::request::{
        PaymentMethod, Request, RequestCode, RequestStatus, Requester, ServiceKind,
    };
    use zoomx_core::domain::worker::{OperatorCode, Worker, WorkerCode};

    use super::{ApiCall, InMemoryAdminApi};
    use crate::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey};

    fn pending(code: u64) -> Request {
        Request {
            code: RequestCode(code),
            origin: "Praça Central".to_string(),
            destination: "Rodoviária".to_string(),
            distance_km: 4.0,
            value: Decimal::new(1500, 2),
            payment_method: PaymentMethod::Pix,
            service: ServiceKind::Mototaxi,
            width: None,
            length: None,
            weight: None,
            status: RequestStatus::Pendente,
            requester: Requester::default(),
            notes: None,
            created_at: None,
        }
    }

    fn api() -> InMemoryAdminApi {
        InMemoryAdminApi::new(
            vec![pending(1), pending(2)],
            vec![Worker { code: WorkerCode(3), name: "Carlos".to_string() }],
        )
    }

    fn assignment() -> ApprovalAssignment {
        ApprovalAssignment { worker: WorkerCode(3), operator: OperatorCode(7) }
    }

    #[tokio::test]
    async fn approve_moves_request_to_accepted() {
        let api = api();
        api.approve_request(RequestCode(1), &assignment(), &IdempotencyKey::generate())
            .await
            .expect("approve succeeds");

        let stored = api.request(RequestCode(1)).await.expect("request exists");
        assert_eq!(stored.status, RequestStatus::Aceita);
        assert_eq!(api.count_calls(ApiCall::is_mutation).await, 1);
    }

    #[tokio::test]
    async fn second_decision_on_same_request_conflicts() {
        let api = api();
        api.reject_request(RequestCode(2), &IdempotencyKey::generate()).await.expect("reject");

        let error = api
            .approve_request(RequestCode(2), &assignment(), &IdempotencyKey::generate())
            .await
            .expect_err("already decided");
        assert!(matches!(error, ApiError::Http { status: 409, .. }));
    }

    #[tokio::test]
    async fn replayed_key_is_accepted_without_reapplying() {
        let api = api();
        let key = IdempotencyKey::generate();

        api.approve_request(RequestCode(1), &assignment(), &key).await.expect("first submit");
        api.approve_request(RequestCode(1), &assignment(), &key).await.expect("replayed submit");

        assert_eq!(api.count_calls(ApiCall::is_mutation).await, 2);
        let stored = api.request(RequestCode(1)).await.expect("request exists");
        assert_eq!(stored.status, RequestStatus::Aceita);
    }

    #[tokio::test]
    async fn inactive_worker_is_refused() {
        let api = api();
        let assignment = ApprovalAssignment { worker: WorkerCode(99), operator: OperatorCode(7) };

        let error = api
            .approve_request(RequestCode(1), &assignment, &IdempotencyKey::generate())
            .await
            .expect_err("unknown worker");
        assert!(matches!(error, ApiError::Http { status: 400, .. }));
    }

    #[tokio::test]
    async fn scripted_failure_applies_to_next_call_only() {
        let api = api();
        api.fail_next(ApiError::SessionExpired { status: Some(403) }).await;

        assert!(api.list_requests().await.expect_err("scripted").is_session_expired());
        assert_eq!(api.list_requests().await.expect("recovers").len(), 2);
        assert_eq!(api.calls().await, vec![ApiCall::ListRequests, ApiCall::ListRequests]);
    }
}
