use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use zoomx_api::{AdminApi, ApiError, ApprovalAssignment, IdempotencyKey};
use zoomx_core::domain::request::{
    PaymentMethod, Request, RequestCode, RequestStatus, Requester, ServiceKind,
};
use zoomx_core::domain::worker::{OperatorCode, Worker, WorkerCode};
use zoomx_core::notification::{AlertError, AlertPolicy, AlertSink};
use zoomx_core::session::Session;

use crate::store::RequestStore;
use crate::view::{ConfirmationPrompt, Confirmer, Toast, ToastLevel, ViewSurface};

pub const REDIRECT_DELAY: Duration = Duration::from_millis(2_000);
pub const TOAST_DURATION: Duration = Duration::from_secs(3);
pub const OPERATOR: OperatorCode = OperatorCode(7);

pub fn request(code: u64, service: ServiceKind, status: RequestStatus) -> Request {
    let cargo = service == ServiceKind::Entrega;
    Request {
        code: RequestCode(code),
        origin: format!("Origem {code}"),
        destination: format!("Destino {code}"),
        distance_km: 2.0,
        value: Decimal::new(1000, 2),
        payment_method: PaymentMethod::Pix,
        service,
        width: cargo.then_some(20.0),
        length: cargo.then_some(30.0),
        weight: cargo.then_some(1.5),
        status,
        requester: Requester { user_code: Some(code), display_name: None },
        notes: None,
        created_at: None,
    }
}

pub fn pending(code: u64) -> Request {
    request(code, ServiceKind::Mototaxi, RequestStatus::Pendente)
}

pub fn worker(code: u64) -> Worker {
    Worker { code: WorkerCode(code), name: format!("Funcionário {code}") }
}

pub fn session() -> Arc<Session> {
    Arc::new(Session::new("tok-test".to_string().into(), Some(OPERATOR), REDIRECT_DELAY))
}

#[derive(Default)]
pub struct RecordingSurface {
    toasts: Mutex<Vec<Toast>>,
    redirects: Mutex<Vec<Duration>>,
}

impl RecordingSurface {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|toasts| toasts.clone()).unwrap_or_default()
    }

    pub fn error_toasts(&self) -> Vec<String> {
        self.toasts()
            .into_iter()
            .filter(|toast| toast.level == ToastLevel::Error)
            .map(|toast| toast.message)
            .collect()
    }

    pub fn redirects(&self) -> Vec<Duration> {
        self.redirects.lock().map(|redirects| redirects.clone()).unwrap_or_default()
    }
}

impl ViewSurface for RecordingSurface {
    fn show_toast(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }

    fn redirect_to_login(&self, after: Duration) {
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(after);
        }
    }
}

#[derive(Default)]
pub struct CountingAlert {
    plays: AtomicUsize,
}

impl CountingAlert {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlertSink for CountingAlert {
    fn play(&self) -> Result<(), AlertError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<ConfirmationPrompt>>,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self { answer, prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.prompts.lock().map(|prompts| prompts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.answer
    }
}

pub struct Harness {
    pub surface: Arc<RecordingSurface>,
    pub alert: Arc<CountingAlert>,
    pub session: Arc<Session>,
    pub store: Arc<RequestStore>,
}

pub fn harness(api: Arc<dyn AdminApi>) -> Harness {
    let surface = Arc::new(RecordingSurface::default());
    let alert = Arc::new(CountingAlert::default());
    let session = session();
    let store = Arc::new(RequestStore::new(
        api,
        Arc::clone(&session),
        surface.clone(),
        TOAST_DURATION,
        AlertPolicy::EverySnapshot,
        alert.clone(),
    ));
    Harness { surface, alert, session, store }
}

type PendingFetch = oneshot::Sender<Result<Vec<Request>, ApiError>>;

/// Admin API whose list responses are released by the test, one fetch at a
/// time and in any order.
#[derive(Default)]
pub struct GatedApi {
    pending: tokio::sync::Mutex<Vec<PendingFetch>>,
}

impl GatedApi {
    pub async fn wait_for_fetches(&self, count: usize) {
        while self.pending.lock().await.len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Resolves the fetch issued `index`-th among those still outstanding.
    pub async fn resolve(&self, index: usize, response: Result<Vec<Request>, ApiError>) {
        let sender = self.pending.lock().await.remove(index);
        let _ = sender.send(response);
    }
}

#[async_trait]
impl AdminApi for GatedApi {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError> {
        let (sender, receiver) = oneshot::channel();
        self.pending.lock().await.push(sender);
        receiver.await.unwrap_or_else(|_| Err(ApiError::Transport("fetch abandoned".to_string())))
    }

    async fn list_active_workers(&self) -> Result<Vec<Worker>, ApiError> {
        Ok(Vec::new())
    }

    async fn approve_request(
        &self,
        _code: RequestCode,
        _assignment: &ApprovalAssignment,
        _key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn reject_request(
        &self,
        _code: RequestCode,
        _key: &IdempotencyKey,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}
