use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zoomx_api::{AdminApi, ApiError};
use zoomx_core::domain::request::{Request, RequestCode};
use zoomx_core::errors::ApplicationError;
use zoomx_core::notification::{AlertDecision, AlertPolicy, AlertSink, NotificationSignal};
use zoomx_core::projection::StatusSummary;
use zoomx_core::session::Session;

use crate::view::{Notifier, ViewSurface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated { count: usize, pending: usize, alerted: bool },
    /// The store was unmounted while the fetch was in flight.
    Discarded,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session expired")]
    SessionExpired { status: Option<u16> },
    #[error(transparent)]
    Request(ApiError),
}

impl StoreError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::SessionExpired { status } => Self::SessionExpired { status },
            StoreError::Request(error) => error.into(),
        }
    }
}

#[derive(Default)]
struct StoreState {
    requests: Arc<Vec<Request>>,
    last_refreshed_at: Option<DateTime<Utc>>,
}

/// Single owner of the request list shown by the console.
///
/// Every successful fetch replaces the list wholesale. Overlapping fetches
/// are not sequenced: whichever response resolves last is what the store
/// holds.
pub struct RequestStore {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    notifier: Notifier,
    state: RwLock<StoreState>,
    signal: Mutex<NotificationSignal>,
    mounted: AtomicBool,
    in_flight: AtomicUsize,
    fetches: AtomicU64,
    updates: watch::Sender<u64>,
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestStore {
    pub fn new(
        api: Arc<dyn AdminApi>,
        session: Arc<Session>,
        surface: Arc<dyn ViewSurface>,
        toast_duration: Duration,
        alert_policy: AlertPolicy,
        alert_sink: Arc<dyn AlertSink>,
    ) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            api,
            session,
            notifier: Notifier::new(surface, toast_duration),
            state: RwLock::new(StoreState::default()),
            signal: Mutex::new(NotificationSignal::new(alert_policy, alert_sink)),
            mounted: AtomicBool::new(true),
            in_flight: AtomicUsize::new(0),
            fetches: AtomicU64::new(0),
            updates,
        }
    }

    pub async fn initial_load(&self) -> Result<RefreshOutcome, StoreError> {
        self.load("initial_load").await
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, StoreError> {
        self.load("refresh").await
    }

    async fn load(&self, trigger: &'static str) -> Result<RefreshOutcome, StoreError> {
        let correlation_id = Uuid::new_v4().to_string();
        let _loading = LoadingGuard::enter(&self.in_flight);
        self.fetches.fetch_add(1, Ordering::SeqCst);
        debug!(
            event_name = "dispatch.store.refresh_started",
            correlation_id = %correlation_id,
            trigger,
            "fetching request list"
        );

        match self.api.list_requests().await {
            Ok(requests) => Ok(self.apply(requests, &correlation_id).await),
            Err(error) if error.is_session_expired() => {
                Err(self.handle_session_expired(error.status(), &correlation_id))
            }
            Err(error) => {
                warn!(
                    event_name = "dispatch.store.refresh_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "request list fetch failed; keeping previous snapshot"
                );
                if self.is_mounted() {
                    self.notifier.error(ApplicationError::from(error.clone()).toast_message());
                }
                Err(StoreError::Request(error))
            }
        }
    }

    async fn apply(&self, requests: Vec<Request>, correlation_id: &str) -> RefreshOutcome {
        if !self.is_mounted() {
            info!(
                event_name = "dispatch.store.refresh_discarded",
                correlation_id = %correlation_id,
                count = requests.len(),
                "view unmounted before the response arrived"
            );
            return RefreshOutcome::Discarded;
        }

        for anomaly in requests.iter().filter_map(Request::cargo_anomaly) {
            warn!(
                event_name = "dispatch.store.cargo_anomaly",
                correlation_id = %correlation_id,
                detail = %anomaly,
                "request violates the cargo invariant"
            );
        }

        let count = requests.len();
        let pending = requests.iter().filter(|request| request.is_pending()).count();
        let snapshot = Arc::new(requests);
        {
            let mut state = self.state.write().await;
            state.requests = Arc::clone(&snapshot);
            state.last_refreshed_at = Some(Utc::now());
        }

        let decision = self.signal.lock().await.observe(&snapshot);
        if let AlertDecision::Failed(error) = &decision {
            warn!(
                event_name = "dispatch.store.alert_failed",
                correlation_id = %correlation_id,
                error = %error,
                "pending-request alert could not be played"
            );
        }

        self.updates.send_modify(|version| *version += 1);
        info!(
            event_name = "dispatch.store.refresh_applied",
            correlation_id = %correlation_id,
            count,
            pending,
            alerted = decision.played(),
            "request list replaced"
        );

        RefreshOutcome::Updated { count, pending, alerted: decision.played() }
    }

    /// Ends the session once for the whole console. Callers that lose the
    /// race still get the error, but only the winner redirects.
    pub(crate) fn handle_session_expired(
        &self,
        status: Option<u16>,
        correlation_id: &str,
    ) -> StoreError {
        if let Some(teardown) = self.session.teardown() {
            warn!(
                event_name = "dispatch.session.expired",
                correlation_id = %correlation_id,
                status = status.unwrap_or_default(),
                redirect_after_ms = teardown.redirect_after.as_millis() as u64,
                "admin session rejected; redirecting to login"
            );
            self.notifier.error("Sessão expirada. Faça login novamente.");
            self.notifier.redirect_to_login(teardown.redirect_after);
        }
        StoreError::SessionExpired { status }
    }

    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            debug!(event_name = "dispatch.store.unmounted", "request store unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn fetches_issued(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Receives the snapshot version each time the list is replaced.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> Arc<Vec<Request>> {
        Arc::clone(&self.state.read().await.requests)
    }

    pub async fn find(&self, code: RequestCode) -> Option<Request> {
        self.state.read().await.requests.iter().find(|request| request.code == code).cloned()
    }

    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_refreshed_at
    }

    pub async fn summary(&self) -> StatusSummary {
        StatusSummary::from_requests(&self.snapshot().await)
    }
}
