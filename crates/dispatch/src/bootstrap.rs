use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use zoomx_api::{AdminApi, ApiError, HttpAdminApi};
use zoomx_core::config::AppConfig;
use zoomx_core::notification::AlertSink;
use zoomx_core::projection::ProjectionState;
use zoomx_core::session::Session;

use crate::refresh::{IntervalRefresh, PollerHandle, RefreshPoller};
use crate::store::RequestStore;
use crate::view::{Confirmer, ViewSurface};
use crate::workflow::ApprovalWorkflow;

/// Front-end hooks the console renders through.
#[derive(Clone)]
pub struct ViewBindings {
    pub surface: Arc<dyn ViewSurface>,
    pub confirmer: Arc<dyn Confirmer>,
    pub alert: Arc<dyn AlertSink>,
}

pub struct Console {
    pub config: AppConfig,
    pub session: Arc<Session>,
    pub store: Arc<RequestStore>,
    pub workflow: ApprovalWorkflow,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("admin api client could not be created: {0}")]
    Client(#[source] ApiError),
}

impl Console {
    /// Wires the console against the HTTP admin API described by `config`.
    pub fn bootstrap(config: AppConfig, bindings: ViewBindings) -> Result<Self, BootstrapError> {
        let session = Arc::new(Session::from_config(&config.session));
        let api = HttpAdminApi::from_config(&config.api, Arc::clone(&session))
            .map_err(BootstrapError::Client)?;
        info!(
            event_name = "dispatch.bootstrap.ready",
            correlation_id = "bootstrap",
            base_url = %api.base_url(),
            "admin api client configured"
        );
        Ok(Self::with_api(config, session, Arc::new(api), bindings))
    }

    pub fn with_api(
        config: AppConfig,
        session: Arc<Session>,
        api: Arc<dyn AdminApi>,
        bindings: ViewBindings,
    ) -> Self {
        let store = Arc::new(RequestStore::new(
            Arc::clone(&api),
            Arc::clone(&session),
            bindings.surface,
            config.view.toast_duration(),
            config.notification.policy,
            bindings.alert,
        ));
        let workflow = ApprovalWorkflow::new(api, Arc::clone(&store), bindings.confirmer);
        Self { config, session, store, workflow }
    }

    pub fn projection(&self) -> ProjectionState {
        ProjectionState::new(self.config.view.page_size, self.config.view.page_reset_policy())
    }

    /// Starts interval polling at the configured period.
    pub fn start_polling(&self) -> PollerHandle {
        RefreshPoller::spawn(
            Arc::clone(&self.store),
            IntervalRefresh::new(self.config.polling.refresh_interval()),
        )
    }
}
