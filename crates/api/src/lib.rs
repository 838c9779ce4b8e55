//! Client side of the ZoomX admin API.
//!
//! `AdminApi` is the seam the dispatch layer depends on. `HttpAdminApi` talks
//! to the real backend; `InMemoryAdminApi` backs local runs and tests.

pub mod http;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use zoomx_core::domain::request::{Request, RequestCode};
use zoomx_core::domain::worker::{OperatorCode, Worker, WorkerCode};
use zoomx_core::errors::ApplicationError;

pub use http::HttpAdminApi;
pub use memory::{ApiCall, InMemoryAdminApi};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("session rejected by the admin api")]
    SessionExpired { status: Option<u16> },
    #[error("admin api returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("admin api unreachable: {0}")]
    Transport(String),
    #[error("admin api response could not be decoded: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired { status } => *status,
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl From<ApiError> for ApplicationError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::SessionExpired { status } => Self::SessionExpired { status },
            ApiError::Http { status, message } => Self::Request { status: Some(status), message },
            ApiError::Transport(message) => Self::Request { status: None, message },
            ApiError::Decode(message) => Self::Integration(message),
        }
    }
}

/// Body of the approve call: who fulfils the request and who dispatched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ApprovalAssignment {
    #[serde(rename = "fun_codigo")]
    pub worker: WorkerCode,
    #[serde(rename = "ate_codigo")]
    pub operator: OperatorCode,
}

/// Per-mutation key so a retried or duplicated submit is recognised upstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdempotencyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_requests(&self) -> Result<Vec<Request>, ApiError>;
    async fn list_active_workers(&self) -> Result<Vec<Worker>, ApiError>;
    async fn approve_request(
        &self,
        code: RequestCode,
        assignment: &ApprovalAssignment,
        key: &IdempotencyKey,
    ) -> Result<(), ApiError>;
    async fn reject_request(&self, code: RequestCode, key: &IdempotencyKey)
        -> Result<(), ApiError>;
}
