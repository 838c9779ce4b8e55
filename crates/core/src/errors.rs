use thiserror::Error;

use crate::domain::request::{RequestCode, RequestStatus};
use crate::domain::worker::WorkerCode;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("request {code} cannot move from {from} to {to}")]
    InvalidRequestTransition { code: RequestCode, from: RequestStatus, to: RequestStatus },
    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Input problems caught before any network call is attempted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select a worker to assign before approving the request")]
    MissingWorker,
    #[error("there are no active workers available for assignment")]
    NoAssignableWorkers,
    #[error("worker {worker} is not an active, assignable worker")]
    UnknownWorker { worker: WorkerCode },
    #[error("request {code} is not in the current list")]
    UnknownRequest { code: RequestCode },
    #[error("no operator is associated with the current session")]
    MissingOperator,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session expired")]
    SessionExpired { status: Option<u16> },
    #[error("request failed: {message}")]
    Request { status: Option<u16>, message: String },
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("session expired: {message}")]
    SessionExpired { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::SessionExpired { .. } => "Your session has expired. Please sign in again.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::SessionExpired { .. } => "session_expired",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::SessionExpired { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::SessionExpired { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }

    /// Text shown in the transient banner. Server-provided messages are
    /// surfaced as-is.
    pub fn toast_message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            Self::SessionExpired { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Validation(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::SessionExpired { .. } => Self::SessionExpired {
                message: "credentials rejected by the admin api".to_owned(),
                correlation_id,
            },
            ApplicationError::Request { message, .. } | ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}
