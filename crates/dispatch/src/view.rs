use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use zoomx_core::domain::request::RequestCode;
use zoomx_core::domain::worker::WorkerCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Transient banner shown to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub dismiss_after: Duration,
}

/// Rendering side of the console. Implementations must not block.
pub trait ViewSurface: Send + Sync {
    fn show_toast(&self, toast: Toast);
    fn redirect_to_login(&self, after: Duration);
}

#[derive(Clone)]
pub struct Notifier {
    surface: Arc<dyn ViewSurface>,
    toast_duration: Duration,
}

impl Notifier {
    pub fn new(surface: Arc<dyn ViewSurface>, toast_duration: Duration) -> Self {
        Self { surface, toast_duration }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.toast(ToastLevel::Error, message.into());
    }

    pub fn redirect_to_login(&self, after: Duration) {
        self.surface.redirect_to_login(after);
    }

    fn toast(&self, level: ToastLevel, message: String) {
        self.surface.show_toast(Toast { level, message, dismiss_after: self.toast_duration });
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("approve"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub decision: Decision,
    pub request: RequestCode,
    pub worker: Option<WorkerCode>,
}

impl ConfirmationPrompt {
    pub fn message(&self) -> String {
        match (self.decision, self.worker) {
            (Decision::Approve, Some(worker)) => {
                format!("Aceitar a solicitação {} e atribuir ao funcionário {worker}?", self.request)
            }
            (Decision::Approve, None) => format!("Aceitar a solicitação {}?", self.request),
            (Decision::Reject, _) => format!("Recusar a solicitação {}?", self.request),
        }
    }
}

#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Answers every prompt the same way, for non-interactive runs.
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, _prompt: &ConfirmationPrompt) -> bool {
        self.0
    }
}
