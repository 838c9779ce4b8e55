//! Explicit session context shared by every component that talks to the
//! admin API.
//!
//! The bearer token is read at call time, so a teardown is visible to all
//! holders immediately. Teardown happens at most once per session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::SessionConfig;
use crate::domain::worker::OperatorCode;

#[derive(Debug)]
pub struct Session {
    token: RwLock<Option<SecretString>>,
    operator: Option<OperatorCode>,
    redirect_delay: Duration,
    torn_down: AtomicBool,
}

/// Issued to the single caller that ended the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTeardown {
    pub redirect_after: Duration,
}

impl Session {
    pub fn new(
        token: SecretString,
        operator: Option<OperatorCode>,
        redirect_delay: Duration,
    ) -> Self {
        let token = (!token.expose_secret().trim().is_empty()).then_some(token);
        Self {
            token: RwLock::new(token),
            operator,
            redirect_delay,
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.token.clone(),
            config.operator_code.map(OperatorCode),
            config.redirect_delay(),
        )
    }

    pub fn bearer_token(&self) -> Option<SecretString> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn operator(&self) -> Option<OperatorCode> {
        self.operator
    }

    pub fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    pub fn is_active(&self) -> bool {
        !self.torn_down.load(Ordering::SeqCst) && self.bearer_token().is_some()
    }

    /// Clears the stored credentials. Only the first call returns a teardown;
    /// later calls observe an already-ended session and return `None`.
    pub fn teardown(&self) -> Option<SessionTeardown> {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return None;
        }

        match self.token.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }

        Some(SessionTeardown { redirect_after: self.redirect_delay })
    }
}
