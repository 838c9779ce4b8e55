use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::request::{Request, RequestCode};

/// When a refreshed snapshot should trigger the audible alert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Any snapshot holding at least one pending request plays the alert,
    /// including requests that were already pending last cycle.
    #[default]
    EverySnapshot,
    /// Only pending codes absent from the previous snapshot play the alert.
    NewPendingOnly,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("alert playback failed: {0}")]
pub struct AlertError(pub String);

pub trait AlertSink: Send + Sync {
    fn play(&self) -> Result<(), AlertError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAlert;

impl AlertSink for SilentAlert {
    fn play(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlertDecision {
    Played { pending: usize },
    Skipped,
    Failed(AlertError),
}

impl AlertDecision {
    pub fn played(&self) -> bool {
        matches!(self, Self::Played { .. })
    }
}

pub struct NotificationSignal {
    policy: AlertPolicy,
    sink: Arc<dyn AlertSink>,
    previous_pending: HashSet<RequestCode>,
    played: u64,
}

impl NotificationSignal {
    pub fn new(policy: AlertPolicy, sink: Arc<dyn AlertSink>) -> Self {
        Self { policy, sink, previous_pending: HashSet::new(), played: 0 }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn played(&self) -> u64 {
        self.played
    }

    /// Inspects one successful snapshot and plays the alert at most once.
    pub fn observe(&mut self, snapshot: &[Request]) -> AlertDecision {
        let pending: HashSet<RequestCode> = snapshot
            .iter()
            .filter(|request| request.is_pending())
            .map(|request| request.code)
            .collect();

        let qualifies = match self.policy {
            AlertPolicy::EverySnapshot => !pending.is_empty(),
            AlertPolicy::NewPendingOnly => {
                pending.iter().any(|code| !self.previous_pending.contains(code))
            }
        };
        let pending_count = pending.len();
        self.previous_pending = pending;

        if !qualifies {
            return AlertDecision::Skipped;
        }

        match self.sink.play() {
            Ok(()) => {
                self.played += 1;
                AlertDecision::Played { pending: pending_count }
            }
            Err(error) => AlertDecision::Failed(error),
        }
    }
}
