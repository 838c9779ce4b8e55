use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::store::{RequestStore, StoreError};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(12);

/// Source of refresh ticks. Returning `false` ends polling.
#[async_trait]
pub trait RefreshTrigger: Send {
    async fn next_tick(&mut self) -> bool;
}

/// Fixed-period ticks. The first tick fires one full period after creation.
pub struct IntervalRefresh {
    interval: Interval,
}

impl IntervalRefresh {
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Default for IntervalRefresh {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}

#[async_trait]
impl RefreshTrigger for IntervalRefresh {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks whenever something is pushed through the paired `RefreshSender`.
pub struct ChannelRefresh {
    receiver: mpsc::Receiver<()>,
}

#[derive(Clone)]
pub struct RefreshSender {
    sender: mpsc::Sender<()>,
}

impl RefreshSender {
    /// Requests a refresh. Returns `false` once the poller is gone.
    pub async fn notify(&self) -> bool {
        self.sender.send(()).await.is_ok()
    }
}

impl ChannelRefresh {
    pub fn channel(buffer: usize) -> (RefreshSender, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (RefreshSender { sender }, Self { receiver })
    }
}

#[async_trait]
impl RefreshTrigger for ChannelRefresh {
    async fn next_tick(&mut self) -> bool {
        self.receiver.recv().await.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerExit {
    TriggerClosed,
    SessionExpired,
    Unmounted,
    Stopped,
}

pub struct RefreshPoller;

impl RefreshPoller {
    pub fn spawn<T>(store: Arc<RequestStore>, mut trigger: T) -> PollerHandle
    where
        T: RefreshTrigger + 'static,
    {
        let task_store = Arc::clone(&store);
        let task = tokio::spawn(async move {
            info!(event_name = "dispatch.poller.started", "refresh poller started");
            let exit = loop {
                if !trigger.next_tick().await {
                    break PollerExit::TriggerClosed;
                }
                if !task_store.is_mounted() {
                    break PollerExit::Unmounted;
                }

                match task_store.refresh().await {
                    Ok(outcome) => {
                        debug!(event_name = "dispatch.poller.tick", outcome = ?outcome);
                    }
                    Err(StoreError::SessionExpired { .. }) => break PollerExit::SessionExpired,
                    Err(error) => {
                        warn!(
                            event_name = "dispatch.poller.tick_failed",
                            error = %error,
                            "refresh failed; polling continues"
                        );
                    }
                }
            };
            info!(event_name = "dispatch.poller.stopped", exit = ?exit, "refresh poller stopped");
            exit
        });

        PollerHandle { store, task: Some(task) }
    }
}

/// Owns the polling task. Dropping the handle aborts it.
pub struct PollerHandle {
    store: Arc<RequestStore>,
    task: Option<JoinHandle<PollerExit>>,
}

impl PollerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Unmounts the store and cancels the timer. Fetches already in flight
    /// resolve into a discarded result.
    pub fn stop(mut self) {
        self.store.unmount();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Waits for polling to end on its own. Safe to cancel and call again.
    pub async fn join(&mut self) -> PollerExit {
        let exit = match self.task.as_mut() {
            Some(task) => task.await.unwrap_or(PollerExit::Stopped),
            None => PollerExit::Stopped,
        };
        self.task = None;
        exit
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
