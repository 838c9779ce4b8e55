//! Request-lifecycle view model of the dispatch console.
//!
//! `RequestStore` owns the request list and refreshes it from the admin API,
//! `ApprovalWorkflow` drives approve/reject decisions, and `RefreshPoller`
//! keeps the store current while a view is mounted.

pub mod bootstrap;
pub mod refresh;
pub mod store;
pub mod view;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::{BootstrapError, Console, ViewBindings};
pub use refresh::{
    ChannelRefresh, IntervalRefresh, PollerExit, PollerHandle, RefreshPoller, RefreshSender,
    RefreshTrigger,
};
pub use store::{RefreshOutcome, RequestStore, StoreError};
pub use view::{
    AutoConfirm, ConfirmationPrompt, Confirmer, Decision, Notifier, Toast, ToastLevel,
    ViewSurface,
};
pub use workflow::{ApprovalWorkflow, WorkflowOutcome};
