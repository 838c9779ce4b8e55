use std::sync::Arc;

use zoomx_core::config::LoadOptions;
use zoomx_core::notification::AlertSink;
use zoomx_core::projection::{KindFilter, ProjectionState, StatusFilter};
use zoomx_dispatch::{AutoConfirm, PollerExit, RequestStore, StoreError};

use super::{load_config, open_console, runtime, CommandResult, EXIT_SESSION};
use crate::commands::requests::{render_page, RequestsArgs};
use crate::view::{LogAlert, TerminalBell};

#[derive(Clone, Copy, Debug)]
pub struct WatchArgs {
    pub kind: KindFilter,
    pub status: StatusFilter,
}

pub fn run(options: &LoadOptions, args: &WatchArgs) -> CommandResult {
    const COMMAND: &str = "watch";

    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let alert: Arc<dyn AlertSink> =
        if config.notification.bell { Arc::new(TerminalBell) } else { Arc::new(LogAlert) };
    let console = match open_console(COMMAND, config, Arc::new(AutoConfirm(false)), alert) {
        Ok(console) => console,
        Err(result) => return result,
    };

    let mut projection = console.projection();
    projection.set_kind(args.kind);
    projection.set_status(args.status);
    let render_args = RequestsArgs { kind: args.kind, status: args.status, page: 1, json: false };

    let exit = runtime.block_on(async {
        if let Err(StoreError::SessionExpired { .. }) = console.store.initial_load().await {
            return PollerExit::SessionExpired;
        }
        print_snapshot(&console.store, &projection, &render_args).await;

        let mut updates = console.store.subscribe();
        let mut poller = console.start_polling();

        let exit = loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break PollerExit::Stopped,
                exit = poller.join() => break exit,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break PollerExit::Stopped;
                    }
                    print_snapshot(&console.store, &projection, &render_args).await;
                }
            }
        };
        poller.stop();
        exit
    });

    match exit {
        PollerExit::SessionExpired => CommandResult::failure(
            COMMAND,
            "session_expired",
            "session expired while watching; sign in again",
            EXIT_SESSION,
        ),
        other => CommandResult::success(COMMAND, format!("watch ended ({other:?})")),
    }
}

async fn print_snapshot(store: &RequestStore, projection: &ProjectionState, args: &RequestsArgs) {
    let snapshot = store.snapshot().await;
    let page = projection.project(&snapshot);
    let refreshed = store
        .last_refreshed_at()
        .await
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!("--- refreshed at {refreshed} ---\n{}", render_page(&page, args));
}
