//! Terminal implementations of the console's view hooks.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use zoomx_core::notification::{AlertError, AlertSink};
use zoomx_dispatch::view::{ConfirmationPrompt, Confirmer, Toast, ToastLevel, ViewSurface};

/// Prints toasts and the login redirect notice on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalSurface;

impl ViewSurface for TerminalSurface {
    fn show_toast(&self, toast: Toast) {
        let marker = match toast.level {
            ToastLevel::Info => "info",
            ToastLevel::Success => "ok",
            ToastLevel::Error => "error",
        };
        eprintln!("[{marker}] {}", toast.message);
    }

    fn redirect_to_login(&self, after: Duration) {
        eprintln!(
            "session ended; sign in to the admin panel again and update session.token (redirect in {} ms)",
            after.as_millis()
        );
    }
}

/// Asks on stdin. Anything other than `s`, `sim`, `y` or `yes` declines.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let question = prompt.message();
        let answer = tokio::task::spawn_blocking(move || {
            eprint!("{question} [s/N] ");
            io::stderr().flush().ok();
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_affirmative(&line),
            Ok(Err(error)) => {
                warn!(event_name = "cli.confirm.read_failed", error = %error);
                false
            }
            Err(error) => {
                warn!(event_name = "cli.confirm.join_failed", error = %error);
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

/// Rings the terminal bell.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn play(&self) -> Result<(), AlertError> {
        let mut stderr = io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|()| stderr.flush())
            .map_err(|error| AlertError(error.to_string()))
    }
}

/// Records the alert in the log instead of making a sound.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn play(&self) -> Result<(), AlertError> {
        info!(event_name = "cli.alert.pending_requests", "pending requests waiting for review");
        Ok(())
    }
}
