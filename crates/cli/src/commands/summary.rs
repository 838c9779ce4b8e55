use zoomx_core::config::LoadOptions;
use zoomx_core::errors::ApplicationError;

use super::{prepare, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let (runtime, console) = match prepare("summary", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let summary = runtime.block_on(async {
        console.store.initial_load().await.map_err(ApplicationError::from)?;
        Ok::<_, ApplicationError>(console.store.summary().await)
    });

    match summary {
        Ok(summary) => CommandResult::success_with_data(
            "summary",
            format!("{} requests, {} pending review", summary.total, summary.pendente),
            summary,
        ),
        Err(error) => CommandResult::from_error("summary", error),
    }
}
