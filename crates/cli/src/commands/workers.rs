use zoomx_core::config::LoadOptions;

use super::{prepare, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let (runtime, console) = match prepare("workers", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    match runtime.block_on(console.workflow.load_workers()) {
        Ok(workers) => CommandResult::success_with_data(
            "workers",
            format!("{} active workers", workers.len()),
            workers.as_slice(),
        ),
        Err(error) => CommandResult::from_error("workers", error),
    }
}
