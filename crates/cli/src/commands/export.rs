use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use zoomx_core::config::LoadOptions;
use zoomx_core::errors::ApplicationError;
use zoomx_core::export::write_csv;
use zoomx_core::projection::{KindFilter, StatusFilter};

use super::{prepare, CommandResult, EXIT_FAILURE};

#[derive(Clone, Debug)]
pub struct ExportArgs {
    pub output: PathBuf,
    pub kind: KindFilter,
    pub status: StatusFilter,
}

pub fn run(options: &LoadOptions, args: &ExportArgs) -> CommandResult {
    let (runtime, console) = match prepare("export", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let snapshot = match runtime.block_on(async {
        console.store.initial_load().await.map_err(ApplicationError::from)?;
        Ok::<_, ApplicationError>(console.store.snapshot().await)
    }) {
        Ok(snapshot) => snapshot,
        Err(error) => return CommandResult::from_error("export", error),
    };

    let mut projection = console.projection();
    projection.set_kind(args.kind);
    projection.set_status(args.status);
    let filtered = projection.filtered(&snapshot);

    let file = match File::create(&args.output) {
        Ok(file) => file,
        Err(error) => {
            return CommandResult::failure(
                "export",
                "io",
                format!("could not create `{}`: {error}", args.output.display()),
                EXIT_FAILURE,
            )
        }
    };

    match write_csv(BufWriter::new(file), &filtered) {
        Ok(rows) => CommandResult::success(
            "export",
            format!("exported {rows} requests to {}", args.output.display()),
        ),
        Err(error) => CommandResult::failure("export", "io", error.to_string(), EXIT_FAILURE),
    }
}
