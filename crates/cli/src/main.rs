use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    zoomx_cli::run()
}
