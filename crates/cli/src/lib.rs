pub mod commands;
pub mod view;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use zoomx_core::config::{AppConfig, LoadOptions, LogFormat};
use zoomx_core::domain::request::RequestCode;
use zoomx_core::domain::worker::WorkerCode;
use zoomx_core::projection::{KindFilter, StatusFilter};

#[derive(Debug, Parser)]
#[command(
    name = "zoomx",
    about = "ZoomX dispatch console",
    long_about = "Review, approve and reject mototaxi and delivery requests from the ZoomX admin API.",
    after_help = "Examples:\n  zoomx requests --status pendente\n  zoomx approve 42 --worker 3\n  zoomx watch\n  zoomx doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a zoomx.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load the request list and show one filtered page")]
    Requests {
        #[arg(long, default_value = "all", help = "Service filter: all, mototaxi, entrega")]
        kind: KindFilter,
        #[arg(long, default_value = "all", help = "Status filter: all, pendente, aceita, recusada, concluida")]
        status: StatusFilter,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show request counts per status")]
    Summary,
    #[command(about = "List active workers that can be assigned to a request")]
    Workers,
    #[command(about = "Accept a pending request and assign a worker")]
    Approve {
        code: u64,
        #[arg(long, help = "Worker code (fun_codigo) to assign")]
        worker: Option<u64>,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Refuse a pending request")]
    Reject {
        code: u64,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Poll the request list and ring on pending requests until Ctrl-C")]
    Watch {
        #[arg(long, default_value = "all")]
        kind: KindFilter,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    #[command(about = "Write the filtered request list to a CSV report")]
    Export {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value = "all")]
        kind: KindFilter,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
    #[command(about = "Validate config and admin API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Requests { kind, status, page, json } => commands::requests::run(
            &options,
            &commands::requests::RequestsArgs { kind, status, page, json },
        ),
        Command::Summary => commands::summary::run(&options),
        Command::Workers => commands::workers::run(&options),
        Command::Approve { code, worker, yes } => {
            commands::decide::approve(&options, RequestCode(code), worker.map(WorkerCode), yes)
        }
        Command::Reject { code, yes } => commands::decide::reject(&options, RequestCode(code), yes),
        Command::Watch { kind, status } => {
            commands::watch::run(&options, &commands::watch::WatchArgs { kind, status })
        }
        Command::Export { output, kind, status } => commands::export::run(
            &options,
            &commands::export::ExportArgs { output, kind, status },
        ),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    writeln!(io::stdout().lock(), "{}", result.output)
        .context("failed to write command output")?;
    Ok(ExitCode::from(result.exit_code))
}

/// Logs go to stderr so command payloads on stdout stay machine-readable.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
