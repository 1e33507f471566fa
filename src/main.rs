use anyhow::{Context as _, Result};
use arigato::api::progress::print_progress;
use arigato::api::{format_api_error, ApiError, Client, Context};
use arigato::cmd::{self, CommandDef, LogLevel};
use arigato::config::Config;
use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: could not open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("ag {} started with log level: {:?}", arigato::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("arigato").join("ag.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".arigato").join("ag.log");
    }
    PathBuf::from("ag.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let commands = cmd::commands();
    let matches = cmd::build_cli(&commands).get_matches();

    let log_level = matches
        .get_one::<LogLevel>("log-level")
        .copied()
        .unwrap_or(LogLevel::Off);
    let _log_guard = setup_logging(log_level);

    match run(&commands, &matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(commands: &[CommandDef], matches: &ArgMatches) -> Result<()> {
    let config = Config::load().with_registry_uri(matches.get_one::<String>("registry").cloned());
    let client = Client::from_config(&config)
        .context("Failed to create registry client")?
        .with_progress(print_progress());

    let (ctx, cancel) = Context::with_cancel();
    let ctx = match matches.get_one::<u64>("timeout") {
        Some(secs) => ctx.with_timeout(Duration::from_secs(*secs)),
        None => ctx,
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling in-flight request");
            cancel.cancel();
        }
    });

    cmd::run(commands, matches, &ctx, &client).await
}

fn report(err: &anyhow::Error) {
    tracing::error!("{:#}", err);
    eprintln!("{}", error_message(err));
}

/// User-facing text for a failed command, keeping any context added on top
/// of an API error
fn error_message(err: &anyhow::Error) -> String {
    let Some(api_err) = err.downcast_ref::<ApiError>() else {
        return format!("Error: {:#}", err);
    };

    let outer: Vec<String> = err
        .chain()
        .take_while(|cause| !cause.is::<ApiError>())
        .map(ToString::to_string)
        .collect();
    if outer.is_empty() {
        format_api_error(api_err)
    } else {
        format!("Error: {}: {}", outer.join(": "), format_api_error(api_err))
    }
}
