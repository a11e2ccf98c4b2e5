//! Homework bot — watches the review status of Practicum homework.
//!
//! Polls the status API on a fixed period and posts a verdict message to a
//! Telegram chat whenever the newest homework changes status. Failures
//! inside a cycle are logged, reported to the chat and retried; missing
//! secrets stop the process before the loop starts.
//!
//! Exit codes: 0 on Ctrl-C, 1 on startup plumbing failure, 2 on missing or
//! invalid configuration.

use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod error;
mod logging;
mod notify;
mod poller;
mod practicum;

use config::{Args, Config, Credentials};
use error::PollError;
use notify::telegram::TelegramNotifier;
use poller::{PollState, Poller};
use practicum::client::PracticumClient;

const EXIT_STARTUP: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_file) {
        eprintln!("homework-bot: {:#}", e);
        return ExitCode::from(EXIT_STARTUP);
    }

    info!("🎓 Homework bot v{}", env!("CARGO_PKG_VERSION"));

    ExitCode::from(launch(&args, Credentials::from_env(), run).await)
}

/// Check the configuration, then hand it to `serve`. Returns the exit code.
/// `serve` is never called when a secret is missing or malformed.
async fn launch<F, Fut>(args: &Args, credentials: Credentials, serve: F) -> u8
where
    F: FnOnce(Config) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let config = match Config::build(args, credentials) {
        Ok(config) => config,
        Err(e) => {
            error!(severity = "CRITICAL", "Required configuration is missing: {}", e);
            return EXIT_CONFIG;
        }
    };

    match serve(config).await {
        Ok(()) => 0,
        Err(e) => {
            error!(severity = "CRITICAL", "Homework bot stopped: {:#}", e);
            let fatal = e.downcast_ref::<PollError>().is_some_and(PollError::is_fatal);
            if fatal { EXIT_CONFIG } else { EXIT_STARTUP }
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let source = PracticumClient::new(
        &config.endpoint,
        config.credentials.practicum_token(),
        config.request_timeout,
    )
    .context("Failed to build the status API client")?;

    let notifier = TelegramNotifier::new(config.credentials.telegram_token(), config.chat.clone());
    info!(chat = %config.chat, endpoint = %config.endpoint, "Telegram notifier ready");

    let poller = Poller::new(
        Arc::new(source),
        Arc::new(notifier),
        PollState::starting_now(),
        config.retry_period,
    );
    poller.run(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received — shutting down");
}
