use std::process::ExitCode;
use std::sync::Arc;

use parley::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const CONSOLE_CHANNEL: &str = "console";
const CONSOLE_AUTHOR: &str = "console";

/// Distinct exit status asking the supervisor to start the relay again.
const RESTART_EXIT_CODE: u8 = 75;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    if let Err(error) = parley::logging::try_init() {
        eprintln!("failed to initialize logging: {error}");
    }

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(phase = "startup", event = "config_invalid", error = %error);
            return ExitCode::FAILURE;
        }
    };

    let gateway = Arc::new(ConsoleGateway::stdout(config.bot_id.clone()));
    let dispatcher = match build_dispatcher(&config, gateway) {
        Ok(dispatcher) => dispatcher,
        Err(error) => {
            tracing::error!(phase = "startup", event = "dispatcher_failed", error = %error);
            return ExitCode::FAILURE;
        }
    };

    let author = config.admin_id.as_deref().unwrap_or(CONSOLE_AUTHOR);
    let input = ConsoleInput::new(author, CONSOLE_CHANNEL, config.bot_id.as_str());
    dispatcher.announce_ready().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!(phase = "console", event = "read_failed", error = %error);
                return ExitCode::FAILURE;
            }
        };

        let outcome = dispatcher.handle(input.parse_line(&line)).await;
        tracing::debug!(phase = "console", event = "turn_complete", outcome = ?outcome);
        if outcome == DispatchOutcome::RestartRequested {
            tracing::warn!(phase = "console", event = "restart_requested");
            return ExitCode::from(RESTART_EXIT_CODE);
        }
    }

    tracing::info!(phase = "console", event = "input_closed");
    ExitCode::SUCCESS
}
