use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use designroom::config::RoomConfig;
use designroom::error::{ConfigError, ErrorCode};
use designroom::replay::{Replay, ReplayError};
use designroom::room::Room;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Open { .. } => "E_IO",
            Self::Replay(e) => e.error_code(),
            Self::Encode(_) => "E_ENCODE",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "designroom", about = "Shared design document editing core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON-lines session script to a fresh room and print the final document.
    Replay {
        #[arg(env = "ROOM_SCRIPT")]
        script: PathBuf,
    },
}

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "designroom failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = RoomConfig::from_env()?;
    tracing::debug!(?config, "room config loaded");

    match cli.command {
        Command::Replay { script } => {
            let file = File::open(&script).map_err(|source| CliError::Open { path: script.clone(), source })?;
            let mut replay = Replay::new(Room::new(&config));
            let summary = replay.run(BufReader::new(file))?;
            tracing::info!(script = %script.display(), ?summary, "script applied");

            let snapshot = replay.room().store().snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}
