use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rollcall_session::Config;
use tracing_subscriber::EnvFilter;

mod mark;
mod probe;
mod terminal_ui;

#[derive(Parser)]
#[command(name = "rollcall", version, about = "Liveness-checked face recognition client")]
struct Cli {
    /// Recognition service URL (overrides ROLLCALL_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds (overrides ROLLCALL_REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one blink → turn → recognize session
    Mark {
        /// Directory of .jpg/.png frames replayed as the camera feed
        #[arg(long)]
        frames: PathBuf,

        /// Milliseconds between samples (overrides ROLLCALL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Print the recognition log as JSON when the session ends
        #[arg(long)]
        json: bool,
    },
    /// Post a single image and print the service verdict
    Probe {
        /// Image file to upload
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = secs;
    }

    match cli.command {
        Command::Mark {
            frames,
            interval_ms,
            json,
        } => {
            if let Some(ms) = interval_ms {
                config.sample_interval_ms = ms;
            }
            mark::run(config, frames, json).await
        }
        Command::Probe { image } => {
            tokio::task::spawn_blocking(move || probe::run(&config, &image)).await?
        }
    }
}
