//! `rollcall mark`: run one session against the recognition service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rollcall_client::HttpRecognitionService;
use rollcall_hw::FrameDirCamera;
use rollcall_session::{Config, SessionController, SessionRunner};

use crate::terminal_ui::TerminalUi;

pub async fn run(config: Config, frames: PathBuf, json: bool) -> Result<()> {
    tracing::info!(
        endpoint = %config.endpoint,
        frames = %frames.display(),
        interval_ms = config.sample_interval_ms,
        "starting mark session"
    );

    let service = Arc::new(HttpRecognitionService::new(
        config.endpoint.clone(),
        config.request_timeout(),
    ));
    let controller = SessionController::new(FrameDirCamera::new(frames), TerminalUi::new(), &config)
        .context("failed to initialize session controller")?;
    let runner = SessionRunner::new(controller, service, config.sample_interval());

    runner.start().await.context("failed to start session")?;

    tokio::select! {
        _ = runner.wait() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted, stopping session");
            runner.stop().await;
        }
    }

    let controller = runner.controller();
    let controller = controller.lock().await;
    let log = controller.recognition_log();

    if json {
        println!("{}", serde_json::to_string_pretty(log)?);
    } else if log.is_empty() {
        println!("No subjects recognized.");
    } else {
        println!("Recognized:");
        for event in log {
            println!("  {}", event.log_line());
        }
    }

    Ok(())
}
