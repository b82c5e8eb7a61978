//! Tiny IDE - main entry point

use anyhow::Context;
use std::process::ExitCode;
use tiny_ide::{AppConfig, EditorApp};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = AppConfig::load();
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);

    match config.context("failed to load init.toml").and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("starting Tiny IDE");
    let app = EditorApp::new(config).context("failed to open startup file")?;
    app.run().context("editor failed to start")?;
    Ok(())
}

/// RUST_LOG wins over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tiny_ide={}", level.to_lowercase())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
