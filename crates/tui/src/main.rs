mod app;
mod client;
mod config;
mod error;
mod quick_add;
mod ui;

use std::{fs::OpenOptions, sync::Mutex};

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_tracing(&config)?;
    tracing::info!(base_url = %config.base_url, "starting payme_tui");

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(config: &config::AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "payme_tui={level},engine={level}",
            level = config.log_level
        ))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
