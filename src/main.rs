//! CLI entry point for camfeed.
//!
//! Connects to the page backend, reads the frame rate, and runs the feed
//! session in the terminal until Ctrl+C. Each line typed on stdin toggles
//! play/pause.
//!
//! # Usage
//!
//! ```bash
//! camfeed --page-url http://rover.local:5000/
//! CAMFEED_STREAM__RECOVERY_INTERVAL_MS=5000 camfeed --config config/camfeed.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use camfeed::config::{AppConfig, DEFAULT_CONFIG_PATH};
use camfeed::{logging, HeadlessUi, HttpBackend, StreamSession};
use camfeed_client::{resolve_address, FeedClient};
use clap::Parser;

#[derive(Parser)]
#[command(name = "camfeed")]
#[command(about = "Camera feed controller with outage recovery", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Page URL, overriding the configuration file
    #[arg(long)]
    page_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(page_url) = cli.page_url {
        config.backend.page_url = Some(page_url);
    }
    config.validate()?;
    logging::init_from_config(&config)?;

    println!("📷 {} - camera feed controller", config.application.name);

    let address = resolve_address(config.backend.page_url.as_deref());
    tracing::info!(page = %address, source = address.source().label(), "Page address resolved");

    let client = FeedClient::with_config(address, config.http_config())?;
    let frame_url = client.join(&config.backend.frame_path)?;
    let backend = Arc::new(HttpBackend::new(client));

    // Without a usable frame rate there is no refresh period to run at.
    let rate = backend
        .frame_rate(&config.backend.settings_path)
        .await
        .context("reading frame rate from backend settings")?;

    let ui = HeadlessUi::new(frame_url.as_str());
    let _stdin_reader = ui.spawn_stdin_reader()?;

    let (session, handle) = StreamSession::new(
        backend.clone(),
        backend,
        Box::new(ui),
        rate,
        config.session_timings(),
    )?;
    let session_task = tokio::spawn(session.run());

    println!("▶️  Streaming {frame_url} at {rate}");
    println!("   Press Enter to toggle play/pause, Ctrl+C to quit");

    tokio::signal::ctrl_c().await?;
    println!("\n👋 Shutting down...");

    handle.shutdown().await?;
    session_task.await?;
    Ok(())
}
