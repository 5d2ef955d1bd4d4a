//! Desktop client that sends up to three PDF/TXT documents to a
//! summarization webhook and shows each file's progress and summary.

mod app;
mod config;
mod error;
mod upload;
mod utils;

use anyhow::{anyhow, Context, Result};
use app::SummaryUploader;
use clap::Parser;
use config::Args;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "summary_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse()
        .into_config()
        .context("Invalid configuration")?;

    // Upload tasks run here while eframe owns the main thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let handle = runtime.handle().clone();

    info!(webhook = %config.webhook_url, "Starting document summarizer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Document Summarizer",
        options,
        Box::new(
            move |_cc: &eframe::CreationContext<'_>| -> Box<dyn eframe::App> {
                Box::new(SummaryUploader::new(config, handle))
            },
        ),
    )
    .map_err(|e| anyhow!("Window closed with error: {}", e))?;

    info!("Shutting down");
    Ok(())
}
