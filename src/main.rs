mod config;
mod error;
mod handlers;
mod models;
mod services;
mod web; // upload page + JSON API

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use services::{OllamaService, VisionService};
use web::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Image Analyzer...");

    let config = Config::from_env()?;

    let ollama = OllamaService::new(
        config.api_url.clone(),
        config.model.clone(),
        config.request_timeout,
    )?;
    log::info!(
        "✅ Ollama service initialized with model: {} via {} (timeout {:?})",
        ollama.model(),
        ollama.api_url(),
        config.request_timeout
    );

    let state = Arc::new(AppState::new(Arc::new(ollama), config.max_sessions));
    let app = create_router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("🌐 Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
