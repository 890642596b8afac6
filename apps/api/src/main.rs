mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::pipeline::ResumePipeline;
use crate::llm_client::CompletionClient;
use crate::render::{BrowserSettings, ChromeRenderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{PgBidLedger, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bidwright API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize completion client
    let completion = CompletionClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.completion_model.clone(),
        config.completion_timeout,
    )?;
    info!("Completion client initialized (model: {})", completion.model());

    // Initialize renderer (bounded browser pool)
    let renderer = ChromeRenderer::new(
        BrowserSettings {
            executable: config.chrome_executable.clone(),
            no_sandbox: config.browser_no_sandbox,
        },
        config.render_pool_size,
        config.render_queue_timeout,
    );

    let pipeline = ResumePipeline::new(
        Arc::new(completion),
        Arc::new(renderer),
        config.pipeline_timeout,
    );

    let store = ResumeStore::new(config.resume_output_dir.clone());
    store.ensure_dir().await?;
    info!("Resumes will be written to {}", store.dir().display());

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        ledger: Arc::new(PgBidLedger::new(db.clone())),
        store,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
