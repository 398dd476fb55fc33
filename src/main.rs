//! GapGraph - research gap explorer.
//!
//! This is the main entry point for the GapGraph web server.
//! The application is organized into the following modules:
//!
//! - `models`: Paper records, upstream wire types and graph types
//! - `scholar`: Semantic Scholar search and citation lookup
//! - `gemini`: AI gap extraction and summaries
//! - `layout` / `graph` / `selection`: graph placement and view state
//! - `workbench`: client session over the HTTP API
//! - `handlers`: HTTP route handlers

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gapgraph::{router, AppState, Config};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gapgraph=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(AppState::new(&config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("GapGraph server running at http://{}", config.bind_addr);
    if config.ai_enabled() {
        info!(model = config.gemini_model.as_str(), "AI gap extraction: ENABLED");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
