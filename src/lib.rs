//! GapGraph library - re-exports for testing and external use.
//!
//! The server relays paper searches to Semantic Scholar and annotates the
//! results with AI-extracted research gaps; the graph, selection and
//! workbench modules hold the client-side state that turns those results
//! into a laid-out node graph.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod gemini;
pub mod graph;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod scholar;
pub mod selection;
pub mod templates;
pub mod workbench;

// ============================================================================
// Configuration
// ============================================================================

/// Papers returned per search.
pub const SEARCH_LIMIT: usize = 5;
/// Citing papers returned per expand.
pub const CITATION_LIMIT: usize = 3;

// ============================================================================
// Application State
// ============================================================================

/// Shared collaborators. Built once at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub papers: Arc<dyn scholar::PaperSource>,
    pub assistant: Arc<dyn gemini::ResearchAssistant>,
}

impl AppState {
    pub fn new(config: &config::Config) -> Result<Self, error::ApiError> {
        let papers = scholar::SemanticScholarClient::new(
            &config.scholar_api_base,
            config.scholar_api_key.clone(),
        )?;
        let assistant = gemini::GeminiAssistant::new(
            config.gemini_api_key.clone(),
            &config.gemini_api_base,
            &config.gemini_model,
        );
        Ok(Self::with_collaborators(Arc::new(papers), Arc::new(assistant)))
    }

    pub fn with_collaborators(
        papers: Arc<dyn scholar::PaperSource>,
        assistant: Arc<dyn gemini::ResearchAssistant>,
    ) -> Self {
        Self { papers, assistant }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Relay routes
        .route("/api/search-gaps", post(handlers::search_gaps))
        .route("/api/expand-paper", post(handlers::expand_paper))
        .route("/api/summarize-paper", post(handlers::summarize_paper))
        // Graph routes
        .route("/api/graph/layout", post(handlers::graph_layout))
        .route("/api/graph/merge", post(handlers::graph_merge))
        // Saved papers
        .route("/api/saved/toggle", post(handlers::toggle_saved))
        .route("/api/export/json", post(handlers::export_json))
        .route("/api/export/csv", post(handlers::export_csv))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Re-export commonly used types
pub use models::{
    Author, EdgeKind, GraphEdge, GraphNode, GraphSnapshot, PaperRecord, Position,
};

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use export::{to_csv, to_json};
pub use gemini::{GeminiAssistant, ResearchAssistant};
pub use graph::GraphStore;
pub use layout::radial_layout;
pub use scholar::{PaperSource, SemanticScholarClient};
pub use selection::{SavedPapers, Selection, SummaryState, SummaryTicket};
pub use workbench::{ClientError, GapGraphApi, HttpGapGraphApi, Workbench};
