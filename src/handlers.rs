//! HTTP route handlers.
//!
//! The three relay routes (`/api/search-gaps`, `/api/expand-paper`,
//! `/api/summarize-paper`), the graph and saved-paper routes the page
//! delegates its state changes to, and the page itself.

use crate::enrich::annotate_with_gaps;
use crate::error::ApiError;
use crate::export::{self, CSV_FILENAME, JSON_FILENAME};
use crate::graph::GraphStore;
use crate::models::{
    ExpandPaperRequest, ExportRequest, GraphSnapshot, LayoutRequest, MergeRequest, MergeResponse,
    PaperRecord, SearchGapsRequest, SummarizeRequest, SummaryResponse, ToggleSaveRequest,
    ToggleSaveResponse,
};
use crate::selection::SavedPapers;
use crate::templates::index_page;
use crate::{AppState, CITATION_LIMIT, SEARCH_LIMIT};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

#[cfg(test)]
#[path = "handlers_test.rs"]
mod handlers_test;

/// A request field that must be present and non-empty. A body that fails to
/// parse counts as missing the field.
fn required<T>(
    body: Result<Json<T>, JsonRejection>,
    field: &'static str,
    pick: impl FnOnce(T) -> Option<String>,
) -> Result<String, ApiError> {
    body.ok()
        .and_then(|Json(b)| pick(b))
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Validation(field))
}

// ============================================================================
// Page
// ============================================================================

pub async fn index() -> Html<String> {
    Html(index_page())
}

// ============================================================================
// Relay Routes
// ============================================================================

pub async fn search_gaps(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchGapsRequest>, JsonRejection>,
) -> Result<Json<Vec<PaperRecord>>, ApiError> {
    let query = required(body, "searchQuery", |b| b.search_query)?;

    let papers = state
        .papers
        .search(&query, SEARCH_LIMIT)
        .await
        .map_err(|e| {
            error!(error = %e, "error in /api/search-gaps");
            e
        })?;

    info!(query = query.as_str(), found = papers.len(), "search complete");
    Ok(Json(annotate_with_gaps(state.assistant.as_ref(), papers).await))
}

pub async fn expand_paper(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ExpandPaperRequest>, JsonRejection>,
) -> Result<Json<Vec<PaperRecord>>, ApiError> {
    let paper_id = required(body, "paperId", |b| b.paper_id)?;

    let citing = state
        .papers
        .citations(&paper_id, CITATION_LIMIT)
        .await
        .map_err(|e| {
            error!(error = %e, paper_id = paper_id.as_str(), "error in /api/expand-paper");
            e
        })?;

    Ok(Json(annotate_with_gaps(state.assistant.as_ref(), citing).await))
}

pub async fn summarize_paper(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let abstract_text = required(body, "abstract", |b| b.r#abstract)?;
    let summary = state.assistant.summarize(&abstract_text).await;
    Ok(Json(SummaryResponse { summary }))
}

// ============================================================================
// Layout Route
// ============================================================================

pub async fn graph_layout(Json(request): Json<LayoutRequest>) -> Json<GraphSnapshot> {
    let mut store = GraphStore::new();
    store.set_papers(request.papers, &request.query, request.year_filter);
    Json(store.snapshot().clone())
}

/// Merge an expand result into the current paper list, dropping papers
/// that are already present.
pub async fn graph_merge(Json(request): Json<MergeRequest>) -> Json<MergeResponse> {
    let mut store = GraphStore::new();
    store.set_papers(request.papers, "", None);
    let added = store.add_papers(request.added);
    Json(MergeResponse {
        papers: store.papers().to_vec(),
        added,
    })
}

// ============================================================================
// Saved Papers
// ============================================================================

pub async fn toggle_saved(Json(request): Json<ToggleSaveRequest>) -> Json<ToggleSaveResponse> {
    let mut saved = SavedPapers::from_papers(request.saved);
    let is_saved = saved.toggle(&request.paper);
    Json(ToggleSaveResponse {
        saved: saved.into_papers(),
        is_saved,
    })
}

fn attachment(content_type: &str, filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}

pub async fn export_json(
    Json(request): Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = export::to_json(&request.papers)?;
    Ok(attachment("application/json", JSON_FILENAME, body))
}

pub async fn export_csv(Json(request): Json<ExportRequest>) -> impl IntoResponse {
    attachment(
        "text/csv; charset=utf-8",
        CSV_FILENAME,
        export::to_csv(&request.papers),
    )
}
