//! Client session over the GapGraph HTTP API.
//!
//! `Workbench` is the state behind the page: the graph for the active
//! query, the saved papers, the open paper and its summary, and the last
//! error. Each user action is one method that moves the session to its
//! next state; nothing is recomputed implicitly.

use crate::export;
use crate::graph::GraphStore;
use crate::models::{
    Author, ErrorBody, ExpandPaperRequest, PaperRecord, SearchGapsRequest, SummarizeRequest,
    SummaryResponse,
};
use crate::selection::{SavedPapers, Selection, SummaryTicket};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Year thresholds offered by the filter control.
pub const YEAR_FILTER_OPTIONS: &[i32] = &[2024, 2023, 2020, 2015];

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx answer; carries the server's `error` field when present.
    #[error("{0}")]
    Server(String),

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("Failed to reach server: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait GapGraphApi: Send + Sync {
    async fn search_gaps(&self, query: &str) -> Result<Vec<PaperRecord>, ClientError>;
    async fn expand_paper(&self, paper_id: &str) -> Result<Vec<PaperRecord>, ClientError>;
    async fn summarize_paper(&self, abstract_text: &str) -> Result<String, ClientError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

pub struct HttpGapGraphApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGapGraphApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, route))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|_| ClientError::InvalidResponse)
    }
}

/// The server's `{error}` message, or `Server error: <status>`.
pub fn server_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Server error: {}", status));
    ClientError::Server(message)
}

#[async_trait]
impl GapGraphApi for HttpGapGraphApi {
    async fn search_gaps(&self, query: &str) -> Result<Vec<PaperRecord>, ClientError> {
        let body = SearchGapsRequest {
            search_query: Some(query.to_string()),
        };
        self.post("/api/search-gaps", &body).await
    }

    async fn expand_paper(&self, paper_id: &str) -> Result<Vec<PaperRecord>, ClientError> {
        let body = ExpandPaperRequest {
            paper_id: Some(paper_id.to_string()),
        };
        self.post("/api/expand-paper", &body).await
    }

    async fn summarize_paper(&self, abstract_text: &str) -> Result<String, ClientError> {
        let body = SummarizeRequest {
            r#abstract: Some(abstract_text.to_string()),
        };
        let response: SummaryResponse = self.post("/api/summarize-paper", &body).await?;
        Ok(response.summary)
    }
}

// ============================================================================
// Fallback Data
// ============================================================================

fn mock_paper(
    id: &str,
    title: &str,
    year: i32,
    authors: &[&str],
    abstract_text: &str,
    gap: &str,
) -> PaperRecord {
    PaperRecord {
        paper_id: id.to_string(),
        title: title.to_string(),
        year: Some(year),
        authors: authors
            .iter()
            .map(|name| Author {
                author_id: None,
                name: name.to_string(),
            })
            .collect(),
        r#abstract: Some(abstract_text.to_string()),
        citation_count: None,
        open_access_pdf_url: None,
        research_gap: Some(gap.to_string()),
    }
}

/// Shown when a search fails, so the graph is never left empty.
pub fn mock_papers() -> Vec<PaperRecord> {
    vec![
        mock_paper(
            "mock-1",
            "Attention Is All You Need",
            2017,
            &["Ashish Vaswani", "Noam Shazeer"],
            "The dominant sequence transduction models are based on complex recurrent or convolutional neural networks...",
            "Future work could explore extending this model to handle longer sequences more efficiently and applying it to other modalities like images or audio.",
        ),
        mock_paper(
            "mock-2",
            "BERT: Pre-training of Deep Bidirectional Transformers",
            2018,
            &["Jacob Devlin", "Ming-Wei Chang"],
            "We introduce a new language representation model called BERT...",
            "Limitations include high computational cost during pre-training. Future research might focus on more efficient pre-training objectives.",
        ),
    ]
}

// ============================================================================
// Workbench
// ============================================================================

/// A summary request that has started but not been applied.
#[derive(Debug)]
pub struct PendingSummary {
    ticket: SummaryTicket,
    abstract_text: String,
}

pub struct Workbench<A> {
    api: A,
    graph: GraphStore,
    saved: SavedPapers,
    selection: Selection,
    active_query: Option<String>,
    error: Option<String>,
}

impl<A: GapGraphApi> Workbench<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            graph: GraphStore::new(),
            saved: SavedPapers::new(),
            selection: Selection::new(),
            active_query: None,
            error: None,
        }
    }

    /// Run a fresh search. On failure the error is kept and the mock
    /// dataset is shown instead. Returns `true` when live results were used.
    pub async fn search(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.active_query = Some(query.to_string());
        self.error = None;

        let filter = self.graph.year_filter();
        match self.api.search_gaps(query).await {
            Ok(papers) => {
                self.graph.set_papers(papers, query, filter);
                true
            }
            Err(e) => {
                warn!(error = %e, "search failed; showing sample papers");
                self.error = Some(e.to_string());
                self.graph.set_papers(mock_papers(), query, filter);
                false
            }
        }
    }

    /// Add the papers citing `paper_id`. Returns how many were new.
    pub async fn expand(&mut self, paper_id: &str) -> usize {
        match self.api.expand_paper(paper_id).await {
            Ok(citing) => self.graph.add_papers(citing),
            Err(e) => {
                warn!(error = %e, paper_id, "expand failed");
                self.error = Some(e.to_string());
                0
            }
        }
    }

    pub fn remove(&mut self, paper_id: &str) -> bool {
        self.graph.remove_paper(paper_id)
    }

    pub fn toggle_save(&mut self, paper: &PaperRecord) -> bool {
        self.saved.toggle(paper)
    }

    pub fn set_year_filter(&mut self, threshold: Option<i32>) {
        self.graph.set_filter(threshold);
    }

    pub fn select(&mut self, paper: PaperRecord) {
        self.selection.select(paper);
    }

    pub fn close_details(&mut self) {
        self.selection.clear();
    }

    /// Summarize the open paper. Returns whether a summary (or failure
    /// notice) was applied.
    pub async fn summarize(&mut self) -> bool {
        let Some(pending) = self.begin_summary() else {
            return false;
        };
        let result = self.request_summary(&pending).await;
        self.finish_summary(pending, result)
    }

    /// First step of `summarize`: claim the request for the open paper.
    pub fn begin_summary(&mut self) -> Option<PendingSummary> {
        let (ticket, abstract_text) = self.selection.begin_summary()?;
        Some(PendingSummary {
            ticket,
            abstract_text,
        })
    }

    /// Second step: call the API. Holds only a shared borrow, so the
    /// selection may change before the result is applied.
    pub async fn request_summary(&self, pending: &PendingSummary) -> Result<String, ClientError> {
        self.api.summarize_paper(&pending.abstract_text).await
    }

    /// Last step: apply the result unless the selection moved on.
    pub fn finish_summary(
        &mut self,
        pending: PendingSummary,
        result: Result<String, ClientError>,
    ) -> bool {
        self.selection.complete_summary(pending.ticket, result)
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        export::to_json(self.saved.papers())
    }

    pub fn export_csv(&self) -> String {
        export::to_csv(self.saved.papers())
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn saved(&self) -> &SavedPapers {
        &self.saved
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
