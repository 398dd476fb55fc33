//! Saved papers and the detail-view selection.
//!
//! Both live apart from the graph: saving never touches the visible set,
//! and removing a paper from the graph never unsaves it.

use crate::models::PaperRecord;
use std::fmt::Display;
use tracing::warn;

/// Shown in place of a summary when the summarize call fails.
pub const SUMMARY_FAILED: &str = "Failed to generate summary.";

// ============================================================================
// Saved Papers
// ============================================================================

/// Saved papers in the order they were saved. Full records are kept so a
/// paper stays exportable after it leaves the graph.
#[derive(Debug, Clone, Default)]
pub struct SavedPapers {
    papers: Vec<PaperRecord>,
}

impl SavedPapers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a saved set sent back by the page. Repeated ids keep the
    /// first occurrence.
    pub fn from_papers(papers: Vec<PaperRecord>) -> Self {
        let mut saved = Self::new();
        for paper in papers {
            if !saved.is_saved(&paper.paper_id) {
                saved.papers.push(paper);
            }
        }
        saved
    }

    /// Flip membership of `paper.paper_id`. Returns whether it is now saved.
    pub fn toggle(&mut self, paper: &PaperRecord) -> bool {
        if self.is_saved(&paper.paper_id) {
            self.papers.retain(|p| p.paper_id != paper.paper_id);
            false
        } else {
            self.papers.push(paper.clone());
            true
        }
    }

    pub fn is_saved(&self, paper_id: &str) -> bool {
        self.papers.iter().any(|p| p.paper_id == paper_id)
    }

    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub fn into_papers(self) -> Vec<PaperRecord> {
        self.papers
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

// ============================================================================
// Summary State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryState {
    #[default]
    Idle,
    Requesting,
    Cached(String),
    Failed(String),
}

impl SummaryState {
    /// Text to display, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryState::Cached(text) | SummaryState::Failed(text) => Some(text),
            SummaryState::Idle | SummaryState::Requesting => None,
        }
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self, SummaryState::Requesting)
    }
}

/// Issued when a summary request starts. Completing with a ticket from an
/// earlier selection is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTicket {
    generation: u64,
}

// ============================================================================
// Selection
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Selection {
    open: Option<PaperRecord>,
    summary: SummaryState,
    generation: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a paper for detail viewing. Any summary, cached or in flight,
    /// is dropped, even when the same paper is reopened.
    pub fn select(&mut self, paper: PaperRecord) {
        self.open = Some(paper);
        self.reset_summary();
    }

    pub fn clear(&mut self) {
        self.open = None;
        self.reset_summary();
    }

    fn reset_summary(&mut self) {
        self.summary = SummaryState::Idle;
        self.generation += 1;
    }

    pub fn open_paper(&self) -> Option<&PaperRecord> {
        self.open.as_ref()
    }

    pub fn is_open(&self, paper_id: &str) -> bool {
        self.open.as_ref().is_some_and(|p| p.paper_id == paper_id)
    }

    pub fn summary(&self) -> &SummaryState {
        &self.summary
    }

    /// Start a summary request for the open paper. Returns the ticket and
    /// the abstract to summarize, or `None` when there is no open paper,
    /// it has no abstract, or a summary is already cached or in flight.
    pub fn begin_summary(&mut self) -> Option<(SummaryTicket, String)> {
        if self.summary != SummaryState::Idle {
            return None;
        }
        let abstract_text = self.open.as_ref()?.abstract_text()?.to_string();
        self.summary = SummaryState::Requesting;
        Some((
            SummaryTicket {
                generation: self.generation,
            },
            abstract_text,
        ))
    }

    /// Apply a finished summary request. Returns `false` when the ticket is
    /// stale and the result was discarded.
    pub fn complete_summary<E: Display>(
        &mut self,
        ticket: SummaryTicket,
        result: Result<String, E>,
    ) -> bool {
        if ticket.generation != self.generation || !self.summary.is_requesting() {
            return false;
        }
        self.summary = match result {
            Ok(summary) => SummaryState::Cached(summary),
            Err(e) => {
                warn!(error = %e, "summary request failed");
                SummaryState::Failed(SUMMARY_FAILED.to_string())
            }
        };
        true
    }
}
