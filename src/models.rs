//! Data models for the GapGraph application.
//!
//! This module contains the paper records the rest of the crate works with,
//! the upstream Semantic Scholar shapes they are normalized from, the HTTP
//! request/response bodies, and the node/edge types of the rendered graph.

use serde::{Deserialize, Serialize};

// ============================================================================
// Paper Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub author_id: Option<String>,
    pub name: String,
}

/// A paper as returned to clients, optionally annotated with an extracted
/// research gap. Identity is `paper_id` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub paper_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub open_access_pdf_url: Option<String>,
    #[serde(default)]
    pub research_gap: Option<String>,
}

impl PaperRecord {
    /// Normalize an upstream result. Results without a `paperId` cannot be
    /// placed in the graph and are dropped.
    pub fn from_scholar(paper: ScholarPaper) -> Option<Self> {
        let paper_id = paper.paper_id.filter(|id| !id.is_empty())?;
        let authors = paper
            .authors
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| {
                let name = a.name?;
                Some(Author {
                    author_id: a.author_id,
                    name,
                })
            })
            .collect();

        Some(Self {
            paper_id,
            title: paper.title.unwrap_or_default(),
            year: paper.year,
            authors,
            r#abstract: paper.r#abstract,
            citation_count: paper.citation_count,
            open_access_pdf_url: paper.open_access_pdf.and_then(|pdf| pdf.url),
            research_gap: None,
        })
    }

    /// The abstract, if there is one worth sending to the AI service.
    pub fn abstract_text(&self) -> Option<&str> {
        self.r#abstract.as_deref().filter(|a| !a.trim().is_empty())
    }

    /// The research gap, if one was extracted and is non-empty.
    pub fn gap(&self) -> Option<&str> {
        self.research_gap.as_deref().filter(|g| !g.is_empty())
    }

    pub fn author_names(&self, separator: &str) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn semantic_scholar_url(&self) -> String {
        format!("https://www.semanticscholar.org/paper/{}", self.paper_id)
    }
}

// ============================================================================
// Semantic Scholar Wire Types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarPaper {
    #[serde(default)]
    pub paper_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Option<Vec<ScholarAuthor>>,
    #[serde(default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub open_access_pdf: Option<OpenAccessPdf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScholarAuthor {
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAccessPdf {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `GET /paper/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScholarSearchResponse {
    #[serde(default)]
    pub data: Option<Vec<ScholarPaper>>,
}

/// Body of `GET /paper/{id}/citations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScholarCitationsResponse {
    #[serde(default)]
    pub data: Option<Vec<CitationItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationItem {
    #[serde(default)]
    pub citing_paper: Option<ScholarPaper>,
}

// ============================================================================
// HTTP Bodies
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGapsRequest {
    #[serde(default)]
    pub search_query: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandPaperRequest {
    #[serde(default)]
    pub paper_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub r#abstract: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub year_filter: Option<i32>,
}

/// Body of `/api/graph/merge`: the current paper list plus an expand result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
    #[serde(default)]
    pub added: Vec<PaperRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub papers: Vec<PaperRecord>,
    /// How many papers from `added` were new.
    pub added: usize,
}

/// Body of `/api/saved/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSaveRequest {
    #[serde(default)]
    pub saved: Vec<PaperRecord>,
    pub paper: PaperRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSaveResponse {
    pub saved: Vec<PaperRecord>,
    pub is_saved: bool,
}

/// Body of the `/api/export/*` routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
}

// ============================================================================
// Graph Data Structures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum GraphNode {
    Center {
        id: String,
        label: String,
        position: Position,
    },
    Paper {
        id: String,
        paper_id: String,
        position: Position,
    },
    Gap {
        id: String,
        paper_id: String,
        text: String,
        position: Position,
    },
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Center { id, .. }
            | GraphNode::Paper { id, .. }
            | GraphNode::Gap { id, .. } => id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            GraphNode::Center { position, .. }
            | GraphNode::Paper { position, .. }
            | GraphNode::Gap { position, .. } => *position,
        }
    }

    /// The paper this node belongs to; `None` for the center node.
    pub fn paper_id(&self) -> Option<&str> {
        match self {
            GraphNode::Center { .. } => None,
            GraphNode::Paper { paper_id, .. } | GraphNode::Gap { paper_id, .. } => Some(paper_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Center node to paper.
    Query,
    /// Paper to its extracted gap.
    Extraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}
