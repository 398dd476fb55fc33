//! Semantic Scholar integration: keyword search and citation expansion.
//!
//! The API is rate limited and sometimes answers with non-JSON error
//! bodies, so responses are read as text first and parsed second. Nothing
//! here retries; a 429 is reported to the caller as-is.

use crate::error::ApiError;
use crate::models::{PaperRecord, ScholarCitationsResponse, ScholarSearchResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const SCHOLAR_FIELDS: &str = "title,abstract,year,authors,citationCount,openAccessPdf";

#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Top `limit` papers matching a free-text query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperRecord>, ApiError>;

    /// Up to `limit` papers citing `paper_id`.
    async fn citations(&self, paper_id: &str, limit: usize) -> Result<Vec<PaperRecord>, ApiError>;
}

// ============================================================================
// Response Handling
// ============================================================================

/// Pull a human-readable message out of an error body: its `message` field,
/// else its `error` field, else the raw text.
pub fn extract_error_message(body: &str) -> Option<String> {
    let field = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"].iter().find_map(|key| {
                json.get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    field.or_else(|| {
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Map a failed upstream response to an `ApiError`.
pub fn upstream_error(status: u16, reason: Option<&str>, body: &str) -> ApiError {
    if status == 429 {
        return ApiError::RateLimited;
    }
    let message = extract_error_message(body)
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_default();
    ApiError::Upstream { status, message }
}

pub fn parse_search_body(body: &str) -> Result<Vec<PaperRecord>, ApiError> {
    let response: ScholarSearchResponse =
        serde_json::from_str(body).map_err(|_| ApiError::InvalidUpstreamJson)?;
    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(PaperRecord::from_scholar)
        .collect())
}

/// Citation listings wrap each paper in `citingPaper`; entries without one
/// (or without an id) are skipped.
pub fn parse_citations_body(body: &str) -> Result<Vec<PaperRecord>, ApiError> {
    let response: ScholarCitationsResponse =
        serde_json::from_str(body).map_err(|_| ApiError::InvalidUpstreamJson)?;
    Ok(response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| item.citing_paper)
        .filter_map(PaperRecord::from_scholar)
        .collect())
}

// ============================================================================
// HTTP Client
// ============================================================================

pub struct SemanticScholarClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("GapGraph/0.1")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(query),
            limit,
            SCHOLAR_FIELDS
        )
    }

    pub fn citations_url(&self, paper_id: &str, limit: usize) -> String {
        format!(
            "{}/paper/{}/citations?fields={}&limit={}",
            self.base_url,
            urlencoding::encode(paper_id),
            SCHOLAR_FIELDS,
            limit
        )
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ApiError> {
        debug!(url, "querying Semantic Scholar");
        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream_error(status.as_u16(), status.canonical_reason(), &body));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperRecord>, ApiError> {
        let body = self.fetch_text(&self.search_url(query, limit)).await?;
        parse_search_body(&body)
    }

    async fn citations(&self, paper_id: &str, limit: usize) -> Result<Vec<PaperRecord>, ApiError> {
        let body = self.fetch_text(&self.citations_url(paper_id, limit)).await?;
        parse_citations_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SemanticScholarClient {
        SemanticScholarClient::new("https://api.semanticscholar.org/graph/v1/", None).unwrap()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = client().search_url("graph neural nets & more", 5);
        assert_eq!(
            url,
            "https://api.semanticscholar.org/graph/v1/paper/search?query=graph%20neural%20nets%20%26%20more&limit=5&fields=title,abstract,year,authors,citationCount,openAccessPdf"
        );
    }

    #[test]
    fn test_citations_url() {
        let url = client().citations_url("204e3073870fae3d05bcbc2f6a8e263d9b72e776", 3);
        assert!(url.starts_with(
            "https://api.semanticscholar.org/graph/v1/paper/204e3073870fae3d05bcbc2f6a8e263d9b72e776/citations?"
        ));
        assert!(url.ends_with("&limit=3"));
    }

    #[test]
    fn test_rate_limit_maps_to_distinct_error() {
        let err = upstream_error(
            429,
            Some("Too Many Requests"),
            r#"{"message":"Too Many Requests"}"#,
        );
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"message":"Bad query"}"#).as_deref(),
            Some("Bad query")
        );
        assert_eq!(
            extract_error_message(r#"{"error":"Paper not found"}"#).as_deref(),
            Some("Paper not found")
        );
        assert_eq!(
            extract_error_message("<html>Gateway Timeout</html>").as_deref(),
            Some("<html>Gateway Timeout</html>")
        );
        assert_eq!(extract_error_message("   "), None);

        let err = upstream_error(503, Some("Service Unavailable"), "");
        assert_eq!(
            err.to_string(),
            "Semantic Scholar API error (503): Service Unavailable"
        );
    }

    #[test]
    fn test_parse_search_body() {
        let body = r#"{
            "total": 2,
            "data": [
                {"paperId": "a", "title": "A", "abstract": "About A", "year": 2020,
                 "authors": [{"authorId": "1", "name": "X"}], "citationCount": 4,
                 "openAccessPdf": null},
                {"paperId": "b", "title": "B", "abstract": null, "year": null,
                 "authors": [], "citationCount": 0}
            ]
        }"#;
        let papers = parse_search_body(body).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].abstract_text(), Some("About A"));
        assert_eq!(papers[1].abstract_text(), None);
    }

    #[test]
    fn test_parse_search_without_data() {
        assert!(parse_search_body(r#"{"total": 0}"#).unwrap().is_empty());
        assert!(matches!(
            parse_search_body("Internal Server Error"),
            Err(ApiError::InvalidUpstreamJson)
        ));
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_a_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            // Promises 100 bytes, sends 7, then hangs up
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"data\"")
                .await;
        });

        let client = SemanticScholarClient::new(&format!("http://{}", addr), None).unwrap();
        assert!(matches!(
            client.search("graphs", 5).await,
            Err(ApiError::Transport(_))
        ));
    }

    #[test]
    fn test_parse_citations_skips_missing_papers() {
        let body = r#"{"data": [
            {"citingPaper": {"paperId": "c1", "title": "Citing 1"}},
            {"citingPaper": {"paperId": null, "title": "Ghost"}},
            {"citingPaper": null},
            {"citingPaper": {"paperId": "c2", "title": "Citing 2"}}
        ]}"#;
        let papers = parse_citations_body(body).unwrap();
        let ids: Vec<&str> = papers.iter().map(|p| p.paper_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}
