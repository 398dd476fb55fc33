//! Gemini-backed gap extraction and summarization.
//!
//! The HTTP client is built on first use and then shared for the life of
//! the process. Without an API key it is never built: gap extraction
//! returns `None` and summaries return a fixed notice, and no request
//! leaves the process. Failures are logged and folded into the same
//! fallbacks; callers never see an error.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const GAP_FALLBACK: &str = "No explicit gaps mentioned.";
pub const SUMMARY_UNAVAILABLE: &str = "AI summarization unavailable: Missing API Key.";
pub const SUMMARY_EMPTY: &str = "Summary unavailable.";
pub const SUMMARY_ERROR: &str = "Could not generate summary at this time.";

pub fn gap_prompt(abstract_text: &str) -> String {
    format!(
        "Extract the limitations, future work, and research gaps from this text in 1-2 short sentences. If there are none explicitly mentioned, infer potential gaps or state \"No explicit gaps mentioned.\":\n\n{}",
        abstract_text
    )
}

pub fn summary_prompt(abstract_text: &str) -> String {
    format!(
        "Provide a concise, easy-to-understand summary of this research paper abstract in 2-3 sentences:\n\n{}",
        abstract_text
    )
}

#[async_trait]
pub trait ResearchAssistant: Send + Sync {
    /// Research gaps stated in (or inferred from) an abstract. `None` when
    /// the service is unavailable or the call failed.
    async fn extract_gap(&self, abstract_text: &str) -> Option<String>;

    /// A short summary of an abstract, or a placeholder message.
    async fn summarize(&self, abstract_text: &str) -> String;
}

// ============================================================================
// Gemini Client
// ============================================================================

#[derive(Error, Debug)]
pub enum AiError {
    #[error("request to Gemini API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from Gemini API: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected Gemini response: {0}")]
    ResponseParse(String),
}

/// Concatenated text parts of the first candidate. An empty string means
/// the model answered with no text.
pub fn parse_completion(body: &Value) -> Result<String, AiError> {
    let candidate = body["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| AiError::ResponseParse("missing 'candidates'".to_string()))?;

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text.trim().to_string())
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: String) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        debug!(model = self.model.as_str(), "sending Gemini request");
        let response = self
            .http
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| AiError::ResponseParse(format!("invalid JSON: {}", e)))?;
        parse_completion(&json)
    }
}

// ============================================================================
// Assistant
// ============================================================================

pub struct GeminiAssistant {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: OnceCell<GeminiClient>,
}

impl GeminiAssistant {
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Self {
        if api_key.is_none() {
            info!("GEMINI_API_KEY not set; gap extraction and summaries are disabled");
        }
        Self {
            api_key,
            base_url: base_url.to_string(),
            model: model.to_string(),
            client: OnceCell::new(),
        }
    }

    /// Whether the shared client has been constructed.
    pub fn is_ready(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> Option<&GeminiClient> {
        let key = self.api_key.as_ref()?;
        self.client
            .get_or_try_init(|| GeminiClient::new(&self.base_url, &self.model, key.clone()))
            .map_err(|e| warn!(error = %e, "could not build Gemini client"))
            .ok()
    }
}

#[async_trait]
impl ResearchAssistant for GeminiAssistant {
    async fn extract_gap(&self, abstract_text: &str) -> Option<String> {
        let client = self.client()?;
        match client.generate(&gap_prompt(abstract_text)).await {
            Ok(text) if text.is_empty() => Some(GAP_FALLBACK.to_string()),
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "gap extraction failed");
                None
            }
        }
    }

    async fn summarize(&self, abstract_text: &str) -> String {
        let Some(client) = self.client() else {
            return SUMMARY_UNAVAILABLE.to_string();
        };
        match client.generate(&summary_prompt(abstract_text)).await {
            Ok(text) if text.is_empty() => SUMMARY_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "summarization failed");
                SUMMARY_ERROR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

    #[test]
    fn test_parse_completion_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Needs larger " }, { "text": "datasets." }] },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_completion(&body).unwrap(), "Needs larger datasets.");
    }

    #[test]
    fn test_parse_completion_without_text() {
        let body = serde_json::json!({ "candidates": [{ "content": {} }] });
        assert_eq!(parse_completion(&body).unwrap(), "");
        assert!(matches!(
            parse_completion(&serde_json::json!({})),
            Err(AiError::ResponseParse(_))
        ));
    }

    #[test]
    fn test_prompts_embed_abstract() {
        assert!(gap_prompt("ABSTRACT").ends_with(":\n\nABSTRACT"));
        assert!(summary_prompt("ABSTRACT").starts_with("Provide a concise"));
    }

    #[tokio::test]
    async fn test_without_key_degrades_and_never_builds_client() {
        let assistant = GeminiAssistant::new(None, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL);
        assert_eq!(assistant.extract_gap("An abstract.").await, None);
        assert_eq!(assistant.summarize("An abstract.").await, SUMMARY_UNAVAILABLE);
        assert!(!assistant.is_ready());
    }

    #[test]
    fn test_client_built_once_with_key() {
        let assistant = GeminiAssistant::new(
            Some("key".to_string()),
            DEFAULT_GEMINI_API_BASE,
            DEFAULT_GEMINI_MODEL,
        );
        assert!(!assistant.is_ready());
        let first = assistant.client().map(|c| c as *const GeminiClient);
        let second = assistant.client().map(|c| c as *const GeminiClient);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(assistant.is_ready());
    }
}
