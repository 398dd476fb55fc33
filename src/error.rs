//! Errors surfaced by the HTTP API.
//!
//! Every variant renders as `{ "error": "<message>" }`. Only validation
//! failures use 400; anything that went wrong upstream is a 500 with the
//! most specific message we could recover.

use crate::models::ErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str =
    "Semantic Scholar API rate limit exceeded. Please try again in a few minutes.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required request field was missing or empty.
    #[error("{0} is required")]
    Validation(&'static str),

    /// The search API answered 429.
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("Semantic Scholar API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid JSON from Semantic Scholar API")]
    InvalidUpstreamJson,

    #[error("Semantic Scholar API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to export papers: {0}")]
    Export(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited
            | ApiError::Upstream { .. }
            | ApiError::InvalidUpstreamJson
            | ApiError::Transport(_)
            | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
