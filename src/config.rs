//! Runtime configuration, read from the environment (and `.env`).

use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_SCHOLAR_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("GAPGRAPH_BIND is not a valid socket address ({value}): {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub scholar_api_base: String,
    pub scholar_api_key: Option<String>,
    /// `None` disables every AI feature.
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind = get("GAPGRAPH_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind.clone(),
                source,
            })?;

        let scholar_api_base = base_url(
            "SCHOLAR_API_BASE",
            get("SCHOLAR_API_BASE").unwrap_or_else(|| DEFAULT_SCHOLAR_API_BASE.to_string()),
        )?;
        let gemini_api_base = base_url(
            "GEMINI_API_BASE",
            get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
        )?;

        Ok(Self {
            bind_addr,
            scholar_api_base,
            scholar_api_key: get("SCHOLAR_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_api_base,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }

    pub fn ai_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

/// Check that `value` parses as a URL and strip any trailing slash.
fn base_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        var,
        value: value.clone(),
        source,
    })?;
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.scholar_api_base, DEFAULT_SCHOLAR_API_BASE);
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert!(!config.ai_enabled());
    }

    #[test]
    fn test_empty_key_disables_ai() {
        let config = config_from(&[("GEMINI_API_KEY", "  ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("SCHOLAR_API_BASE", "http://localhost:8080/graph/v1/"),
            ("GAPGRAPH_BIND", "127.0.0.1:8000"),
        ])
        .unwrap();
        assert!(config.ai_enabled());
        assert_eq!(config.scholar_api_base, "http://localhost:8080/graph/v1");
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("SCHOLAR_API_BASE", "not a url")]),
            Err(ConfigError::InvalidUrl { var: "SCHOLAR_API_BASE", .. })
        ));
        assert!(matches!(
            config_from(&[("GAPGRAPH_BIND", "localhost")]),
            Err(ConfigError::InvalidBind { .. })
        ));
    }
}
