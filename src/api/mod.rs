//! Recommendation service access
//!
//! The UI only ever sees [`RecommendationSource`]; the HTTP implementation
//! lives in [`client`].

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;

pub use client::HttpRecommendationClient;

/// Why a fetch failed. Never shown to the user, only logged.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Anything that can turn a user id into an ordered list of recommendations
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn recommend(&self, user_id: &str) -> Result<Vec<String>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    recommendations: Option<Vec<Recommendation>>,
}

// The service has returned both item names and numeric item ids
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recommendation {
    Text(String),
    Number(serde_json::Number),
}

impl From<Recommendation> for String {
    fn from(item: Recommendation) -> Self {
        match item {
            Recommendation::Text(s) => s,
            Recommendation::Number(n) => n.to_string(),
        }
    }
}

/// Decode a `/recommend` response body. A missing or null
/// `recommendations` field is an empty list, not an error.
pub fn parse_recommendations(body: &str) -> Result<Vec<String>, FetchError> {
    let response: RecommendResponse = serde_json::from_str(body)?;
    Ok(response
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}
