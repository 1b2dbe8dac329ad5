//! Response envelopes of the engine's JSON API.
//!
//! Every endpoint answers `{"status": "success", ...}` on success and any
//! other status, usually with a `message`, on failure.

use super::{Article, SearchHit};
use serde::{Deserialize, Serialize};

/// Status value of a successful response.
pub const STATUS_SUCCESS: &str = "success";

/// Response of `POST /api/search/{mode}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchHit>>,
}

impl SearchResponse {
    pub fn success(results: Vec<SearchHit>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
            results: Some(results),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            results: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The hits of a successful response, or the failure message.
    ///
    /// A successful response without a result list has no hits.
    pub fn into_result(self) -> std::result::Result<Vec<SearchHit>, String> {
        if self.is_success() {
            Ok(self.results.unwrap_or_default())
        } else {
            Err(failure_message(&self.status, self.message))
        }
    }
}

/// Response of `GET /api/article?id={id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<Article>,
}

impl ArticleResponse {
    pub fn success(article: Article) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
            article: Some(article),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            article: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// The article of a successful response, or the failure message.
    pub fn into_result(self) -> std::result::Result<Article, String> {
        match (self.is_success(), self.article) {
            (true, Some(article)) => Ok(article),
            (true, None) => Err("response carries no article".to_string()),
            (false, _) => Err(failure_message(&self.status, self.message)),
        }
    }
}

fn failure_message(status: &str, message: Option<String>) -> String {
    message.unwrap_or_else(|| format!("engine answered with status '{}'", status))
}
