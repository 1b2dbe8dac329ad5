//! The engine's JSON API.
//!
//! [`EngineApi`] is the seam between the client and the network: the search
//! orchestrator and the article view model only ever see this trait, so tests
//! can substitute an in-memory engine.

use super::HttpClient;
use crate::config::EngineConfig;
use crate::models::{Article, ArticleResponse, Mode, SearchHit, SearchRequest, SearchResponse};
use crate::{Result, WikiliteError};
use async_trait::async_trait;
use url::Url;

/// Operations the client needs from the engine.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Run `request` against the endpoint of a single `mode`.
    async fn search(&self, mode: Mode, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// Fetch one article by id.
    async fn article(&self, id: u64) -> Result<Article>;

    /// Load the served root page.
    async fn root(&self) -> Result<()>;
}

/// [`EngineApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngineApi {
    base: Url,
    http: HttpClient,
}

impl HttpEngineApi {
    /// Talk to the engine at `base_url`, e.g. `http://127.0.0.1:35248/`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, HttpClient::new()?)
    }

    pub fn with_client(base_url: &str, http: HttpClient) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| WikiliteError::Config {
            message: format!("Invalid engine URL {}: {}", base_url, e),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, http })
    }

    /// The engine at its fixed loopback address.
    pub fn local() -> Result<Self> {
        Self::new(&EngineConfig::base_url())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| WikiliteError::Config {
            message: format!("Invalid endpoint {}: {}", path, e),
        })
    }

    /// URL of a mode's search endpoint.
    pub fn search_url(&self, mode: Mode) -> Result<Url> {
        self.endpoint(&format!("api/search/{}", mode))
    }

    /// URL of an article.
    pub fn article_url(&self, id: u64) -> Result<Url> {
        let mut url = self.endpoint("api/article")?;
        url.query_pairs_mut().append_pair("id", &id.to_string());
        Ok(url)
    }
}

#[async_trait]
impl EngineApi for HttpEngineApi {
    async fn search(&self, mode: Mode, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let search_error = |message: String| WikiliteError::SearchMode {
            mode: mode.to_string(),
            message,
        };

        let url = self.search_url(mode)?;
        let response = self
            .http
            .post_json(url.as_str(), &request.body())
            .await
            .map_err(|e| search_error(e.to_string()))?;
        let envelope: SearchResponse = response
            .json()
            .await
            .map_err(|e| search_error(format!("invalid response: {}", e)))?;

        envelope.into_result().map_err(search_error)
    }

    async fn article(&self, id: u64) -> Result<Article> {
        let article_error = |message: String| WikiliteError::ArticleFetch { id, message };

        let url = self.article_url(id)?;
        let response = self
            .http
            .get(url.as_str())
            .await
            .map_err(|e| article_error(e.to_string()))?;
        let envelope: ArticleResponse = response
            .json()
            .await
            .map_err(|e| article_error(format!("invalid response: {}", e)))?;

        envelope.into_result().map_err(article_error)
    }

    async fn root(&self) -> Result<()> {
        self.http.get(self.base.as_str()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let api = HttpEngineApi::local().unwrap();
        assert_eq!(
            api.search_url(Mode::Semantic).unwrap().as_str(),
            "http://127.0.0.1:35248/api/search/semantic"
        );
        assert_eq!(
            api.article_url(42).unwrap().as_str(),
            "http://127.0.0.1:35248/api/article?id=42"
        );
    }

    #[test]
    fn test_base_without_trailing_slash_keeps_prefix() {
        let api = HttpEngineApi::new("http://127.0.0.1:8080/wiki").unwrap();
        assert_eq!(
            api.search_url(Mode::Title).unwrap().as_str(),
            "http://127.0.0.1:8080/wiki/api/search/title"
        );
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        assert!(matches!(
            HttpEngineApi::new("not a url"),
            Err(WikiliteError::Config { .. })
        ));
    }
}
