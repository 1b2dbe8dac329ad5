//! Navigation between the result list and articles.

use crate::models::Article;
use crate::network::EngineApi;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Which screen the client is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    SearchResults,
    Article(u64),
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationState::SearchResults => write!(f, "search results"),
            NavigationState::Article(id) => write!(f, "article {}", id),
        }
    }
}

/// Whether a back signal was used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Handled: the client went back to the result list.
    Consumed,
    /// Not handled: the host applies its default (leaving the view).
    Propagate,
}

/// Owner of the navigation state and the displayed article.
///
/// Every transition goes through this type. The article is replaced
/// wholesale on each successful fetch and dropped when leaving it.
pub struct ArticleViewModel {
    api: Arc<dyn EngineApi>,
    state: NavigationState,
    article: Option<Article>,
    history: usize,
}

impl ArticleViewModel {
    pub fn new(api: Arc<dyn EngineApi>) -> Self {
        Self {
            api,
            state: NavigationState::SearchResults,
            article: None,
            history: 0,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    /// Number of history markers pushed by opened articles.
    pub fn history_depth(&self) -> usize {
        self.history
    }

    /// Fetch and show article `id`.
    ///
    /// On failure the state is left untouched and nothing is retried.
    /// Returns whether the article is now shown.
    pub async fn open(&mut self, id: u64) -> bool {
        match self.api.article(id).await {
            Ok(article) => {
                info!(id, title = %article.title, "Opened article");
                self.article = Some(article);
                self.state = NavigationState::Article(id);
                self.history += 1;
                true
            }
            Err(e) => {
                warn!("Staying on {}: {}", self.state, e);
                false
            }
        }
    }

    /// Handle the back signal.
    pub fn back(&mut self) -> BackOutcome {
        match self.state {
            NavigationState::Article(_) => {
                self.leave_article();
                self.history = self.history.saturating_sub(1);
                BackOutcome::Consumed
            }
            NavigationState::SearchResults => BackOutcome::Propagate,
        }
    }

    /// Return to the result list for a new submission.
    ///
    /// Unlike [`back`](Self::back) this discards the article history.
    pub fn show_results(&mut self) {
        self.leave_article();
        self.history = 0;
    }

    fn leave_article(&mut self) {
        self.state = NavigationState::SearchResults;
        self.article = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mode, SearchHit, SearchRequest, Section};
    use crate::{Result, WikiliteError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves article 42 only and counts every call.
    #[derive(Default)]
    struct OneArticle {
        searches: AtomicUsize,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl EngineApi for OneArticle {
        async fn search(&self, _mode: Mode, _request: &SearchRequest) -> Result<Vec<SearchHit>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn article(&self, id: u64) -> Result<Article> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if id != 42 {
                return Err(WikiliteError::ArticleFetch {
                    id,
                    message: "not found".into(),
                });
            }
            Ok(Article {
                id,
                title: "Light".into(),
                sections: vec![Section {
                    title: "Intro".into(),
                    content: "Light is...".into(),
                }],
            })
        }

        async fn root(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_open_then_back_returns_to_results_without_searching() {
        let engine = Arc::new(OneArticle::default());
        let mut model = ArticleViewModel::new(engine.clone());

        assert!(model.open(42).await);
        assert_eq!(model.state(), NavigationState::Article(42));
        assert_eq!(model.article().unwrap().title, "Light");
        assert_eq!(model.history_depth(), 1);

        assert_eq!(model.back(), BackOutcome::Consumed);
        assert_eq!(model.state(), NavigationState::SearchResults);
        assert!(model.article().is_none());
        assert_eq!(engine.searches.load(Ordering::SeqCst), 0);
        assert_eq!(engine.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_back_on_results_propagates() {
        let mut model = ArticleViewModel::new(Arc::new(OneArticle::default()));
        assert_eq!(model.back(), BackOutcome::Propagate);
        assert_eq!(model.state(), NavigationState::SearchResults);
    }

    #[tokio::test]
    async fn test_failed_open_keeps_current_state() {
        let engine = Arc::new(OneArticle::default());
        let mut model = ArticleViewModel::new(engine.clone());

        assert!(!model.open(7).await);
        assert_eq!(model.state(), NavigationState::SearchResults);

        assert!(model.open(42).await);
        assert!(!model.open(7).await);
        assert_eq!(model.state(), NavigationState::Article(42));
        assert_eq!(model.article().unwrap().id, 42);
        assert_eq!(engine.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_show_results_discards_history() {
        let mut model = ArticleViewModel::new(Arc::new(OneArticle::default()));
        model.open(42).await;
        model.open(42).await;
        assert_eq!(model.history_depth(), 2);

        model.show_results();
        assert_eq!(model.state(), NavigationState::SearchResults);
        assert_eq!(model.history_depth(), 0);
    }
}
