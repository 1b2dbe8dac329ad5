//! Fan-out of one search submission over the selected modes.

use crate::models::{Mode, SearchRequest, SearchResult};
use crate::network::EngineApi;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a completed search leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing matched; carries the literal query for the notice.
    NoResults { query: String },
    /// Exactly one match: its article is opened directly.
    Single(SearchResult),
    /// Several matches, in merge order.
    Listing(Vec<SearchResult>),
}

impl SearchOutcome {
    /// Classify merged results.
    pub fn classify(query: &str, mut results: Vec<SearchResult>) -> Self {
        match results.len() {
            0 => SearchOutcome::NoResults {
                query: query.to_string(),
            },
            1 => match results.pop() {
                Some(only) => SearchOutcome::Single(only),
                None => SearchOutcome::Listing(results),
            },
            _ => SearchOutcome::Listing(results),
        }
    }

    /// The results to keep for the listing, whatever the outcome.
    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::NoResults { .. } => &[],
            SearchOutcome::Single(only) => std::slice::from_ref(only),
            SearchOutcome::Listing(results) => results,
        }
    }
}

/// Identifies one submission. Later submissions carry larger tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionToken(u64);

impl SubmissionToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A validated submission waiting to be run.
#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub token: SubmissionToken,
    pub request: SearchRequest,
}

/// A submission whose searches have all completed.
#[derive(Debug, Clone)]
pub struct CompletedSearch {
    pub token: SubmissionToken,
    pub outcome: SearchOutcome,
}

/// Runs a [`SearchRequest`] against every selected mode concurrently.
///
/// Modes are isolated from one another: a mode whose request fails
/// contributes no results and the others are merged as usual.
#[derive(Clone)]
pub struct SearchOrchestrator {
    api: Arc<dyn EngineApi>,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn EngineApi>) -> Self {
        Self { api }
    }

    /// Search all modes and concatenate their results in submission order.
    ///
    /// Waits for every mode; nothing is cancelled mid-flight.
    pub async fn search(&self, request: &SearchRequest) -> Vec<SearchResult> {
        let searches = request
            .modes
            .iter()
            .map(|mode| self.search_mode(*mode, request));
        let per_mode = join_all(searches).await;

        let merged: Vec<SearchResult> = per_mode.into_iter().flatten().collect();
        debug!(
            query = %request.query,
            modes = request.modes.len(),
            results = merged.len(),
            "Search completed"
        );
        merged
    }

    /// Search and classify the merged results.
    pub async fn run(&self, request: &SearchRequest) -> SearchOutcome {
        let results = self.search(request).await;
        SearchOutcome::classify(&request.query, results)
    }

    /// Run a pending submission, keeping its token.
    pub async fn complete(&self, pending: PendingSearch) -> CompletedSearch {
        CompletedSearch {
            token: pending.token,
            outcome: self.run(&pending.request).await,
        }
    }

    async fn search_mode(&self, mode: Mode, request: &SearchRequest) -> Vec<SearchResult> {
        match self.api.search(mode, request).await {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| SearchResult::from_hit(hit, mode))
                .collect(),
            Err(e) => {
                warn!(%mode, "Search mode degraded to no results: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, SearchHit};
    use crate::{Result, WikiliteError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Answers each mode from a table, after an optional per-mode delay.
    struct TableEngine {
        answers: HashMap<Mode, Option<Vec<SearchHit>>>,
        delays: HashMap<Mode, Duration>,
    }

    fn hit(id: u64, title: &str) -> SearchHit {
        SearchHit {
            article_id: id,
            title: title.to_string(),
            snippet: title.to_string(),
            text: String::new(),
        }
    }

    #[async_trait]
    impl EngineApi for TableEngine {
        async fn search(&self, mode: Mode, _request: &SearchRequest) -> Result<Vec<SearchHit>> {
            if let Some(delay) = self.delays.get(&mode) {
                tokio::time::sleep(*delay).await;
            }
            match self.answers.get(&mode) {
                Some(Some(hits)) => Ok(hits.clone()),
                _ => Err(WikiliteError::SearchMode {
                    mode: mode.to_string(),
                    message: "unavailable".into(),
                }),
            }
        }

        async fn article(&self, id: u64) -> Result<Article> {
            Err(WikiliteError::ArticleFetch {
                id,
                message: "not served".into(),
            })
        }

        async fn root(&self) -> Result<()> {
            Ok(())
        }
    }

    fn orchestrator(engine: TableEngine) -> SearchOrchestrator {
        SearchOrchestrator::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_failing_mode_does_not_abort_the_others() {
        let engine = TableEngine {
            answers: HashMap::from([
                (Mode::Title, Some(vec![hit(1, "Light"), hit(2, "Lightning")])),
                (Mode::Semantic, None),
            ]),
            delays: HashMap::new(),
        };
        let request = SearchRequest::new("light", &[Mode::Title, Mode::Semantic], 10).unwrap();

        let results = orchestrator(engine).search(&request).await;

        let ids: Vec<u64> = results.iter().map(|r| r.article_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(results.iter().all(|r| r.mode == Mode::Title));
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_follows_submission_order_not_completion_order() {
        let engine = TableEngine {
            answers: HashMap::from([
                (Mode::Lexical, Some(vec![hit(10, "Optics")])),
                (Mode::Distance, Some(vec![hit(20, "Lamp"), hit(10, "Optics")])),
            ]),
            delays: HashMap::from([(Mode::Lexical, Duration::from_secs(3))]),
        };
        let request = SearchRequest::new("light", &[Mode::Lexical, Mode::Distance], 10).unwrap();

        let results = orchestrator(engine).search(&request).await;

        let tagged: Vec<(u64, Mode)> = results.iter().map(|r| (r.article_id, r.mode)).collect();
        assert_eq!(
            tagged,
            vec![(10, Mode::Lexical), (20, Mode::Distance), (10, Mode::Distance)]
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            SearchOutcome::classify("zzqq", vec![]),
            SearchOutcome::NoResults {
                query: "zzqq".into()
            }
        );

        let only = SearchResult::from_hit(hit(42, "Light"), Mode::Title);
        let outcome = SearchOutcome::classify("light", vec![only.clone()]);
        assert_eq!(outcome, SearchOutcome::Single(only));
        assert_eq!(outcome.results().len(), 1);

        let two = vec![
            SearchResult::from_hit(hit(1, "A"), Mode::Title),
            SearchResult::from_hit(hit(2, "B"), Mode::Title),
        ];
        assert_eq!(SearchOutcome::classify("x", two).results().len(), 2);
    }
}
