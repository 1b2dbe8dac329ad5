//! The search client as a whole.
//!
//! [`ClientController`] owns everything a front end shows: the mode
//! selection, the limit input, the last results, and the navigation state
//! through [`ArticleViewModel`]. Front ends feed it [`UiEvent`]s and draw the
//! [`View`] it renders.
//!
//! A submission is split in three steps so a front end can keep accepting
//! input while searches are in flight:
//!
//! 1. [`ClientController::begin_search`] clears the screen and hands out a
//!    [`PendingSearch`] tagged with a fresh submission token.
//! 2. [`SearchOrchestrator::complete`] runs it, without touching the
//!    controller.
//! 3. [`ClientController::finish_search`] applies the result, unless a newer
//!    submission was made in between.
//!
//! [`ClientController::submit`] chains the three for callers that wait.

use super::navigation::{ArticleViewModel, BackOutcome, NavigationState};
use super::render::{no_results_notice, render, RenderInput, View};
use super::search::{
    CompletedSearch, PendingSearch, SearchOrchestrator, SearchOutcome, SubmissionToken,
};
use crate::models::{parse_limit, Mode, ModeSelection, SearchRequest, SearchResult};
use crate::network::EngineApi;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options fixed when the client is created.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOptions {
    /// Pre-select semantic search.
    pub ai: bool,
}

/// Input from the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SetMode { mode: Mode, selected: bool },
    ToggleMode(Mode),
    SetLimit(String),
    Submit(String),
    Open(u64),
    Back,
    /// Load the engine's root page again.
    Reload,
}

/// Whether the controller used an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// Left to the host: a back signal on the result list.
    Propagate,
}

pub struct ClientController {
    api: Arc<dyn EngineApi>,
    orchestrator: SearchOrchestrator,
    navigation: ArticleViewModel,
    modes: ModeSelection,
    limit_input: Option<String>,
    results: Vec<SearchResult>,
    notice: Option<String>,
    loading: bool,
    load_error: Option<String>,
    latest: SubmissionToken,
}

impl ClientController {
    pub fn new(api: Arc<dyn EngineApi>, options: ClientOptions) -> Self {
        Self {
            orchestrator: SearchOrchestrator::new(Arc::clone(&api)),
            navigation: ArticleViewModel::new(Arc::clone(&api)),
            api,
            modes: ModeSelection::with_ai(options.ai),
            limit_input: None,
            results: Vec::new(),
            notice: None,
            loading: false,
            load_error: None,
            latest: SubmissionToken::default(),
        }
    }

    pub fn modes(&self) -> &ModeSelection {
        &self.modes
    }

    /// Result limit as the current input parses.
    pub fn limit(&self) -> u32 {
        parse_limit(self.limit_input.as_deref())
    }

    pub fn state(&self) -> NavigationState {
        self.navigation.state()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A handle to run pending searches with.
    pub fn orchestrator(&self) -> SearchOrchestrator {
        self.orchestrator.clone()
    }

    /// Load the engine's root page. A failure is kept and rendered as an
    /// error view until the engine answers a submission or an article fetch.
    pub async fn load_root(&mut self) -> View {
        match self.api.root().await {
            Ok(()) => {
                info!("Engine root page loaded");
                self.load_error = None;
            }
            Err(e) => {
                warn!("Failed to load engine root page: {}", e);
                self.load_error = Some(format!("The search engine is not reachable: {}", e));
            }
        }
        self.view()
    }

    pub fn set_mode(&mut self, mode: Mode, selected: bool) {
        self.modes.set(mode, selected);
        debug!(modes = ?self.modes.modes(), "Mode selection changed");
    }

    pub fn toggle_mode(&mut self, mode: Mode) {
        self.modes.toggle(mode);
        debug!(modes = ?self.modes.modes(), "Mode selection changed");
    }

    pub fn set_limit(&mut self, input: impl Into<String>) {
        self.limit_input = Some(input.into());
    }

    /// Start a submission.
    ///
    /// Clears the previous results, notice and article in any case. Returns
    /// `None` (and issues nothing) for a blank query or an empty selection.
    pub fn begin_search(&mut self, query: &str) -> Option<PendingSearch> {
        self.latest = self.latest.next();
        self.results.clear();
        self.notice = None;
        self.navigation.show_results();
        self.loading = false;

        match SearchRequest::new(query, &self.modes.modes(), self.limit()) {
            Ok(request) => {
                info!(
                    query = %request.query,
                    modes = ?request.modes,
                    limit = request.limit,
                    "Searching"
                );
                self.loading = true;
                Some(PendingSearch {
                    token: self.latest,
                    request,
                })
            }
            Err(e) => {
                debug!("Nothing to search: {}", e);
                None
            }
        }
    }

    /// Apply a completed submission. Returns `false` when it was superseded
    /// by a newer one and dropped.
    pub async fn finish_search(&mut self, completed: CompletedSearch) -> bool {
        if completed.token != self.latest {
            debug!(
                token = completed.token.value(),
                latest = self.latest.value(),
                "Discarding stale search results"
            );
            return false;
        }

        self.load_error = None;
        self.results = completed.outcome.results().to_vec();
        match completed.outcome {
            SearchOutcome::NoResults { query } => {
                self.notice = Some(no_results_notice(&query));
            }
            SearchOutcome::Single(only) => {
                self.navigation.open(only.article_id).await;
            }
            SearchOutcome::Listing(_) => {}
        }
        self.loading = false;
        true
    }

    /// Submit `query` and wait for its results.
    pub async fn submit(&mut self, query: &str) -> View {
        if let Some(pending) = self.begin_search(query) {
            let completed = self.orchestrator.complete(pending).await;
            self.finish_search(completed).await;
        }
        self.view()
    }

    /// Open an article from the result list.
    pub async fn open(&mut self, id: u64) -> View {
        self.loading = true;
        if self.navigation.open(id).await {
            self.load_error = None;
        }
        self.loading = false;
        self.view()
    }

    /// The single back handler.
    pub fn back(&mut self) -> EventOutcome {
        match self.navigation.back() {
            BackOutcome::Consumed => EventOutcome::Handled,
            BackOutcome::Propagate => EventOutcome::Propagate,
        }
    }

    pub async fn handle(&mut self, event: UiEvent) -> EventOutcome {
        match event {
            UiEvent::SetMode { mode, selected } => self.set_mode(mode, selected),
            UiEvent::ToggleMode(mode) => self.toggle_mode(mode),
            UiEvent::SetLimit(input) => self.set_limit(input),
            UiEvent::Submit(query) => {
                self.submit(&query).await;
            }
            UiEvent::Open(id) => {
                self.open(id).await;
            }
            UiEvent::Back => return self.back(),
            UiEvent::Reload => {
                self.load_root().await;
            }
        }
        EventOutcome::Handled
    }

    /// Render the current state.
    pub fn view(&self) -> View {
        let input = RenderInput {
            results: &self.results,
            notice: self.notice.as_deref(),
            article: self.navigation.article(),
            loading: self.loading,
            load_error: self.load_error.as_deref(),
        };
        render(self.navigation.state(), &input)
    }
}
