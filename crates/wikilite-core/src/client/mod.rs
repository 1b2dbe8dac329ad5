//! The search client driven by a front end.
//!
//! - [`SearchOrchestrator`] fans a submission out over the selected modes
//! - [`ArticleViewModel`] owns navigation between results and articles
//! - [`render`] turns the client state into a [`View`]
//! - [`ClientController`] ties them together behind [`UiEvent`]s

mod controller;
mod navigation;
mod render;
mod search;

pub use controller::{ClientController, ClientOptions, EventOutcome, UiEvent};
pub use navigation::{ArticleViewModel, BackOutcome, NavigationState};
pub use render::{
    no_results_notice, render, strip_highlight, Markup, RenderInput, ResultView, SectionView,
    View, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN,
};
pub use search::{
    CompletedSearch, PendingSearch, SearchOrchestrator, SearchOutcome, SubmissionToken,
};
