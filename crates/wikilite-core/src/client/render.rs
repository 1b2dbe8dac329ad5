//! Rendering of client state into a view.
//!
//! [`render`] is a pure function of the navigation state and the data the
//! controller holds. It runs after every transition; nothing else decides
//! what is on screen.

use super::navigation::NavigationState;
use crate::config::SearchConfig;
use crate::models::{Article, Mode, SearchResult};

pub const HIGHLIGHT_OPEN: &str = "<mark>";
pub const HIGHLIGHT_CLOSE: &str = "</mark>";

/// Remove highlight tags from a snippet.
pub fn strip_highlight(snippet: &str) -> String {
    snippet.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "")
}

/// A piece of text and how the front end must treat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Shown as is.
    Plain(String),
    /// May contain highlight tags to be interpreted.
    Html(String),
}

impl Markup {
    pub fn as_str(&self) -> &str {
        match self {
            Markup::Plain(s) | Markup::Html(s) => s,
        }
    }
}

/// One entry of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub article_id: u64,
    /// Clickable heading opening the article.
    pub heading: Markup,
    pub body: Markup,
    pub mode: Mode,
}

impl ResultView {
    /// Lay out a result.
    ///
    /// Title matches, and results whose snippet is just the highlighted
    /// title, show the snippet as heading and the full text as body. All
    /// others show the plain title as heading and the snippet as body.
    ///
    /// Distance results follow the general rule. The web page the engine
    /// ships with also gives them the full-text body; this layout does not.
    pub fn from_result(result: &SearchResult) -> Self {
        let snippet_is_title = strip_highlight(&result.snippet) == result.title;
        let (heading, body) = if result.mode == Mode::Title || snippet_is_title {
            (
                Markup::Html(result.snippet.clone()),
                Markup::Plain(result.text.clone()),
            )
        } else {
            (
                Markup::Plain(result.title.clone()),
                Markup::Html(result.snippet.clone()),
            )
        };

        Self {
            article_id: result.article_id,
            heading,
            body,
            mode: result.mode,
        }
    }
}

/// One rendered article section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    /// Anchor of the section heading, `section-{i}`.
    pub anchor: String,
    /// Anchor of the section body, `content-{i}`.
    pub content_anchor: String,
    pub title: String,
    pub content: String,
}

/// What the front end shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// The engine's root page could not be loaded.
    Error { message: String },
    SearchResults {
        title: String,
        items: Vec<ResultView>,
        /// "No results" notice of the last submission.
        notice: Option<String>,
        loading: bool,
    },
    Article {
        id: u64,
        title: String,
        sections: Vec<SectionView>,
        loading: bool,
    },
}

impl View {
    /// Window title.
    pub fn title(&self) -> &str {
        match self {
            View::Error { .. } => "Error",
            View::SearchResults { title, .. } | View::Article { title, .. } => title,
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            View::Error { .. } => false,
            View::SearchResults { loading, .. } | View::Article { loading, .. } => *loading,
        }
    }
}

/// Data the controller holds besides the navigation state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderInput<'a> {
    pub results: &'a [SearchResult],
    pub notice: Option<&'a str>,
    pub article: Option<&'a Article>,
    pub loading: bool,
    pub load_error: Option<&'a str>,
}

/// Notice shown when a submission matched nothing.
pub fn no_results_notice(query: &str) -> String {
    format!("No results found for \"{}\"", query)
}

/// Produce the view for `state`.
pub fn render(state: NavigationState, input: &RenderInput<'_>) -> View {
    if let Some(message) = input.load_error {
        return View::Error {
            message: message.to_string(),
        };
    }

    match (state, input.article) {
        (NavigationState::Article(id), Some(article)) if article.id == id => View::Article {
            id,
            title: article.title.clone(),
            sections: render_sections(article),
            loading: input.loading,
        },
        _ => View::SearchResults {
            title: SearchConfig::RESULTS_TITLE.to_string(),
            items: input.results.iter().map(ResultView::from_result).collect(),
            notice: input.notice.map(str::to_string),
            loading: input.loading,
        },
    }
}

fn render_sections(article: &Article) -> Vec<SectionView> {
    article
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| SectionView {
            anchor: format!("section-{}", i),
            content_anchor: format!("content-{}", i),
            title: section.title.clone(),
            content: section.content.clone(),
        })
        .collect()
}
