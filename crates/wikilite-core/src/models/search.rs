//! Search modes, requests and results.

use crate::config::SearchConfig;
use crate::error::{Result, WikiliteError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A search strategy, each served by its own engine endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Match against article titles.
    Title,
    /// Full-text match against article content.
    Lexical,
    /// Embedding similarity.
    Semantic,
    /// Word distance.
    Distance,
}

impl Mode {
    /// All modes in display order. Selections are submitted in this order.
    pub const ALL: [Mode; 4] = [Mode::Title, Mode::Lexical, Mode::Semantic, Mode::Distance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Title => "title",
            Mode::Lexical => "lexical",
            Mode::Semantic => "semantic",
            Mode::Distance => "distance",
        }
    }

    /// The mode that selecting `self` deselects.
    pub fn excludes(&self) -> Option<Mode> {
        match self {
            Mode::Title => Some(Mode::Lexical),
            Mode::Lexical => Some(Mode::Title),
            Mode::Semantic | Mode::Distance => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = WikiliteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Mode::Title),
            "lexical" => Ok(Mode::Lexical),
            "semantic" => Ok(Mode::Semantic),
            "distance" => Ok(Mode::Distance),
            other => Err(WikiliteError::Config {
                message: format!("Unknown search mode: {}", other),
            }),
        }
    }
}

/// The set of modes currently ticked in the search form.
///
/// `title` and `lexical` never coexist: selecting one clears the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelection {
    selected: [bool; 4],
}

impl Default for ModeSelection {
    fn default() -> Self {
        let mut selection = Self::empty();
        selection.set(Mode::Title, true);
        selection
    }
}

impl ModeSelection {
    pub fn empty() -> Self {
        Self {
            selected: [false; 4],
        }
    }

    /// The default selection, with `semantic` added when AI search is on.
    pub fn with_ai(ai: bool) -> Self {
        let mut selection = Self::default();
        if ai {
            selection.set(Mode::Semantic, true);
        }
        selection
    }

    fn index(mode: Mode) -> usize {
        Mode::ALL.iter().position(|m| *m == mode).unwrap_or_default()
    }

    /// Tick or untick `mode`.
    pub fn set(&mut self, mode: Mode, on: bool) {
        self.selected[Self::index(mode)] = on;
        if on {
            if let Some(excluded) = mode.excludes() {
                self.selected[Self::index(excluded)] = false;
            }
        }
    }

    pub fn toggle(&mut self, mode: Mode) {
        let on = !self.is_selected(mode);
        self.set(mode, on);
    }

    pub fn is_selected(&self, mode: Mode) -> bool {
        self.selected[Self::index(mode)]
    }

    pub fn is_empty(&self) -> bool {
        !self.selected.iter().any(|s| *s)
    }

    /// Selected modes in submission order.
    pub fn modes(&self) -> Vec<Mode> {
        Mode::ALL
            .into_iter()
            .filter(|m| self.is_selected(*m))
            .collect()
    }
}

/// Parse the result limit the way the search form does: leading digits
/// count, anything else (or a non-positive number) falls back to the default.
pub fn parse_limit(input: Option<&str>) -> u32 {
    let Some(input) = input else {
        return SearchConfig::DEFAULT_LIMIT;
    };
    let trimmed = input.trim_start();
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(limit) if limit > 0 => limit,
        _ => SearchConfig::DEFAULT_LIMIT,
    }
}

/// One validated search submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub modes: Vec<Mode>,
    pub limit: u32,
}

impl SearchRequest {
    /// Validate a submission: the query is trimmed and must not be empty,
    /// at least one mode is required, duplicate modes are dropped, and a zero
    /// limit becomes the default.
    pub fn new(query: &str, modes: &[Mode], limit: u32) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WikiliteError::EmptyQuery);
        }

        let mut unique = Vec::with_capacity(modes.len());
        for mode in modes {
            if !unique.contains(mode) {
                unique.push(*mode);
            }
        }
        if unique.is_empty() {
            return Err(WikiliteError::NoModesSelected);
        }

        Ok(Self {
            query: query.to_string(),
            modes: unique,
            limit: if limit == 0 {
                SearchConfig::DEFAULT_LIMIT
            } else {
                limit
            },
        })
    }

    /// Body posted to each mode's endpoint.
    pub fn body(&self) -> SearchBody<'_> {
        SearchBody {
            query: &self.query,
            limit: self.limit,
        }
    }
}

/// JSON body of `POST /api/search/{mode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBody<'a> {
    pub query: &'a str,
    pub limit: u32,
}

/// A result as returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub article_id: u64,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub text: String,
}

/// A result tagged with the mode that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub article_id: u64,
    pub title: String,
    /// Excerpt, possibly with `<mark>` highlight tags.
    pub snippet: String,
    pub text: String,
    pub mode: Mode,
}

impl SearchResult {
    pub fn from_hit(hit: SearchHit, mode: Mode) -> Self {
        Self {
            article_id: hit.article_id,
            title: hit.title,
            snippet: hit.snippet,
            text: hit.text,
            mode,
        }
    }
}
