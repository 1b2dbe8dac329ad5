//! Text rendering of client views.

use wikilite_core::client::{Markup, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};
use wikilite_core::{ModeSelection, View};

/// Highlights become `*...*`; everything else is printed as is.
pub fn markup(text: &Markup) -> String {
    match text {
        Markup::Plain(s) => s.clone(),
        Markup::Html(s) => s.replace(HIGHLIGHT_OPEN, "*").replace(HIGHLIGHT_CLOSE, "*"),
    }
}

pub fn status_line(modes: &ModeSelection, limit: u32) -> String {
    let names: Vec<&str> = modes.modes().iter().map(|m| m.as_str()).collect();
    let names = if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    };
    format!("[modes: {} | limit: {}]", names, limit)
}

pub fn view(view: &View) -> String {
    let mut out = format!("== {} ==\n", view.title());
    if view.is_loading() {
        out.push_str("(loading...)\n");
    }

    match view {
        View::Error { message } => {
            out.push_str(message);
            out.push('\n');
        }
        View::SearchResults { items, notice, .. } => {
            if let Some(notice) = notice {
                out.push_str(notice);
                out.push('\n');
            }
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("{:>3}. {}\n", i + 1, markup(&item.heading)));
                let body = markup(&item.body);
                if !body.is_empty() {
                    out.push_str(&format!("     {}\n", body));
                }
            }
        }
        View::Article { sections, .. } => {
            for section in sections {
                out.push_str(&format!("\n## {} (#{})\n", section.title, section.anchor));
                out.push_str(&section.content);
                out.push('\n');
            }
        }
    }
    out
}
