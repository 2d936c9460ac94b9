//! Release notes document wrapper component

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::assets::RELEASE_NOTES_CSS;

/// Default document title when the caller supplies none.
pub const DEFAULT_TITLE: &str = "Release Notes";

/// Wraps rendered release notes in a standalone HTML document
///
/// The stylesheet is inlined so the file has no external dependencies and
/// can be loaded directly by an update dialog.
///
/// # Arguments
///
/// * `title`: Document title shown in the window or tab
/// * `heading`: Optional heading rendered as `<h1>` before the content
/// * `content_html`: Pre-rendered HTML fragment, inserted unescaped
///
/// # Returns
///
/// Complete HTML document with a single body
pub fn release_notes_page(title: &str, heading: Option<&str>, content_html: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(RELEASE_NOTES_CSS)) }
            }
            body {
                @if let Some(heading) = heading {
                    h1 { (heading) }
                }
                (PreEscaped(content_html))
            }
        }
    }
}
