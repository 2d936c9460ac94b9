//! Embedded stylesheet assets

/// Stylesheet inlined into every release notes document.
///
/// Follows the reader's `prefers-color-scheme` so the page matches the
/// host application's light or dark appearance without scripts.
pub const RELEASE_NOTES_CSS: &str = include_str!("../assets/release-notes.css");
