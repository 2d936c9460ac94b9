//! Markdown to HTML conversion.

use anyhow::{Context, Result};
use comrak::Options;
use std::path::Path;
use tracing::debug;

/// Renders release notes markdown to an HTML fragment.
///
/// Enables the extensions release notes are written against: tables and
/// hard line breaks, on top of CommonMark fenced code blocks. Raw HTML in
/// the source is passed through untouched.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with release notes options.
    ///
    /// - Tables
    /// - Every newline inside a paragraph becomes `<br />`
    /// - Raw HTML allowed (notes are authored by the release owner)
    pub fn new() -> Self {
        let mut options = Options::default();

        options.extension.table = true;
        options.render.hardbreaks = true;
        options.render.unsafe_ = true;

        Self { options }
    }

    /// Renders markdown content to HTML string.
    ///
    /// Any text is accepted; there is no syntax validation.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    ///
    /// # Returns
    ///
    /// Rendered HTML fragment (no document wrapper)
    pub fn render(&self, content: &str) -> Result<String> {
        let html = comrak::markdown_to_html(content, &self.options);
        debug!(
            input_bytes = content.len(),
            output_bytes = html.len(),
            "Rendered markdown"
        );
        Ok(html)
    }

    /// Renders markdown file at given path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or is not valid UTF8
    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?;
        self.render(&content)
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}
