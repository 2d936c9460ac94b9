//! Release notes document generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::components::layout::{DEFAULT_TITLE, release_notes_page};
use crate::markdown::MarkdownRenderer;

/// Renders markdown release notes into a complete HTML document.
///
/// When `heading` is given it doubles as the document title and is shown
/// above the notes; otherwise the title is "Release Notes".
///
/// # Examples
///
/// ```
/// use sparkle_relnotes::generate_release_notes;
///
/// let html = generate_release_notes("- Fixed a crash", Some("Version 1.0.0"))?;
/// assert!(html.contains("<h1>Version 1.0.0</h1>"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn generate_release_notes(markdown: &str, heading: Option<&str>) -> Result<String> {
    let content = MarkdownRenderer::new()
        .render(markdown)
        .context("Failed to render markdown")?;

    Ok(wrap_document(&content, heading))
}

fn wrap_document(content_html: &str, heading: Option<&str>) -> String {
    let title = heading.unwrap_or(DEFAULT_TITLE);
    release_notes_page(title, heading, content_html).into_string()
}

/// Converts a markdown file into a standalone HTML file.
///
/// The output file is overwritten unconditionally. Nothing is cleaned up
/// if writing fails halfway.
///
/// # Errors
///
/// Returns error if:
/// - Input cannot be read or is not valid UTF8
/// - Output cannot be written
pub fn convert_markdown(
    markdown_file: impl AsRef<Path>,
    output_file: impl AsRef<Path>,
    heading: Option<&str>,
) -> Result<()> {
    let markdown_file = markdown_file.as_ref();
    let output_file = output_file.as_ref();

    let content = MarkdownRenderer::new().render_file(markdown_file)?;
    let html = wrap_document(&content, heading);

    fs::write(output_file, html)
        .with_context(|| format!("Failed to write HTML file: {}", output_file.display()))?;

    info!(
        input = %markdown_file.display(),
        output = %output_file.display(),
        "Wrote release notes document"
    );
    Ok(())
}
