//! Markdown rendering for release notes.
//!
//! This module provides markdown rendering using comrak with the extensions
//! release notes rely on: fenced code blocks, tables, and hard line breaks
//! for every newline.

mod renderer;

pub use renderer::MarkdownRenderer;
