//! Shared test utilities for integration tests.
//!
//! Provides scratch directories and fixture feeds used across test files.

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Appcast with two items lacking release notes links, pretty printed the
/// way Sparkle's `generate_appcast` writes feeds.
pub const TWO_ITEM_APPCAST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:sparkle="http://www.andymatuschak.org/xml-namespaces/sparkle">
    <channel>
        <title>Trading Analyzer</title>
        <item>
            <title>1.1</title>
            <pubDate>Tue, 14 Oct 2025 09:00:00 +0000</pubDate>
            <sparkle:version>1.0</sparkle:version>
            <enclosure url="https://example.com/app-1.1.zip" length="1024" type="application/octet-stream"/>
        </item>
        <item>
            <title>1.0</title>
            <pubDate>Mon, 13 Oct 2025 09:00:00 +0000</pubDate>
            <enclosure url="https://example.com/app-1.0.zip" length="1024" type="application/octet-stream"/>
        </item>
    </channel>
</rss>
"#;

/// Creates scratch directory for test files.
///
/// # Errors
///
/// Returns error if directory creation fails
pub fn scratch_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Writes file into directory, creating parent directories as needed.
///
/// # Returns
///
/// Full path of written file
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(dir: &Path, path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, content)?;
    Ok(file_path)
}
