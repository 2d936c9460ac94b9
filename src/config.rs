//! Command line configuration.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

use crate::appcast::{AppcastUpdate, DEFAULT_NOTES_PATH};

/// Command line configuration for `convert-markdown`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "convert-markdown",
    version,
    about = "Convert markdown release notes to a standalone HTML document",
    long_about = None,
    after_help = "Example: convert-markdown release_notes.md release_notes.html 'Version 1.0.0'"
)]
pub struct ConvertConfig {
    /// Markdown file to convert
    pub markdown_file: PathBuf,

    /// HTML file to write (overwritten)
    pub output_html_file: PathBuf,

    /// Heading shown above the notes and used as document title
    pub title: Option<String>,
}

impl ConvertConfig {
    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the markdown file does not exist.
    pub fn validate(&self) -> Result<()> {
        if !self.markdown_file.is_file() {
            bail!(
                "Markdown file does not exist: {}",
                self.markdown_file.display()
            );
        }

        Ok(())
    }
}

/// Command line configuration for `update-xml`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "update-xml",
    version,
    about = "Add release notes links and version numbers to a Sparkle appcast",
    long_about = None,
    after_help = "Example: update-xml ./appcast.xml ./release_notes.md 42"
)]
pub struct UpdateConfig {
    /// Appcast file, edited in place
    pub appcast: PathBuf,

    /// Release notes link for items without one
    #[arg(default_value = DEFAULT_NOTES_PATH)]
    pub notes_path: String,

    /// Version written to every item; versions are left alone when omitted
    pub build_number: Option<String>,
}

impl UpdateConfig {
    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the appcast file does not exist.
    pub fn validate(&self) -> Result<()> {
        if !self.appcast.is_file() {
            bail!("Appcast file does not exist: {}", self.appcast.display());
        }

        Ok(())
    }

    /// Returns the edits this invocation asks for.
    pub fn update(&self) -> AppcastUpdate {
        AppcastUpdate {
            notes_path: self.notes_path.clone(),
            version: self.build_number.clone(),
        }
    }
}

/// Parses command line arguments, exiting with status 1 on usage errors.
///
/// `--help` and `--version` still exit with status 0.
pub fn parse_or_exit<C: Parser>() -> C {
    match C::try_parse() {
        Ok(config) => config,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            // Printing can only fail when the terminal is gone
            let _ = err.print();
            std::process::exit(code);
        }
    }
}
