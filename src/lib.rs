//! Release tooling for Sparkle based macOS applications.
//!
//! Renders markdown release notes into standalone HTML and links them from
//! every item of an appcast feed.

pub mod appcast;
mod assets;
pub mod components;
mod config;
mod generators;
mod logging;
mod markdown;

pub use appcast::{
    AppcastUpdate, DEFAULT_NOTES_PATH, SPARKLE_NAMESPACE, UpdateReport, update_appcast_file,
    update_appcast_str,
};
pub use assets::RELEASE_NOTES_CSS;
pub use config::{ConvertConfig, UpdateConfig, parse_or_exit};
pub use generators::{convert_markdown, generate_release_notes};
pub use logging::init_logging;
pub use markdown::MarkdownRenderer;
