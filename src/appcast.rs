//! Sparkle appcast editing.
//!
//! Walks every `item` of the feed's `channel` and makes sure it links to the
//! release notes, optionally stamping a version string. Documents are edited
//! as a quick-xml event stream so untouched markup is written back as read.

mod check;
mod editor;
mod item;

pub use editor::{update_appcast_file, update_appcast_str};

/// Namespace URI of the Sparkle update framework elements.
pub const SPARKLE_NAMESPACE: &str = "http://www.andymatuschak.org/xml-namespaces/sparkle";

/// Prefix bound to [`SPARKLE_NAMESPACE`] when the feed does not declare one.
pub const DEFAULT_PREFIX: &str = "sparkle";

/// Notes path used when none is given on the command line.
pub const DEFAULT_NOTES_PATH: &str = "./release_notes.md";

/// Edits requested for one appcast run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppcastUpdate {
    /// Text of `sparkle:releaseNotesLink` for items without one
    pub notes_path: String,
    /// Value for `sparkle:version`, left alone when `None`
    pub version: Option<String>,
}

impl AppcastUpdate {
    pub fn new(notes_path: impl Into<String>) -> Self {
        Self {
            notes_path: notes_path.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl Default for AppcastUpdate {
    fn default() -> Self {
        Self::new(DEFAULT_NOTES_PATH)
    }
}

/// Outcome of an appcast update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Items visited under the channel
    pub items: usize,
    /// Release notes links inserted
    pub links_added: usize,
    /// Version elements created or given a new value
    pub versions_set: usize,
}

impl UpdateReport {
    /// Returns true when the document differs from its input.
    pub fn changed(&self) -> bool {
        self.links_added > 0 || self.versions_set > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_defaults() {
        // Arrange & Act
        let update = AppcastUpdate::default();

        // Assert
        assert_eq!(update.notes_path, "./release_notes.md");
        assert_eq!(update.version, None);
    }

    #[test]
    fn test_update_with_version() {
        // Arrange & Act
        let update = AppcastUpdate::new("./notes.md").with_version("42");

        // Assert
        assert_eq!(update.notes_path, "./notes.md");
        assert_eq!(update.version.as_deref(), Some("42"));
    }

    #[test]
    fn test_report_changed() {
        // Arrange
        let untouched = UpdateReport {
            items: 3,
            ..Default::default()
        };
        let linked = UpdateReport {
            items: 1,
            links_added: 1,
            versions_set: 0,
        };
        let versioned = UpdateReport {
            items: 1,
            links_added: 0,
            versions_set: 1,
        };

        // Assert
        assert!(!untouched.changed());
        assert!(linked.changed());
        assert!(versioned.changed());
    }
}
