//! Feed item children and the edits applied to them.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use super::{AppcastUpdate, UpdateReport};

const RELEASE_NOTES_LINK: &str = "releaseNotesLink";
const VERSION: &str = "version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum NodeKind {
    Element { local: Vec<u8>, sparkle: bool },
    Whitespace,
    Other,
}

/// One direct child of an `item`, with all events of its subtree.
#[derive(Debug, Clone)]
pub(super) struct Node {
    pub kind: NodeKind,
    pub events: Vec<Event<'static>>,
    /// Node is or contains a Sparkle release notes link
    pub has_link: bool,
}

impl Node {
    pub fn element(local: &[u8], sparkle: bool) -> Self {
        Self {
            kind: NodeKind::Element {
                local: local.to_vec(),
                sparkle,
            },
            events: Vec::new(),
            has_link: false,
        }
    }

    pub fn text(event: BytesText<'static>) -> Self {
        let kind = if event.iter().all(u8::is_ascii_whitespace) {
            NodeKind::Whitespace
        } else {
            NodeKind::Other
        };
        Self {
            kind,
            events: vec![Event::Text(event)],
            has_link: false,
        }
    }

    pub fn other(event: Event<'static>) -> Self {
        Self {
            kind: NodeKind::Other,
            events: vec![event],
            has_link: false,
        }
    }

    /// Builds `<prefix:local>text</prefix:local>`.
    fn sparkle(prefix: &str, local: &str, text: &str) -> Self {
        let name = format!("{}:{}", prefix, local);
        let end = BytesEnd::new(name.clone());

        Self {
            kind: NodeKind::Element {
                local: local.as_bytes().to_vec(),
                sparkle: true,
            },
            events: vec![
                Event::Start(BytesStart::new(name)),
                Event::Text(BytesText::new(text).into_owned()),
                Event::End(end),
            ],
            has_link: local == RELEASE_NOTES_LINK,
        }
    }

    fn is_plain(&self, name: &str) -> bool {
        matches!(&self.kind, NodeKind::Element { local, sparkle: false } if local == name.as_bytes())
    }

    fn is_sparkle(&self, name: &str) -> bool {
        matches!(&self.kind, NodeKind::Element { local, sparkle: true } if local == name.as_bytes())
    }

    fn is_whitespace(&self) -> bool {
        self.kind == NodeKind::Whitespace
    }

    fn whitespace_text(&self) -> Option<&[u8]> {
        match self.events.as_slice() {
            [Event::Text(text)] if self.is_whitespace() => Some(&**text),
            _ => None,
        }
    }

    /// Compares the element's raw content with `text` as it would be written.
    fn text_matches(&self, text: &str) -> Result<bool> {
        let inner = match self.events.as_slice() {
            [Event::Start(_), inner @ .., Event::End(_)] => inner,
            _ => &[],
        };

        let mut writer = Writer::new(Vec::new());
        for event in inner {
            writer.write_event(event.clone())?;
        }

        Ok(writer.into_inner() == escape(text).as_bytes())
    }

    /// Replaces the element content with `text`, keeping name and attributes.
    fn set_text(&mut self, text: &str) {
        let start = match self.events.first() {
            Some(Event::Start(start) | Event::Empty(start)) => start.clone(),
            _ => return,
        };
        let end = start.to_end().into_owned();

        self.events = vec![
            Event::Start(start),
            Event::Text(BytesText::new(text).into_owned()),
            Event::End(end),
        ];
    }
}

/// Derives child indentation from the whitespace before `</item>`.
///
/// The item sits two levels deep (`rss`, `channel`), so half of its own
/// indentation is taken as one level. Falls back to four spaces.
fn child_indent(closing: &[u8]) -> String {
    let closing = String::from_utf8_lossy(closing);
    let line = closing.rsplit('\n').next().unwrap_or_default();

    let unit = match line.chars().next() {
        Some(c) if line.len() % 2 == 0 && line.chars().all(|x| x == c) => &line[..line.len() / 2],
        _ => "    ",
    };

    format!("{}{}", closing, unit)
}

/// Direct children of one feed item.
#[derive(Debug, Default)]
pub(super) struct Item {
    nodes: Vec<Node>,
}

impl Item {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_events(self) -> impl Iterator<Item = Event<'static>> {
        self.nodes.into_iter().flat_map(|node| node.events)
    }

    /// Inserts the release notes link and version this item lacks.
    ///
    /// An existing link anywhere inside the item is kept as is. An existing
    /// version is only counted as changed when its text differs.
    pub fn apply(
        &mut self,
        update: &AppcastUpdate,
        prefix: &str,
        report: &mut UpdateReport,
    ) -> Result<()> {
        report.items += 1;

        let mut link_index = None;
        if !self.nodes.iter().any(|node| node.has_link) {
            let anchor = self.anchor();
            let link = Node::sparkle(prefix, RELEASE_NOTES_LINK, &update.notes_path);
            link_index = Some(self.insert_after(anchor, link));
            report.links_added += 1;
            debug!(item = report.items, notes_path = %update.notes_path, "Inserted release notes link");
        }

        let Some(version) = &update.version else {
            return Ok(());
        };

        match self.nodes.iter().position(|node| node.is_sparkle(VERSION)) {
            Some(index) => {
                let node = &mut self.nodes[index];
                if node.text_matches(version)? {
                    debug!(item = report.items, version = %version, "Version already current");
                } else {
                    node.set_text(version);
                    report.versions_set += 1;
                    debug!(item = report.items, version = %version, "Updated version");
                }
            }
            None => {
                let anchor = link_index.or_else(|| self.anchor());
                self.insert_after(anchor, Node::sparkle(prefix, VERSION, version));
                report.versions_set += 1;
                debug!(item = report.items, version = %version, "Inserted version");
            }
        }

        Ok(())
    }

    /// Index of the child new elements follow: `pubDate`, else `title`.
    fn anchor(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.is_plain("pubDate"))
            .or_else(|| self.nodes.iter().position(|node| node.is_plain("title")))
    }

    /// Inserts `node` after `anchor` (or first when `None`), returning its index.
    ///
    /// Indentation preceding the anchor is repeated so pretty printed feeds
    /// keep one element per line.
    fn insert_after(&mut self, anchor: Option<usize>, node: Node) -> usize {
        match anchor {
            Some(index) => {
                let indent = index
                    .checked_sub(1)
                    .map(|i| &self.nodes[i])
                    .filter(|n| n.is_whitespace())
                    .cloned();

                let mut at = index + 1;
                if let Some(indent) = indent {
                    self.nodes.insert(at, indent);
                    at += 1;
                }
                self.nodes.insert(at, node);
                at
            }
            None if self.nodes.len() == 1 && self.nodes[0].is_whitespace() => {
                let closing = self.nodes[0].whitespace_text().unwrap_or_default();
                let indent = child_indent(closing);
                self.nodes.insert(0, Node::text(BytesText::new(&indent).into_owned()));
                self.nodes.insert(1, node);
                1
            }
            None => match self.nodes.first().filter(|n| n.is_whitespace()).cloned() {
                Some(indent) => {
                    self.nodes.insert(1, node);
                    self.nodes.insert(2, indent);
                    1
                }
                None => {
                    self.nodes.insert(0, node);
                    0
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(local: &str, text: &str) -> Node {
        let mut node = Node::element(local.as_bytes(), false);
        node.events = vec![
            Event::Start(BytesStart::new(local.to_string())),
            Event::Text(BytesText::new(text).into_owned()),
            Event::End(BytesEnd::new(local.to_string())),
        ];
        node
    }

    fn whitespace(text: &str) -> Node {
        Node::text(BytesText::new(text).into_owned())
    }

    fn local_names(item: &Item) -> Vec<String> {
        item.nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Element { local, .. } => String::from_utf8_lossy(local).into_owned(),
                NodeKind::Whitespace => "_".to_string(),
                NodeKind::Other => "?".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_link_goes_after_pub_date() {
        // Arrange
        let mut item = Item::new(vec![plain("pubDate", "Mon"), plain("title", "v1")]);
        let mut report = UpdateReport::default();

        // Act
        item.apply(&AppcastUpdate::new("./notes.md"), "sparkle", &mut report)
            .expect("Should apply");

        // Assert
        assert_eq!(local_names(&item), ["pubDate", "releaseNotesLink", "title"]);
        assert_eq!(report.links_added, 1);
    }

    #[test]
    fn test_link_goes_after_title_without_pub_date() {
        // Arrange
        let mut item = Item::new(vec![plain("title", "v1"), plain("description", "d")]);
        let mut report = UpdateReport::default();

        // Act
        item.apply(&AppcastUpdate::new("./notes.md"), "sparkle", &mut report)
            .expect("Should apply");

        // Assert
        assert_eq!(local_names(&item), ["title", "releaseNotesLink", "description"]);
    }

    #[test]
    fn test_link_goes_first_without_anchor() {
        // Arrange
        let mut item = Item::new(vec![plain("description", "d")]);
        let mut report = UpdateReport::default();

        // Act
        item.apply(&AppcastUpdate::new("./notes.md"), "sparkle", &mut report)
            .expect("Should apply");

        // Assert
        assert_eq!(local_names(&item), ["releaseNotesLink", "description"]);
    }

    #[test]
    fn test_version_follows_new_link() {
        // Arrange
        let mut item = Item::new(vec![plain("title", "v1"), plain("pubDate", "Mon")]);
        let mut report = UpdateReport::default();
        let update = AppcastUpdate::new("./notes.md").with_version("42");

        // Act
        item.apply(&update, "sparkle", &mut report).expect("Should apply");

        // Assert
        assert_eq!(
            local_names(&item),
            ["title", "pubDate", "releaseNotesLink", "version"]
        );
        assert_eq!(report.versions_set, 1);
    }

    #[test]
    fn test_indentation_is_repeated() {
        // Arrange
        let mut item = Item::new(vec![
            whitespace("\n    "),
            plain("title", "v1"),
            whitespace("\n  "),
        ]);
        let mut report = UpdateReport::default();

        // Act
        item.apply(&AppcastUpdate::new("./notes.md"), "sparkle", &mut report)
            .expect("Should apply");

        // Assert
        assert_eq!(local_names(&item), ["_", "title", "_", "releaseNotesLink", "_"]);
    }

    #[test]
    fn test_matching_version_is_not_a_change() {
        // Arrange
        let version = Node::sparkle("sparkle", VERSION, "1.2.3");
        let link = Node::sparkle("sparkle", RELEASE_NOTES_LINK, "./notes.md");
        let mut item = Item::new(vec![link, version]);
        let mut report = UpdateReport::default();
        let update = AppcastUpdate::new("./notes.md").with_version("1.2.3");

        // Act
        item.apply(&update, "sparkle", &mut report).expect("Should apply");

        // Assert
        assert!(!report.changed());
        assert_eq!(report.items, 1);
    }

    #[test]
    fn test_set_text_expands_empty_element() {
        // Arrange
        let mut node = Node::element(b"version", true);
        node.events = vec![Event::Empty(BytesStart::new("sparkle:version"))];

        // Act
        node.set_text("7");

        // Assert
        assert_eq!(node.events.len(), 3);
        assert!(node.text_matches("7").expect("Should compare"));
    }

    #[test]
    fn test_text_matches_escaped_content() {
        // Arrange
        let node = Node::sparkle("sparkle", VERSION, "1 & 2");

        // Act & Assert
        assert!(node.text_matches("1 & 2").expect("Should compare"));
        assert!(!node.text_matches("1 and 2").expect("Should compare"));
    }

    #[test]
    fn test_whitespace_only_item_indents_children() {
        // Arrange
        let mut item = Item::new(vec![whitespace("\n        ")]);
        let mut report = UpdateReport::default();
        let update = AppcastUpdate::new("./notes.md").with_version("5");

        // Act
        item.apply(&update, "sparkle", &mut report).expect("Should apply");
        let xml = item
            .into_events()
            .map(|event| {
                let mut writer = Writer::new(Vec::new());
                writer.write_event(event).expect("Should write");
                String::from_utf8(writer.into_inner()).expect("Should be UTF8")
            })
            .collect::<String>();

        // Assert
        assert_eq!(
            xml,
            "\n            <sparkle:releaseNotesLink>./notes.md</sparkle:releaseNotesLink>\n            <sparkle:version>5</sparkle:version>\n        "
        );
    }

    #[test]
    fn test_child_indent_units() {
        // Act & Assert
        assert_eq!(child_indent(b"\n    "), "\n      ");
        assert_eq!(child_indent(b"\n\t\t"), "\n\t\t\t");
        assert_eq!(child_indent(b"\n"), "\n    ");
        assert_eq!(child_indent(b"\n   "), "\n       ");
    }
}
