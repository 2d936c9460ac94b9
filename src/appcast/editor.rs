//! Event stream rewriting of appcast documents.

use anyhow::{Context, Result, bail};
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::check;
use super::item::{Item, Node};
use super::{AppcastUpdate, DEFAULT_PREFIX, SPARKLE_NAMESPACE, UpdateReport};

/// Applies `update` to an appcast document held in memory.
///
/// Only `item` elements directly under the first `channel` of the root are
/// edited. Everything else is written back event for event. The output
/// always starts with an XML declaration.
///
/// Besides tag nesting, the document must have exactly one root element, no
/// text outside it, no unbound namespace prefixes and no references to
/// entities other than the predefined ones.
///
/// # Returns
///
/// Rewritten document and a report of what changed
///
/// # Errors
///
/// Returns error if the document is not well formed XML
///
/// # Examples
///
/// ```
/// use sparkle_relnotes::{AppcastUpdate, update_appcast_str};
///
/// let feed = "<rss><channel><item><title>v1</title></item></channel></rss>";
/// let (xml, report) = update_appcast_str(feed, &AppcastUpdate::new("./notes.md"))?;
/// assert_eq!(report.links_added, 1);
/// assert!(xml.contains("<sparkle:releaseNotesLink>./notes.md</sparkle:releaseNotesLink>"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn update_appcast_str(xml: &str, update: &AppcastUpdate) -> Result<(String, UpdateReport)> {
    let mut reader = NsReader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 256));
    let mut report = UpdateReport::default();

    // Local names of currently open elements, root first
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut prefix: Option<String> = None;
    let mut channel_seen = false;
    let mut in_channel = false;
    let mut wrote_decl = false;

    loop {
        let event = next_event(&mut reader)?;

        match &event {
            Event::Decl(_) | Event::Eof => {}
            _ if !wrote_decl => {
                writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
                writer.write_event(Event::Text(BytesText::new("\n")))?;
                wrote_decl = true;
            }
            _ => {}
        }

        match event {
            Event::Decl(decl) => {
                wrote_decl = true;
                writer.write_event(Event::Decl(decl))?;
            }
            Event::Start(mut start) => {
                let local = start.local_name().as_ref().to_vec();

                if open.is_empty() {
                    if prefix.is_some() {
                        bail!("Document has more than one root element");
                    }
                    prefix = Some(bind_sparkle_prefix(&mut start)?);
                } else if open.len() == 1 && local == b"channel" && !channel_seen {
                    channel_seen = true;
                    in_channel = true;
                } else if open.len() == 2 && in_channel && local == b"item" {
                    writer.write_event(Event::Start(start))?;
                    let (mut item, end) = collect_item(&mut reader)?;
                    item.apply(update, prefix.as_deref().unwrap_or(DEFAULT_PREFIX), &mut report)?;
                    for event in item.into_events() {
                        writer.write_event(event)?;
                    }
                    writer.write_event(end)?;
                    continue;
                }

                open.push(local);
                writer.write_event(Event::Start(start))?;
            }
            Event::Empty(mut start) => {
                let local = start.local_name().as_ref().to_vec();

                if open.is_empty() {
                    if prefix.is_some() {
                        bail!("Document has more than one root element");
                    }
                    prefix = Some(bind_sparkle_prefix(&mut start)?);
                } else if open.len() == 2 && in_channel && local == b"item" {
                    let mut item = Item::default();
                    item.apply(update, prefix.as_deref().unwrap_or(DEFAULT_PREFIX), &mut report)?;
                    if item.is_empty() {
                        writer.write_event(Event::Empty(start))?;
                    } else {
                        let end = start.to_end().into_owned();
                        writer.write_event(Event::Start(start))?;
                        for event in item.into_events() {
                            writer.write_event(event)?;
                        }
                        writer.write_event(Event::End(end))?;
                    }
                    continue;
                }

                writer.write_event(Event::Empty(start))?;
            }
            Event::End(end) => {
                if open.pop().is_none() {
                    bail!("Unmatched end tag outside the root element");
                }
                if open.len() == 1 {
                    in_channel = false;
                }
                writer.write_event(Event::End(end))?;
            }
            Event::Eof => {
                if !open.is_empty() {
                    bail!("Unexpected end of document: {} unclosed element(s)", open.len());
                }
                break;
            }
            Event::Text(text) if open.is_empty() => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    bail!("Text outside the root element");
                }
                writer.write_event(Event::Text(text))?;
            }
            Event::CData(_) | Event::GeneralRef(_) if open.is_empty() => {
                bail!("Character data outside the root element");
            }
            event => writer.write_event(event)?,
        }
    }

    if prefix.is_none() {
        bail!("Document has no root element");
    }

    let output = String::from_utf8(writer.into_inner()).context("Rewritten document is not UTF8")?;
    Ok((output, report))
}

/// Updates an appcast file in place.
///
/// The file is rewritten, without a backup, only when the report shows a
/// change. A document that fails to parse is never written.
///
/// # Errors
///
/// Returns error if the file cannot be read or written, or is not well
/// formed XML
pub fn update_appcast_file(path: impl AsRef<Path>, update: &AppcastUpdate) -> Result<UpdateReport> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read appcast: {}", path.display()))?;

    let (output, report) = update_appcast_str(&xml, update)
        .with_context(|| format!("Failed to parse appcast: {}", path.display()))?;

    if report.changed() {
        fs::write(path, output)
            .with_context(|| format!("Failed to write appcast: {}", path.display()))?;
        info!(
            path = %path.display(),
            items = report.items,
            links_added = report.links_added,
            versions_set = report.versions_set,
            "Updated appcast"
        );
    } else {
        debug!(path = %path.display(), items = report.items, "Appcast already up to date");
    }

    Ok(report)
}

/// Reads the next event and checks what the tokenizer does not.
fn next_event<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<Event<'i>> {
    let event = match reader.read_event() {
        Ok(event) => event,
        Err(e) => bail!(
            "XML parse error at position {}: {}",
            reader.error_position(),
            e
        ),
    };

    let checked = match &event {
        Event::Start(start) | Event::Empty(start) => check::element(reader, start),
        Event::Text(text) => check::references(text),
        Event::GeneralRef(name) => check::reference_name(name),
        _ => Ok(()),
    };
    checked.with_context(|| format!("XML parse error at position {}", reader.buffer_position()))?;

    Ok(event)
}

fn is_sparkle(resolved: &ResolveResult) -> bool {
    matches!(resolved, ResolveResult::Bound(Namespace(uri)) if *uri == SPARKLE_NAMESPACE.as_bytes())
}

/// Returns the prefix the root binds to the Sparkle namespace.
///
/// When the root binds none, declares it on the root under `sparkle`, or
/// `sparkle1`, `sparkle2`, ... if the root already uses that prefix for
/// another namespace.
fn bind_sparkle_prefix(root: &mut BytesStart) -> Result<String> {
    let mut taken = Vec::new();

    for attr in root.attributes() {
        let attr = attr.context("Invalid attribute on root element")?;
        if let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") {
            if &*attr.value == SPARKLE_NAMESPACE.as_bytes() {
                return String::from_utf8(prefix.to_vec()).context("Namespace prefix is not UTF8");
            }
            taken.push(prefix.to_vec());
        }
    }

    let prefix = std::iter::once(DEFAULT_PREFIX.to_string())
        .chain((1..).map(|n| format!("{}{}", DEFAULT_PREFIX, n)))
        .find(|candidate| !taken.iter().any(|t| t == candidate.as_bytes()))
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    root.push_attribute((format!("xmlns:{}", prefix).as_str(), SPARKLE_NAMESPACE));
    Ok(prefix)
}

/// Reads the children of an `item` whose start tag was just consumed.
///
/// Returns the children grouped per direct child and the item's end tag.
fn collect_item(reader: &mut NsReader<&[u8]>) -> Result<(Item, Event<'static>)> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = next_event(reader)?;

        match event {
            Event::Start(start) => {
                let (sparkle, local) = resolve(reader, &start);
                if depth == 0 {
                    nodes.push(Node::element(&local, sparkle));
                }
                push_element(&mut nodes, Event::Start(start.into_owned()), sparkle, &local);
                depth += 1;
            }
            Event::Empty(start) => {
                let (sparkle, local) = resolve(reader, &start);
                if depth == 0 {
                    nodes.push(Node::element(&local, sparkle));
                }
                push_element(&mut nodes, Event::Empty(start.into_owned()), sparkle, &local);
            }
            Event::End(end) if depth == 0 => {
                return Ok((Item::new(nodes), Event::End(end.into_owned())));
            }
            Event::End(end) => {
                depth -= 1;
                if let Some(node) = nodes.last_mut() {
                    node.events.push(Event::End(end.into_owned()));
                }
            }
            Event::Eof => bail!("Unexpected end of document inside <item>"),
            Event::Text(text) if depth == 0 => nodes.push(Node::text(text.into_owned())),
            event if depth == 0 => nodes.push(Node::other(event.into_owned())),
            event => {
                if let Some(node) = nodes.last_mut() {
                    node.events.push(event.into_owned());
                }
            }
        }
    }
}

fn resolve(reader: &NsReader<&[u8]>, start: &BytesStart) -> (bool, Vec<u8>) {
    let (resolved, local) = reader.resolve_element(start.name());
    (is_sparkle(&resolved), local.as_ref().to_vec())
}

fn push_element(nodes: &mut [Node], event: Event<'static>, sparkle: bool, local: &[u8]) {
    if let Some(node) = nodes.last_mut() {
        node.has_link |= sparkle && local == b"releaseNotesLink";
        node.events.push(event);
    }
}
