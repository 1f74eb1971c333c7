//! OSM XML output.
//!
//! Writes an `<osm>` document containing `<node>` elements, indented two
//! spaces per level. Nodes are written as they arrive; nothing is buffered
//! beyond the underlying writer.

use std::{borrow::Cow, io::Write};

use chrono::SecondsFormat;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use waymark_core::Point;

use crate::SinkError;

const OSM_ELEMENT: &str = "osm";
const OSM_VERSION: &str = "0.6";
const NODE_ELEMENT: &str = "node";
const TAG_ELEMENT: &str = "tag";

/// Streaming writer for OSM XML node documents.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{Point, TagList};
/// use waymark_data::OsmXmlWriter;
///
/// # fn main() -> Result<(), waymark_data::SinkError> {
/// let mut writer = OsmXmlWriter::begin(Vec::new(), "waymark")?;
/// writer.write_point(&Point::new(
///     1000,
///     Coord { x: 7.5, y: 52.25 },
///     TagList::from_iter([("node_network", "node_bicycle"), ("name", "53")]),
/// ))?;
/// let xml = String::from_utf8(writer.finish()?).expect("utf-8 output");
///
/// assert!(xml.contains(r#"<tag k="name" v="53"/>"#));
/// assert!(xml.ends_with("</osm>\n"));
/// # Ok(())
/// # }
/// ```
pub struct OsmXmlWriter<W: Write> {
    writer: Writer<W>,
    written: u64,
}

impl<W: Write> OsmXmlWriter<W> {
    /// Write the XML declaration and open the root element.
    ///
    /// # Errors
    /// Returns [`SinkError`] when writing fails.
    pub fn begin(inner: W, generator: &str) -> Result<Self, SinkError> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new(OSM_ELEMENT);
        root.push_attribute(("version", OSM_VERSION));
        push_text_attribute(&mut root, "generator", generator);
        writer.write_event(Event::Start(root))?;
        Ok(Self { writer, written: 0 })
    }

    /// Serialise one node with its metadata and tags.
    ///
    /// # Errors
    /// Returns [`SinkError`] when writing fails.
    pub fn write_point(&mut self, point: &Point) -> Result<(), SinkError> {
        let node = node_start(point);
        if point.tags.is_empty() {
            self.writer.write_event(Event::Empty(node))?;
        } else {
            self.writer.write_event(Event::Start(node))?;
            for (key, value) in point.tags.iter() {
                let mut tag = BytesStart::new(TAG_ELEMENT);
                push_text_attribute(&mut tag, "k", key);
                push_text_attribute(&mut tag, "v", value);
                self.writer.write_event(Event::Empty(tag))?;
            }
            self.writer
                .write_event(Event::End(BytesEnd::new(NODE_ELEMENT)))?;
        }
        self.written += 1;
        Ok(())
    }

    /// Number of nodes written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Close the root element, flush, and return the underlying writer.
    ///
    /// # Errors
    /// Returns [`SinkError`] when writing or flushing fails.
    pub fn finish(mut self) -> Result<W, SinkError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(OSM_ELEMENT)))?;
        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        inner.flush()?;
        Ok(inner)
    }
}

fn node_start(point: &Point) -> BytesStart<'static> {
    let mut node = BytesStart::new(NODE_ELEMENT);
    node.push_attribute(("id", point.id.to_string().as_str()));
    node.push_attribute(("lat", format_coordinate(point.lat()).as_str()));
    node.push_attribute(("lon", format_coordinate(point.lon()).as_str()));
    let metadata = &point.metadata;
    if let Some(user) = &metadata.user {
        push_text_attribute(&mut node, "user", user);
    }
    if let Some(uid) = metadata.uid {
        node.push_attribute(("uid", uid.to_string().as_str()));
    }
    node.push_attribute(("visible", if metadata.visible { "true" } else { "false" }));
    if let Some(version) = metadata.version {
        node.push_attribute(("version", version.to_string().as_str()));
    }
    if let Some(changeset) = metadata.changeset {
        node.push_attribute(("changeset", changeset.to_string().as_str()));
    }
    if let Some(timestamp) = metadata.timestamp {
        let formatted = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        node.push_attribute(("timestamp", formatted.as_str()));
    }
    node
}

/// Push a free-text attribute escaped by [`escape_attribute`].
fn push_text_attribute(element: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape_attribute(value);
    element.push_attribute((key.as_bytes(), escaped.as_bytes()));
}

/// Escape an attribute value so it parses back unchanged.
///
/// Markup characters become entities and `\t`, `\n`, `\r` become character
/// references, which attribute-value normalisation would otherwise turn into
/// spaces. Characters XML 1.0 forbids are replaced with U+FFFD.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            ch if is_forbidden_in_xml(ch) => escaped.push(char::REPLACEMENT_CHARACTER),
            ch => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

const fn needs_escape(ch: char) -> bool {
    matches!(ch, '&' | '<' | '>' | '"' | '\'' | '\t' | '\n' | '\r') || is_forbidden_in_xml(ch)
}

const fn is_forbidden_in_xml(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Degrees at OSM's 1e-7 precision, without trailing zeros.
///
/// Values that round to zero are written as `0`, never `-0`.
fn format_coordinate(degrees: f64) -> String {
    let fixed = format!("{degrees:.7}");
    match fixed.trim_end_matches('0').trim_end_matches('.') {
        "-0" => "0".to_owned(),
        trimmed => trimmed.to_owned(),
    }
}
