//! Fixture helpers shared by the behavioural tests.

#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose};
use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::{Reader, events::Event};
use std::{fs, io::Write};
use tempfile::{Builder, TempPath};

/// Epsilon for floating-point coordinate comparisons in tests
const COORDINATE_EPSILON: f64 = 1.0e-7;

/// Directory containing the encoded fixture blobs.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Decode a Base64-encoded fixture into a temporary `.osm.pbf` file.
pub fn decode_fixture(dir: &Utf8Path, stem: &str) -> TempPath {
    let encoded_path = dir.join(format!("{stem}.osm.pbf.b64"));
    let encoded = fs::read_to_string(&encoded_path).unwrap_or_else(|err| {
        panic!("failed to read base64 fixture {encoded_path}: {err}");
    });
    let cleaned: String = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let decoded = general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .unwrap_or_else(|err| {
            panic!("failed to decode base64 fixture {encoded_path}: {err}");
        });
    let mut tempfile = Builder::new()
        .prefix(stem)
        .suffix(".osm.pbf")
        .tempfile()
        .unwrap_or_else(|err| {
            panic!("failed to create temporary fixture for {stem}: {err}");
        });
    tempfile.write_all(&decoded).unwrap_or_else(|err| {
        panic!("failed to write decoded fixture for {stem}: {err}");
    });
    tempfile.flush().unwrap_or_else(|err| {
        panic!("failed to flush decoded fixture for {stem}: {err}");
    });
    tempfile.into_temp_path()
}

/// Borrow a temporary path as UTF-8.
pub fn utf8(path: &TempPath) -> &Utf8Path {
    Utf8Path::from_path(path.as_ref()).expect("temporary paths are UTF-8")
}

/// A `<node>` element read back from an output document.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: Vec<(String, String)>,
}

impl WrittenNode {
    /// Value of the first tag with `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse every `<node>` from an OSM XML document, in document order.
pub fn read_nodes(xml: &str) -> Vec<WrittenNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut nodes = Vec::new();
    loop {
        match reader.read_event().expect("well-formed output") {
            Event::Start(element) | Event::Empty(element) => match element.name().as_ref() {
                b"node" => {
                    let mut node = WrittenNode {
                        id: 0,
                        lat: f64::NAN,
                        lon: f64::NAN,
                        tags: Vec::new(),
                    };
                    for attribute in element.attributes() {
                        let attribute = attribute.expect("valid attribute");
                        let value = attribute.unescape_value().expect("valid value");
                        match attribute.key.as_ref() {
                            b"id" => node.id = value.parse().expect("numeric id"),
                            b"lat" => node.lat = value.parse().expect("numeric lat"),
                            b"lon" => node.lon = value.parse().expect("numeric lon"),
                            _ => {}
                        }
                    }
                    nodes.push(node);
                }
                b"tag" => {
                    let mut key = String::new();
                    let mut value = String::new();
                    for attribute in element.attributes() {
                        let attribute = attribute.expect("valid attribute");
                        let text = attribute.unescape_value().expect("valid value").into_owned();
                        match attribute.key.as_ref() {
                            b"k" => key = text,
                            b"v" => value = text,
                            _ => {}
                        }
                    }
                    nodes
                        .last_mut()
                        .expect("tags appear inside nodes")
                        .tags
                        .push((key, value));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    nodes
}

/// Compare floating-point coordinates within a small epsilon.
#[expect(
    clippy::float_arithmetic,
    reason = "test delta computation requires float maths"
)]
pub fn assert_close(actual: f64, expected: f64) {
    let delta = (actual - expected).abs();
    assert!(
        delta <= COORDINATE_EPSILON,
        "expected {expected}, got {actual} (|Δ| = {delta})"
    );
}
