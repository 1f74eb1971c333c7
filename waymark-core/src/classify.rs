//! Tag-driven classification of nodes.
//!
//! A node may match several rule families at once, so [`classify`] returns an
//! ordered list of outcomes rather than a single verdict:
//!
//! - nodes tagged `network:type=node_network` yield one
//!   [`SynthesisRequest`] per recognised sub-network reference; and
//! - nodes tagged `highway=turning_circle` or `highway=turning_loop` yield a
//!   [`Classification::TurningFeature`].
//!
//! # Examples
//! ```
//! use waymark_core::{Classification, NetworkCategory, TagList, classify};
//!
//! let tags = TagList::from_iter([("network:type", "node_network"), ("rcn_ref", "53")]);
//! let outcomes = classify(&tags);
//!
//! assert_eq!(outcomes.len(), 1);
//! assert!(matches!(
//!     &outcomes[0],
//!     Classification::Network(request)
//!         if request.category == NetworkCategory::Bicycle && request.reference == "53"
//! ));
//! ```

use crate::TagList;

/// Tag key marking a node as part of a node network.
pub const NETWORK_TYPE_KEY: &str = "network:type";
/// Value of [`NETWORK_TYPE_KEY`] for junction nodes.
pub const NODE_NETWORK_VALUE: &str = "node_network";
/// Tag key carrying the OSM highway classification.
pub const HIGHWAY_KEY: &str = "highway";

/// Sub-network families recognised on junction nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkCategory {
    /// Cycling networks.
    Bicycle,
    /// Hiking networks.
    Hiking,
    /// Inline-skating networks.
    InlineSkates,
    /// Horse-riding networks.
    Horse,
    /// Canoeing networks.
    Canoe,
    /// Motorboat networks.
    Motorboat,
}

impl NetworkCategory {
    /// All categories in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::Bicycle,
        Self::Hiking,
        Self::InlineSkates,
        Self::Horse,
        Self::Canoe,
        Self::Motorboat,
    ];

    /// Label written to the `node_network` tag of derived nodes.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::NetworkCategory;
    ///
    /// assert_eq!(NetworkCategory::Canoe.label(), "node_canoe");
    /// ```
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bicycle => "node_bicycle",
            Self::Hiking => "node_hiking",
            Self::InlineSkates => "node_inline_skates",
            Self::Horse => "node_horse",
            Self::Canoe => "node_canoe",
            Self::Motorboat => "node_motorboat",
        }
    }

    /// Reference keys consulted for this category, highest priority first.
    ///
    /// Only the first key present on a node produces a request.
    #[must_use]
    pub const fn reference_keys(self) -> &'static [&'static str] {
        match self {
            Self::Bicycle => &["icn_ref", "ncn_ref", "rcn_ref", "lcn_ref"],
            Self::Hiking => &["iwn_ref", "nwn_ref", "rwn_ref", "lwn_ref"],
            Self::InlineSkates => &["rin_ref"],
            Self::Horse => &["rhn_ref"],
            Self::Canoe => &["rpn_ref"],
            Self::Motorboat => &["rmn_ref"],
        }
    }

    fn reference<'a>(self, tags: &'a TagList) -> Option<&'a str> {
        self.reference_keys()
            .iter()
            .find_map(|key| tags.get(key))
    }
}

impl std::fmt::Display for NetworkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Turning features retained for way correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurningKind {
    /// `highway=turning_circle`.
    Circle,
    /// `highway=turning_loop`.
    Loop,
}

impl TurningKind {
    /// Parse the `highway` value of a node.
    #[must_use]
    pub fn from_highway(value: &str) -> Option<Self> {
        match value {
            "turning_circle" => Some(Self::Circle),
            "turning_loop" => Some(Self::Loop),
            _ => None,
        }
    }
}

/// Highway classes of ways allowed to annotate turning features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighwayCategory {
    /// `highway=residential`.
    Residential,
    /// `highway=living_street`.
    LivingStreet,
    /// `highway=unclassified`.
    Unclassified,
    /// `highway=service`.
    Service,
    /// `highway=track`.
    Track,
}

impl HighwayCategory {
    /// Parse a `highway` value, returning `None` for unrecognised classes.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::HighwayCategory;
    ///
    /// assert_eq!(HighwayCategory::parse("track"), Some(HighwayCategory::Track));
    /// assert_eq!(HighwayCategory::parse("primary"), None);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "residential" => Some(Self::Residential),
            "living_street" => Some(Self::LivingStreet),
            "unclassified" => Some(Self::Unclassified),
            "service" => Some(Self::Service),
            "track" => Some(Self::Track),
            _ => None,
        }
    }

    /// Read the category from a way's `highway` tag.
    #[must_use]
    pub fn from_tags(tags: &TagList) -> Option<Self> {
        tags.get(HIGHWAY_KEY).and_then(Self::parse)
    }

    /// The `highway` value this category was parsed from.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::LivingStreet => "living_street",
            Self::Unclassified => "unclassified",
            Self::Service => "service",
            Self::Track => "track",
        }
    }
}

impl std::fmt::Display for HighwayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to derive one network node from a junction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Sub-network the derived node belongs to.
    pub category: NetworkCategory,
    /// Junction reference, written as the derived node's `name`.
    pub reference: String,
}

/// A single classification outcome for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The node is a network junction for the requested category.
    Network(SynthesisRequest),
    /// The node is a turning feature.
    TurningFeature(TurningKind),
}

/// Return true when the tags mark a node network junction.
#[must_use]
pub fn is_network_junction(tags: &TagList) -> bool {
    tags.has(NETWORK_TYPE_KEY, NODE_NETWORK_VALUE)
}

/// Classify a node by its tags.
///
/// Network outcomes come first, in [`NetworkCategory::ALL`] order, followed
/// by at most one turning outcome. Untagged or unrelated nodes yield an empty
/// list.
#[must_use]
pub fn classify(tags: &TagList) -> Vec<Classification> {
    let mut outcomes = Vec::new();
    if is_network_junction(tags) {
        outcomes.extend(NetworkCategory::ALL.into_iter().filter_map(|category| {
            category.reference(tags).map(|reference| {
                Classification::Network(SynthesisRequest {
                    category,
                    reference: reference.to_owned(),
                })
            })
        }));
    }
    if let Some(kind) = tags.get(HIGHWAY_KEY).and_then(TurningKind::from_highway) {
        outcomes.push(Classification::TurningFeature(kind));
    }
    outcomes
}
