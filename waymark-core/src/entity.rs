//! Typed OpenStreetMap entities flowing through a processing run.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`.
//! Passthrough [`Metadata`] is copied verbatim onto derived nodes.

use chrono::{DateTime, Utc};
use geo::Coord;

use crate::TagList;

/// Editing metadata carried by every OSM element.
///
/// Fields mirror the optional `Info` block of the PBF format; absent values
/// stay `None` and are omitted on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Display name of the last editor.
    pub user: Option<String>,
    /// Numeric identifier of the last editor.
    pub uid: Option<i32>,
    /// Whether the element is visible in the current data set.
    pub visible: bool,
    /// Element version.
    pub version: Option<i32>,
    /// Changeset that produced this version.
    pub changeset: Option<i64>,
    /// Time of the last edit.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            user: None,
            uid: None,
            visible: true,
            version: None,
            changeset: None,
            timestamp: None,
        }
    }
}

/// An OSM node.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{Point, TagList};
///
/// let point = Point::new(
///     77,
///     Coord { x: 7.0229826, y: 52.2220383 },
///     TagList::from_iter([("highway", "turning_circle")]),
/// );
///
/// assert_eq!(point.id, 77);
/// assert_eq!(point.tags.get("highway"), Some("turning_circle"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Node identifier.
    pub id: i64,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Ordered tags.
    pub tags: TagList,
    /// Passthrough editing metadata.
    pub metadata: Metadata,
}

impl Point {
    /// Construct a `Point` with default metadata.
    #[must_use]
    pub fn new(id: i64, location: Coord<f64>, tags: TagList) -> Self {
        Self {
            id,
            location,
            tags,
            metadata: Metadata::default(),
        }
    }

    /// Replace the metadata block.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.location.x
    }
}

/// An OSM way: an ordered list of node references.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Way identifier.
    pub id: i64,
    /// Referenced node identifiers in way order.
    pub node_refs: Vec<i64>,
    /// Ordered tags.
    pub tags: TagList,
    /// Passthrough editing metadata.
    pub metadata: Metadata,
}

impl Path {
    /// Construct a `Path` with default metadata.
    #[must_use]
    pub fn new(id: i64, node_refs: Vec<i64>, tags: TagList) -> Self {
        Self {
            id,
            node_refs,
            tags,
            metadata: Metadata::default(),
        }
    }
}

/// Kind of element a relation member points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A node member.
    Node,
    /// A way member.
    Way,
    /// A nested relation member.
    Relation,
}

/// One member of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Member element kind.
    pub kind: MemberKind,
    /// Member element identifier.
    pub id: i64,
}

/// An OSM relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Relation identifier.
    pub id: i64,
    /// Ordered members.
    pub members: Vec<MemberRef>,
    /// Ordered tags.
    pub tags: TagList,
    /// Passthrough editing metadata.
    pub metadata: Metadata,
}

impl Relation {
    /// Construct a `Relation` with default metadata.
    #[must_use]
    pub fn new(id: i64, members: Vec<MemberRef>, tags: TagList) -> Self {
        Self {
            id,
            members,
            tags,
            metadata: Metadata::default(),
        }
    }
}

/// Any element produced by an entity source.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A node.
    Point(Point),
    /// A way.
    Path(Path),
    /// A relation.
    Relation(Relation),
}

impl Entity {
    /// Identifier of the wrapped element.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Point(point) => point.id,
            Self::Path(path) => path.id,
            Self::Relation(relation) => relation.id,
        }
    }

    /// Kind of the wrapped element.
    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        match self {
            Self::Point(_) => MemberKind::Node,
            Self::Path(_) => MemberKind::Way,
            Self::Relation(_) => MemberKind::Relation,
        }
    }

    /// Tags of the wrapped element.
    #[must_use]
    pub const fn tags(&self) -> &TagList {
        match self {
            Self::Point(point) => &point.tags,
            Self::Path(path) => &path.tags,
            Self::Relation(relation) => &relation.tags,
        }
    }

    /// Metadata of the wrapped element.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        match self {
            Self::Point(point) => &point.metadata,
            Self::Path(path) => &path.metadata,
            Self::Relation(relation) => &relation.metadata,
        }
    }
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        })
    }
}
