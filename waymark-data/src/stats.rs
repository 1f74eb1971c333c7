//! Element statistics gathered during a run.
//!
//! Pure bookkeeping: counts, coordinate bounds, timestamp range, identifier
//! ranges, and the largest element of each kind by tag count, node
//! references, and relation members.

use chrono::{DateTime, Utc};
use geo::{Coord, Rect};
use log::warn;
use waymark_core::{Entity, MemberKind, Metadata, Path, Point, Relation};

/// Inclusive range of identifiers seen for one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    /// Smallest identifier.
    pub min: i64,
    /// Largest identifier.
    pub max: i64,
}

impl IdRange {
    const fn single(id: i64) -> Self {
        Self { min: id, max: id }
    }

    fn include(range: &mut Option<Self>, id: i64) {
        match range {
            Some(existing) => {
                existing.min = existing.min.min(id);
                existing.max = existing.max.max(id);
            }
            None => *range = Some(Self::single(id)),
        }
    }
}

/// Inclusive range of edit timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Earliest timestamp.
    pub min: DateTime<Utc>,
    /// Latest timestamp.
    pub max: DateTime<Utc>,
}

/// The element holding a maximum, and the maximum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMaximum {
    /// Measured size.
    pub count: usize,
    /// Kind of the owning element.
    pub kind: MemberKind,
    /// Identifier of the owning element.
    pub id: i64,
}

impl ElementMaximum {
    /// Replace `slot` when `count` strictly exceeds it; the first element
    /// reaching a maximum keeps it.
    fn offer(slot: &mut Option<Self>, count: usize, kind: MemberKind, id: i64) {
        if slot.is_none_or(|current| count > current.count) {
            *slot = Some(Self { count, kind, id });
        }
    }
}

/// Statistics over every element of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmStatistics {
    /// Number of nodes, including dense-node entries.
    pub nodes: u64,
    /// Number of ways.
    pub ways: u64,
    /// Number of relations.
    pub relations: u64,
    /// Bounding box covering all valid node coordinates, if any.
    /// Coordinates are WGS84 with `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
    /// Edit timestamps across all elements.
    pub timestamps: Option<TimeRange>,
    /// Highest element version.
    pub max_version: Option<i32>,
    /// Node identifier range.
    pub node_ids: Option<IdRange>,
    /// Way identifier range.
    pub way_ids: Option<IdRange>,
    /// Relation identifier range.
    pub relation_ids: Option<IdRange>,
    /// Element with the most tags.
    pub max_tags: Option<ElementMaximum>,
    /// Way with the most node references.
    pub max_node_refs: Option<ElementMaximum>,
    /// Relation with the most members.
    pub max_members: Option<ElementMaximum>,
}

impl OsmStatistics {
    /// Account for one entity.
    pub fn record(&mut self, entity: &Entity) {
        match entity {
            Entity::Point(point) => self.record_node(point),
            Entity::Path(path) => self.record_way(path),
            Entity::Relation(relation) => self.record_relation(relation),
        }
        self.record_common(entity.kind(), entity.id(), entity.tags().len(), entity.metadata());
    }

    fn record_node(&mut self, point: &Point) {
        self.nodes += 1;
        IdRange::include(&mut self.node_ids, point.id);
        match Self::coordinate_bounds(point.lon(), point.lat()) {
            Some(bounds) => self.include_bounds(bounds),
            None => warn!(
                "Node {} has invalid coordinates ({}, {}); excluded from bounds",
                point.id,
                point.lon(),
                point.lat()
            ),
        }
    }

    fn record_way(&mut self, path: &Path) {
        self.ways += 1;
        IdRange::include(&mut self.way_ids, path.id);
        ElementMaximum::offer(
            &mut self.max_node_refs,
            path.node_refs.len(),
            MemberKind::Way,
            path.id,
        );
    }

    fn record_relation(&mut self, relation: &Relation) {
        self.relations += 1;
        IdRange::include(&mut self.relation_ids, relation.id);
        ElementMaximum::offer(
            &mut self.max_members,
            relation.members.len(),
            MemberKind::Relation,
            relation.id,
        );
    }

    fn record_common(&mut self, kind: MemberKind, id: i64, tag_count: usize, metadata: &Metadata) {
        ElementMaximum::offer(&mut self.max_tags, tag_count, kind, id);
        if let Some(version) = metadata.version {
            self.max_version = Some(self.max_version.map_or(version, |max| max.max(version)));
        }
        if let Some(timestamp) = metadata.timestamp {
            self.include_timestamp(timestamp);
        }
    }

    fn include_timestamp(&mut self, timestamp: DateTime<Utc>) {
        match &mut self.timestamps {
            Some(range) => {
                range.min = range.min.min(timestamp);
                range.max = range.max.max(timestamp);
            }
            None => {
                self.timestamps = Some(TimeRange {
                    min: timestamp,
                    max: timestamp,
                });
            }
        }
    }

    fn include_bounds(&mut self, bounds: Rect<f64>) {
        match &mut self.bounds {
            Some(existing) => {
                let min = Coord {
                    x: existing.min().x.min(bounds.min().x),
                    y: existing.min().y.min(bounds.min().y),
                };
                let max = Coord {
                    x: existing.max().x.max(bounds.max().x),
                    y: existing.max().y.max(bounds.max().y),
                };
                *existing = Rect::new(min, max);
            }
            None => self.bounds = Some(bounds),
        }
    }

    fn coordinate_bounds(lon: f64, lat: f64) -> Option<Rect<f64>> {
        (lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat))
        .then(|| {
            let coordinate = Coord { x: lon, y: lat };
            Rect::new(coordinate, coordinate)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use waymark_core::{Metadata, test_support};

    fn stamped(point: Point, version: i32, day: u32) -> Entity {
        Entity::Point(point.with_metadata(Metadata {
            version: Some(version),
            timestamp: Utc.with_ymd_and_hms(2019, 9, day, 12, 0, 0).single(),
            ..Metadata::default()
        }))
    }

    #[rstest]
    fn tracks_counts_bounds_and_id_ranges() {
        let mut stats = OsmStatistics::default();
        stats.record(&Entity::Point(test_support::point(5, 7.0, 52.0, &[])));
        stats.record(&Entity::Point(test_support::point(3, 8.0, 51.0, &[])));
        stats.record(&Entity::Path(test_support::highway_path(10, "track", &[5, 3])));
        stats.record(&Entity::Relation(test_support::node_relation(20, &[5])));

        assert_eq!((stats.nodes, stats.ways, stats.relations), (2, 1, 1));
        assert_eq!(stats.node_ids, Some(IdRange { min: 3, max: 5 }));
        assert_eq!(stats.way_ids, Some(IdRange::single(10)));
        assert_eq!(stats.relation_ids, Some(IdRange::single(20)));
        let bounds = stats.bounds.expect("bounds for valid nodes");
        assert_eq!(bounds.min(), Coord { x: 7.0, y: 51.0 });
        assert_eq!(bounds.max(), Coord { x: 8.0, y: 52.0 });
    }

    #[rstest]
    fn invalid_coordinates_are_counted_but_not_bounded() {
        let mut stats = OsmStatistics::default();
        stats.record(&Entity::Point(test_support::point(1, f64::NAN, 0.0, &[])));
        stats.record(&Entity::Point(test_support::point(2, 200.0, 0.0, &[])));
        assert_eq!(stats.nodes, 2);
        assert!(stats.bounds.is_none());
    }

    #[rstest]
    fn tracks_versions_and_timestamps() {
        let mut stats = OsmStatistics::default();
        stats.record(&stamped(test_support::point(1, 0.0, 0.0, &[]), 3, 20));
        stats.record(&stamped(test_support::point(2, 0.0, 0.0, &[]), 8, 13));
        assert_eq!(stats.max_version, Some(8));
        let range = stats.timestamps.expect("timestamps recorded");
        assert_eq!(range.min, Utc.with_ymd_and_hms(2019, 9, 13, 12, 0, 0).unwrap());
        assert_eq!(range.max, Utc.with_ymd_and_hms(2019, 9, 20, 12, 0, 0).unwrap());
    }

    #[rstest]
    fn first_element_keeps_a_tied_maximum() {
        let mut stats = OsmStatistics::default();
        stats.record(&Entity::Path(test_support::highway_path(1, "track", &[1, 2, 3])));
        stats.record(&Entity::Path(test_support::highway_path(2, "track", &[4, 5, 6])));
        stats.record(&Entity::Point(test_support::point(9, 0.0, 0.0, &[("a", "1"), ("b", "2")])));
        assert_eq!(
            stats.max_node_refs,
            Some(ElementMaximum {
                count: 3,
                kind: MemberKind::Way,
                id: 1,
            })
        );
        assert_eq!(
            stats.max_tags,
            Some(ElementMaximum {
                count: 2,
                kind: MemberKind::Node,
                id: 9,
            })
        );
    }
}
