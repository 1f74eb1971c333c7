//! Entity builders shared by unit and behaviour tests.

use geo::Coord;

use crate::{MemberKind, MemberRef, Path, Point, Relation, TagList};

/// Build a node at `(lon, lat)` carrying `tags`.
#[must_use]
pub fn point(id: i64, lon: f64, lat: f64, tags: &[(&str, &str)]) -> Point {
    Point::new(id, Coord { x: lon, y: lat }, tags.iter().copied().collect())
}

/// Build a `network:type=node_network` junction with the given references.
#[must_use]
pub fn junction(id: i64, references: &[(&str, &str)]) -> Point {
    let mut tags = TagList::from_iter([("network:type", "node_network")]);
    for (key, value) in references {
        tags.push(*key, *value);
    }
    Point::new(
        id,
        Coord {
            x: 7.022_982_6,
            y: 52.222_038_3,
        },
        tags,
    )
}

/// Build a way tagged `highway=<highway>` over `node_refs`.
#[must_use]
pub fn highway_path(id: i64, highway: &str, node_refs: &[i64]) -> Path {
    Path::new(
        id,
        node_refs.to_vec(),
        TagList::from_iter([("highway", highway)]),
    )
}

/// Build an untagged relation whose members are all nodes.
#[must_use]
pub fn node_relation(id: i64, node_ids: &[i64]) -> Relation {
    let members = node_ids
        .iter()
        .map(|node_id| MemberRef {
            kind: MemberKind::Node,
            id: *node_id,
        })
        .collect();
    Relation::new(id, members, TagList::new())
}
