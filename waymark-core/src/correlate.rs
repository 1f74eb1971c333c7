//! Correlation of turning features with the ways that reach them.
//!
//! Turning-circle and turning-loop nodes are held by identifier until the end
//! of a run. Each qualifying way appends `fzk_turning=<highway>` to the nodes
//! it references; the first way wins. Nodes no way reached are finalised with
//! `fzk_turning=not_set`.

use std::collections::HashMap;

use log::debug;

use crate::{HighwayCategory, Point};

/// Tag key written onto turning features.
pub const TURNING_KEY: &str = "fzk_turning";
/// Value written onto turning features no qualifying way referenced.
pub const NOT_SET_VALUE: &str = "not_set";

/// Table of turning features keyed by node identifier.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{HighwayCategory, Point, TagList, TurningCorrelator};
///
/// let mut correlator = TurningCorrelator::default();
/// correlator.register(Point::new(
///     77,
///     Coord { x: 0.0, y: 0.0 },
///     TagList::from_iter([("highway", "turning_circle")]),
/// ));
///
/// assert_eq!(correlator.annotate(&[76, 77], HighwayCategory::Service), 1);
/// let points = correlator.drain_finalize();
/// assert_eq!(points[0].tags.get("fzk_turning"), Some("service"));
/// ```
#[derive(Debug, Default)]
pub struct TurningCorrelator {
    table: HashMap<i64, Point>,
}

impl TurningCorrelator {
    /// Track `point`, replacing any earlier entry with the same identifier.
    pub fn register(&mut self, point: Point) {
        if self.table.insert(point.id, point).is_some() {
            debug!("Replaced duplicate turning feature registration");
        }
    }

    /// Annotate every tracked node in `node_refs` with `category`.
    ///
    /// Nodes already carrying [`TURNING_KEY`] and identifiers that are not
    /// tracked are skipped. Returns the number of nodes newly annotated.
    pub fn annotate(&mut self, node_refs: &[i64], category: HighwayCategory) -> usize {
        let mut annotated = 0;
        for node_id in node_refs {
            let Some(point) = self.table.get_mut(node_id) else {
                continue;
            };
            if point.tags.contains_key(TURNING_KEY) {
                continue;
            }
            point.tags.push(TURNING_KEY, category.as_str());
            debug!("Annotated turning feature {node_id} with {category}");
            annotated += 1;
        }
        annotated
    }

    /// Number of tracked turning features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Return true when no turning features are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of tracked features already annotated by a way.
    #[must_use]
    pub fn annotated_count(&self) -> usize {
        self.table
            .values()
            .filter(|point| point.tags.contains_key(TURNING_KEY))
            .count()
    }

    /// Finalise every tracked feature and hand them back.
    ///
    /// Features without a [`TURNING_KEY`] tag receive
    /// `fzk_turning=not_set`. The result is ordered by identifier.
    #[must_use]
    pub fn drain_finalize(self) -> Vec<Point> {
        let mut points: Vec<Point> = self
            .table
            .into_values()
            .map(|mut point| {
                if !point.tags.contains_key(TURNING_KEY) {
                    point.tags.push(TURNING_KEY, NOT_SET_VALUE);
                }
                point
            })
            .collect();
        points.sort_by_key(|point| point.id);
        points
    }
}
