//! Human-readable summary of a junction run.

use std::fmt;

use chrono::SecondsFormat;

use crate::stats::{ElementMaximum, IdRange, OsmStatistics};

/// Counters for network junction derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JunctionStatistics {
    /// Nodes tagged `network:type=node_network`.
    pub junctions_found: u64,
    /// Derived nodes written to the output.
    pub nodes_written: u64,
}

/// Counters for turning-feature correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurningStatistics {
    /// Distinct turning features tracked.
    pub registered: u64,
    /// Features annotated by a qualifying way.
    pub annotated: u64,
    /// Features finalised as `not_set`.
    pub not_set: u64,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Junction derivation counters.
    pub junctions: JunctionStatistics,
    /// Turning-feature counters.
    pub turning: TurningStatistics,
    /// Element statistics.
    pub statistics: OsmStatistics,
}

const NOT_AVAILABLE: &str = "n/a";

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "  {label:<24}: {value}")
}

fn id_bound(range: Option<IdRange>, pick: fn(IdRange) -> i64) -> String {
    range.map_or_else(|| NOT_AVAILABLE.to_owned(), |range| pick(range).to_string())
}

fn maximum(value: Option<ElementMaximum>) -> (String, String) {
    value.map_or_else(
        || ("0".to_owned(), NOT_AVAILABLE.to_owned()),
        |max| (max.count.to_string(), format!("{} {}", max.kind, max.id)),
    )
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;

        writeln!(f, "Junction point statistics:")?;
        row(f, "Points found", self.junctions.junctions_found)?;
        row(f, "Nodes written", self.junctions.nodes_written)?;

        writeln!(f)?;
        writeln!(f, "Turning point statistics:")?;
        row(f, "Points found", self.turning.registered)?;
        row(f, "Points annotated", self.turning.annotated)?;
        row(f, "Points not set", self.turning.not_set)?;

        writeln!(f)?;
        writeln!(f, "OSM data statistics:")?;
        let (ts_min, ts_max) = stats.timestamps.map_or_else(
            || (NOT_AVAILABLE.to_owned(), NOT_AVAILABLE.to_owned()),
            |range| {
                (
                    range.min.to_rfc3339_opts(SecondsFormat::Secs, true),
                    range.max.to_rfc3339_opts(SecondsFormat::Secs, true),
                )
            },
        );
        row(f, "Timestamp min", ts_min)?;
        row(f, "Timestamp max", ts_max)?;
        match stats.bounds {
            Some(bounds) => {
                row(f, "Lon min", format!("{:.7}", bounds.min().x))?;
                row(f, "Lon max", format!("{:.7}", bounds.max().x))?;
                row(f, "Lat min", format!("{:.7}", bounds.min().y))?;
                row(f, "Lat max", format!("{:.7}", bounds.max().y))?;
            }
            None => {
                for label in ["Lon min", "Lon max", "Lat min", "Lat max"] {
                    row(f, label, NOT_AVAILABLE)?;
                }
            }
        }
        row(f, "Nodes", stats.nodes)?;
        row(f, "Ways", stats.ways)?;
        row(f, "Relations", stats.relations)?;
        row(
            f,
            "Version max",
            stats
                .max_version
                .map_or_else(|| NOT_AVAILABLE.to_owned(), |version| version.to_string()),
        )?;
        row(f, "Node ID min", id_bound(stats.node_ids, |range| range.min))?;
        row(f, "Node ID max", id_bound(stats.node_ids, |range| range.max))?;
        row(f, "Way ID min", id_bound(stats.way_ids, |range| range.min))?;
        row(f, "Way ID max", id_bound(stats.way_ids, |range| range.max))?;
        row(f, "Relation ID min", id_bound(stats.relation_ids, |range| range.min))?;
        row(f, "Relation ID max", id_bound(stats.relation_ids, |range| range.max))?;
        let (tags, tags_owner) = maximum(stats.max_tags);
        row(f, "Keyval pairs max", tags)?;
        row(f, "Keyval pairs max object", tags_owner)?;
        let (refs, refs_owner) = maximum(stats.max_node_refs);
        row(f, "Noderefs max", refs)?;
        row(f, "Noderefs max object", refs_owner)?;
        let (members, members_owner) = maximum(stats.max_members);
        row(f, "Relrefs max", members)?;
        row(f, "Relrefs max object", members_owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use waymark_core::{Entity, test_support};

    #[rstest]
    fn empty_report_marks_missing_values() {
        let report = RunReport {
            junctions: JunctionStatistics::default(),
            turning: TurningStatistics::default(),
            statistics: OsmStatistics::default(),
        };
        let rendered = report.to_string();
        assert!(rendered.contains("  Points found            : 0\n"));
        assert!(rendered.contains("  Lon min                 : n/a\n"));
        assert!(rendered.contains("  Relrefs max object      : n/a\n"));
    }

    #[rstest]
    fn report_lists_maxima_with_owner() {
        let mut statistics = OsmStatistics::default();
        statistics.record(&Entity::Point(test_support::point(
            77,
            7.022_982_6,
            52.222_038_3,
            &[("highway", "turning_circle")],
        )));
        statistics.record(&Entity::Path(test_support::highway_path(100, "service", &[76, 77])));
        let report = RunReport {
            junctions: JunctionStatistics {
                junctions_found: 1,
                nodes_written: 2,
            },
            turning: TurningStatistics {
                registered: 1,
                annotated: 1,
                not_set: 0,
            },
            statistics,
        };
        let rendered = report.to_string();
        assert!(rendered.contains("  Nodes written           : 2\n"));
        assert!(rendered.contains("  Lat max                 : 52.2220383\n"));
        assert!(rendered.contains("  Noderefs max object     : way 100\n"));
        assert!(rendered.contains("  Keyval pairs max object : node 77\n"));
    }
}
