//! OSM I/O and run orchestration for Waymark.
//!
//! Responsibilities:
//! - Stream entities out of OSM PBF containers.
//! - Write derived and annotated nodes as OSM XML.
//! - Drive a single pass over the input and report statistics.
//!
//! Boundaries:
//! - Tag rules, node derivation and correlation live in `waymark-core`.
//! - Filesystem access goes through `waymark-fs`.
//!
//! Invariants:
//! - Entities are processed in storage order on a single thread.
//! - No global mutable state; identifiers are drawn from an explicit
//!   allocator owned by each run.

mod error;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod source;
pub mod stats;

pub use error::{PipelineError, ProcessError, SinkError, SourceError};
pub use pipeline::{
    DEFAULT_GENERATOR, JunctionOptions, JunctionProcessor, process_osm_pbf, run_junctions,
};
pub use report::{JunctionStatistics, RunReport, TurningStatistics};
pub use sink::OsmXmlWriter;
pub use source::PbfEntitySource;
pub use stats::{ElementMaximum, IdRange, OsmStatistics, TimeRange};
