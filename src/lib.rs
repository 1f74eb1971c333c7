//! Facade crate for Waymark.
//!
//! This crate re-exports the core domain types and, behind the `data` feature,
//! the OSM PBF source, OSM XML sink and run driver.

#![forbid(unsafe_code)]

pub use waymark_core::{
    Classification, Entity, HighwayCategory, NetworkCategory, NodeIdAllocator, Path, Point,
    Relation, StartIdError, SynthesisError, TagList, TurningCorrelator, classify, synthesize,
};

#[cfg(feature = "data")]
pub use waymark_data::{
    JunctionOptions, OsmXmlWriter, PbfEntitySource, ProcessError, RunReport, process_osm_pbf,
    run_junctions,
};
