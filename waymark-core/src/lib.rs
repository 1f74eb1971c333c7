//! Core domain types for Waymark.
//!
//! Waymark derives node-network junction nodes and annotates turning
//! features while streaming over OpenStreetMap data. This crate holds the
//! pure parts of that pipeline:
//!
//! - the entity model ([`Point`], [`Path`], [`Relation`]);
//! - the tag [`classify`] rules;
//! - node derivation via [`synthesize`] and [`NodeIdAllocator`]; and
//! - the [`TurningCorrelator`] table.
//!
//! Nothing here performs I/O.

#![forbid(unsafe_code)]

pub mod classify;
pub mod correlate;
pub mod entity;
pub mod synthesize;
pub mod tags;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use classify::{
    Classification, HighwayCategory, NetworkCategory, SynthesisRequest, TurningKind, classify,
    is_network_junction,
};
pub use correlate::{NOT_SET_VALUE, TURNING_KEY, TurningCorrelator};
pub use entity::{Entity, MemberKind, MemberRef, Metadata, Path, Point, Relation};
pub use synthesize::{NodeIdAllocator, StartIdError, SynthesisError, synthesize};
pub use tags::TagList;
