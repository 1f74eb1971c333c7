//! Derivation of network nodes from junctions.
//!
//! Derived nodes share the junction's position and metadata but carry only
//! two tags, `node_network` and `name`. Identifiers come from an explicit
//! [`NodeIdAllocator`] owned by the caller.

use log::debug;
use thiserror::Error;

use crate::{Point, SynthesisRequest, TagList};

/// Tag key holding the derived node's network label.
pub const NODE_NETWORK_KEY: &str = "node_network";
/// Tag key holding the derived node's junction reference.
pub const NAME_KEY: &str = "name";

/// Errors returned by [`NodeIdAllocator::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartIdError {
    /// The starting identifier was zero or negative.
    #[error("starting node id must be positive, got {0}")]
    NotPositive(i64),
}

/// Errors returned by [`synthesize`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// No identifiers remain in the `i64` range.
    #[error("node id space exhausted after {last}")]
    IdentifiersExhausted {
        /// Last identifier handed out.
        last: i64,
    },
}

/// Monotonic source of identifiers for derived nodes.
///
/// # Examples
/// ```
/// use waymark_core::NodeIdAllocator;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ids = NodeIdAllocator::new(1000)?;
/// assert_eq!(ids.allocate()?, 1000);
/// assert_eq!(ids.allocate()?, 1001);
/// assert_eq!(ids.allocated(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdAllocator {
    start: i64,
    next: Option<i64>,
}

impl NodeIdAllocator {
    /// Create an allocator whose first identifier is `start`.
    ///
    /// # Errors
    /// Returns [`StartIdError::NotPositive`] when `start <= 0`.
    pub const fn new(start: i64) -> Result<Self, StartIdError> {
        if start <= 0 {
            return Err(StartIdError::NotPositive(start));
        }
        Ok(Self {
            start,
            next: Some(start),
        })
    }

    /// Hand out the next identifier.
    ///
    /// # Errors
    /// Returns [`SynthesisError::IdentifiersExhausted`] once `i64::MAX` has
    /// been allocated.
    pub fn allocate(&mut self) -> Result<i64, SynthesisError> {
        let id = self.next.ok_or(SynthesisError::IdentifiersExhausted { last: i64::MAX })?;
        self.next = id.checked_add(1);
        Ok(id)
    }

    /// Identifier the allocator started from.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Number of identifiers handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        let end = self.next.map_or(i128::from(i64::MAX) + 1, i128::from);
        u64::try_from(end - i128::from(self.start)).unwrap_or(u64::MAX)
    }
}

/// Derive a network node from `source`.
///
/// The new node copies the source's coordinates and metadata, drops every
/// source tag, and carries `node_network=<label>` followed by
/// `name=<reference>`.
///
/// # Errors
/// Returns [`SynthesisError::IdentifiersExhausted`] when the allocator has no
/// identifiers left.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use waymark_core::{
///     NetworkCategory, NodeIdAllocator, Point, SynthesisRequest, TagList, synthesize,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let junction = Point::new(
///     355_939_532,
///     Coord { x: 7.0229826, y: 52.2220383 },
///     TagList::from_iter([("network:type", "node_network"), ("rcn_ref", "53")]),
/// );
/// let request = SynthesisRequest {
///     category: NetworkCategory::Bicycle,
///     reference: "53".into(),
/// };
/// let mut ids = NodeIdAllocator::new(1000)?;
/// let derived = synthesize(&junction, &request, &mut ids)?;
///
/// assert_eq!(derived.id, 1000);
/// assert_eq!(derived.tags.get("node_network"), Some("node_bicycle"));
/// assert_eq!(derived.tags.get("name"), Some("53"));
/// # Ok(())
/// # }
/// ```
pub fn synthesize(
    source: &Point,
    request: &SynthesisRequest,
    ids: &mut NodeIdAllocator,
) -> Result<Point, SynthesisError> {
    let id = ids.allocate()?;
    let mut tags = TagList::new();
    tags.push(NODE_NETWORK_KEY, request.category.label());
    tags.push(NAME_KEY, request.reference.as_str());
    debug!(
        "Derived node {id} ({}, name={}) from junction {}",
        request.category, request.reference, source.id
    );
    Ok(Point {
        id,
        location: source.location,
        tags,
        metadata: source.metadata.clone(),
    })
}
