//! Error types produced while streaming OSM data through a run.

use std::{io, sync::Arc};

use camino::Utf8PathBuf;
use thiserror::Error;
use waymark_core::{StartIdError, SynthesisError};

/// Errors produced by the PBF entity source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    /// A blob could not be read or decoded.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        #[source]
        source: osmpbf::Error,
        path: Utf8PathBuf,
    },
}

/// Errors produced while writing OSM XML.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Serialising an element failed.
    #[error("failed to serialise OSM XML")]
    Xml(#[source] quick_xml::Error),
    /// Writing to the underlying stream failed.
    #[error("failed to write OSM XML output")]
    Io(#[from] io::Error),
}

impl From<quick_xml::Error> for SinkError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(shared) => Self::Io(
                Arc::try_unwrap(shared)
                    .unwrap_or_else(|still_shared| io::Error::new(still_shared.kind(), still_shared)),
            ),
            other => Self::Xml(other),
        }
    }
}

/// Errors that abort a junction run mid-stream.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading the next entity failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Writing a node failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// Deriving a node failed.
    #[error("failed to derive network node")]
    Synthesis(#[from] SynthesisError),
}

/// Errors returned by [`crate::process_osm_pbf`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The starting node identifier was rejected.
    #[error("invalid starting node id")]
    InvalidStartNode(#[from] StartIdError),
    /// The input file could not be opened.
    #[error("failed to open input")]
    OpenInput(#[source] SourceError),
    /// The output file could not be created.
    #[error("failed to create output file at {path:?}")]
    CreateOutput {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
    /// The run aborted while streaming.
    #[error("processing aborted")]
    Pipeline(#[from] PipelineError),
}
