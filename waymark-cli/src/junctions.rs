//! Junctions command implementation for the Waymark CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use waymark_data::{JunctionOptions, RunReport, process_osm_pbf};

use crate::{
    ARG_INPUT_OSM, ARG_OUTPUT_NODES, ARG_START_NODE, CliError, ENV_INPUT_OSM, ENV_OUTPUT_NODES,
    ENV_START_NODE,
};

const PROGRAM_NAME: &str = "waymark";
const PROGRAM_PURPOSE: &str =
    "Duplicates node-network junction points and annotates turning points";

/// CLI arguments for the `junctions` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read an OSM PBF file and write an OSM XML document holding \
                 one derived node per node-network junction category and \
                 every turning circle or loop annotated with the highway \
                 category of the first residential, living_street, \
                 unclassified, service or track way reaching it. Values can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Derive junction nodes and annotate turning points"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct JunctionsArgs {
    /// Path to the OpenStreetMap PBF input file.
    #[arg(long = ARG_INPUT_OSM, value_name = "path")]
    #[serde(default)]
    pub(crate) input_osm: Option<Utf8PathBuf>,
    /// Path of the OSM XML nodes output file.
    #[arg(long = ARG_OUTPUT_NODES, value_name = "path")]
    #[serde(default)]
    pub(crate) output_nodes: Option<Utf8PathBuf>,
    /// First identifier assigned to derived nodes (positive).
    #[arg(long = ARG_START_NODE, value_name = "id", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) start_node: Option<i64>,
}

impl JunctionsArgs {
    pub(crate) fn into_config(self) -> Result<JunctionsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        JunctionsConfig::try_from(merged)
    }
}

/// Resolved `junctions` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JunctionsConfig {
    /// PBF file to read.
    pub(crate) input_osm: Utf8PathBuf,
    /// XML file to write.
    pub(crate) output_nodes: Utf8PathBuf,
    /// First derived node identifier.
    pub(crate) start_node: i64,
}

impl JunctionsConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.input_osm, ARG_INPUT_OSM)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match waymark_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<JunctionsArgs> for JunctionsConfig {
    type Error = CliError;

    fn try_from(args: JunctionsArgs) -> Result<Self, Self::Error> {
        let input_osm = args.input_osm.ok_or(CliError::MissingArgument {
            field: ARG_INPUT_OSM,
            env: ENV_INPUT_OSM,
        })?;
        let output_nodes = args.output_nodes.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT_NODES,
            env: ENV_OUTPUT_NODES,
        })?;
        let start_node = args.start_node.ok_or(CliError::MissingArgument {
            field: ARG_START_NODE,
            env: ENV_START_NODE,
        })?;
        if start_node <= 0 {
            return Err(CliError::InvalidStartNode {
                field: ARG_START_NODE,
                value: start_node,
            });
        }
        Ok(Self {
            input_osm,
            output_nodes,
            start_node,
        })
    }
}

pub(crate) fn resolve_junctions_config(args: JunctionsArgs) -> Result<JunctionsConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn run_junctions_with(
    args: JunctionsArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_junctions_config(args)?;
    write_preamble(writer, &config).map_err(CliError::WriteReport)?;
    let report = execute_junctions(&config)?;
    writeln!(writer, "\n{report}").map_err(CliError::WriteReport)
}

fn execute_junctions(config: &JunctionsConfig) -> Result<RunReport, CliError> {
    info!(
        "Deriving junction nodes from {} into {}",
        config.input_osm, config.output_nodes
    );
    process_osm_pbf(
        &config.input_osm,
        &config.output_nodes,
        &JunctionOptions::new(config.start_node),
    )
    .map_err(|source| CliError::Process {
        input: config.input_osm.clone(),
        source: Box::new(source),
    })
}

fn write_preamble(writer: &mut dyn Write, config: &JunctionsConfig) -> std::io::Result<()> {
    writeln!(writer, "Program:")?;
    writeln!(writer, "  {:<24}: {PROGRAM_NAME}", "Name")?;
    writeln!(writer, "  {:<24}: v{}", "Release", env!("CARGO_PKG_VERSION"))?;
    writeln!(writer, "  {:<24}: {PROGRAM_PURPOSE}", "Purpose")?;
    writeln!(writer)?;
    writeln!(writer, "Processing:")?;
    writeln!(writer, "  {:<24}: {}", "OSM input file", config.input_osm)?;
    writeln!(writer, "  {:<24}: {}", "Nodes output file", config.output_nodes)?;
    writeln!(writer, "  {:<24}: {}", "Starting node ID", config.start_node)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<JunctionsConfig, CliError> {
    let merged = JunctionsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    JunctionsConfig::try_from(merged)
}
