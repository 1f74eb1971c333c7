//! Command-line interface for Waymark's junction tooling.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{CommandFactory, Parser, Subcommand};

mod error;
mod junctions;

pub use error::CliError;

use junctions::JunctionsArgs;

const JUNCTIONS_COMMAND: &str = "junctions";
const ARG_INPUT_OSM: &str = "input-osm";
const ARG_OUTPUT_NODES: &str = "output-nodes";
const ARG_START_NODE: &str = "start-node";
const ENV_INPUT_OSM: &str = "WAYMARK_CMDS_JUNCTIONS_INPUT_OSM";
const ENV_OUTPUT_NODES: &str = "WAYMARK_CMDS_JUNCTIONS_OUTPUT_NODES";
const ENV_START_NODE: &str = "WAYMARK_CMDS_JUNCTIONS_START_NODE";

/// Run the Waymark CLI with the current process arguments and environment.
///
/// The run report is written to standard output.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid or the run fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Junctions(args) => junctions::run_junctions_with(args, writer),
    }
}

/// Help text for the `junctions` subcommand, used after configuration errors.
#[must_use]
pub fn usage() -> String {
    let mut command = Cli::command();
    command.build();
    if let Some(junctions) = command.find_subcommand_mut(JUNCTIONS_COMMAND) {
        return junctions.render_help().to_string();
    }
    command.render_usage().to_string()
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Derive node-network junction nodes and annotate turning points in OSM data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive junction nodes and annotated turning points from an OSM PBF file.
    Junctions(JunctionsArgs),
}

#[cfg(test)]
mod tests;
