//! Shared test harness modules for the Waymark CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::junctions::{JunctionsConfig, config_from_layers_for_test, resolve_junctions_config};

mod helpers;
