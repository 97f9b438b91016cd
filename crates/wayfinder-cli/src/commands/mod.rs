// Module exports for CLI subcommands
//
// Each module handles one subcommand; main.rs parses arguments and dispatches
// to these handlers.

pub mod route;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use wayfinder_lib::{load_snapshot, BuildingSnapshot};

/// Load the building snapshot named by `--snapshot`.
pub fn read_snapshot(path: &Path) -> Result<BuildingSnapshot> {
    load_snapshot(path)
        .with_context(|| format!("failed to load building snapshot from {}", path.display()))
}
