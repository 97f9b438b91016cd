//! Validate command handler: build the graph and report skipped paths.

use std::path::Path;

use anyhow::{bail, Result};

use wayfinder_lib::build_graph;

use crate::commands::read_snapshot;
use crate::output::{render_validation, OutputFormat};

/// Handle the validate subcommand.
///
/// With `strict`, any inconsistency turns into a failing exit status after
/// the report has been printed.
pub fn handle_validate_command(
    snapshot_path: &Path,
    format: OutputFormat,
    strict: bool,
) -> Result<()> {
    let snapshot = read_snapshot(snapshot_path)?;
    let graph = build_graph(&snapshot);

    println!("{}", render_validation(&graph, format)?.trim_end());

    let found = graph.inconsistencies().len();
    if strict && found > 0 {
        bail!(
            "building {} has {} inconsistent path records",
            graph.building(),
            found
        );
    }
    Ok(())
}
