//! Output formatting for route and validation reports.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use wayfinder_lib::{GraphInconsistency, GraphModel, LandmarkId, RouteResult, ShortPath};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered walking instructions.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Render a computed route.
///
/// Text output names both endpoints before the instruction list; JSON output
/// is the serialized [`RouteResult`].
pub fn render_route(
    graph: &GraphModel,
    from: LandmarkId,
    to: LandmarkId,
    route: &RouteResult,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(route).context("failed to serialize route")
        }
        OutputFormat::Text => {
            let mut buffer = String::new();
            let _ = writeln!(
                buffer,
                "From {} to {}",
                landmark_label(graph, from),
                landmark_label(graph, to)
            );
            buffer.push_str(&route.render_plain());
            Ok(buffer)
        }
    }
}

fn landmark_label(graph: &GraphModel, landmark: LandmarkId) -> String {
    graph
        .index_of(landmark)
        .and_then(|index| graph.landmark(index))
        .map(|record| format!("{} (#{}, floor {})", record.name, record.id, record.floor))
        .unwrap_or_else(|| format!("#{landmark}"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport<'a> {
    building: i64,
    landmarks: usize,
    edges: usize,
    inconsistencies: &'a [GraphInconsistency],
    short_paths: &'a [ShortPath],
}

/// Render the result of building a graph.
pub fn render_validation(graph: &GraphModel, format: OutputFormat) -> Result<String> {
    let inconsistencies = graph.inconsistencies();
    match format {
        OutputFormat::Json => {
            let report = ValidationReport {
                building: graph.building(),
                landmarks: graph.node_count(),
                edges: graph.edge_count(),
                inconsistencies,
                short_paths: graph.short_paths(),
            };
            serde_json::to_string_pretty(&report).context("failed to serialize validation report")
        }
        OutputFormat::Text => {
            let mut buffer = String::new();
            let _ = writeln!(
                buffer,
                "Building {}: {} landmarks, {} directed edges",
                graph.building(),
                graph.node_count(),
                graph.edge_count()
            );
            if inconsistencies.is_empty() {
                let _ = writeln!(buffer, "No inconsistencies found.");
            } else {
                let _ = writeln!(buffer, "{} inconsistencies:", inconsistencies.len());
                for issue in inconsistencies {
                    let _ = writeln!(buffer, "  - {issue}");
                }
            }
            let short_paths = graph.short_paths();
            if !short_paths.is_empty() {
                let _ = writeln!(
                    buffer,
                    "{} paths shorter than their straight line (a-star runs as dijkstra):",
                    short_paths.len()
                );
                for short in short_paths {
                    let _ = writeln!(buffer, "  - {short}");
                }
            }
            Ok(buffer)
        }
    }
}
