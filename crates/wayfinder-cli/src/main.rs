use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use wayfinder_cli::commands::route::{handle_route_command, RouteCommandArgs};
use wayfinder_cli::commands::validate::handle_validate_command;
use wayfinder_cli::logging::{init_logging, LoggingConfig};
use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::{LandmarkId, RouteAlgorithm};

#[derive(Parser, Debug)]
#[command(author, version, about = "Indoor route planning over building snapshots")]
struct Cli {
    /// Building snapshot JSON file.
    #[arg(long, env = "WAYFINDER_SNAPSHOT", global = true)]
    snapshot: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a walking route between two landmarks.
    Route {
        /// Starting landmark id.
        #[arg(long = "from")]
        from: LandmarkId,
        /// Destination landmark id.
        #[arg(long = "to")]
        to: LandmarkId,
        /// Never use paths that require stairs.
        #[arg(long)]
        avoid_stairs: bool,
        /// Only use wheelchair accessible paths.
        #[arg(long)]
        wheelchair: bool,
        /// Minimize estimated walking time instead of distance.
        #[arg(long)]
        fastest: bool,
        /// Search algorithm (dijkstra or a-star).
        #[arg(long)]
        algorithm: Option<RouteAlgorithm>,
    },
    /// Build the routing graph and report inconsistent path records.
    Validate {
        /// Exit with an error when any inconsistency is found.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let snapshot = cli.snapshot.ok_or_else(|| {
        anyhow::anyhow!("no building snapshot given; pass --snapshot or set WAYFINDER_SNAPSHOT")
    })?;

    match cli.command {
        Command::Route {
            from,
            to,
            avoid_stairs,
            wheelchair,
            fastest,
            algorithm,
        } => {
            let args = RouteCommandArgs {
                from,
                to,
                algorithm,
                avoid_stairs,
                wheelchair,
                fastest,
            };
            handle_route_command(&snapshot, cli.format, &args).map(|_| ())
        }
        Command::Validate { strict } => handle_validate_command(&snapshot, cli.format, strict),
    }
}
