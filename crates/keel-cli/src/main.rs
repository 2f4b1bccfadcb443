use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logger;

use commands::{GraphArgs, ResolveArgs, Selection};

/// Keel module graph resolver.
///
/// Reads keel.toml and the module and target rule files of a project,
/// resolves the module graph of a target and prints or exports the result.
///
/// EXAMPLES:
///     keel resolve                          Resolve the default target
///     keel resolve -t Editor -c Shipping    Resolve one configuration
///     keel resolve --all-configurations     Resolve every configuration
///     keel graph -o game.dot                Export the graph for Graphviz
///     keel modules                          List discovered rule files
///
/// ENVIRONMENT VARIABLES:
///     KEEL_CONFIGURATION  Default configuration of every target
///     KEEL_LINK_KIND      Override the link kind of every target
///     KEEL_OUTPUT_DIR     Override the output directory
///     NO_COLOR            Set to disable colored output
#[derive(Parser)]
#[command(name = "keel")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a target and print a summary
    ///
    /// EXAMPLES:
    ///     keel resolve --target Game --platform linux
    ///     keel resolve --json
    #[command(visible_alias = "r")]
    Resolve {
        #[command(flatten)]
        selection: Selection,

        /// Resolve every configuration in parallel
        #[arg(long, conflicts_with = "configuration")]
        all_configurations: bool,

        /// Print the JSON export instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Export the module graph in Graphviz dot format
    ///
    /// EXAMPLES:
    ///     keel graph | dot -Tsvg > graph.svg
    ///     keel graph --output graph.dot
    #[command(visible_alias = "g")]
    Graph {
        #[command(flatten)]
        selection: Selection,

        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List discovered modules and targets
    Modules {
        /// Project directory (defaults to the current directory)
        #[arg(long, short = 'p')]
        project: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let color = logger::should_use_color(cli.no_color);
    if !color {
        colored::control::set_override(false);
    }
    logger::init_logger(cli.verbose, cli.quiet, !color);

    match cli.command {
        Commands::Resolve {
            selection,
            all_configurations,
            json,
        } => commands::resolve::run(ResolveArgs {
            selection,
            all_configurations,
            json,
            quiet: cli.quiet,
        }),
        Commands::Graph { selection, output } => {
            commands::graph::run(GraphArgs { selection, output })
        }
        Commands::Modules { project, json } => commands::modules::run(project, json),
    }
}
