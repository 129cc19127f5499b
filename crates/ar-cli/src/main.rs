//! CLI for inspecting augmented-reality scene files.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "arctl",
    about = "Inspect reference frames and poses in AR scene files",
    version,
    propagate_version = true
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the ancestor frames of an entity, root first
    Ancestors {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Entity name (case-insensitive)
        entity: String,
    },

    /// Show the root reference frame of an entity
    Root {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Entity name (case-insensitive)
        entity: String,
    },

    /// Show an entity's pose in its own reference frame
    Pose {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Entity name (case-insensitive)
        entity: String,

        /// Evaluation time, RFC 3339 (default: now)
        #[arg(short, long)]
        time: Option<String>,

        /// Print the pose as JSON
        #[arg(long)]
        json: bool,
    },

    /// Walk every entity's frame chain and report broken graphs
    Check {
        /// Scene file (JSON)
        scene: PathBuf,

        /// Maximum ancestor chain length
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Resolve and print the components of a URL
    Url {
        /// URL to parse, absolute or relative to --base
        url: String,

        /// Base URL for relative input
        #[arg(short, long)]
        base: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Ancestors { scene, entity } => commands::ancestors::run(&scene, &entity),
        Commands::Root { scene, entity } => commands::root::run(&scene, &entity),
        Commands::Pose {
            scene,
            entity,
            time,
            json,
        } => commands::pose::run(&scene, &entity, time.as_deref(), json),
        Commands::Check { scene, max_depth } => commands::check::run(&scene, max_depth),
        Commands::Url { url, base } => commands::url::run(&url, base.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
