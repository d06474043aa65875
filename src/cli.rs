// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "anodos")]
#[command(about = "Build-to-cluster promotion pipeline with endpoint discovery")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new anodos.yml configuration file
    Init {
        /// Application name for the template
        #[arg(short, long)]
        app: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration and print a summary
    Check,

    /// Run the promotion pipeline
    Run {
        /// Build identifier (default: UTC timestamp)
        #[arg(short, long)]
        build_id: Option<String>,
    },
}
