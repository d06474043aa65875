// ABOUTME: Entry point for the anodos CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;

use anodos::config::{self, PipelineConfig};
use anodos::error::{Error, Result};
use anodos::exec::Executor;
use anodos::orchestrator::Orchestrator;
use anodos::output::{Output, OutputMode};
use anodos::pipeline::Outcome;
use anodos::tools::Toolset;
use anodos::types::BuildId;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    match run(cli, &mut output).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<i32> {
    match cli.command {
        Commands::Init { app, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, app.as_deref(), force)?;
            output.success(&format!("Wrote {}", config::CONFIG_FILENAME));
            Ok(0)
        }
        Commands::Check => {
            let cwd = env::current_dir()?;
            let config = PipelineConfig::discover(&cwd)?;
            output.success(&format!(
                "Configuration OK: app={} repository={} cluster={} region={}",
                config.app, config.repository, config.cluster, config.region
            ));
            Ok(0)
        }
        Commands::Run { build_id } => {
            let cwd = env::current_dir()?;
            let config = PipelineConfig::discover(&cwd)?;

            let build_id = match build_id {
                Some(id) => {
                    BuildId::new(&id).map_err(|e| Error::InvalidConfig(e.to_string()))?
                }
                None => BuildId::now(),
            };

            let tools = Toolset::cli(Executor::default(), &config.namespace)
                .map_err(|e| Error::HttpClient(e.to_string()))?;
            let orchestrator = Orchestrator::new(config, tools);

            match orchestrator.run(build_id, output).await {
                Outcome::Succeeded => Ok(0),
                Outcome::Running | Outcome::Failed => Ok(1),
            }
        }
    }
}
