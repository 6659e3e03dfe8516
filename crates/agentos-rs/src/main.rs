//! Command-line entry point that drives the AgentOS tools directly.

use agentos_rs::Gatekeepers;
use agentos_rs::config::AgentOsConfig;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

/// Command-line options for the AgentOS tool host.
#[derive(Parser)]
#[command(name = "agentos", version)]
struct Cli {
    /// Optional path to an agentos.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the name, description and argument schema of every tool
    Tools,
    /// Invoke one tool and print its result
    Call {
        /// Tool name, e.g. execute_command
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Print the effective command and file policies
    Policy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agentos_rs::init_logging();

    let cli = Cli::parse();
    info!("starting agentos (config_set={})", cli.config.is_some());
    let config = AgentOsConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let gatekeepers = Gatekeepers::from_config(&config).context("failed to set up gatekeepers")?;

    match cli.command {
        Command::Tools => {
            let specs = gatekeepers.registry().specs();
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        Command::Call { tool, args } => {
            let args: Value = serde_json::from_str(&args).context("--args must be valid JSON")?;
            if !args.is_object() {
                bail!("--args must be a JSON object");
            }
            let result = gatekeepers.registry().invoke(&tool, args).await;
            println!("{}", serde_json::to_string_pretty(&result.to_value())?);
            if !result.success {
                std::process::exit(1);
            }
        }
        Command::Policy => {
            let summary = gatekeepers.policy_summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
