// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald - an asynchronous SMS dispatch service.
//!
//! This is the binary entry point for the Herald server.

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Herald - an asynchronous SMS dispatch service.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Herald server (HTTP API + dispatch workers).
    Serve {
        /// Path to a TOML config file (default: XDG config hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Manage Herald configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Load and validate configuration, printing the effective values.
    Validate {
        /// Path to a TOML config file (default: XDG config hierarchy).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = load_config_or_exit(config.as_deref());
            init_tracing(&config.log.level);
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config {
            command: ConfigCommands::Validate { config },
        } => {
            let config = load_config_or_exit(config.as_deref());
            match toml::to_string_pretty(&config) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("error: failed to render configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Loads configuration, rendering all collected diagnostics and exiting
/// nonzero on failure.
fn load_config_or_exit(path: Option<&std::path::Path>) -> herald_config::HeraldConfig {
    match herald_config::load_and_validate(path) {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
