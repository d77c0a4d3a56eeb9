// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frugal - a cost-optimizing chat-completion router.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod models;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use frugal_config::{ConfigError, FrugalConfig};

/// Frugal - routes each chat completion to the cheapest adequate model.
#[derive(Parser, Debug)]
#[command(name = "frugal", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the HTTP gateway (the default).
    Serve,
    /// Validate configuration and exit.
    CheckConfig,
    /// Print the model catalogue with pricing.
    Models,
}

fn load(path: Option<&PathBuf>) -> Result<FrugalConfig, Vec<ConfigError>> {
    match path {
        Some(path) => frugal_config::load_and_validate_path(path),
        None => frugal_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            frugal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => {
            println!(
                "frugal: config ok (mode={}, listen={}:{}, cache={}, rate_limit={}, quality={})",
                config.server.mode,
                config.server.host,
                config.server.port,
                config.cache.enabled,
                config.rate_limit.enabled,
                config.quality.enabled,
            );
        }
        Commands::Models => models::print_catalogue(),
    }
}
