// SPDX-FileCopyrightText: 2026 Bazaar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bazaar - peer-to-peer marketplace chat.
//!
//! This is the binary entry point.

mod demo;
mod doctor;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bazaar_config::{BazaarConfig, ConfigError};

/// Bazaar - peer-to-peer marketplace chat.
#[derive(Parser, Debug)]
#[command(name = "bazaar", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a scripted buyer/seller conversation on an in-memory store.
    Demo,
    /// Check that the configured store and upload directory are usable.
    Doctor,
    /// Manage Bazaar configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate configuration and report any errors.
    Check,
}

fn load(path: Option<&PathBuf>) -> Result<BazaarConfig, Vec<ConfigError>> {
    match path {
        Some(path) => bazaar_config::load_and_validate_path(path),
        None => bazaar_config::load_and_validate(),
    }
}

/// `RUST_LOG` wins over `logging.level`.
fn init_tracing(config: &BazaarConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            bazaar_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let result = match cli.command {
        Some(Commands::Demo) => demo::run_demo(&config).await,
        Some(Commands::Doctor) => doctor::run_doctor(&config).await,
        Some(Commands::Config {
            action: ConfigCommand::Check,
        }) => {
            println!(
                "bazaar: config valid (database={}, withdraw window={} ms)",
                config.storage.database_path, config.chat.withdraw_window_ms
            );
            Ok(())
        }
        None => {
            println!("bazaar: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = bazaar_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.chat.withdraw_window_ms, 180_000);
    }

    #[test]
    fn cli_parses_config_check() {
        let cli = Cli::parse_from(["bazaar", "config", "check"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommand::Check
            })
        ));
    }

    #[test]
    fn cli_accepts_global_config_path() {
        let cli = Cli::parse_from(["bazaar", "doctor", "--config", "/tmp/bazaar.toml"]);
        assert!(matches!(cli.command, Some(Commands::Doctor)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bazaar.toml")));
    }
}
