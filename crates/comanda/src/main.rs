// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comanda - a Telegram order-taking assistant for restaurants.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comanda_config::ComandaConfig;

/// Comanda - a Telegram order-taking assistant for restaurants.
#[derive(Parser, Debug)]
#[command(name = "comanda", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot.
    Serve,
    /// Validate the configuration and print it with secrets redacted.
    Config,
    /// Price a delivery to a point without running the bot.
    Quote {
        /// Destination latitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        /// Destination longitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
}

fn load_config(path: Option<&PathBuf>) -> ComandaConfig {
    let loaded = match path {
        Some(path) => comanda_config::load_and_validate_path(path),
        None => comanda_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            comanda_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("comanda: use --help for available commands");
        return;
    };

    let config = load_config(cli.config.as_ref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Config => inspect::print_config(&config),
        Commands::Quote {
            latitude,
            longitude,
        } => inspect::run_quote(&config, latitude, longitude).await,
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
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_quote_with_negative_longitude() {
        let cli = Cli::try_parse_from(["comanda", "quote", "10.49", "-66.87"]).unwrap();
        match cli.command {
            Some(Commands::Quote {
                latitude,
                longitude,
            }) => {
                assert_eq!(latitude, 10.49);
                assert_eq!(longitude, -66.87);
            }
            other => panic!("expected quote, got {other:?}"),
        }
    }

    #[test]
    fn cli_accepts_global_config_flag() {
        let cli =
            Cli::try_parse_from(["comanda", "serve", "--config", "/etc/comanda.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/comanda.toml")));
    }

    #[test]
    fn cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
