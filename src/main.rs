//! Cashora main entry point

use anyhow::Context;
use cashora_api::{start_server, AppState};
use cashora_config::{Config, ConfigError};
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "cashora")]
#[command(version = "0.1.0")]
#[command(about = "Mock banking console: admin review screens and a user wallet dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default: bool,
}

fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level),
    };
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            return Err(anyhow::anyhow!("{}", e.to_details()))
                .with_context(|| format!("Failed to load {}", args.config.display()))
        }
    };

    init_logging(&config.logging.level);
    if missing {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let rt = Runtime::new()?;
    rt.block_on(start_server(AppState::seeded(config)))
}
