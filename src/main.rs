//! Kakeibo main entry point

use anyhow::Context;
use clap::Parser;
use kakeibo_api::start_server;
use kakeibo_config::{Config, ConfigError};
use kakeibo_core::Kakeibo;
use kakeibo_store::SqliteStore;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kakeibo")]
#[command(version = "0.1.0")]
#[command(about = "A shared household account book served over HTTP", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    // A missing file falls back to defaults; a broken one is fatal
    let (config, missing) = match Config::load(args.config.clone()) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e).context("Failed to load configuration");
        }
    };

    // RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.to_lowercase())).init();

    if missing {
        warn!("Config file {} not found, using defaults", args.config.display());
    } else {
        info!("Config loaded from {}", args.config.display());
    }

    let store = SqliteStore::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    info!("Database ready: {}", config.database.url);

    let service = Arc::new(Kakeibo::new(config, Arc::new(store)));
    start_server(service).await?;

    Ok(())
}
