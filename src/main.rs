mod app;
mod cache;
mod collection;
mod config;
mod logging;
mod model;
mod source;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

use cache::{NoopStorage, SqliteSlotStorage};

#[derive(Parser, Debug)]
#[command(name = "equinox")]
#[command(about = "Browse and edit the products and berries catalogs, keeping edits locally")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/equinox/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  kind: app::Kind,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.logging)?;

  if !config.storage.enabled {
    let app = app::App::new(config, Arc::new(NoopStorage));
    return app.run(args.kind).await;
  }

  let storage = match &config.storage.path {
    Some(path) => SqliteSlotStorage::open_at(path)?,
    None => SqliteSlotStorage::open()?,
  };
  let app = app::App::new(config, Arc::new(storage));
  app.run(args.kind).await
}
