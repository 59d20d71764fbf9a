//! RushHour - a Discord commute game
//!
//! Architecture:
//! - Content tables, engine and dispatcher are platform independent
//! - Sessions and win/loss records live in two JSON documents
//! - Serenity drives the Discord gateway as a supervised plugin
//! - Tokio for async runtime

mod content;
mod dispatch;
mod engine;
mod error;
mod model;
mod plugins;
mod prelude;
mod state;
mod store;
mod utils;
mod view;

use std::{env, sync::Arc};

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{App, discord},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rushhour=debug,serenity=warn".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN not set")?;
  let config = Config::from_env()?;

  info!("Starting RushHour v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config));
  let handles = App::new().register(discord::Plugin::new(token)).run(app);

  tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
  info!("Shutting down...");

  for handle in handles {
    handle.abort();
  }
  Ok(())
}
