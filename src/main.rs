//! Afrikipresse access server
//!
//! - SeaORM over SQLite for users, subscriptions, orders and the archive
//! - Axum HTTP API with per-IP rate limiting
//! - Stripe and CinetPay webhooks mirrored into the store

// `FromJsonQueryResult` expands to `serde_json::` paths
extern crate json as serde_json;

mod access;
mod entity;
mod error;
mod migration;
mod plugins;
mod prelude;
mod providers;
mod state;
mod sv;
mod utils;

#[cfg(test)]
mod testing;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{Supervisor, server},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "afrikipresse=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting Afrikipresse server v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_env()?;
  let app = Arc::new(AppState::connect(config).await?);

  let tasks = Supervisor::new().register(server::Plugin).run(app);

  tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
  info!("Shutting down...");

  for task in tasks {
    task.abort();
  }

  Ok(())
}
