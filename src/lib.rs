pub mod api;
pub mod commands;
pub mod config;
pub mod db;
pub mod goals;
pub mod logging;
pub mod models;
pub mod stats;
pub mod workouts;

#[cfg(test)]
pub mod test_utils;

use api::{ApiClient, ApiError};
use chrono::Local;
use config::AppConfig;
use db::AppState;
use tracing::{error, info, warn};

/// Load config, refresh the cache from the backend and print the dashboard
/// report as JSON on stdout
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  logging::init(&config.log_level);

  let runtime = tokio::runtime::Runtime::new()?;
  runtime.block_on(async move {
    let pool = db::initialize_db(&config.db_path).await?;
    let state = AppState {
      db: pool,
      api: ApiClient::from_config(&config)?,
    };

    if config.api_token.is_some() {
      match commands::sync::sync_workouts(&state).await {
        Ok(count) => info!(workouts = count, "Cache refreshed from backend"),
        Err(ApiError::Unauthorized) => {
          warn!("API token rejected; showing cached data. Log in again to refresh FITNESS_API_TOKEN")
        }
        Err(e) => error!(error = %e, "Sync failed; showing cached data"),
      }
    } else {
      info!("No FITNESS_API_TOKEN set, skipping sync");
    }

    let report = commands::build_dashboard_report(&state, &Local::now()).await?;
    println!("{}", report.to_json()?);

    state.db.close().await;
    Ok::<(), Box<dyn std::error::Error>>(())
  })
}
