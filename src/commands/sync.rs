use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ApiError, PredictionInput};
use crate::db::AppState;
use crate::models::WorkoutRecord;
use crate::workouts::{delete_workout, replace_workouts, upsert_workout};

/// ---------------------------------------------------------------------------
/// Sync From Backend
/// ---------------------------------------------------------------------------

/// Mirror the backend's workout list into the local cache.
/// Returns the number of cached workouts.
///
/// A 401 comes back as `ApiError::Unauthorized`; the caller should drop the
/// token. The cache is left untouched on any error.
pub async fn sync_workouts(state: &AppState) -> Result<usize, ApiError> {
  let records = state.api.fetch_workouts().await.map_err(|e| {
    if matches!(e, ApiError::Unauthorized) {
      warn!("Backend rejected token during sync");
    }
    e
  })?;

  replace_workouts(&state.db, &records)
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?;

  info!(workouts = records.len(), "Workout sync complete");
  Ok(records.len())
}

/// ---------------------------------------------------------------------------
/// Log a Workout
/// ---------------------------------------------------------------------------

/// Predict calories for a workout, save it to the backend and cache it
pub async fn log_workout(state: &AppState, input: PredictionInput) -> Result<WorkoutRecord, ApiError> {
  let calories = state.api.predict_calories(&input).await?;
  let id = state.api.save_workout(&input, calories).await?;

  let record = WorkoutRecord {
    id,
    created_at: Utc::now(),
    calories,
    duration_minutes: input.duration_minutes,
    heart_rate: input.heart_rate,
    gender: Some(input.gender),
    age: Some(input.age),
    height: Some(input.height),
    weight: Some(input.weight),
    body_temp: Some(input.body_temp),
  };

  // The backend owns the timestamp; until a sync succeeds, cache our copy
  // under the backend id so the next sync overwrites it
  if let Err(e) = sync_workouts(state).await {
    warn!(error = %e, workout_id = id, "Saved workout but could not refresh cache");
    upsert_workout(&state.db, &record)
      .await
      .map_err(|e| ApiError::Database(e.to_string()))?;
  }

  info!(workout_id = id, calories, "Workout logged");
  Ok(record)
}

/// Delete a workout on the backend, then from the cache
pub async fn delete_remote_workout(state: &AppState, id: i64) -> Result<(), ApiError> {
  state.api.delete_workout(id).await?;

  delete_workout(&state.db, id)
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
