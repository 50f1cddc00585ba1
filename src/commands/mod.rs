pub mod goals;
pub mod sync;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::db::AppState;
use crate::goals::{evaluate_all, load_all_goals, EvaluatedGoal};
use crate::models::{NewWorkout, WorkoutRecord};
use crate::stats::{monthly_workout_counts, weekly_calories, WorkoutStats};
use crate::workouts::{delete_workout, insert_workout, load_workouts};

/// ---------------------------------------------------------------------------
/// Workout Cache
/// ---------------------------------------------------------------------------

pub async fn get_workouts(state: &AppState) -> Result<Vec<WorkoutRecord>, String> {
  load_workouts(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))
}

/// Record a workout in the local cache
pub async fn add_workout(state: &AppState, workout: NewWorkout) -> Result<WorkoutRecord, String> {
  let numbers = [
    ("calories", workout.calories),
    ("duration", workout.duration_minutes),
    ("heart rate", workout.heart_rate as f64),
  ];
  for (name, value) in numbers {
    if !value.is_finite() || value < 0.0 {
      return Err(format!("Invalid {}: {}", name, value));
    }
  }

  insert_workout(&state.db, &workout)
    .await
    .map_err(|e| format!("Failed to save workout: {}", e))
}

pub async fn remove_workout(state: &AppState, id: i64) -> Result<(), String> {
  let deleted = delete_workout(&state.db, id)
    .await
    .map_err(|e| format!("Failed to delete workout: {}", e))?;

  if !deleted {
    return Err(format!("Workout not found: {}", id));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Stats & Dashboard
/// ---------------------------------------------------------------------------

pub async fn get_workout_stats(state: &AppState) -> Result<WorkoutStats, String> {
  let records = get_workouts(state).await?;
  Ok(WorkoutStats::compute(&records))
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
  pub generated_at: DateTime<Utc>,
  pub stats: WorkoutStats,
  /// Jan..Dec of the current year
  pub monthly_workouts: [u32; 12],
  /// Mon..Sun of the current week
  pub weekly_calories: [f64; 7],
  pub goals: Vec<EvaluatedGoal>,
}

impl DashboardReport {
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }
}

/// Everything the overview page shows, computed from the cache at `now`
pub async fn build_dashboard_report<Tz: TimeZone>(
  state: &AppState,
  now: &DateTime<Tz>,
) -> Result<DashboardReport, String> {
  let records = get_workouts(state).await?;
  let goals = load_all_goals(&state.db)
    .await
    .map_err(|e| format!("Failed to fetch goals: {}", e))?;

  Ok(DashboardReport {
    generated_at: now.with_timezone(&Utc),
    stats: WorkoutStats::compute(&records),
    monthly_workouts: monthly_workout_counts(&records, now),
    weekly_calories: weekly_calories(&records, now),
    goals: evaluate_all(&goals, &records, now),
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
