//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use crate::api::PredictionInput;
use crate::models::{Goal, GoalPeriod, GoalStatus, GoalType, WorkoutRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the database with one workout per day, today first
/// Returns the IDs of created workouts
pub async fn seed_test_workouts(pool: &SqlitePool, count: usize) -> Vec<i64> {
  let mut workout_ids = Vec::new();

  for i in 0..count {
    let created_at = datetime_days_ago(i as i64);
    let duration = 30.0 + (i % 4) as f64 * 5.0;
    let calories = 250.0 + (i as f64) * 10.0;

    let result = sqlx::query(
      r#"
      INSERT INTO workouts (created_at, calories, duration_minutes, heart_rate)
      VALUES (?1, ?2, ?3, ?4)
      "#,
    )
    .bind(created_at)
    .bind(calories)
    .bind(duration)
    .bind(130 + (i % 20) as i64)
    .execute(pool)
    .await
    .expect("Failed to insert test workout");

    workout_ids.push(result.last_insert_rowid());
  }

  workout_ids
}

/// Seed one active goal of each known type
/// Returns the IDs of created goals
pub async fn seed_test_goals(pool: &SqlitePool) -> Vec<i64> {
  let goals = [
    ("calories", 2000.0, "weekly"),
    ("workouts", 3.0, "weekly"),
    ("duration", 600.0, "monthly"),
    ("streak", 5.0, "daily"),
  ];

  let mut goal_ids = Vec::new();
  for (goal_type, target, period) in goals {
    let result = sqlx::query(
      r#"
      INSERT INTO goals (goal_type, target, period, status, created_at)
      VALUES (?1, ?2, ?3, 'active', ?4)
      "#,
    )
    .bind(goal_type)
    .bind(target)
    .bind(period)
    .bind(datetime_days_ago(1).to_rfc3339())
    .execute(pool)
    .await
    .expect("Failed to insert test goal");

    goal_ids.push(result.last_insert_rowid());
  }

  goal_ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create a workout record with the given timing and totals
pub fn mock_workout(id: i64, created_at: DateTime<Utc>, calories: f64, duration_minutes: f64) -> WorkoutRecord {
  WorkoutRecord {
    id,
    created_at,
    calories,
    duration_minutes,
    heart_rate: 140,
    gender: None,
    age: None,
    height: None,
    weight: None,
    body_temp: None,
  }
}

/// Create an active goal with id 1
pub fn mock_goal(goal_type: GoalType, target: f64, period: GoalPeriod, created_at: DateTime<Utc>) -> Goal {
  Goal {
    id: 1,
    goal_type,
    target,
    period,
    created_at,
    status: GoalStatus::Active,
  }
}

/// Create a realistic set of model inputs
pub fn mock_prediction_input() -> PredictionInput {
  PredictionInput {
    gender: 1,
    age: 30,
    height: 170.0,
    weight: 65.0,
    duration_minutes: 45.0,
    heart_rate: 140,
    body_temp: 40.2,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Build a UTC instant from calendar fields
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(year, month, day, hour, minute, 0)
    .single()
    .expect("Invalid test datetime")
}

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('workouts', 'goals')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected both tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_helpers_return_correct_counts() {
    let pool = setup_test_db().await;

    let workout_ids = seed_test_workouts(&pool, 5).await;
    assert_eq!(workout_ids.len(), 5);

    let goal_ids = seed_test_goals(&pool).await;
    assert_eq!(goal_ids.len(), 4);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");
    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_time_helpers() {
    assert_eq!(utc(2024, 6, 5, 8, 30).to_rfc3339(), "2024-06-05T08:30:00+00:00");

    let diff = Utc::now() - datetime_days_ago(7);
    // Allow for slight timing differences
    assert!(
      diff.num_days() >= 6 && diff.num_days() <= 8,
      "Expected ~7 days difference, got {}",
      diff.num_days()
    );
  }
}
