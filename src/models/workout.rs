use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved workout. Calories come from the backend's prediction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutRecord {
  pub id: i64,
  pub created_at: DateTime<Utc>,
  pub calories: f64,
  pub duration_minutes: f64,
  pub heart_rate: i64,
  pub gender: Option<i64>,
  pub age: Option<i64>,
  pub height: Option<f64>,
  pub weight: Option<f64>,
  pub body_temp: Option<f64>,
}

/// For inserting new workouts (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkout {
  pub created_at: DateTime<Utc>,
  pub calories: f64,
  pub duration_minutes: f64,
  pub heart_rate: i64,
  pub gender: Option<i64>,
  pub age: Option<i64>,
  pub height: Option<f64>,
  pub weight: Option<f64>,
  pub body_temp: Option<f64>,
}

impl NewWorkout {
  /// Workout with only the fields the goal evaluator reads
  pub fn basic(created_at: DateTime<Utc>, calories: f64, duration_minutes: f64, heart_rate: i64) -> Self {
    Self {
      created_at,
      calories,
      duration_minutes,
      heart_rate,
      gender: None,
      age: None,
      height: None,
      weight: None,
      body_temp: None,
    }
  }
}
