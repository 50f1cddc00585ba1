//! Workout aggregates for the overview and analytics views
//!
//! Totals mirror the backend's `/stats` query; the chart series bucket
//! workouts by calendar month and by weekday in the caller's time zone.

use chrono::{DateTime, Datelike, Days, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::goals::{resolve_window_start, start_of_day};
use crate::models::{GoalPeriod, WorkoutRecord};

/// ---------------------------------------------------------------------------
/// Totals
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkoutStats {
  pub total_workouts: usize,
  pub total_calories: f64,
  /// 0 when there are no workouts
  pub avg_calories: f64,
  pub total_duration_minutes: f64,
  pub avg_heart_rate: Option<f64>,
}

impl WorkoutStats {
  pub fn compute(records: &[WorkoutRecord]) -> Self {
    if records.is_empty() {
      return Self::default();
    }

    let total_workouts = records.len();
    let total_calories: f64 = records.iter().map(|r| r.calories).sum();
    let total_duration_minutes: f64 = records.iter().map(|r| r.duration_minutes).sum();
    let hr_sum: i64 = records.iter().map(|r| r.heart_rate).sum();

    Self {
      total_workouts,
      total_calories,
      avg_calories: total_calories / total_workouts as f64,
      total_duration_minutes,
      avg_heart_rate: Some(hr_sum as f64 / total_workouts as f64),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Chart Series
/// ---------------------------------------------------------------------------

/// Workouts per month (Jan..Dec) of `now`'s year
pub fn monthly_workout_counts<Tz: TimeZone>(records: &[WorkoutRecord], now: &DateTime<Tz>) -> [u32; 12] {
  let tz = now.timezone();
  let year = now.year();
  let mut counts = [0u32; 12];

  for r in records {
    let local = r.created_at.with_timezone(&tz);
    if local.year() == year {
      counts[local.month0() as usize] += 1;
    }
  }

  counts
}

/// Calories burned per weekday (Mon..Sun) of the current week
pub fn weekly_calories<Tz: TimeZone>(records: &[WorkoutRecord], now: &DateTime<Tz>) -> [f64; 7] {
  let mut calories = [0.0; 7];
  let Some(week_start) = resolve_window_start(GoalPeriod::Weekly, now) else {
    return calories;
  };

  let tz = now.timezone();
  let week_start_utc = week_start.with_timezone(&Utc);
  // A local week is not always 168 hours long, so end at next Monday's start
  let next_monday = week_start.date_naive() + Days::new(7);
  let week_end_utc = start_of_day(next_monday, &tz)
    .map(|end| end.with_timezone(&Utc))
    .unwrap_or_else(|| week_start_utc + chrono::Duration::days(7));

  for r in records {
    if r.created_at < week_start_utc || r.created_at >= week_end_utc {
      continue;
    }
    let weekday = r.created_at.with_timezone(&tz).weekday();
    calories[weekday.num_days_from_monday() as usize] += r.calories;
  }

  calories
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{mock_workout, utc};

  #[test]
  fn test_stats_empty() {
    let stats = WorkoutStats::compute(&[]);
    assert_eq!(stats.total_workouts, 0);
    assert_eq!(stats.avg_calories, 0.0);
    assert_eq!(stats.avg_heart_rate, None);
  }

  #[test]
  fn test_stats_totals_and_averages() {
    let mut a = mock_workout(1, utc(2024, 6, 1, 8, 0), 300.0, 30.0);
    a.heart_rate = 120;
    let mut b = mock_workout(2, utc(2024, 6, 2, 8, 0), 450.0, 45.5);
    b.heart_rate = 150;

    let stats = WorkoutStats::compute(&[a, b]);
    assert_eq!(stats.total_workouts, 2);
    assert_approx_eq!(stats.total_calories, 750.0, 1e-9);
    assert_approx_eq!(stats.avg_calories, 375.0, 1e-9);
    assert_approx_eq!(stats.total_duration_minutes, 75.5, 1e-9);
    assert_eq!(stats.avg_heart_rate, Some(135.0));
  }

  #[test]
  fn test_monthly_counts_only_current_year() {
    let now = utc(2024, 6, 15, 12, 0);
    let records = vec![
      mock_workout(1, utc(2024, 1, 3, 8, 0), 200.0, 20.0),
      mock_workout(2, utc(2024, 1, 20, 8, 0), 200.0, 20.0),
      mock_workout(3, utc(2024, 6, 1, 8, 0), 200.0, 20.0),
      mock_workout(4, utc(2023, 6, 1, 8, 0), 200.0, 20.0),
    ];

    let counts = monthly_workout_counts(&records, &now);
    assert_eq!(counts[0], 2);
    assert_eq!(counts[5], 1);
    assert_eq!(counts.iter().sum::<u32>(), 3);
  }

  #[test]
  fn test_weekly_calories_buckets_by_weekday() {
    // Wednesday; week runs Mon 3rd .. Sun 9th
    let now = utc(2024, 6, 5, 12, 0);
    let records = vec![
      mock_workout(1, utc(2024, 6, 3, 8, 0), 320.0, 30.0),
      mock_workout(2, utc(2024, 6, 3, 18, 0), 100.0, 10.0),
      mock_workout(3, utc(2024, 6, 5, 8, 0), 450.0, 40.0),
      // previous Sunday, outside the window
      mock_workout(4, utc(2024, 6, 2, 8, 0), 999.0, 60.0),
    ];

    let week = weekly_calories(&records, &now);
    assert_approx_eq!(week[0], 420.0, 1e-9);
    assert_eq!(week[1], 0.0);
    assert_approx_eq!(week[2], 450.0, 1e-9);
    assert_eq!(week[6], 0.0);
  }

  #[test]
  fn test_weekly_calories_covers_long_dst_week() {
    // New York falls back on Sun 3 Nov 2024, so that week lasts 169 hours
    let tz = chrono_tz::America::New_York;
    let now = utc(2024, 11, 4, 4, 45).with_timezone(&tz);
    let records = vec![
      mock_workout(1, utc(2024, 10, 28, 4, 30), 150.0, 15.0),
      // Sun 23:30 EST, the last local hour of the week
      mock_workout(2, utc(2024, 11, 4, 4, 30), 275.0, 25.0),
      // Mon 00:15 EST, next week
      mock_workout(3, utc(2024, 11, 4, 5, 15), 999.0, 60.0),
    ];

    let week = weekly_calories(&records, &now);
    assert_approx_eq!(week[0], 150.0, 1e-9);
    assert_approx_eq!(week[6], 275.0, 1e-9);
    assert_approx_eq!(week.iter().sum::<f64>(), 425.0, 1e-9);
  }
}
