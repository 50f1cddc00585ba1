//! Goal Progress Evaluation
//!
//! Every goal is measured against the current period window:
//! - daily, weekly (ISO, Monday first), monthly, yearly
//! - an unrecognised period is measured from the goal's own creation time
//!
//! Progress is recomputed from scratch on every call. Nothing here writes the
//! stored goal status; the displayed status is derived, never persisted.
//!
//! Calendar math happens in the zone of the `now` argument. Callers pass
//! `Local::now()` in production and a fixed zone in tests.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::models::{Goal, GoalPeriod, GoalStatus, GoalType, NewGoal, WorkoutRecord};

/// ---------------------------------------------------------------------------
/// Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("Goal target must be a positive number, got {0}")]
    InvalidTarget(f64),

    #[error("Goal not found: {0}")]
    NotFound(i64),

    #[error("Goal {id} has an unreadable created_at: {reason}")]
    InvalidRecord { id: i64, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Serialize for GoalError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// ---------------------------------------------------------------------------
/// Displayed Status
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    Completed,
    Overdue,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Overdue => write!(f, "Overdue"),
            Self::InProgress => write!(f, "In Progress"),
        }
    }
}

/// Result of evaluating one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Amount achieved in the current window, in the goal's unit
    pub progress: f64,
    /// Share of the target reached, 0 to 100
    pub percent: f64,
    pub status: ProgressStatus,
}

/// A goal paired with its freshly computed progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedGoal {
    pub goal: Goal,
    pub progress: GoalProgress,
}

/// ---------------------------------------------------------------------------
/// Time-Window Resolver
/// ---------------------------------------------------------------------------

/// First instant of `date` in `tz`. Midnight can be skipped by a DST
/// transition, in which case the first hour that exists is used.
pub(crate) fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    (0..24).find_map(|hour| {
        date.and_hms_opt(hour, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
    })
}

/// Start of the period containing `now`.
///
/// Returns `None` for [`GoalPeriod::Unknown`]; the caller decides the
/// fallback (see [`Goal::window_start`]).
pub fn resolve_window_start<Tz: TimeZone>(
    period: GoalPeriod,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let today = now.date_naive();
    let first_day = match period {
        GoalPeriod::Daily => today,
        // Sunday is day 7 of the week that started the Monday before
        GoalPeriod::Weekly => {
            today - Days::new(u64::from(today.weekday().num_days_from_monday()))
        }
        GoalPeriod::Monthly => today.with_day(1)?,
        GoalPeriod::Yearly => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        GoalPeriod::Unknown => return None,
    };

    let start = start_of_day(first_day, &now.timezone()).unwrap_or_else(|| now.clone());
    Some(start.min(now.clone()))
}

impl Goal {
    /// Window start for this goal, falling back to `created_at` when the
    /// period is not recognised
    pub fn window_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        resolve_window_start(self.period, now)
            .unwrap_or_else(|| self.created_at.with_timezone(&now.timezone()))
    }
}

/// ---------------------------------------------------------------------------
/// Streak Calculator
/// ---------------------------------------------------------------------------

/// Consecutive calendar days with at least one workout, ending today.
///
/// Today must have a workout for the streak to count at all: a run of days
/// ending yesterday yields 0.
pub fn compute_streak<Tz: TimeZone>(records: &[WorkoutRecord], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let workout_days: HashSet<NaiveDate> = records
        .iter()
        .map(|r| r.created_at.with_timezone(&tz).date_naive())
        .collect();

    let mut streak = 0;
    let mut day = now.date_naive();
    while workout_days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}

/// ---------------------------------------------------------------------------
/// Progress Evaluator
/// ---------------------------------------------------------------------------

/// Amount achieved toward `goal` in its current window
pub fn compute_progress<Tz: TimeZone>(
    goal: &Goal,
    records: &[WorkoutRecord],
    now: &DateTime<Tz>,
) -> f64 {
    let start = goal.window_start(now).with_timezone(&Utc);
    let in_window = records.iter().filter(|r| r.created_at >= start);

    match goal.goal_type {
        GoalType::Calories => in_window.map(|r| r.calories).sum::<f64>().round(),
        GoalType::Workouts => in_window.count() as f64,
        GoalType::Duration => in_window.map(|r| r.duration_minutes).sum(),
        // A streak crosses period boundaries, so it sees every record
        GoalType::Streak => f64::from(compute_streak(records, now)),
        GoalType::Unknown => 0.0,
    }
}

/// Whether the goal's period has elapsed since it was created
pub fn is_overdue<Tz: TimeZone>(goal: &Goal, now: &DateTime<Tz>) -> bool {
    let created = goal.created_at.with_timezone(&now.timezone());

    match goal.period {
        GoalPeriod::Daily => created.date_naive() != now.date_naive() && *now > created,
        GoalPeriod::Weekly => (now.with_timezone(&Utc) - goal.created_at).num_weeks() >= 1,
        GoalPeriod::Monthly => created.year() != now.year() || created.month() != now.month(),
        GoalPeriod::Yearly => created.year() != now.year(),
        GoalPeriod::Unknown => false,
    }
}

fn percent_of(progress: f64, target: f64) -> f64 {
    if target > 0.0 {
        (progress / target * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    }
}

/// Evaluate one goal against the workout history.
///
/// Reaching the target wins over being overdue.
pub fn evaluate<Tz: TimeZone>(
    goal: &Goal,
    records: &[WorkoutRecord],
    now: &DateTime<Tz>,
) -> GoalProgress {
    let progress = compute_progress(goal, records, now);
    let percent = percent_of(progress, goal.target);

    let status = if progress >= goal.target {
        ProgressStatus::Completed
    } else if is_overdue(goal, now) {
        ProgressStatus::Overdue
    } else {
        ProgressStatus::InProgress
    };

    GoalProgress {
        progress,
        percent,
        status,
    }
}

/// Evaluate every goal against the same history and instant
pub fn evaluate_all<Tz: TimeZone>(
    goals: &[Goal],
    records: &[WorkoutRecord],
    now: &DateTime<Tz>,
) -> Vec<EvaluatedGoal> {
    let evaluated: Vec<EvaluatedGoal> = goals
        .iter()
        .map(|goal| EvaluatedGoal {
            goal: goal.clone(),
            progress: evaluate(goal, records, now),
        })
        .collect();

    let completed = evaluated
        .iter()
        .filter(|e| e.progress.status == ProgressStatus::Completed)
        .count();
    debug!(
        goals = evaluated.len(),
        completed,
        records = records.len(),
        "Evaluated goals"
    );

    evaluated
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

fn validate_target(target: f64) -> Result<(), GoalError> {
    if target.is_finite() && target > 0.0 {
        Ok(())
    } else {
        Err(GoalError::InvalidTarget(target))
    }
}

fn goal_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Goal, GoalError> {
    let id: i64 = row.get("id");
    let goal_type: String = row.get("goal_type");
    let period: String = row.get("period");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    // Windows and overdue checks hang off created_at, so there is no safe default
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GoalError::InvalidRecord {
            id,
            reason: e.to_string(),
        })?;

    Ok(Goal {
        id,
        goal_type: goal_type.parse().unwrap_or(GoalType::Unknown),
        target: row.get("target"),
        period: period.parse().unwrap_or(GoalPeriod::Unknown),
        status: status.parse().unwrap_or_default(),
        created_at,
    })
}

/// Load all goals, oldest first. Rows with an unreadable `created_at` are
/// skipped.
pub async fn load_all_goals(pool: &SqlitePool) -> Result<Vec<Goal>, GoalError> {
    let rows = sqlx::query(
        r#"
        SELECT id, goal_type, target, period, status, created_at
        FROM goals
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let goals = rows
        .iter()
        .filter_map(|row| match goal_from_row(row) {
            Ok(goal) => Some(goal),
            Err(e) => {
                warn!(error = %e, "Skipping goal");
                None
            }
        })
        .collect();

    Ok(goals)
}

/// Load a single goal by id
pub async fn load_goal(pool: &SqlitePool, id: i64) -> Result<Goal, GoalError> {
    let row = sqlx::query(
        r#"
        SELECT id, goal_type, target, period, status, created_at
        FROM goals
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => goal_from_row(&row),
        None => Err(GoalError::NotFound(id)),
    }
}

/// Persist a new goal. Targets must be positive.
pub async fn insert_goal(pool: &SqlitePool, new_goal: &NewGoal) -> Result<Goal, GoalError> {
    validate_target(new_goal.target)?;

    let created_at = new_goal.created_at.unwrap_or_else(Utc::now);
    let status = GoalStatus::Active;

    let result = sqlx::query(
        r#"
        INSERT INTO goals (goal_type, target, period, status, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_goal.goal_type.to_string())
    .bind(new_goal.target)
    .bind(new_goal.period.to_string())
    .bind(status.to_string())
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Goal {
        id: result.last_insert_rowid(),
        goal_type: new_goal.goal_type,
        target: new_goal.target,
        period: new_goal.period,
        created_at,
        status,
    })
}

/// Change the stored status flag
pub async fn update_goal_status(
    pool: &SqlitePool,
    id: i64,
    status: GoalStatus,
) -> Result<(), GoalError> {
    let result = sqlx::query("UPDATE goals SET status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(GoalError::NotFound(id));
    }
    Ok(())
}

/// Delete a goal
pub async fn delete_goal(pool: &SqlitePool, id: i64) -> Result<(), GoalError> {
    let result = sqlx::query("DELETE FROM goals WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(GoalError::NotFound(id));
    }
    Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
