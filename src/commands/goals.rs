//! Commands for goal management and progress

use chrono::{DateTime, TimeZone};

use crate::db::AppState;
use crate::goals::{
    delete_goal, evaluate_all, insert_goal, load_all_goals, update_goal_status, EvaluatedGoal,
    GoalError,
};
use crate::models::{Goal, GoalStatus, NewGoal};
use crate::workouts::load_workouts;

/// Get all goals, oldest first
pub async fn get_goals(state: &AppState) -> Result<Vec<Goal>, String> {
    load_all_goals(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch goals: {}", e))
}

/// Create a goal. Rejects non-positive targets.
pub async fn create_goal(state: &AppState, goal: NewGoal) -> Result<Goal, GoalError> {
    insert_goal(&state.db, &goal).await
}

pub async fn remove_goal(state: &AppState, id: i64) -> Result<(), String> {
    delete_goal(&state.db, id).await.map_err(|e| e.to_string())
}

/// Set the stored status flag. Displayed progress is unaffected.
pub async fn mark_goal_completed(state: &AppState, id: i64) -> Result<(), String> {
    update_goal_status(&state.db, id, GoalStatus::Completed)
        .await
        .map_err(|e| e.to_string())
}

/// Evaluate every goal against the cached workouts at `now`
pub async fn get_goal_progress<Tz: TimeZone>(
    state: &AppState,
    now: &DateTime<Tz>,
) -> Result<Vec<EvaluatedGoal>, String> {
    let goals = get_goals(state).await?;
    let records = load_workouts(&state.db)
        .await
        .map_err(|e| format!("Failed to fetch workouts: {}", e))?;

    Ok(evaluate_all(&goals, &records, now))
}
