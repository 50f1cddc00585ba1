//! Local cache of workout records
//!
//! The backend is the source of truth; `replace_workouts` mirrors its list
//! into SQLite so goals can be evaluated offline.

use sqlx::SqlitePool;

use crate::models::{NewWorkout, WorkoutRecord};

const SELECT_WORKOUTS: &str = r#"
  SELECT id, created_at, calories, duration_minutes, heart_rate,
         gender, age, height, weight, body_temp
  FROM workouts
"#;

/// All cached workouts, newest first
pub async fn load_workouts(pool: &SqlitePool) -> Result<Vec<WorkoutRecord>, sqlx::Error> {
  let sql = format!("{} ORDER BY created_at DESC, id DESC", SELECT_WORKOUTS);
  sqlx::query_as::<_, WorkoutRecord>(&sql)
    .fetch_all(pool)
    .await
}

pub async fn load_workout(pool: &SqlitePool, id: i64) -> Result<Option<WorkoutRecord>, sqlx::Error> {
  let sql = format!("{} WHERE id = ?", SELECT_WORKOUTS);
  sqlx::query_as::<_, WorkoutRecord>(&sql)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a workout, returning the stored record
pub async fn insert_workout(pool: &SqlitePool, workout: &NewWorkout) -> Result<WorkoutRecord, sqlx::Error> {
  let result = sqlx::query(
    r#"
    INSERT INTO workouts (
      created_at, calories, duration_minutes, heart_rate,
      gender, age, height, weight, body_temp
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
  )
  .bind(workout.created_at)
  .bind(workout.calories)
  .bind(workout.duration_minutes)
  .bind(workout.heart_rate)
  .bind(workout.gender)
  .bind(workout.age)
  .bind(workout.height)
  .bind(workout.weight)
  .bind(workout.body_temp)
  .execute(pool)
  .await?;

  Ok(WorkoutRecord {
    id: result.last_insert_rowid(),
    created_at: workout.created_at,
    calories: workout.calories,
    duration_minutes: workout.duration_minutes,
    heart_rate: workout.heart_rate,
    gender: workout.gender,
    age: workout.age,
    height: workout.height,
    weight: workout.weight,
    body_temp: workout.body_temp,
  })
}

/// Delete a workout. Returns false if no row matched.
pub async fn delete_workout(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
  let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
    .bind(id)
    .execute(pool)
    .await?;

  Ok(result.rows_affected() > 0)
}

/// Insert or overwrite a workout under its own id
pub async fn upsert_workout(pool: &SqlitePool, r: &WorkoutRecord) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
    INSERT OR REPLACE INTO workouts (
      id, created_at, calories, duration_minutes, heart_rate,
      gender, age, height, weight, body_temp
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
  )
  .bind(r.id)
  .bind(r.created_at)
  .bind(r.calories)
  .bind(r.duration_minutes)
  .bind(r.heart_rate)
  .bind(r.gender)
  .bind(r.age)
  .bind(r.height)
  .bind(r.weight)
  .bind(r.body_temp)
  .execute(pool)
  .await?;

  Ok(())
}

/// Replace the whole cache with `records`, keeping their ids
pub async fn replace_workouts(pool: &SqlitePool, records: &[WorkoutRecord]) -> Result<(), sqlx::Error> {
  let mut tx = pool.begin().await?;

  sqlx::query("DELETE FROM workouts").execute(&mut *tx).await?;

  for r in records {
    sqlx::query(
      r#"
      INSERT INTO workouts (
        id, created_at, calories, duration_minutes, heart_rate,
        gender, age, height, weight, body_temp
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
      "#,
    )
    .bind(r.id)
    .bind(r.created_at)
    .bind(r.calories)
    .bind(r.duration_minutes)
    .bind(r.heart_rate)
    .bind(r.gender)
    .bind(r.age)
    .bind(r.height)
    .bind(r.weight)
    .bind(r.body_temp)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_workout, setup_test_db, teardown_test_db, utc};

  #[tokio::test]
  async fn test_insert_and_load_newest_first() {
    let pool = setup_test_db().await;

    let older = insert_workout(&pool, &NewWorkout::basic(utc(2024, 6, 1, 8, 0), 300.0, 30.0, 130))
      .await
      .expect("Should insert");
    let newer = insert_workout(&pool, &NewWorkout::basic(utc(2024, 6, 3, 8, 0), 410.5, 42.0, 145))
      .await
      .expect("Should insert");

    let workouts = load_workouts(&pool).await.expect("Should load");
    assert_eq!(workouts, vec![newer.clone(), older]);

    let single = load_workout(&pool, newer.id).await.unwrap();
    assert_eq!(single, Some(newer));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_delete_workout() {
    let pool = setup_test_db().await;
    let ids = crate::test_utils::seed_test_workouts(&pool, 3).await;

    assert!(delete_workout(&pool, ids[1]).await.unwrap());
    assert!(!delete_workout(&pool, ids[1]).await.unwrap());
    assert_eq!(load_workouts(&pool).await.unwrap().len(), 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_replace_workouts_mirrors_list() {
    let pool = setup_test_db().await;
    crate::test_utils::seed_test_workouts(&pool, 4).await;

    let remote = vec![
      mock_workout(101, utc(2024, 6, 2, 8, 0), 250.0, 25.0),
      mock_workout(205, utc(2024, 6, 4, 8, 0), 500.0, 50.0),
    ];
    replace_workouts(&pool, &remote).await.expect("Should replace");

    let cached = load_workouts(&pool).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].id, 205);
    assert_eq!(cached[1].id, 101);

    replace_workouts(&pool, &[]).await.unwrap();
    assert!(load_workouts(&pool).await.unwrap().is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_upsert_workout_keeps_id_and_overwrites() {
    let pool = setup_test_db().await;

    let mut record = mock_workout(42, utc(2024, 6, 5, 8, 0), 300.0, 30.0);
    upsert_workout(&pool, &record).await.expect("Should insert");

    record.calories = 310.0;
    upsert_workout(&pool, &record).await.expect("Should overwrite");

    let cached = load_workouts(&pool).await.unwrap();
    assert_eq!(cached, vec![record]);

    teardown_test_db(pool).await;
  }
}
