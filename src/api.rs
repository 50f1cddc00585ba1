use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::AppConfig;
use crate::models::WorkoutRecord;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("No API token configured")]
  MissingToken,

  /// The backend rejected the token; the session is over
  #[error("Session expired or token invalid")]
  Unauthorized,

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Server returned {status}: {message}")]
  Server { status: u16, message: String },

  #[error("Prediction failed: {0}")]
  Prediction(String),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Invalid URL: {0}")]
  Url(#[from] url::ParseError),

  #[error("Failed to parse response: {0}")]
  Parse(String),

  #[error("Database error: {0}")]
  Database(String),
}

impl Serialize for ApiError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Wire Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Debug, Deserialize)]
struct WorkoutsResponse {
  #[serde(default)]
  workouts: Vec<ApiWorkout>,
}

/// Workout row as the backend returns it. Numeric columns may arrive as
/// floats because the entry form parses everything with `parseFloat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiWorkout {
  pub id: i64,
  pub created_at: String,
  pub calories: f64,
  #[serde(default)]
  pub duration: f64,
  #[serde(default)]
  pub heart_rate: f64,
  pub gender: Option<f64>,
  pub age: Option<f64>,
  pub height: Option<f64>,
  pub weight: Option<f64>,
  pub body_temp: Option<f64>,
}

impl ApiWorkout {
  /// Convert to a record, or None if the timestamp can't be parsed
  pub fn into_record(self) -> Option<WorkoutRecord> {
    let created_at = parse_timestamp(&self.created_at)?;
    Some(WorkoutRecord {
      id: self.id,
      created_at,
      calories: self.calories.max(0.0),
      duration_minutes: self.duration.max(0.0),
      heart_rate: self.heart_rate.max(0.0).round() as i64,
      gender: self.gender.map(|g| g.round() as i64),
      age: self.age.map(|a| a.round() as i64),
      height: self.height,
      weight: self.weight,
      body_temp: self.body_temp,
    })
  }
}

/// Parse the backend's timestamps: SQLite `CURRENT_TIMESTAMP` text (UTC,
/// no zone) or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Inputs to the backend's calorie model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
  /// 0 = male, 1 = female, as the model was trained
  pub gender: i64,
  pub age: i64,
  pub height: f64,
  pub weight: f64,
  pub duration_minutes: f64,
  pub heart_rate: i64,
  pub body_temp: f64,
}

impl PredictionInput {
  /// Feature vector in the order the model expects
  pub fn features(&self) -> [f64; 7] {
    [
      self.gender as f64,
      self.age as f64,
      self.height,
      self.weight,
      self.duration_minutes,
      self.heart_rate as f64,
      self.body_temp,
    ]
  }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
  calories: Option<f64>,
  error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
  id: i64,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
  status: String,
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

pub struct ApiClient {
  client: Client,
  base_url: Url,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(mut base_url: Url, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
    // Url::join drops the last path segment unless it ends with '/'
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url,
      token,
    })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
    Self::new(config.api_url.clone(), config.api_token.clone(), config.http_timeout)
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    Ok(self.base_url.join(path)?)
  }

  fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
    let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
    Ok(request.bearer_auth(token))
  }

  /// Map non-success statuses to errors, passing successful responses through
  async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
      return Err(ApiError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
      .map(|e| e.error)
      .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
      Err(ApiError::NotFound(message))
    } else {
      Err(ApiError::Server {
        status: status.as_u16(),
        message,
      })
    }
  }

  /// True when the backend reports itself healthy
  pub async fn health(&self) -> Result<bool, ApiError> {
    let response = self.client.get(self.endpoint("health")?).send().await?;
    let response = Self::check(response).await?;
    let body: HealthResponse = response
      .json()
      .await
      .map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(body.status == "healthy")
  }

  /// Fetch the user's workouts. Rows with unreadable timestamps are skipped.
  pub async fn fetch_workouts(&self) -> Result<Vec<WorkoutRecord>, ApiError> {
    let request = self.authorized(self.client.get(self.endpoint("workouts")?))?;
    let response = Self::check(request.send().await?).await?;

    let text = response.text().await?;
    let body: WorkoutsResponse = serde_json::from_str(&text).map_err(|e| {
      warn!(error = %e, "Failed to parse workouts response");
      ApiError::Parse(format!("Failed to parse workouts: {}", e))
    })?;

    let total = body.workouts.len();
    let records: Vec<WorkoutRecord> = body
      .workouts
      .into_iter()
      .filter_map(|w| {
        let id = w.id;
        let raw = w.created_at.clone();
        let record = w.into_record();
        if record.is_none() {
          warn!(workout_id = id, created_at = %raw, "Skipping workout with unparseable timestamp");
        }
        record
      })
      .collect();

    debug!(total, kept = records.len(), "Fetched workouts");
    Ok(records)
  }

  /// Save a predicted workout. Returns the backend id.
  pub async fn save_workout(&self, input: &PredictionInput, calories: f64) -> Result<i64, ApiError> {
    let body = json!({
      "calories": calories,
      "gender": input.gender,
      "age": input.age,
      "height": input.height,
      "weight": input.weight,
      "duration": input.duration_minutes,
      "heart_rate": input.heart_rate,
      "body_temp": input.body_temp,
    });

    let request = self.authorized(self.client.post(self.endpoint("workouts")?).json(&body))?;
    let response = Self::check(request.send().await?).await?;
    let saved: SaveResponse = response
      .json()
      .await
      .map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(saved.id)
  }

  pub async fn delete_workout(&self, id: i64) -> Result<(), ApiError> {
    let url = self.endpoint(&format!("workouts/{}", id))?;
    let request = self.authorized(self.client.delete(url))?;
    Self::check(request.send().await?).await?;
    Ok(())
  }

  /// Ask the backend's model for the calories burned by a workout
  pub async fn predict_calories(&self, input: &PredictionInput) -> Result<f64, ApiError> {
    let body = json!({ "features": input.features() });
    let request = self.authorized(self.client.post(self.endpoint("predict")?).json(&body))?;
    let response = request.send().await?;

    if response.status() == StatusCode::UNAUTHORIZED {
      return Err(ApiError::Unauthorized);
    }

    // The model's failures come back as 400 with an `error` field
    let text = response.text().await?;
    let parsed: PredictResponse = serde_json::from_str(&text)
      .map_err(|e| ApiError::Parse(format!("Failed to parse prediction: {}", e)))?;

    match (parsed.calories, parsed.error) {
      (_, Some(error)) => Err(ApiError::Prediction(error)),
      (Some(calories), None) => Ok(calories),
      (None, None) => Err(ApiError::Parse("Prediction response had no calories".into())),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
