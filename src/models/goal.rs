use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a goal measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
  /// Calories burned in the period
  Calories,
  /// Number of workouts in the period
  Workouts,
  /// Minutes trained in the period
  Duration,
  /// Consecutive days with a workout, ending today
  Streak,
  /// Stored value this version doesn't recognise; never makes progress
  #[serde(other)]
  Unknown,
}

impl std::fmt::Display for GoalType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Calories => write!(f, "calories"),
      Self::Workouts => write!(f, "workouts"),
      Self::Duration => write!(f, "duration"),
      Self::Streak => write!(f, "streak"),
      Self::Unknown => write!(f, "unknown"),
    }
  }
}

impl std::str::FromStr for GoalType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "calories" => Ok(Self::Calories),
      "workouts" => Ok(Self::Workouts),
      "duration" => Ok(Self::Duration),
      "streak" => Ok(Self::Streak),
      _ => Err(format!("Unknown goal type: {}", s)),
    }
  }
}

/// Recurring period a goal is measured over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
  Daily,
  Weekly,
  Monthly,
  Yearly,
  #[serde(other)]
  Unknown,
}

impl std::fmt::Display for GoalPeriod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Daily => write!(f, "daily"),
      Self::Weekly => write!(f, "weekly"),
      Self::Monthly => write!(f, "monthly"),
      Self::Yearly => write!(f, "yearly"),
      Self::Unknown => write!(f, "unknown"),
    }
  }
}

impl std::str::FromStr for GoalPeriod {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "daily" => Ok(Self::Daily),
      "weekly" => Ok(Self::Weekly),
      "monthly" => Ok(Self::Monthly),
      "yearly" => Ok(Self::Yearly),
      _ => Err(format!("Unknown goal period: {}", s)),
    }
  }
}

/// Stored flag set by the user. Independent of computed progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
  #[default]
  Active,
  Completed,
}

impl std::fmt::Display for GoalStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Active => write!(f, "active"),
      Self::Completed => write!(f, "completed"),
    }
  }
}

impl std::str::FromStr for GoalStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "completed" => Ok(Self::Completed),
      _ => Err(format!("Unknown goal status: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
  pub id: i64,
  #[serde(rename = "type")]
  pub goal_type: GoalType,
  pub target: f64,
  pub period: GoalPeriod,
  pub created_at: DateTime<Utc>,
  pub status: GoalStatus,
}

/// For inserting new goals (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
  #[serde(rename = "type")]
  pub goal_type: GoalType,
  pub target: f64,
  pub period: GoalPeriod,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}
