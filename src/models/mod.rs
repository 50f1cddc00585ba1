pub mod goal;
pub mod workout;

pub use goal::{Goal, GoalPeriod, GoalStatus, GoalType, NewGoal};
pub use workout::{NewWorkout, WorkoutRecord};
