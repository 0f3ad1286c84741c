//! Workouts - user-authored definitions, the recommendation catalog and
//! the log that ties either one to a user.

use crate::kinds::{Difficulty, ExerciseType};
use crate::record::{NewRecord, Record, UserOwned};
use crate::storage::Table;
use chrono::NaiveDate;
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// A workout a user defined themselves. It has no user id of its own; it
/// is logged immediately through a `WorkoutLog` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWorkout {
    pub id: i64,
    pub exercise_type: ExerciseType,
    pub description: String,
    /// Hours, 0..=3
    pub duration: f64,
    pub difficulty_level: Difficulty,
}

impl Record for UserWorkout {
    const TABLE: Table = Table::UserWorkout;
    const COLUMNS: &'static [&'static str] = &[
        "id", "exercise_type", "description", "duration", "difficulty_level",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(UserWorkout {
            id: row.get(0)?,
            exercise_type: row.get(1)?,
            description: row.get(2)?,
            duration: row.get(3)?,
            difficulty_level: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 4] = [
            &self.exercise_type,
            &self.description,
            &self.duration,
            &self.difficulty_level,
        ];
        values.to_vec()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserWorkout {
    pub exercise_type: ExerciseType,
    pub description: String,
    pub duration: f64,
    pub difficulty_level: Difficulty,
}

impl NewUserWorkout {
    pub fn new(
        exercise_type: ExerciseType,
        description: impl Into<String>,
        duration: f64,
        difficulty_level: Difficulty,
    ) -> Self {
        Self {
            exercise_type,
            description: description.into(),
            duration,
            difficulty_level,
        }
    }
}

impl NewRecord for NewUserWorkout {
    type Output = UserWorkout;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 4] = [
            &self.exercise_type,
            &self.description,
            &self.duration,
            &self.difficulty_level,
        ];
        values.to_vec()
    }
}

/// A catalog workout users can pick from. Names are not unique: the same
/// workout may exist at several durations or difficulty levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecommendation {
    pub id: i64,
    pub workout_name: String,
    pub description: Option<String>,
    pub exercise_type: ExerciseType,
    pub duration: f64,
    pub difficulty_level: Difficulty,
}

impl Record for WorkoutRecommendation {
    const TABLE: Table = Table::WorkoutRecommendation;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workout_name",
        "description",
        "exercise_type",
        "duration",
        "difficulty_level",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WorkoutRecommendation {
            id: row.get(0)?,
            workout_name: row.get(1)?,
            description: row.get(2)?,
            exercise_type: row.get(3)?,
            duration: row.get(4)?,
            difficulty_level: row.get(5)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 5] = [
            &self.workout_name,
            &self.description,
            &self.exercise_type,
            &self.duration,
            &self.difficulty_level,
        ];
        values.to_vec()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutRecommendation {
    pub workout_name: String,
    pub description: Option<String>,
    pub exercise_type: ExerciseType,
    pub duration: f64,
    pub difficulty_level: Difficulty,
}

impl NewWorkoutRecommendation {
    pub fn new(
        workout_name: impl Into<String>,
        exercise_type: ExerciseType,
        duration: f64,
        difficulty_level: Difficulty,
    ) -> Self {
        Self {
            workout_name: workout_name.into(),
            description: None,
            exercise_type,
            duration,
            difficulty_level,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl NewRecord for NewWorkoutRecommendation {
    type Output = WorkoutRecommendation;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 5] = [
            &self.workout_name,
            &self.description,
            &self.exercise_type,
            &self.duration,
            &self.difficulty_level,
        ];
        values.to_vec()
    }
}

/// Which workout a log row points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum WorkoutSource {
    UserWorkout(i64),
    Recommendation(i64),
}

/// Measurements only known once a workout was actually done
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutStats {
    pub calories_burned: Option<i64>,
    pub heart_rate: Option<i64>,
    pub date: NaiveDate,
}

impl WorkoutStats {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            calories_burned: None,
            heart_rate: None,
            date,
        }
    }

    pub fn with_calories(mut self, calories_burned: i64) -> Self {
        self.calories_burned = Some(calories_burned);
        self
    }

    pub fn with_heart_rate(mut self, heart_rate: i64) -> Self {
        self.heart_rate = Some(heart_rate);
        self
    }
}

/// A completed workout. Exactly one of `user_workout_id` and
/// `recommendation_id` is set; the schema rejects rows with both or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: i64,
    pub user_id: i64,
    pub user_workout_id: Option<i64>,
    pub recommendation_id: Option<i64>,
    pub calories_burned: Option<i64>,
    pub heart_rate: Option<i64>,
    pub date: NaiveDate,
}

impl WorkoutLog {
    /// The referenced workout. `None` only for a row that bypassed the
    /// exclusivity check, which the store never yields.
    pub fn source(&self) -> Option<WorkoutSource> {
        match (self.user_workout_id, self.recommendation_id) {
            (Some(id), None) => Some(WorkoutSource::UserWorkout(id)),
            (None, Some(id)) => Some(WorkoutSource::Recommendation(id)),
            _ => None,
        }
    }
}

impl Record for WorkoutLog {
    const TABLE: Table = Table::WorkoutLog;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "user_workout_id",
        "recommendation_id",
        "calories_burned",
        "heart_rate",
        "date",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WorkoutLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            user_workout_id: row.get(2)?,
            recommendation_id: row.get(3)?,
            calories_burned: row.get(4)?,
            heart_rate: row.get(5)?,
            date: row.get(6)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 6] = [
            &self.user_id,
            &self.user_workout_id,
            &self.recommendation_id,
            &self.calories_burned,
            &self.heart_rate,
            &self.date,
        ];
        values.to_vec()
    }
}

impl UserOwned for WorkoutLog {
    const ORDER_BY: &'static str = "date DESC, id DESC";

    fn user_id(&self) -> i64 {
        self.user_id
    }
}

/// A workout log to be stored. Both workout references are plain options
/// so the exclusivity rule is enforced by the schema on write, not by the
/// shape of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutLog {
    pub user_id: i64,
    pub user_workout_id: Option<i64>,
    pub recommendation_id: Option<i64>,
    pub calories_burned: Option<i64>,
    pub heart_rate: Option<i64>,
    pub date: NaiveDate,
}

impl NewWorkoutLog {
    /// Log a workout pointing at `source`
    pub fn new(user_id: i64, source: WorkoutSource, stats: WorkoutStats) -> Self {
        let (user_workout_id, recommendation_id) = match source {
            WorkoutSource::UserWorkout(id) => (Some(id), None),
            WorkoutSource::Recommendation(id) => (None, Some(id)),
        };
        Self {
            user_id,
            user_workout_id,
            recommendation_id,
            calories_burned: stats.calories_burned,
            heart_rate: stats.heart_rate,
            date: stats.date,
        }
    }
}

impl NewRecord for NewWorkoutLog {
    type Output = WorkoutLog;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 6] = [
            &self.user_id,
            &self.user_workout_id,
            &self.recommendation_id,
            &self.calories_burned,
            &self.heart_rate,
            &self.date,
        ];
        values.to_vec()
    }
}
