//! # Healthlog - Personal Health Tracking Store
//!
//! A constrained relational schema for tracking users, device health
//! metrics, sleep, nutrition, workouts and goals.
//!
//! Healthlog provides:
//! - A declarative schema layer whose domain, nullability, uniqueness,
//!   referential and composite rules are enforced by SQLite itself
//! - Typed records and named enumerations for every coded column
//! - A single Integrity Violation error for every rejected write
//! - A deterministic synthetic data seeder
//! - Reporting queries (aggregates, joins, date-window filters)

pub mod kinds;
pub mod record;
pub mod user;
pub mod metric;
pub mod sleep;
pub mod nutrition;
pub mod workout;
pub mod goal;
pub mod storage;
pub mod report;
pub mod seed;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use kinds::{Difficulty, ExerciseType, FoodCategory, Gender, GoalType};
pub use record::{NewRecord, Record, UserOwned};
pub use user::{NewUser, User};
pub use metric::{HealthMetric, NewHealthMetric};
pub use sleep::{NewSleepLog, SleepLog};
pub use nutrition::{Food, FoodLog, NewFood, NewFoodLog};
pub use workout::{
    NewUserWorkout, NewWorkoutLog, NewWorkoutRecommendation, UserWorkout, WorkoutLog,
    WorkoutRecommendation, WorkoutSource, WorkoutStats,
};
pub use goal::{Goal, GoalStatus, NewGoal};
pub use storage::{DbStats, HealthStore, IntegrityKind, StoreOptions, Table};
pub use report::ReportEngine;

/// Result type alias for Healthlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Healthlog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A write was rejected by a nullability, domain, uniqueness,
    /// referential or composite rule. The row was not written.
    #[error("Integrity violation ({kind}): {detail}")]
    Integrity { kind: IntegrityKind, detail: String },

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("{table} #{id} not found")]
    NotFound { table: Table, id: i64 },

    #[error("Unknown field `{field}` on {table}")]
    UnknownField { table: Table, field: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Password hashing error: {0}")]
    Password(#[from] bcrypt::BcryptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True when the error is an Integrity Violation of any kind
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::Integrity { .. })
    }

    /// The integrity kind, if this is an Integrity Violation
    pub fn integrity_kind(&self) -> Option<IntegrityKind> {
        match self {
            Error::Integrity { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match storage::integrity::classify(&err) {
            Some((kind, detail)) => Error::Integrity { kind, detail },
            None => Error::Storage(err),
        }
    }
}
