//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - users(name, age, gender, weight, height, email, password)
//! - health_metrics(user_id, heart_rate, steps_taken, stand_hours, systolic_bp, diastolic_bp, timestamp)
//! - sleep_log(user_id, duration, quality, start_time, end_time, date)
//! - food(name, calories, category)
//! - food_log(user_id, food_id, date, time)
//! - user_workout(exercise_type, description, duration, difficulty_level)
//! - workout_recommendation(workout_name, description, exercise_type, duration, difficulty_level)
//! - workout_log(user_id, user_workout_id | recommendation_id, calories_burned, heart_rate, date)
//! - goals(user_id, description, start_date, end_date, goal_type)
//!
//! Foreign key enforcement is switched on for every connection.

pub mod integrity;
pub mod schema;
pub mod sqlite;

pub use integrity::IntegrityKind;
pub use schema::{Column, Domain, SqlType, Table, TableCheck, TableDef};
pub use sqlite::{DbStats, HealthStore, PurgeSummary, StoreOptions};
