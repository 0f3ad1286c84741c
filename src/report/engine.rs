//! Report engine implementation
//!
//! Provides read-only reporting over the health store:
//! - User listings and counts
//! - Health metric and sleep averages over explicit windows
//! - Food popularity and per-day intake
//! - Workout recommendation search and usage
//! - Goal progress
//!
//! Every window is a parameter; nothing here reads the clock.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::OptionalExtension;
use rusqlite::types::ToSql;
use serde::Serialize;
use crate::Result;
use crate::goal::Goal;
use crate::kinds::{Difficulty, ExerciseType, FoodCategory, GoalType};
use crate::metric::HealthMetric;
use crate::nutrition::Food;
use crate::record::{Record, UserOwned};
use crate::sleep::SleepLog;
use crate::storage::{HealthStore, Table};
use crate::user::User;
use crate::workout::{UserWorkout, WorkoutLog, WorkoutRecommendation};

/// Average health metrics; `None` when no readings fall in the window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAverages {
    pub heart_rate: Option<f64>,
    pub steps_taken: Option<f64>,
    pub stand_hours: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SleepAverages {
    pub duration: Option<f64>,
    pub quality: Option<f64>,
}

/// A user ranked by an averaged value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAverage {
    pub user_id: i64,
    pub name: String,
    pub average: f64,
}

/// A food and how many times it was logged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodCount {
    pub food_id: i64,
    pub name: String,
    pub total: usize,
}

/// One food log entry joined with its food
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodEntry {
    pub food: Food,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationUsage {
    pub recommendation_id: i64,
    pub times: usize,
}

/// A user-created workout together with the log entry that recorded it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomWorkout {
    pub workout: UserWorkout,
    pub log: WorkoutLog,
}

/// Filter for recommendation search. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecommendationFilter {
    pub exercise_type: Option<ExerciseType>,
    pub difficulty: Option<Difficulty>,
    /// Upper bound on duration in hours, inclusive
    pub max_duration: Option<f64>,
}

/// Everything reported for one user as of a given day
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub user: User,
    pub today: NaiveDate,
    pub metrics_30d: MetricAverages,
    pub steps_7d: Option<f64>,
    pub sleep_30d: SleepAverages,
    pub latest_metric: Option<HealthMetric>,
    pub latest_sleep: Option<SleepLog>,
    pub foods_yesterday: Vec<FoodEntry>,
    pub veggies_7d: usize,
    pub calories_today: i64,
    pub workouts_7d: usize,
    pub calories_burned_today: i64,
    pub latest_custom_workout: Option<CustomWorkout>,
    pub goals: Vec<Goal>,
    pub completed_goals: usize,
    pub in_progress_goals: Vec<Goal>,
}

/// Store-wide figures as of a given day
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub today: NaiveDate,
    pub user_count: usize,
    pub first_users: Vec<User>,
    pub best_sleeper_30d: Option<UserAverage>,
    pub top_foods: Vec<FoodCount>,
    pub quick_easy_cardio: Vec<WorkoutRecommendation>,
    pub strength_recommendations: usize,
    pub most_frequent_recommendation: Option<RecommendationUsage>,
}

/// Report engine over a health store
pub struct ReportEngine<'a> {
    store: &'a HealthStore,
}

impl<'a> ReportEngine<'a> {
    /// Create a new report engine
    pub fn new(store: &'a HealthStore) -> Self {
        Self { store }
    }

    // ========== Users ==========

    /// The first `limit` users in id order
    pub fn first_users(&self, limit: usize) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT ?1",
            User::COLUMNS.join(", ")
        );
        self.collect(&sql, &[&(limit as i64)], User::from_row)
    }

    pub fn user_count(&self) -> Result<usize> {
        self.store.count(Table::Users)
    }

    // ========== Health Metrics ==========

    /// Average of every metric recorded at or after `since`
    pub fn average_metrics(&self, user_id: i64, since: NaiveDateTime) -> Result<MetricAverages> {
        let averages = self.store.conn().query_row(
            "SELECT AVG(heart_rate), AVG(steps_taken), AVG(stand_hours), AVG(systolic_bp), AVG(diastolic_bp)
             FROM health_metrics WHERE user_id = ?1 AND timestamp >= ?2",
            rusqlite::params![user_id, since],
            |row| {
                Ok(MetricAverages {
                    heart_rate: row.get(0)?,
                    steps_taken: row.get(1)?,
                    stand_hours: row.get(2)?,
                    systolic_bp: row.get(3)?,
                    diastolic_bp: row.get(4)?,
                })
            },
        )?;
        Ok(averages)
    }

    /// Average steps recorded at or after `since`
    pub fn average_steps(&self, user_id: i64, since: NaiveDateTime) -> Result<Option<f64>> {
        Ok(self.average_metrics(user_id, since)?.steps_taken)
    }

    pub fn latest_metric(&self, user_id: i64) -> Result<Option<HealthMetric>> {
        self.latest(user_id)
    }

    // ========== Sleep ==========

    /// Average duration and quality of nights dated `from..=to`
    pub fn average_sleep(&self, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<SleepAverages> {
        let averages = self.store.conn().query_row(
            "SELECT AVG(duration), AVG(quality) FROM sleep_log
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
            rusqlite::params![user_id, from, to],
            |row| {
                Ok(SleepAverages {
                    duration: row.get(0)?,
                    quality: row.get(1)?,
                })
            },
        )?;
        Ok(averages)
    }

    /// The user with the highest average sleep quality since `since`.
    /// Ties go to the lower user id.
    pub fn best_sleeper(&self, since: NaiveDate) -> Result<Option<UserAverage>> {
        let best = self
            .store
            .conn()
            .query_row(
                "SELECT u.id, u.name, AVG(s.quality) AS avg_quality
                 FROM sleep_log s JOIN users u ON u.id = s.user_id
                 WHERE s.date >= ?1 AND s.quality IS NOT NULL
                 GROUP BY u.id
                 ORDER BY avg_quality DESC, u.id
                 LIMIT 1",
                [since],
                |row| {
                    Ok(UserAverage {
                        user_id: row.get(0)?,
                        name: row.get(1)?,
                        average: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(best)
    }

    pub fn latest_sleep(&self, user_id: i64) -> Result<Option<SleepLog>> {
        self.latest(user_id)
    }

    // ========== Food ==========

    /// The `limit` most logged foods across all users
    pub fn top_foods(&self, limit: usize) -> Result<Vec<FoodCount>> {
        self.collect(
            "SELECT f.id, f.name, COUNT(l.id) AS total
             FROM food f JOIN food_log l ON l.food_id = f.id
             GROUP BY f.id
             ORDER BY total DESC, f.name
             LIMIT ?1",
            &[&(limit as i64)],
            |row| {
                Ok(FoodCount {
                    food_id: row.get(0)?,
                    name: row.get(1)?,
                    total: row.get::<_, i64>(2)? as usize,
                })
            },
        )
    }

    /// What a user logged on `date`, earliest first
    pub fn foods_eaten_on(&self, user_id: i64, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        let columns: Vec<String> = Food::COLUMNS.iter().map(|c| format!("f.{}", c)).collect();
        let time_index = Food::COLUMNS.len();
        let sql = format!(
            "SELECT {}, l.time FROM food_log l JOIN food f ON f.id = l.food_id
             WHERE l.user_id = ?1 AND l.date = ?2
             ORDER BY l.time, l.id",
            columns.join(", ")
        );
        self.collect(&sql, &[&user_id, &date], |row| {
            Ok(FoodEntry {
                food: Food::from_row(row)?,
                time: row.get(time_index)?,
            })
        })
    }

    /// How many logged foods of `category` a user ate in `from..=to`
    pub fn category_count(
        &self,
        user_id: i64,
        category: FoodCategory,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize> {
        let count: i64 = self.store.conn().query_row(
            "SELECT COUNT(*) FROM food_log l JOIN food f ON f.id = l.food_id
             WHERE l.user_id = ?1 AND l.date BETWEEN ?2 AND ?3 AND f.category = ?4",
            rusqlite::params![user_id, from, to, category],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Calories of every food logged on `date`; 0 when nothing was logged
    pub fn calories_eaten_on(&self, user_id: i64, date: NaiveDate) -> Result<i64> {
        let total = self.store.conn().query_row(
            "SELECT COALESCE(SUM(f.calories), 0) FROM food_log l JOIN food f ON f.id = l.food_id
             WHERE l.user_id = ?1 AND l.date = ?2",
            rusqlite::params![user_id, date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    // ========== Workouts ==========

    /// Recommendations matching `filter`, shortest first
    pub fn find_recommendations(&self, filter: &RecommendationFilter) -> Result<Vec<WorkoutRecommendation>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(exercise_type) = &filter.exercise_type {
            conditions.push("exercise_type = ?");
            values.push(exercise_type);
        }
        if let Some(difficulty) = &filter.difficulty {
            conditions.push("difficulty_level = ?");
            values.push(difficulty);
        }
        if let Some(max_duration) = &filter.max_duration {
            conditions.push("duration <= ?");
            values.push(max_duration);
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM workout_recommendation{} ORDER BY duration, id",
            WorkoutRecommendation::COLUMNS.join(", "),
            where_clause
        );
        self.collect(&sql, &values, WorkoutRecommendation::from_row)
    }

    /// Number of recommendations of one exercise type
    pub fn recommendation_count(&self, exercise_type: ExerciseType) -> Result<usize> {
        self.store
            .count_where(Table::WorkoutRecommendation, "exercise_type = ?1", &[&exercise_type])
    }

    /// The recommendation logged most often. Custom-workout logs are ignored.
    pub fn most_frequent_recommendation(&self) -> Result<Option<RecommendationUsage>> {
        let usage = self
            .store
            .conn()
            .query_row(
                "SELECT recommendation_id, COUNT(*) AS times FROM workout_log
                 WHERE recommendation_id IS NOT NULL
                 GROUP BY recommendation_id
                 ORDER BY times DESC, recommendation_id
                 LIMIT 1",
                [],
                |row| {
                    Ok(RecommendationUsage {
                        recommendation_id: row.get(0)?,
                        times: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(usage)
    }

    /// Number of workouts a user logged in `from..=to`
    pub fn workout_count(&self, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        self.store.count_where(
            Table::WorkoutLog,
            "user_id = ?1 AND date BETWEEN ?2 AND ?3",
            &[&user_id, &from, &to],
        )
    }

    /// Calories burned across a user's workouts on `date`; 0 when none
    pub fn calories_burned_on(&self, user_id: i64, date: NaiveDate) -> Result<i64> {
        let total = self.store.conn().query_row(
            "SELECT COALESCE(SUM(calories_burned), 0) FROM workout_log
             WHERE user_id = ?1 AND date = ?2",
            rusqlite::params![user_id, date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// The most recently logged user-created workout
    pub fn latest_custom_workout(&self, user_id: i64) -> Result<Option<CustomWorkout>> {
        let sql = format!(
            "SELECT {} FROM workout_log
             WHERE user_id = ?1 AND user_workout_id IS NOT NULL
             ORDER BY {} LIMIT 1",
            WorkoutLog::COLUMNS.join(", "),
            WorkoutLog::ORDER_BY
        );
        let log = self
            .store
            .conn()
            .query_row(&sql, [user_id], WorkoutLog::from_row)
            .optional()?;

        let Some(log) = log else {
            return Ok(None);
        };
        let Some(workout_id) = log.user_workout_id else {
            return Ok(None);
        };
        let workout = self.store.require::<UserWorkout>(workout_id)?;
        Ok(Some(CustomWorkout { workout, log }))
    }

    // ========== Goals ==========

    pub fn goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        self.store.list_for_user(user_id)
    }

    /// Goals whose end date is before `today`
    pub fn completed_goal_count(&self, user_id: i64, today: NaiveDate) -> Result<usize> {
        self.store
            .count_where(Table::Goals, "user_id = ?1 AND end_date < ?2", &[&user_id, &today])
    }

    /// Goals with `start_date <= today <= end_date`, optionally of one type
    pub fn in_progress_goals(
        &self,
        user_id: i64,
        today: NaiveDate,
        goal_type: Option<GoalType>,
    ) -> Result<Vec<Goal>> {
        let mut sql = format!(
            "SELECT {} FROM goals WHERE user_id = ?1 AND start_date <= ?2 AND end_date >= ?2",
            Goal::COLUMNS.join(", ")
        );
        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(3);
        values.push(&user_id);
        values.push(&today);
        if let Some(goal_type) = &goal_type {
            sql.push_str(" AND goal_type = ?3");
            values.push(goal_type);
        }
        sql.push_str(" ORDER BY end_date, id");
        self.collect(&sql, &values, Goal::from_row)
    }

    // ========== Summary ==========

    /// All per-user reports as of `today`: 30 and 7 day windows ending
    /// today, yesterday's food, and today's totals.
    pub fn user_report(&self, user_id: i64, today: NaiveDate) -> Result<UserReport> {
        let user = self.store.require::<User>(user_id)?;
        let month_ago = today - chrono::Duration::days(30);
        let week_ago = today - chrono::Duration::days(7);
        let yesterday = today - chrono::Duration::days(1);
        tracing::debug!("Building report for user #{} as of {}", user_id, today);

        Ok(UserReport {
            metrics_30d: self.average_metrics(user_id, start_of(month_ago))?,
            steps_7d: self.average_steps(user_id, start_of(week_ago))?,
            sleep_30d: self.average_sleep(user_id, month_ago, today)?,
            latest_metric: self.latest_metric(user_id)?,
            latest_sleep: self.latest_sleep(user_id)?,
            foods_yesterday: self.foods_eaten_on(user_id, yesterday)?,
            veggies_7d: self.category_count(user_id, FoodCategory::Veggie, week_ago, today)?,
            calories_today: self.calories_eaten_on(user_id, today)?,
            workouts_7d: self.workout_count(user_id, week_ago, today)?,
            calories_burned_today: self.calories_burned_on(user_id, today)?,
            latest_custom_workout: self.latest_custom_workout(user_id)?,
            goals: self.goals(user_id)?,
            completed_goals: self.completed_goal_count(user_id, today)?,
            in_progress_goals: self.in_progress_goals(user_id, today, None)?,
            user,
            today,
        })
    }

    /// Store-wide overview: first five users, the month's best sleeper, the
    /// three most logged foods and recommendation usage
    pub fn overview(&self, today: NaiveDate) -> Result<Overview> {
        let quick_easy_cardio = RecommendationFilter {
            exercise_type: Some(ExerciseType::Cardio),
            difficulty: Some(Difficulty::Easy),
            max_duration: Some(0.75),
        };
        Ok(Overview {
            today,
            user_count: self.user_count()?,
            first_users: self.first_users(5)?,
            best_sleeper_30d: self.best_sleeper(today - chrono::Duration::days(30))?,
            top_foods: self.top_foods(3)?,
            quick_easy_cardio: self.find_recommendations(&quick_easy_cardio)?,
            strength_recommendations: self.recommendation_count(ExerciseType::Strength)?,
            most_frequent_recommendation: self.most_frequent_recommendation()?,
        })
    }

    // ========== Helpers ==========

    fn latest<R: UserOwned>(&self, user_id: i64) -> Result<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY {} LIMIT 1",
            R::COLUMNS.join(", "),
            R::TABLE.name(),
            R::ORDER_BY
        );
        self.store
            .conn()
            .query_row(&sql, [user_id], |row| R::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    fn collect<T, F>(&self, sql: &str, values: &[&dyn ToSql], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.store.conn().prepare(sql)?;
        let rows = stmt
            .query_map(values, map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

/// Midnight at the start of `date`
fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
