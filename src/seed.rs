//! Synthetic data seeder
//!
//! Fills a store with plausible users and a window of daily activity. Output
//! is fully determined by `SeedConfig` (seed, anchor date and counts), so a
//! seeded database can be rebuilt exactly.
//!
//! Catalog rows (foods, workout recommendations) are shared by every user and
//! written once; each user and their logs are written in one transaction.

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::Result;
use crate::goal::NewGoal;
use crate::kinds::{Difficulty, ExerciseType, FoodCategory, Gender, GoalType, SLEEP_QUALITY_MAX, SLEEP_QUALITY_MIN};
use crate::metric::NewHealthMetric;
use crate::nutrition::{NewFood, NewFoodLog};
use crate::sleep::NewSleepLog;
use crate::storage::{HealthStore, Table};
use crate::user::NewUser;
use crate::workout::{NewUserWorkout, NewWorkoutRecommendation, WorkoutStats};

const FIRST_NAMES: &[&str] = &[
    "Ava", "Ben", "Chloe", "Diego", "Elena", "Farah", "Gus", "Hana", "Ivan", "Jade",
    "Kofi", "Lena", "Mateo", "Nina", "Omar", "Priya", "Quinn", "Rosa", "Sami", "Theo",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Brooks", "Chen", "Dubois", "Evans", "Fischer", "Garcia", "Haddad",
    "Ito", "Jensen", "Kim", "Lopez", "Moreau", "Novak", "Okafor", "Park",
];

/// Food catalog: name and category. Calories are drawn per seed.
const FOODS: &[(&str, FoodCategory)] = &[
    ("Chicken Breast", FoodCategory::Protein),
    ("Salmon", FoodCategory::Protein),
    ("Eggs", FoodCategory::Protein),
    ("Tofu", FoodCategory::Protein),
    ("Greek Yogurt", FoodCategory::Protein),
    ("Brown Rice", FoodCategory::Carb),
    ("Oatmeal", FoodCategory::Carb),
    ("Whole Wheat Pasta", FoodCategory::Carb),
    ("Sourdough Bread", FoodCategory::Carb),
    ("Quinoa", FoodCategory::Carb),
    ("Avocado", FoodCategory::Fat),
    ("Almonds", FoodCategory::Fat),
    ("Olive Oil", FoodCategory::Fat),
    ("Peanut Butter", FoodCategory::Fat),
    ("Broccoli", FoodCategory::Veggie),
    ("Spinach", FoodCategory::Veggie),
    ("Carrots", FoodCategory::Veggie),
    ("Bell Pepper", FoodCategory::Veggie),
    ("Kale", FoodCategory::Veggie),
    ("Apple", FoodCategory::Fruit),
    ("Banana", FoodCategory::Fruit),
    ("Blueberries", FoodCategory::Fruit),
    ("Orange", FoodCategory::Fruit),
    ("Mango", FoodCategory::Fruit),
];

const WORKOUT_NAMES: &[&str] = &["Workout A", "Workout B", "Workout C", "Workout D", "Workout E"];

const WORKOUT_DESCRIPTIONS: &[&str] = &[
    "Steady pace with a short cool down",
    "Intervals with full recovery between sets",
    "Full body circuit",
    "Mobility flow focusing on hips and shoulders",
    "Upper body push and pull",
    "Easy recovery session",
    "Hill repeats",
];

const GOAL_DESCRIPTIONS: &[(GoalType, &str)] = &[
    (GoalType::Sleep, "Be in bed before 23:00 on weeknights"),
    (GoalType::Sleep, "Average seven hours of sleep"),
    (GoalType::Nutrition, "Eat vegetables with every dinner"),
    (GoalType::Nutrition, "Cut back on late night snacks"),
    (GoalType::Workout, "Work out four times a week"),
    (GoalType::Workout, "Run 5k without stopping"),
];

/// Share of workout logs that follow a catalog recommendation
const RECOMMENDATION_SHARE: f64 = 0.3;

/// Seeder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// RNG seed
    pub seed: u64,
    /// Users to create
    pub users: usize,
    /// Last day of generated activity
    pub anchor: NaiveDate,
    /// Length of the activity window ending at `anchor`
    pub days: u32,
    /// Device readings per user, spread over the window
    pub metrics_per_user: usize,
    /// Goals per user
    pub goals_per_user: usize,
    /// Recommendations in the catalog when it is first created
    pub recommendations: usize,
}

impl SeedConfig {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            seed: 42,
            users: 10,
            anchor,
            days: 30,
            metrics_per_user: 10,
            goals_per_user: 5,
            recommendations: 20,
        }
    }

    /// First day of the activity window
    pub fn first_day(&self) -> NaiveDate {
        self.anchor - Duration::days(i64::from(self.days.max(1)) - 1)
    }
}

/// Rows written by one seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub foods: usize,
    pub recommendations: usize,
    pub health_metrics: usize,
    pub sleep_logs: usize,
    pub food_logs: usize,
    pub user_workouts: usize,
    pub workout_logs: usize,
    pub goals: usize,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.users
            + self.foods
            + self.recommendations
            + self.health_metrics
            + self.sleep_logs
            + self.food_logs
            + self.user_workouts
            + self.workout_logs
            + self.goals
    }

    /// Per-table row counts in table order
    pub fn rows(&self) -> [(Table, usize); 9] {
        [
            (Table::Users, self.users),
            (Table::Food, self.foods),
            (Table::UserWorkout, self.user_workouts),
            (Table::WorkoutRecommendation, self.recommendations),
            (Table::HealthMetrics, self.health_metrics),
            (Table::SleepLog, self.sleep_logs),
            (Table::FoodLog, self.food_logs),
            (Table::WorkoutLog, self.workout_logs),
            (Table::Goals, self.goals),
        ]
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Seed Summary:")?;
        for (table, rows) in self.rows() {
            writeln!(f, "  {}: {}", table, rows)?;
        }
        write!(f, "  Total: {}", self.total())
    }
}

/// Deterministic data generator over a store
pub struct Seeder<'a> {
    store: &'a HealthStore,
    config: SeedConfig,
    rng: StdRng,
}

impl<'a> Seeder<'a> {
    pub fn new(store: &'a HealthStore, config: SeedConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { store, config, rng }
    }

    /// Seed everything
    pub fn run(&mut self) -> Result<SeedSummary> {
        self.run_with(|_, _| {})
    }

    /// Seed everything, calling `on_user(done, total)` after each user
    pub fn run_with(&mut self, mut on_user: impl FnMut(usize, usize)) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        let (food_ids, recommendation_ids) = self.seed_catalog(&mut summary)?;

        // Offset keeps generated emails unique across runs
        let offset = self.store.count(Table::Users)?;
        let total = self.config.users;
        for i in 0..total {
            self.seed_user(offset + i, &food_ids, &recommendation_ids, &mut summary)?;
            on_user(i + 1, total);
        }

        tracing::info!(
            "Seeded {} users ({} rows) over {}..={}",
            summary.users,
            summary.total(),
            self.config.first_day(),
            self.config.anchor
        );
        Ok(summary)
    }

    /// Insert missing catalog foods and, on an empty catalog, workout
    /// recommendations. Returns the ids available to log against.
    fn seed_catalog(&mut self, summary: &mut SeedSummary) -> Result<(Vec<i64>, Vec<i64>)> {
        let store = self.store;
        store.transaction(|store| {
            let mut food_ids = Vec::with_capacity(FOODS.len());
            for (name, category) in FOODS {
                let calories = self.rng.gen_range(50..=700);
                let id = match store.find_food_by_name(name)? {
                    Some(food) => food.id,
                    None => {
                        summary.foods += 1;
                        store.insert(&NewFood::new(*name, calories, *category))?
                    }
                };
                food_ids.push(id);
            }

            if store.count(Table::WorkoutRecommendation)? == 0 {
                for _ in 0..self.config.recommendations {
                    let recommendation = self.recommendation();
                    store.insert(&recommendation)?;
                    summary.recommendations += 1;
                }
            }
            let recommendation_ids = store
                .list::<crate::workout::WorkoutRecommendation>()?
                .into_iter()
                .map(|r| r.id)
                .collect();

            tracing::debug!(
                "Catalog ready: {} new foods, {} new recommendations",
                summary.foods,
                summary.recommendations
            );
            Ok((food_ids, recommendation_ids))
        })
    }

    fn seed_user(
        &mut self,
        index: usize,
        food_ids: &[i64],
        recommendation_ids: &[i64],
        summary: &mut SeedSummary,
    ) -> Result<()> {
        let store = self.store;
        let user = self.user(index);

        store.transaction(|store| {
            let user_id = store.insert_user(&user)?;
            summary.users += 1;

            for _ in 0..self.config.metrics_per_user {
                let metric = self.metric(user_id);
                store.insert(&metric)?;
                summary.health_metrics += 1;
            }

            for date in self.window() {
                let sleep = self.sleep(user_id, date);
                store.insert(&sleep)?;
                summary.sleep_logs += 1;

                if let Some(food_id) = food_ids.choose(&mut self.rng) {
                    let log = NewFoodLog::new(user_id, *food_id, date).at(self.time_of_day(6..=22));
                    store.insert(&log)?;
                    summary.food_logs += 1;
                }

                let stats = self.workout_stats(date);
                let recommendation = if self.rng.gen_bool(RECOMMENDATION_SHARE) {
                    recommendation_ids.choose(&mut self.rng).copied()
                } else {
                    None
                };
                match recommendation {
                    Some(id) => {
                        store.log_recommended_workout(user_id, id, stats)?;
                    }
                    None => {
                        let workout = self.user_workout();
                        store.log_user_workout(user_id, &workout, stats)?;
                        summary.user_workouts += 1;
                    }
                }
                summary.workout_logs += 1;
            }

            for _ in 0..self.config.goals_per_user {
                let goal = self.goal(user_id);
                store.insert(&goal)?;
                summary.goals += 1;
            }
            Ok(())
        })
    }

    // ========== Generators ==========

    /// Every day of the activity window, oldest first
    fn window(&self) -> Vec<NaiveDate> {
        let first = self.config.first_day();
        (0..self.config.days.max(1))
            .map(|offset| first + Duration::days(i64::from(offset)))
            .collect()
    }

    fn random_day(&mut self) -> NaiveDate {
        let offset = self.rng.gen_range(0..self.config.days.max(1));
        self.config.first_day() + Duration::days(i64::from(offset))
    }

    fn time_of_day(&mut self, hours: std::ops::RangeInclusive<u32>) -> NaiveTime {
        let hour = self.rng.gen_range(hours);
        let minute = self.rng.gen_range(0..60);
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    fn user(&mut self, index: usize) -> NewUser {
        let first = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("Smith");
        let gender = Gender::all().choose(&mut self.rng).copied().unwrap_or(Gender::Nonbinary);
        let password: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        NewUser::new(
            format!("{} {}", first, last),
            format!("{}.{}.{}@example.com", first.to_lowercase(), last.to_lowercase(), index),
            password,
        )
        .with_age(self.rng.gen_range(18..=60))
        .with_gender(gender)
        .with_body(self.rng.gen_range(50.0..100.0), self.rng.gen_range(150.0..200.0))
    }

    fn metric(&mut self, user_id: i64) -> NewHealthMetric {
        let timestamp = self.random_day().and_time(self.time_of_day(0..=23));
        NewHealthMetric::new(user_id, timestamp)
            .with_heart_rate(self.rng.gen_range(40..=250))
            .with_activity(self.rng.gen_range(0..=20_000), self.rng.gen_range(0..=24))
            .with_blood_pressure(self.rng.gen_range(90..=140), self.rng.gen_range(50..=100))
    }

    /// A night starting on `date`, 3 to 13 hours long
    fn sleep(&mut self, user_id: i64, date: NaiveDate) -> NewSleepLog {
        let start = self.time_of_day(20..=23);
        let minutes = self.rng.gen_range(3 * 60..=13 * 60);
        let end = start + Duration::minutes(minutes);
        NewSleepLog::from_times(user_id, date, start, end)
            .with_quality(self.rng.gen_range(SLEEP_QUALITY_MIN..=SLEEP_QUALITY_MAX))
    }

    fn exercise(&mut self) -> (ExerciseType, Difficulty) {
        let exercise_type = ExerciseType::all()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ExerciseType::Cardio);
        let difficulty = Difficulty::all()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Difficulty::Easy);
        (exercise_type, difficulty)
    }

    fn description(&mut self) -> &'static str {
        WORKOUT_DESCRIPTIONS.choose(&mut self.rng).copied().unwrap_or("Workout")
    }

    fn recommendation(&mut self) -> NewWorkoutRecommendation {
        let name = WORKOUT_NAMES.choose(&mut self.rng).copied().unwrap_or("Workout A");
        let (exercise_type, difficulty) = self.exercise();
        let duration = self.rng.gen_range(0.5..=2.0);
        NewWorkoutRecommendation::new(name, exercise_type, duration, difficulty)
            .with_description(self.description())
    }

    fn user_workout(&mut self) -> NewUserWorkout {
        let (exercise_type, difficulty) = self.exercise();
        let duration = self.rng.gen_range(0.15..=2.0);
        NewUserWorkout::new(exercise_type, self.description(), duration, difficulty)
    }

    fn workout_stats(&mut self, date: NaiveDate) -> WorkoutStats {
        WorkoutStats::on(date)
            .with_calories(self.rng.gen_range(100..=500))
            .with_heart_rate(self.rng.gen_range(60..=250))
    }

    /// A goal lasting 14 to 90 days, starting inside the window
    fn goal(&mut self, user_id: i64) -> NewGoal {
        let (goal_type, description) = GOAL_DESCRIPTIONS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or((GoalType::Workout, "Stay active"));
        let start = self.random_day();
        let end = start + Duration::days(self.rng.gen_range(14..=90));
        NewGoal::new(user_id, description, goal_type, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::Goal;
    use crate::sleep::SleepLog;
    use crate::storage::StoreOptions;
    use crate::workout::WorkoutLog;

    fn store() -> HealthStore {
        HealthStore::open_in_memory_with(StoreOptions { password_cost: 4 }).unwrap()
    }

    fn config() -> SeedConfig {
        SeedConfig {
            users: 3,
            days: 14,
            recommendations: 8,
            ..SeedConfig::new(NaiveDate::from_ymd_opt(2023, 11, 8).unwrap())
        }
    }

    #[test]
    fn test_seed_counts() {
        let store = store();
        let summary = Seeder::new(&store, config()).run().unwrap();

        assert_eq!(summary.users, 3);
        assert_eq!(summary.foods, FOODS.len());
        assert_eq!(summary.recommendations, 8);
        assert_eq!(summary.health_metrics, 30);
        assert_eq!(summary.sleep_logs, 42);
        assert_eq!(summary.food_logs, 42);
        assert_eq!(summary.workout_logs, 42);
        assert_eq!(summary.goals, 15);

        let stats = store.stats().unwrap();
        for (table, rows) in summary.rows() {
            assert_eq!(stats.rows(table), rows, "row count for {}", table);
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = store();
        let b = store();
        Seeder::new(&a, config()).run().unwrap();
        Seeder::new(&b, config()).run().unwrap();

        let users_a: Vec<_> = a.list::<crate::User>().unwrap().into_iter().map(|u| u.email).collect();
        let users_b: Vec<_> = b.list::<crate::User>().unwrap().into_iter().map(|u| u.email).collect();
        assert_eq!(users_a, users_b);
        assert_eq!(a.list::<SleepLog>().unwrap(), b.list::<SleepLog>().unwrap());
        assert_eq!(a.list::<Goal>().unwrap(), b.list::<Goal>().unwrap());

        let c = store();
        Seeder::new(&c, SeedConfig { seed: 7, ..config() }).run().unwrap();
        assert_ne!(a.list::<SleepLog>().unwrap(), c.list::<SleepLog>().unwrap());
    }

    #[test]
    fn test_seeded_rows_stay_in_window() {
        let store = store();
        let config = config();
        Seeder::new(&store, config.clone()).run().unwrap();

        for log in store.list::<SleepLog>().unwrap() {
            assert!(log.date >= config.first_day() && log.date <= config.anchor);
            let quality = log.quality.unwrap();
            assert!((SLEEP_QUALITY_MIN..=SLEEP_QUALITY_MAX).contains(&quality));
        }
        for goal in store.list::<Goal>().unwrap() {
            let (start, end) = (goal.start_date.unwrap(), goal.end_date.unwrap());
            let days = (end - start).num_days();
            assert!((14..=90).contains(&days));
        }
        for log in store.list::<WorkoutLog>().unwrap() {
            assert!(log.source().is_some());
        }
    }

    #[test]
    fn test_reseeding_reuses_catalog() {
        let store = store();
        Seeder::new(&store, config()).run().unwrap();
        let second = Seeder::new(&store, config()).run().unwrap();

        assert_eq!(second.foods, 0);
        assert_eq!(second.recommendations, 0);
        assert_eq!(second.users, 3);
        assert_eq!(store.count(Table::Users).unwrap(), 6);
        assert_eq!(store.count(Table::Food).unwrap(), FOODS.len());
    }

    #[test]
    fn test_progress_callback() {
        let store = store();
        let mut seen = Vec::new();
        Seeder::new(&store, config())
            .run_with(|done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }
}
