use super::*;
use crate::goal::{Goal, NewGoal};
use crate::kinds::{Difficulty, ExerciseType, FoodCategory, Gender, GoalType};
use crate::metric::{HealthMetric, NewHealthMetric};
use crate::nutrition::{FoodLog, NewFood, NewFoodLog};
use crate::sleep::{NewSleepLog, SleepLog};
use crate::storage::IntegrityKind;
use crate::workout::{
    NewWorkoutRecommendation, UserWorkout, WorkoutLog, WorkoutRecommendation,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Null;

fn store() -> HealthStore {
    // Lowest bcrypt cost keeps the suite fast
    HealthStore::open_in_memory_with(StoreOptions { password_cost: 4 }).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, d).unwrap()
}

fn at(d: u32, hour: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, 0, 0).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn test_user() -> NewUser {
    NewUser::new("Test User", "test@example.com", "password")
        .with_age(30)
        .with_gender(Gender::Male)
        .with_body(70.0, 170.0)
}

fn sample_metric(user_id: i64) -> NewHealthMetric {
    NewHealthMetric::new(user_id, at(8, 9))
        .with_heart_rate(70)
        .with_activity(10000, 12)
        .with_blood_pressure(120, 80)
}

fn sample_sleep(user_id: i64) -> NewSleepLog {
    NewSleepLog::from_times(user_id, day(8), hm(23, 0), hm(7, 0)).with_quality(4)
}

fn sample_recommendation() -> NewWorkoutRecommendation {
    NewWorkoutRecommendation::new("Test Workout", ExerciseType::Cardio, 0.5, Difficulty::Easy)
        .with_description("Test workout description")
}

fn sample_user_workout() -> NewUserWorkout {
    NewUserWorkout::new(ExerciseType::Cardio, "test user workout", 0.5, Difficulty::Easy)
}

fn stats() -> WorkoutStats {
    WorkoutStats::on(day(8)).with_calories(300).with_heart_rate(130)
}

/// Assert the result is an Integrity Violation of `kind`
fn assert_violation<T: std::fmt::Debug>(result: Result<T>, kind: IntegrityKind) {
    match result {
        Err(Error::Integrity { kind: actual, detail }) => {
            assert_eq!(actual, kind, "unexpected violation: {}", detail)
        }
        other => panic!("expected {} violation, got {:?}", kind, other),
    }
}

// ========== Connection ==========

#[test]
fn test_foreign_keys_enabled_on_open() {
    let store = store();
    assert!(store.foreign_keys_enabled().unwrap());
}

#[test]
fn test_file_backed_reopen_keeps_data_and_enforcement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("health.db");
    let options = StoreOptions { password_cost: 4 };

    let user_id = {
        let store = HealthStore::open_with(&path, options).unwrap();
        store.insert_user(&test_user()).unwrap()
    };

    let store = HealthStore::open_with(&path, options).unwrap();
    assert!(store.foreign_keys_enabled().unwrap());
    assert_eq!(store.require::<User>(user_id).unwrap().email, "test@example.com");
    assert_violation(store.insert(&sample_metric(9999)), IntegrityKind::ForeignKey);
}

// ========== Users ==========

#[test]
fn test_user_creation_assigns_id() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();
    assert!(id > 0);

    let user = store.require::<User>(id).unwrap();
    assert_eq!(user.name, "Test User");
    assert_eq!(user.gender, Some(Gender::Male));
    assert_eq!(user.weight, Some(70.0));
}

#[test]
fn test_user_password_is_hashed() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();
    let user = store.require::<User>(id).unwrap();

    assert_ne!(user.password_hash, "password");
    assert!(store.verify_password("test@example.com", "password").unwrap().is_some());
    assert!(store.verify_password("test@example.com", "wrong").unwrap().is_none());
    assert!(store.verify_password("nobody@example.com", "password").unwrap().is_none());

    store.set_password(id, "changed").unwrap();
    assert!(store.verify_password("test@example.com", "changed").unwrap().is_some());
}

#[test]
fn test_user_update() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();

    let mut user = store.require::<User>(id).unwrap();
    user.name = "Updated User".to_string();
    store.update(&user).unwrap();

    assert_eq!(store.require::<User>(id).unwrap().name, "Updated User");
}

#[test]
fn test_user_delete() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();
    store.delete::<User>(id).unwrap();
    assert!(store.get::<User>(id).unwrap().is_none());
}

#[test]
fn test_user_required_fields() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();
    for field in ["name", "email", "password"] {
        assert_violation(store.update_field(Table::Users, id, field, &Null), IntegrityKind::NotNull);
    }
    // Optional profile fields accept NULL
    for field in ["age", "gender", "weight", "height"] {
        store.update_field(Table::Users, id, field, &Null).unwrap();
    }
}

#[test]
fn test_user_domains() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();

    for field in ["age", "weight", "height"] {
        assert_violation(store.update_field(Table::Users, id, field, &-1), IntegrityKind::Check);
        store.update_field(Table::Users, id, field, &0).unwrap();
    }

    assert_violation(store.update_field(Table::Users, id, "gender", &0), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Users, id, "gender", &4), IntegrityKind::Check);
    store.update_field(Table::Users, id, "gender", &3).unwrap();
    assert_eq!(store.require::<User>(id).unwrap().gender, Some(Gender::Nonbinary));
}

#[test]
fn test_text_rejected_by_numeric_domains() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let food_id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();

    assert_violation(store.update_field(Table::Users, user_id, "age", &"abc"), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Users, user_id, "weight", &"-5kg"), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Food, food_id, "calories", &"lots"), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Users, user_id, "age", &30.5), IntegrityKind::Check);

    // Numeric text is converted by the column affinity and still range checked
    store.update_field(Table::Users, user_id, "age", &"41").unwrap();
    assert_violation(store.update_field(Table::Users, user_id, "age", &"-3"), IntegrityKind::Check);

    // Rows stay readable after every rejected write
    let user = store.require::<User>(user_id).unwrap();
    assert_eq!(user.age, Some(41));
    assert_eq!(user.weight, Some(70.0));
    assert_eq!(store.require::<crate::nutrition::Food>(food_id).unwrap().calories, 95);
}

#[test]
fn test_dates_must_parse() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let goal_id = store
        .insert(&NewGoal::new(user_id, "Run 5k", GoalType::Workout, day(1), day(20)))
        .unwrap();
    let sleep_id = store.insert(&sample_sleep(user_id)).unwrap();
    let metric_id = store.insert(&sample_metric(user_id)).unwrap();

    assert_violation(store.update_field(Table::Goals, goal_id, "end_date", &"garbage"), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Goals, goal_id, "end_date", &99), IntegrityKind::Check);
    assert_violation(store.update_field(Table::SleepLog, sleep_id, "start_time", &"late"), IntegrityKind::Check);
    assert_violation(
        store.update_field(Table::HealthMetrics, metric_id, "timestamp", &"yesterday"),
        IntegrityKind::Check,
    );

    // Undated goals are still allowed
    store.update_field(Table::Goals, goal_id, "end_date", &Null).unwrap();
    store.update_field(Table::Goals, goal_id, "end_date", &day(25)).unwrap();
    assert_eq!(store.require::<Goal>(goal_id).unwrap().end_date, Some(day(25)));
    assert_eq!(store.require::<SleepLog>(sleep_id).unwrap().start_time, hm(23, 0));
}

#[test]
fn test_user_negative_age_rejected_on_insert() {
    let store = store();
    let result = store.insert_user(&test_user().with_age(-1));
    assert_violation(result, IntegrityKind::Check);
    assert_eq!(store.count(Table::Users).unwrap(), 0);
}

#[test]
fn test_user_email_unique() {
    let store = store();
    store.insert_user(&test_user()).unwrap();
    let again = NewUser::new("Someone Else", "test@example.com", "other");
    assert_violation(store.insert_user(&again), IntegrityKind::Unique);
}

#[test]
fn test_find_user_by_email() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();
    let found = store.find_user_by_email("test@example.com").unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(store.find_user_by_email("missing@example.com").unwrap().is_none());
}

// ========== Health Metrics ==========

#[test]
fn test_health_metric_scenario() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();

    let metric_id = store.insert(&sample_metric(user_id)).unwrap();
    assert!(metric_id > 0);

    assert_violation(store.insert(&sample_metric(9999)), IntegrityKind::ForeignKey);
}

#[test]
fn test_health_metric_domains_and_boundaries() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_metric(user_id)).unwrap();

    for field in ["heart_rate", "steps_taken", "stand_hours", "systolic_bp", "diastolic_bp"] {
        assert_violation(
            store.update_field(Table::HealthMetrics, id, field, &-1),
            IntegrityKind::Check,
        );
        store.update_field(Table::HealthMetrics, id, field, &0).unwrap();
    }

    let metric = store.require::<HealthMetric>(id).unwrap();
    assert_eq!(metric.heart_rate, Some(0));
    assert_eq!(metric.diastolic_bp, Some(0));
}

#[test]
fn test_health_metric_timestamp_required() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_metric(user_id)).unwrap();
    assert_violation(
        store.update_field(Table::HealthMetrics, id, "timestamp", &Null),
        IntegrityKind::NotNull,
    );
    assert_violation(
        store.update_field(Table::HealthMetrics, id, "user_id", &Null),
        IntegrityKind::NotNull,
    );
}

#[test]
fn test_full_row_update_revalidates() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_metric(user_id)).unwrap();

    let mut metric = store.require::<HealthMetric>(id).unwrap();
    metric.heart_rate = Some(80);
    store.update(&metric).unwrap();
    assert_eq!(store.require::<HealthMetric>(id).unwrap().heart_rate, Some(80));

    metric.heart_rate = Some(-1);
    assert_violation(store.update(&metric), IntegrityKind::Check);
    assert_eq!(store.require::<HealthMetric>(id).unwrap().heart_rate, Some(80));
}

#[test]
fn test_list_metrics_for_user() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let other = store
        .insert_user(&NewUser::new("Other", "other@example.com", "pw"))
        .unwrap();

    store.insert(&sample_metric(user_id)).unwrap();
    store.insert(&NewHealthMetric::new(user_id, at(9, 9)).with_heart_rate(65)).unwrap();
    store.insert(&sample_metric(other)).unwrap();

    let metrics: Vec<HealthMetric> = store.list_for_user(user_id).unwrap();
    assert_eq!(metrics.len(), 2);
    // Newest first
    assert_eq!(metrics[0].timestamp, at(9, 9));
}

// ========== Sleep ==========

#[test]
fn test_sleep_log_crud() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_sleep(user_id)).unwrap();

    let mut log = store.require::<SleepLog>(id).unwrap();
    assert_eq!(log.duration, Some(8.0));
    assert_eq!(log.start_time, hm(23, 0));

    log.quality = Some(5);
    store.update(&log).unwrap();
    assert_eq!(store.require::<SleepLog>(id).unwrap().quality, Some(5));

    store.delete::<SleepLog>(id).unwrap();
    assert!(store.get::<SleepLog>(id).unwrap().is_none());
}

#[test]
fn test_sleep_quality_range() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_sleep(user_id)).unwrap();

    assert_violation(store.update_field(Table::SleepLog, id, "quality", &0), IntegrityKind::Check);
    assert_violation(store.update_field(Table::SleepLog, id, "quality", &6), IntegrityKind::Check);
    store.update_field(Table::SleepLog, id, "quality", &1).unwrap();
    store.update_field(Table::SleepLog, id, "quality", &5).unwrap();

    assert_violation(store.update_field(Table::SleepLog, id, "duration", &-0.5), IntegrityKind::Check);
    store.update_field(Table::SleepLog, id, "duration", &0.0).unwrap();
}

#[test]
fn test_sleep_required_fields_and_fk() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store.insert(&sample_sleep(user_id)).unwrap();

    for field in ["start_time", "end_time", "date", "user_id"] {
        assert_violation(store.update_field(Table::SleepLog, id, field, &Null), IntegrityKind::NotNull);
    }
    assert_violation(store.insert(&sample_sleep(9999)), IntegrityKind::ForeignKey);
}

// ========== Food ==========

#[test]
fn test_food_name_unique_scenario() {
    let store = store();
    store.insert(&NewFood::new("Test Food", 200, FoodCategory::Protein)).unwrap();
    let duplicate = NewFood::new("Test Food", 300, FoodCategory::Carb);
    assert_violation(store.insert(&duplicate), IntegrityKind::Unique);
    assert_eq!(store.count(Table::Food).unwrap(), 1);
}

#[test]
fn test_food_domains() {
    let store = store();
    let id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();

    assert_violation(store.update_field(Table::Food, id, "calories", &-1), IntegrityKind::Check);
    store.update_field(Table::Food, id, "calories", &0).unwrap();

    assert_violation(store.update_field(Table::Food, id, "category", &0), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Food, id, "category", &6), IntegrityKind::Check);
    store.update_field(Table::Food, id, "category", &1).unwrap();
    store.update_field(Table::Food, id, "category", &5).unwrap();

    for field in ["name", "calories", "category"] {
        assert_violation(store.update_field(Table::Food, id, field, &Null), IntegrityKind::NotNull);
    }
}

#[test]
fn test_find_food_by_name() {
    let store = store();
    let id = store.insert(&NewFood::new("Broccoli", 55, FoodCategory::Veggie)).unwrap();
    let food = store.find_food_by_name("Broccoli").unwrap().unwrap();
    assert_eq!(food.id, id);
    assert_eq!(food.category, FoodCategory::Veggie);
}

// ========== Food Log ==========

#[test]
fn test_food_log_same_food_twice_a_day() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let food_id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();

    store.insert(&NewFoodLog::new(user_id, food_id, day(8)).at(hm(8, 0))).unwrap();
    store.insert(&NewFoodLog::new(user_id, food_id, day(8)).at(hm(15, 0))).unwrap();
    store.insert(&NewFoodLog::new(user_id, food_id, day(8))).unwrap();

    let logs: Vec<FoodLog> = store.list_for_user(user_id).unwrap();
    assert_eq!(logs.len(), 3);
}

#[test]
fn test_food_log_foreign_keys() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let food_id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();

    assert_violation(store.insert(&NewFoodLog::new(9999, food_id, day(8))), IntegrityKind::ForeignKey);
    assert_violation(store.insert(&NewFoodLog::new(user_id, 9999, day(8))), IntegrityKind::ForeignKey);

    let id = store.insert(&NewFoodLog::new(user_id, food_id, day(8))).unwrap();
    for field in ["date", "user_id", "food_id"] {
        assert_violation(store.update_field(Table::FoodLog, id, field, &Null), IntegrityKind::NotNull);
    }
    assert_violation(store.update_field(Table::FoodLog, id, "food_id", &9999), IntegrityKind::ForeignKey);
}

#[test]
fn test_food_referenced_by_log_cannot_be_deleted() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let food_id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();
    let log_id = store.insert(&NewFoodLog::new(user_id, food_id, day(8))).unwrap();

    assert_violation(store.delete::<crate::nutrition::Food>(food_id), IntegrityKind::ForeignKey);
    store.delete::<FoodLog>(log_id).unwrap();
    store.delete::<crate::nutrition::Food>(food_id).unwrap();
}

// ========== Workouts ==========

#[test]
fn test_workout_recommendation_domains() {
    let store = store();
    let id = store.insert(&sample_recommendation()).unwrap();
    let t = Table::WorkoutRecommendation;

    assert_violation(store.update_field(t, id, "exercise_type", &4), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "difficulty_level", &0), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "duration", &3.5), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "duration", &-0.25), IntegrityKind::Check);
    store.update_field(t, id, "duration", &3.0).unwrap();
    store.update_field(t, id, "duration", &0.0).unwrap();
    store.update_field(t, id, "exercise_type", &3).unwrap();

    for field in ["workout_name", "exercise_type", "duration", "difficulty_level"] {
        assert_violation(store.update_field(t, id, field, &Null), IntegrityKind::NotNull);
    }
    store.update_field(t, id, "description", &Null).unwrap();

    let rec = store.require::<WorkoutRecommendation>(id).unwrap();
    assert_eq!(rec.exercise_type, ExerciseType::Flexibility);
    assert_eq!(rec.description, None);
}

#[test]
fn test_user_workout_domains() {
    let store = store();
    let id = store.insert(&sample_user_workout()).unwrap();
    let t = Table::UserWorkout;

    assert_violation(store.update_field(t, id, "exercise_type", &0), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "difficulty_level", &4), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "duration", &3.01), IntegrityKind::Check);
    for field in ["exercise_type", "description", "duration", "difficulty_level"] {
        assert_violation(store.update_field(t, id, field, &Null), IntegrityKind::NotNull);
    }

    let mut workout = store.require::<UserWorkout>(id).unwrap();
    workout.difficulty_level = Difficulty::Hard;
    store.update(&workout).unwrap();
    assert_eq!(store.require::<UserWorkout>(id).unwrap().difficulty_level, Difficulty::Hard);
}

#[test]
fn test_workout_log_exclusivity_scenario() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let workout_id = store.insert(&sample_user_workout()).unwrap();
    let rec_id = store.insert(&sample_recommendation()).unwrap();

    let mut both = NewWorkoutLog::new(user_id, WorkoutSource::UserWorkout(workout_id), stats());
    both.recommendation_id = Some(rec_id);
    match store.insert(&both) {
        Err(Error::Integrity { kind, detail }) => {
            assert_eq!(kind, IntegrityKind::Check);
            assert_eq!(detail, "chk_workout_recommendation_exclusive");
        }
        other => panic!("expected exclusivity violation, got {:?}", other),
    }

    let mut neither = NewWorkoutLog::new(user_id, WorkoutSource::UserWorkout(workout_id), stats());
    neither.user_workout_id = None;
    assert_violation(store.insert(&neither), IntegrityKind::Check);

    let only_custom = NewWorkoutLog::new(user_id, WorkoutSource::UserWorkout(workout_id), stats());
    let id = store.insert(&only_custom).unwrap();
    let log = store.require::<WorkoutLog>(id).unwrap();
    assert_eq!(log.source(), Some(WorkoutSource::UserWorkout(workout_id)));

    let only_rec = NewWorkoutLog::new(user_id, WorkoutSource::Recommendation(rec_id), stats());
    store.insert(&only_rec).unwrap();
}

#[test]
fn test_workout_log_exclusivity_on_update() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let workout_id = store.insert(&sample_user_workout()).unwrap();
    let rec_id = store.insert(&sample_recommendation()).unwrap();
    let id = store
        .insert(&NewWorkoutLog::new(user_id, WorkoutSource::UserWorkout(workout_id), stats()))
        .unwrap();

    let t = Table::WorkoutLog;
    assert_violation(store.update_field(t, id, "recommendation_id", &rec_id), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "user_workout_id", &Null), IntegrityKind::Check);

    // Switching sides in one row write keeps exactly one reference
    let mut log = store.require::<WorkoutLog>(id).unwrap();
    log.user_workout_id = None;
    log.recommendation_id = Some(rec_id);
    store.update(&log).unwrap();
    assert_eq!(
        store.require::<WorkoutLog>(id).unwrap().source(),
        Some(WorkoutSource::Recommendation(rec_id))
    );
}

#[test]
fn test_workout_log_foreign_keys() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let workout_id = store.insert(&sample_user_workout()).unwrap();

    let bad_user = NewWorkoutLog::new(9999, WorkoutSource::UserWorkout(workout_id), stats());
    assert_violation(store.insert(&bad_user), IntegrityKind::ForeignKey);

    let bad_workout = NewWorkoutLog::new(user_id, WorkoutSource::UserWorkout(9999), stats());
    assert_violation(store.insert(&bad_workout), IntegrityKind::ForeignKey);

    let bad_rec = NewWorkoutLog::new(user_id, WorkoutSource::Recommendation(9999), stats());
    assert_violation(store.insert(&bad_rec), IntegrityKind::ForeignKey);
}

#[test]
fn test_workout_log_positive_measurements() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let (_, id) = store
        .log_user_workout(user_id, &sample_user_workout(), stats())
        .unwrap();
    let t = Table::WorkoutLog;

    assert_violation(store.update_field(t, id, "calories_burned", &0), IntegrityKind::Check);
    assert_violation(store.update_field(t, id, "heart_rate", &0), IntegrityKind::Check);
    store.update_field(t, id, "calories_burned", &1).unwrap();
    store.update_field(t, id, "heart_rate", &1).unwrap();
    assert_violation(store.update_field(t, id, "date", &Null), IntegrityKind::NotNull);
    assert_violation(store.update_field(t, id, "user_id", &Null), IntegrityKind::NotNull);
}

#[test]
fn test_log_user_workout_is_atomic() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();

    let (workout_id, log_id) = store
        .log_user_workout(user_id, &sample_user_workout(), stats())
        .unwrap();
    let log = store.require::<WorkoutLog>(log_id).unwrap();
    assert_eq!(log.user_workout_id, Some(workout_id));

    // The log insert fails on the unknown user, taking the workout with it
    let result = store.log_user_workout(9999, &sample_user_workout(), stats());
    assert_violation(result, IntegrityKind::ForeignKey);
    assert_eq!(store.count(Table::UserWorkout).unwrap(), 1);
    assert_eq!(store.count(Table::WorkoutLog).unwrap(), 1);
}

#[test]
fn test_log_recommended_workout() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let rec_id = store.insert(&sample_recommendation()).unwrap();

    let id = store.log_recommended_workout(user_id, rec_id, stats()).unwrap();
    let log = store.require::<WorkoutLog>(id).unwrap();
    assert_eq!(log.source(), Some(WorkoutSource::Recommendation(rec_id)));
    assert_eq!(log.calories_burned, Some(300));

    assert_violation(
        store.log_recommended_workout(user_id, 9999, stats()),
        IntegrityKind::ForeignKey,
    );
}

// ========== Goals ==========

#[test]
fn test_goal_date_ordering() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();

    let ok = NewGoal::new(user_id, "Run 5k", GoalType::Workout, day(1), day(20));
    let id = store.insert(&ok).unwrap();

    let same_day = NewGoal::new(user_id, "Sleep more", GoalType::Sleep, day(5), day(5));
    assert_violation(store.insert(&same_day), IntegrityKind::Check);

    let reversed = NewGoal::new(user_id, "Eat greens", GoalType::Nutrition, day(20), day(1));
    match store.insert(&reversed) {
        Err(Error::Integrity { detail, .. }) => {
            assert_eq!(detail, "check_start_date_before_end_date")
        }
        other => panic!("expected date ordering violation, got {:?}", other),
    }

    // Moving the deadline before the start is rejected too
    assert_violation(
        store.update_field(Table::Goals, id, "end_date", &day(1)),
        IntegrityKind::Check,
    );
    let goal = store.require::<Goal>(id).unwrap();
    assert_eq!(goal.end_date, Some(day(20)));
}

#[test]
fn test_goal_fields() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let id = store
        .insert(&NewGoal::new(user_id, "Run 5k", GoalType::Workout, day(1), day(20)))
        .unwrap();

    assert_violation(store.update_field(Table::Goals, id, "goal_type", &4), IntegrityKind::Check);
    assert_violation(store.update_field(Table::Goals, id, "description", &Null), IntegrityKind::NotNull);
    assert_violation(store.update_field(Table::Goals, id, "user_id", &Null), IntegrityKind::NotNull);
    assert_violation(
        store.insert(&NewGoal::new(9999, "Ghost", GoalType::Sleep, day(1), day(2))),
        IntegrityKind::ForeignKey,
    );
}

// ========== Deletes and Purge ==========

#[test]
fn test_delete_user_with_children_fails() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    store.insert(&sample_metric(user_id)).unwrap();

    assert_violation(store.delete::<User>(user_id), IntegrityKind::ForeignKey);
    assert!(store.get::<User>(user_id).unwrap().is_some());
}

#[test]
fn test_purge_user_removes_children_first() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    let food_id = store.insert(&NewFood::new("Apple", 95, FoodCategory::Fruit)).unwrap();
    store.insert(&sample_metric(user_id)).unwrap();
    store.insert(&sample_sleep(user_id)).unwrap();
    store.insert(&NewFoodLog::new(user_id, food_id, day(8))).unwrap();
    store.log_user_workout(user_id, &sample_user_workout(), stats()).unwrap();
    store
        .insert(&NewGoal::new(user_id, "Run 5k", GoalType::Workout, day(1), day(20)))
        .unwrap();

    let summary = store.purge_user(user_id).unwrap();
    assert_eq!(summary.total_children(), 5);
    assert!(store.get::<User>(user_id).unwrap().is_none());
    // Catalog rows are not owned by the user
    assert_eq!(store.count(Table::Food).unwrap(), 1);
    assert_eq!(store.count(Table::UserWorkout).unwrap(), 1);
}

#[test]
fn test_delete_missing_is_not_found() {
    let store = store();
    match store.delete::<User>(42) {
        Err(Error::NotFound { table, id }) => {
            assert_eq!(table, Table::Users);
            assert_eq!(id, 42);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(matches!(store.purge_user(42), Err(Error::NotFound { .. })));
}

// ========== Field Updates ==========

#[test]
fn test_update_field_rejects_unknown_columns() {
    let store = store();
    let id = store.insert_user(&test_user()).unwrap();

    assert!(matches!(
        store.update_field(Table::Users, id, "nickname", &"x"),
        Err(Error::UnknownField { .. })
    ));
    assert!(matches!(
        store.update_field(Table::Users, id, "id", &7),
        Err(Error::UnknownField { .. })
    ));
    assert!(matches!(
        store.update_field(Table::Users, 999, "name", &"x"),
        Err(Error::NotFound { .. })
    ));
}

// ========== Transactions ==========

#[test]
fn test_transaction_rolls_back_group() {
    let store = store();
    let result = store.transaction(|store| {
        store.insert(&NewFood::new("Rice", 200, FoodCategory::Carb))?;
        store.insert(&NewFood::new("Rice", 210, FoodCategory::Carb))?;
        Ok(())
    });
    assert_violation(result, IntegrityKind::Unique);
    assert_eq!(store.count(Table::Food).unwrap(), 0);
}

#[test]
fn test_nested_transaction_joins_outer() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();

    let result: Result<()> = store.transaction(|store| {
        store.log_user_workout(user_id, &sample_user_workout(), stats())?;
        store.insert(&sample_metric(9999))?;
        Ok(())
    });
    assert!(result.unwrap_err().is_integrity());
    assert_eq!(store.count(Table::WorkoutLog).unwrap(), 0);
    assert_eq!(store.count(Table::UserWorkout).unwrap(), 0);
}

// ========== Statistics ==========

#[test]
fn test_stats() {
    let store = store();
    let user_id = store.insert_user(&test_user()).unwrap();
    store.insert(&sample_metric(user_id)).unwrap();
    store.insert(&sample_metric(user_id)).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.tables.len(), 9);
    assert_eq!(stats.rows(Table::Users), 1);
    assert_eq!(stats.rows(Table::HealthMetrics), 2);
    assert_eq!(stats.total(), 3);
    assert!(stats.to_string().contains("health_metrics: 2"));
}
