pub mod engine;

pub use engine::{
    CustomWorkout, FoodCount, FoodEntry, MetricAverages, Overview, RecommendationFilter,
    RecommendationUsage, ReportEngine, SleepAverages, UserAverage, UserReport,
};
