//! Health metrics - point-in-time device readings

use crate::record::{NewRecord, Record, UserOwned};
use crate::storage::Table;
use chrono::NaiveDateTime;
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// One reading pushed by a wearable or smart device.
///
/// Every measurement is optional since devices report different subsets,
/// but the timestamp is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: i64,
    pub user_id: i64,
    pub heart_rate: Option<i64>,
    pub steps_taken: Option<i64>,
    pub stand_hours: Option<i64>,
    pub systolic_bp: Option<i64>,
    pub diastolic_bp: Option<i64>,
    pub timestamp: NaiveDateTime,
}

impl Record for HealthMetric {
    const TABLE: Table = Table::HealthMetrics;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "heart_rate",
        "steps_taken",
        "stand_hours",
        "systolic_bp",
        "diastolic_bp",
        "timestamp",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(HealthMetric {
            id: row.get(0)?,
            user_id: row.get(1)?,
            heart_rate: row.get(2)?,
            steps_taken: row.get(3)?,
            stand_hours: row.get(4)?,
            systolic_bp: row.get(5)?,
            diastolic_bp: row.get(6)?,
            timestamp: row.get(7)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 7] = [
            &self.user_id,
            &self.heart_rate,
            &self.steps_taken,
            &self.stand_hours,
            &self.systolic_bp,
            &self.diastolic_bp,
            &self.timestamp,
        ];
        values.to_vec()
    }
}

impl UserOwned for HealthMetric {
    const ORDER_BY: &'static str = "timestamp DESC, id DESC";

    fn user_id(&self) -> i64 {
        self.user_id
    }
}

/// A reading to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewHealthMetric {
    pub user_id: i64,
    pub heart_rate: Option<i64>,
    pub steps_taken: Option<i64>,
    pub stand_hours: Option<i64>,
    pub systolic_bp: Option<i64>,
    pub diastolic_bp: Option<i64>,
    pub timestamp: NaiveDateTime,
}

impl NewHealthMetric {
    /// Create an empty reading at `timestamp`
    pub fn new(user_id: i64, timestamp: NaiveDateTime) -> Self {
        Self {
            user_id,
            heart_rate: None,
            steps_taken: None,
            stand_hours: None,
            systolic_bp: None,
            diastolic_bp: None,
            timestamp,
        }
    }

    pub fn with_heart_rate(mut self, bpm: i64) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn with_activity(mut self, steps_taken: i64, stand_hours: i64) -> Self {
        self.steps_taken = Some(steps_taken);
        self.stand_hours = Some(stand_hours);
        self
    }

    pub fn with_blood_pressure(mut self, systolic: i64, diastolic: i64) -> Self {
        self.systolic_bp = Some(systolic);
        self.diastolic_bp = Some(diastolic);
        self
    }
}

impl NewRecord for NewHealthMetric {
    type Output = HealthMetric;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 7] = [
            &self.user_id,
            &self.heart_rate,
            &self.steps_taken,
            &self.stand_hours,
            &self.systolic_bp,
            &self.diastolic_bp,
            &self.timestamp,
        ];
        values.to_vec()
    }
}
