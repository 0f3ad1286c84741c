//! Sleep logs

use crate::record::{NewRecord, Record, UserOwned};
use crate::storage::Table;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// One night of sleep. `date` is the night the sleep started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLog {
    pub id: i64,
    pub user_id: i64,
    /// Hours
    pub duration: Option<f64>,
    /// 1 = poor .. 5 = excellent
    pub quality: Option<i64>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
}

impl Record for SleepLog {
    const TABLE: Table = Table::SleepLog;
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "duration", "quality", "start_time", "end_time", "date",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(SleepLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            duration: row.get(2)?,
            quality: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            date: row.get(6)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 6] = [
            &self.user_id,
            &self.duration,
            &self.quality,
            &self.start_time,
            &self.end_time,
            &self.date,
        ];
        values.to_vec()
    }
}

impl UserOwned for SleepLog {
    const ORDER_BY: &'static str = "date DESC, id DESC";

    fn user_id(&self) -> i64 {
        self.user_id
    }
}

/// A night of sleep to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewSleepLog {
    pub user_id: i64,
    pub duration: Option<f64>,
    pub quality: Option<i64>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
}

impl NewSleepLog {
    /// Build a log from bed and wake times; the duration is derived and
    /// wraps past midnight.
    pub fn from_times(user_id: i64, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let mut minutes = (end_time - start_time).num_minutes();
        if minutes < 0 {
            minutes += 24 * 60;
        }
        Self {
            user_id,
            duration: Some(minutes as f64 / 60.0),
            quality: None,
            start_time,
            end_time,
            date,
        }
    }

    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality = Some(quality);
        self
    }
}

impl NewRecord for NewSleepLog {
    type Output = SleepLog;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 6] = [
            &self.user_id,
            &self.duration,
            &self.quality,
            &self.start_time,
            &self.end_time,
            &self.date,
        ];
        values.to_vec()
    }
}
