//! Nutrition - the shared food catalog and per-user consumption logs

use crate::kinds::FoodCategory;
use crate::record::{NewRecord, Record, UserOwned};
use crate::storage::Table;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// A catalog food, shared by all users. Names are unique so the catalog
/// cannot hold duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub category: FoodCategory,
}

impl Record for Food {
    const TABLE: Table = Table::Food;
    const COLUMNS: &'static [&'static str] = &["id", "name", "calories", "category"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Food {
            id: row.get(0)?,
            name: row.get(1)?,
            calories: row.get(2)?,
            category: row.get(3)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 3] = [&self.name, &self.calories, &self.category];
        values.to_vec()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub calories: i64,
    pub category: FoodCategory,
}

impl NewFood {
    pub fn new(name: impl Into<String>, calories: i64, category: FoodCategory) -> Self {
        Self {
            name: name.into(),
            calories,
            category,
        }
    }
}

impl NewRecord for NewFood {
    type Output = Food;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 3] = [&self.name, &self.calories, &self.category];
        values.to_vec()
    }
}

/// One consumption event. A user may log the same food several times a
/// day, hence the surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: i64,
    pub user_id: i64,
    pub food_id: i64,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl Record for FoodLog {
    const TABLE: Table = Table::FoodLog;
    const COLUMNS: &'static [&'static str] = &["id", "user_id", "food_id", "date", "time"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FoodLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            food_id: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 4] = [&self.user_id, &self.food_id, &self.date, &self.time];
        values.to_vec()
    }
}

impl UserOwned for FoodLog {
    const ORDER_BY: &'static str = "date DESC, time DESC, id DESC";

    fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub user_id: i64,
    pub food_id: i64,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl NewFoodLog {
    pub fn new(user_id: i64, food_id: i64, date: NaiveDate) -> Self {
        Self {
            user_id,
            food_id,
            date,
            time: None,
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }
}

impl NewRecord for NewFoodLog {
    type Output = FoodLog;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 4] = [&self.user_id, &self.food_id, &self.date, &self.time];
        values.to_vec()
    }
}
