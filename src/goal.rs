//! Goals

use crate::kinds::GoalType;
use crate::record::{NewRecord, Record, UserOwned};
use crate::storage::Table;
use chrono::NaiveDate;
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// A user goal. Status is derived from the dates rather than stored, so
/// moving a deadline is just a date update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub goal_type: Option<GoalType>,
}

/// Where a goal stands relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Upcoming,
    InProgress,
    Completed,
    /// Missing a start or end date
    Undated,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Upcoming => "upcoming",
            GoalStatus::InProgress => "in progress",
            GoalStatus::Completed => "completed",
            GoalStatus::Undated => "undated",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Goal {
    /// Status as of `today`. A goal whose end date has passed is completed;
    /// the end date itself still counts as in progress.
    pub fn status_on(&self, today: NaiveDate) -> GoalStatus {
        match (self.start_date, self.end_date) {
            (_, Some(end)) if end < today => GoalStatus::Completed,
            (Some(start), Some(_)) if start > today => GoalStatus::Upcoming,
            (Some(_), Some(_)) => GoalStatus::InProgress,
            _ => GoalStatus::Undated,
        }
    }
}

impl Record for Goal {
    const TABLE: Table = Table::Goals;
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "description", "start_date", "end_date", "goal_type",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Goal {
            id: row.get(0)?,
            user_id: row.get(1)?,
            description: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            goal_type: row.get(5)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 5] = [
            &self.user_id,
            &self.description,
            &self.start_date,
            &self.end_date,
            &self.goal_type,
        ];
        values.to_vec()
    }
}

impl UserOwned for Goal {
    const ORDER_BY: &'static str = "end_date DESC, id DESC";

    fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub user_id: i64,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub goal_type: Option<GoalType>,
}

impl NewGoal {
    /// A dated goal of a given type
    pub fn new(
        user_id: i64,
        description: impl Into<String>,
        goal_type: GoalType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            description: description.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
            goal_type: Some(goal_type),
        }
    }
}

impl NewRecord for NewGoal {
    type Output = Goal;

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 5] = [
            &self.user_id,
            &self.description,
            &self.start_date,
            &self.end_date,
            &self.goal_type,
        ];
        values.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, day).unwrap()
    }

    fn goal(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            description: "Sleep 8 hours".into(),
            start_date: start,
            end_date: end,
            goal_type: Some(GoalType::Sleep),
        }
    }

    #[test]
    fn test_status_windows() {
        let g = goal(Some(date(5)), Some(date(10)));
        assert_eq!(g.status_on(date(4)), GoalStatus::Upcoming);
        assert_eq!(g.status_on(date(5)), GoalStatus::InProgress);
        assert_eq!(g.status_on(date(10)), GoalStatus::InProgress);
        assert_eq!(g.status_on(date(11)), GoalStatus::Completed);
    }

    #[test]
    fn test_status_undated() {
        assert_eq!(goal(None, Some(date(10))).status_on(date(5)), GoalStatus::Undated);
        assert_eq!(goal(Some(date(1)), None).status_on(date(5)), GoalStatus::Undated);
        // A passed end date is enough to call it completed
        assert_eq!(goal(None, Some(date(1))).status_on(date(5)), GoalStatus::Completed);
    }
}
