use tabled::{settings::Style, Table, Tabled};
use crate::goal::{Goal, GoalStatus};
use crate::storage::DbStats;
use chrono::NaiveDate;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    /// Add a row for an optional figure, `-` when missing
    pub fn add_optional(&mut self, label: &str, value: Option<f64>) {
        let value = value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
        self.add_row(label, &value);
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Type")]
    goal_type: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Status")]
    status: GoalStatus,
    #[tabled(rename = "Description")]
    description: String,
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Goals with their status as of `today`
pub fn goals_table(goals: &[Goal], today: NaiveDate) -> String {
    if goals.is_empty() {
        return String::new();
    }
    let rows: Vec<GoalRow> = goals
        .iter()
        .map(|goal| GoalRow {
            id: goal.id,
            goal_type: goal
                .goal_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            start: date_cell(goal.start_date),
            end: date_cell(goal.end_date),
            status: goal.status_on(today),
            description: goal.description.clone(),
        })
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

/// Row counts per table
pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    for count in &stats.tables {
        builder.add_row(count.table, &count.rows.to_string());
    }
    builder.add_row("total", &stats.total().to_string());
    builder.build()
}
