//! Database schema definitions
//!
//! Tables are declared with a small builder rather than raw DDL so that
//! every rule (domain, nullability, uniqueness, foreign key, composite
//! check, index) has one definition and the store can validate field names
//! against it. All rules render to SQLite constraints; nothing here checks
//! values in Rust.

use crate::kinds::{
    Difficulty, ExerciseType, FoodCategory, Gender, GoalType, MAX_WORKOUT_HOURS,
    SLEEP_QUALITY_MAX, SLEEP_QUALITY_MIN,
};
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// The nine tables, in creation (dependency) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    Food,
    UserWorkout,
    WorkoutRecommendation,
    HealthMetrics,
    SleepLog,
    FoodLog,
    WorkoutLog,
    Goals,
}

impl Table {
    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Food => "food",
            Table::UserWorkout => "user_workout",
            Table::WorkoutRecommendation => "workout_recommendation",
            Table::HealthMetrics => "health_metrics",
            Table::SleepLog => "sleep_log",
            Table::FoodLog => "food_log",
            Table::WorkoutLog => "workout_log",
            Table::Goals => "goals",
        }
    }

    /// All tables, parents before children
    pub fn all() -> &'static [Table] {
        &[
            Table::Users,
            Table::Food,
            Table::UserWorkout,
            Table::WorkoutRecommendation,
            Table::HealthMetrics,
            Table::SleepLog,
            Table::FoodLog,
            Table::WorkoutLog,
            Table::Goals,
        ]
    }

    /// Tables holding a required `user_id` foreign key
    pub fn user_owned() -> &'static [Table] {
        &[
            Table::HealthMetrics,
            Table::SleepLog,
            Table::FoodLog,
            Table::WorkoutLog,
            Table::Goals,
        ]
    }

    /// The table's definition
    pub fn def(&self) -> &'static TableDef {
        // `definitions` is built from `Table::all`, which follows declaration order
        &definitions()[*self as usize]
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Declared SQLite column type. Dates and times are stored as ISO-8601 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Date,
    Time,
    DateTime,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::DateTime => "DATETIME",
        }
    }

    /// CHECK expression pinning the stored value to this type's storage
    /// class. Column affinity alone lets non-numeric text through, and text
    /// compares above every number. NULL passes; nullability is separate.
    pub fn guard(&self, column: &str) -> Option<String> {
        match self {
            SqlType::Integer => Some(format!("typeof({column}) IN ('integer', 'null')")),
            SqlType::Real => Some(format!("typeof({column}) IN ('integer', 'real', 'null')")),
            SqlType::Text => None,
            SqlType::Date => Some(Self::shape_guard(column, "date")),
            SqlType::Time => Some(Self::shape_guard(column, "time")),
            SqlType::DateTime => Some(Self::shape_guard(column, "datetime")),
        }
    }

    /// Text the SQLite date function `func` can parse
    fn shape_guard(column: &str, func: &str) -> String {
        format!("{column} IS NULL OR (typeof({column}) = 'text' AND {func}({column}) IS NOT NULL)")
    }
}

/// Value domain of a single column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// `>= 0`
    NonNegative,
    /// `> 0`
    Positive,
    /// Inclusive range
    Between(i64, i64),
    /// One of a fixed set of codes
    OneOf(&'static [i64]),
}

impl Domain {
    /// CHECK expression over `column`
    pub fn expression(&self, column: &str) -> String {
        match self {
            Domain::NonNegative => format!("{column} >= 0"),
            Domain::Positive => format!("{column} > 0"),
            Domain::Between(lo, hi) => format!("{column} BETWEEN {lo} AND {hi}"),
            Domain::OneOf(codes) => {
                let list: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
                format!("{column} IN ({})", list.join(", "))
            }
        }
    }
}

/// A column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
    pub primary_key: bool,
    pub required: bool,
    pub unique: bool,
    pub domain: Option<Domain>,
    /// Parent table; the reference is always to its `id`
    pub references: Option<Table>,
}

impl Column {
    fn new(name: &'static str, ty: SqlType) -> Self {
        Self {
            name,
            ty,
            primary_key: false,
            required: false,
            unique: false,
            domain: None,
            references: None,
        }
    }

    /// Surrogate integer key
    pub fn id() -> Self {
        Self {
            primary_key: true,
            ..Self::new("id", SqlType::Integer)
        }
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, SqlType::Integer)
    }

    pub fn real(name: &'static str) -> Self {
        Self::new(name, SqlType::Real)
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, SqlType::Text)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(name, SqlType::Date)
    }

    pub fn time(name: &'static str) -> Self {
        Self::new(name, SqlType::Time)
    }

    pub fn datetime(name: &'static str) -> Self {
        Self::new(name, SqlType::DateTime)
    }

    /// NOT NULL
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Foreign key to `parent(id)`
    pub fn references(mut self, parent: Table) -> Self {
        self.references = Some(parent);
        self
    }

    /// Combined type guard and domain, `None` for unconstrained columns
    pub fn check_expression(&self) -> Option<String> {
        if self.primary_key {
            return None;
        }
        let guard = self.ty.guard(self.name);
        let domain = self.domain.map(|d| d.expression(self.name));
        match (guard, domain) {
            (Some(guard), Some(domain)) => Some(format!("({guard}) AND {domain}")),
            (Some(guard), None) => Some(guard),
            (None, Some(domain)) => Some(domain),
            (None, None) => None,
        }
    }

    /// Column clause inside CREATE TABLE
    fn render(&self, table: &str) -> String {
        let mut sql = format!("{} {}", self.name, self.ty.as_sql());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.required {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(check) = self.check_expression() {
            sql.push_str(&format!(" CONSTRAINT ck_{}_{} CHECK ({})", table, self.name, check));
        }
        if let Some(parent) = self.references {
            sql.push_str(&format!(" REFERENCES {}(id)", parent.name()));
        }
        sql
    }
}

/// A rule spanning several columns of one row
#[derive(Debug, Clone)]
pub enum TableCheck {
    /// `earlier < later`; passes when either is NULL
    Before {
        name: &'static str,
        earlier: &'static str,
        later: &'static str,
    },
    /// Exactly one of two nullable columns is non-NULL
    ExactlyOne {
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

impl TableCheck {
    pub fn name(&self) -> &'static str {
        match self {
            TableCheck::Before { name, .. } | TableCheck::ExactlyOne { name, .. } => *name,
        }
    }

    pub fn expression(&self) -> String {
        match self {
            TableCheck::Before { earlier, later, .. } => format!("{earlier} < {later}"),
            TableCheck::ExactlyOne { first, second, .. } => format!(
                "({first} IS NULL AND {second} IS NOT NULL) OR ({first} IS NOT NULL AND {second} IS NULL)"
            ),
        }
    }

    fn render(&self) -> String {
        format!("CONSTRAINT {} CHECK ({})", self.name(), self.expression())
    }
}

/// A (possibly composite) secondary index
#[derive(Debug, Clone)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<&'static str>,
}

/// A table definition
#[derive(Debug, Clone)]
pub struct TableDef {
    pub table: Table,
    pub columns: Vec<Column>,
    pub checks: Vec<TableCheck>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Start a definition; every table gets a surrogate `id`
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: vec![Column::id()],
            checks: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column. Foreign key columns also get a single-column index.
    pub fn column(mut self, column: Column) -> Self {
        if column.references.is_some() {
            self.indexes.push(IndexDef {
                name: format!("ix_{}_{}", self.table.name(), column.name),
                columns: vec![column.name],
            });
        }
        self.columns.push(column);
        self
    }

    pub fn check(mut self, check: TableCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Declare a composite index
    pub fn index(mut self, name: &str, columns: &[&'static str]) -> Self {
        self.indexes.push(IndexDef {
            name: name.to_string(),
            columns: columns.to_vec(),
        });
        self
    }

    /// Look up a column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns holding foreign keys, with their parent table
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static str, Table)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|parent| (c.name, parent)))
    }

    /// CREATE TABLE statement
    pub fn create_sql(&self) -> String {
        let name = self.table.name();
        let mut clauses: Vec<String> = self.columns.iter().map(|c| c.render(name)).collect();
        clauses.extend(self.checks.iter().map(TableCheck::render));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            name,
            clauses.join(",\n    ")
        )
    }

    /// CREATE INDEX statements
    pub fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|ix| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                    ix.name,
                    self.table.name(),
                    ix.columns.join(", ")
                )
            })
            .collect()
    }
}

fn users() -> TableDef {
    TableDef::new(Table::Users)
        .column(Column::text("name").required())
        .column(Column::integer("age").domain(Domain::NonNegative))
        .column(Column::integer("gender").domain(Domain::OneOf(Gender::codes())))
        .column(Column::real("weight").domain(Domain::NonNegative))
        .column(Column::real("height").domain(Domain::NonNegative))
        .column(Column::text("email").required().unique())
        .column(Column::text("password").required())
}

fn food() -> TableDef {
    TableDef::new(Table::Food)
        .column(Column::text("name").required().unique())
        .column(Column::integer("calories").required().domain(Domain::NonNegative))
        .column(
            Column::integer("category")
                .required()
                .domain(Domain::OneOf(FoodCategory::codes())),
        )
}

fn user_workout() -> TableDef {
    TableDef::new(Table::UserWorkout)
        .column(
            Column::integer("exercise_type")
                .required()
                .domain(Domain::OneOf(ExerciseType::codes())),
        )
        .column(Column::text("description").required())
        .column(
            Column::real("duration")
                .required()
                .domain(Domain::Between(0, MAX_WORKOUT_HOURS)),
        )
        .column(
            Column::integer("difficulty_level")
                .required()
                .domain(Domain::OneOf(Difficulty::codes())),
        )
}

fn workout_recommendation() -> TableDef {
    TableDef::new(Table::WorkoutRecommendation)
        .column(Column::text("workout_name").required())
        .column(Column::text("description"))
        .column(
            Column::integer("exercise_type")
                .required()
                .domain(Domain::OneOf(ExerciseType::codes())),
        )
        .column(
            Column::real("duration")
                .required()
                .domain(Domain::Between(0, MAX_WORKOUT_HOURS)),
        )
        .column(
            Column::integer("difficulty_level")
                .required()
                .domain(Domain::OneOf(Difficulty::codes())),
        )
        .index(
            "idx_workoutrec_type_difficulty",
            &["exercise_type", "difficulty_level"],
        )
}

fn health_metrics() -> TableDef {
    TableDef::new(Table::HealthMetrics)
        .column(Column::integer("user_id").required().references(Table::Users))
        .column(Column::integer("heart_rate").domain(Domain::NonNegative))
        .column(Column::integer("steps_taken").domain(Domain::NonNegative))
        .column(Column::integer("stand_hours").domain(Domain::NonNegative))
        .column(Column::integer("systolic_bp").domain(Domain::NonNegative))
        .column(Column::integer("diastolic_bp").domain(Domain::NonNegative))
        .column(Column::datetime("timestamp").required())
        .index("idx_healthmetrics_userid_timestamp", &["user_id", "timestamp"])
}

fn sleep_log() -> TableDef {
    TableDef::new(Table::SleepLog)
        .column(Column::integer("user_id").required().references(Table::Users))
        .column(Column::real("duration").domain(Domain::NonNegative))
        .column(
            Column::integer("quality")
                .domain(Domain::Between(SLEEP_QUALITY_MIN, SLEEP_QUALITY_MAX)),
        )
        .column(Column::time("start_time").required())
        .column(Column::time("end_time").required())
        .column(Column::date("date").required())
        .index("idx_sleeplog_userid_date", &["user_id", "date"])
}

fn food_log() -> TableDef {
    TableDef::new(Table::FoodLog)
        .column(Column::integer("user_id").required().references(Table::Users))
        .column(Column::integer("food_id").required().references(Table::Food))
        .column(Column::date("date").required())
        .column(Column::time("time"))
        .index("idx_foodlog_userid_date", &["user_id", "date"])
}

fn workout_log() -> TableDef {
    TableDef::new(Table::WorkoutLog)
        .column(Column::integer("user_id").required().references(Table::Users))
        .column(Column::integer("user_workout_id").references(Table::UserWorkout))
        .column(
            Column::integer("recommendation_id").references(Table::WorkoutRecommendation),
        )
        .column(Column::integer("calories_burned").domain(Domain::Positive))
        .column(Column::integer("heart_rate").domain(Domain::Positive))
        .column(Column::date("date").required())
        .check(TableCheck::ExactlyOne {
            name: "chk_workout_recommendation_exclusive",
            first: "user_workout_id",
            second: "recommendation_id",
        })
        .index("idx_workoutlog_userid_date", &["user_id", "date"])
}

fn goals() -> TableDef {
    TableDef::new(Table::Goals)
        .column(Column::integer("user_id").required().references(Table::Users))
        .column(Column::text("description").required())
        .column(Column::date("start_date"))
        .column(Column::date("end_date"))
        .column(
            Column::integer("goal_type").domain(Domain::OneOf(GoalType::codes())),
        )
        .check(TableCheck::Before {
            name: "check_start_date_before_end_date",
            earlier: "start_date",
            later: "end_date",
        })
        .index("idx_goals_userid_end_date", &["user_id", "end_date"])
}

/// All table definitions, in `Table::all` order
pub fn definitions() -> &'static [TableDef] {
    static DEFS: OnceLock<Vec<TableDef>> = OnceLock::new();
    DEFS.get_or_init(|| {
        Table::all()
            .iter()
            .map(|table| match table {
                Table::Users => users(),
                Table::Food => food(),
                Table::UserWorkout => user_workout(),
                Table::WorkoutRecommendation => workout_recommendation(),
                Table::HealthMetrics => health_metrics(),
                Table::SleepLog => sleep_log(),
                Table::FoodLog => food_log(),
                Table::WorkoutLog => workout_log(),
                Table::Goals => goals(),
            })
            .collect()
    })
}

/// All schema creation statements: tables first, then indexes
pub fn all_schema_statements() -> Vec<String> {
    let defs = definitions();
    let mut stmts: Vec<String> = defs.iter().map(TableDef::create_sql).collect();
    stmts.extend(defs.iter().flat_map(TableDef::index_sql));
    stmts
}
