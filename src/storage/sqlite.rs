//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite::types::ToSql;
use serde::Serialize;
use crate::{Error, Result};
use crate::nutrition::Food;
use crate::record::{NewRecord, Record, UserOwned};
use crate::user::{NewUser, User};
use crate::workout::{NewUserWorkout, NewWorkoutLog, WorkoutSource, WorkoutStats};
use super::schema::{self, Table};

/// Connection-level settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// bcrypt cost used when hashing passwords
    pub password_cost: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            password_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// SQLite-backed storage for the health schema
pub struct HealthStore {
    conn: Connection,
    options: StoreOptions,
}

impl HealthStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open a database file with explicit options
    pub fn open_with(path: &Path, options: StoreOptions) -> Result<Self> {
        tracing::info!("Opening health store at {}", path.display());
        Self::from_connection(Connection::open(path)?, options)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with(StoreOptions::default())
    }

    pub fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, options)
    }

    fn from_connection(conn: Connection, options: StoreOptions) -> Result<Self> {
        let store = Self { conn, options };
        store.enable_foreign_keys()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// SQLite ships with foreign keys off; they must be enabled per connection.
    fn enable_foreign_keys(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if !self.foreign_keys_enabled()? {
            return Err(Error::Config(
                "SQLite build does not support foreign key enforcement".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the connection enforces foreign keys
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self.conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(enabled == 1)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    /// Raw connection, for read-only reporting queries
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    // ========== Generic Record Operations ==========

    /// Insert a record and return its generated id.
    ///
    /// Fails with an Integrity Violation if any rule rejects the row; the
    /// row is then not written at all.
    pub fn insert<N: NewRecord>(&self, record: &N) -> Result<i64> {
        let table = N::Output::TABLE;
        let columns = &N::Output::COLUMNS[1..];
        let id = self.insert_values(table, columns, &record.values())?;
        tracing::debug!("Inserted {} #{}", table, id);
        Ok(id)
    }

    fn insert_values(&self, table: Table, columns: &[&str], values: &[&dyn ToSql]) -> Result<i64> {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, values)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a record by id
    pub fn get<R: Record>(&self, id: i64) -> Result<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            R::COLUMNS.join(", "),
            R::TABLE.name()
        );
        self.conn
            .query_row(&sql, [id], |row| R::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    /// Get a record by id, failing with `NotFound` if it does not exist
    pub fn require<R: Record>(&self, id: i64) -> Result<R> {
        self.get(id)?.ok_or(Error::NotFound { table: R::TABLE, id })
    }

    /// All records of a table in id order
    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            R::COLUMNS.join(", "),
            R::TABLE.name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// A user's records, newest first. Uses the `user_id` index.
    pub fn list_for_user<R: UserOwned>(&self, user_id: i64) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY {}",
            R::COLUMNS.join(", "),
            R::TABLE.name(),
            R::ORDER_BY
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([user_id], |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Rewrite every column of a stored record. The whole row is
    /// revalidated against the schema.
    pub fn update<R: Record>(&self, record: &R) -> Result<()> {
        let columns = &R::COLUMNS[1..];
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            R::TABLE.name(),
            assignments.join(", "),
            columns.len() + 1
        );

        let id = record.id();
        let mut values = record.values();
        values.push(&id);

        let changed = self.conn.execute(&sql, values.as_slice())?;
        if changed == 0 {
            return Err(Error::NotFound { table: R::TABLE, id });
        }
        tracing::debug!("Updated {} #{}", R::TABLE, id);
        Ok(())
    }

    /// Set a single field. `value` may be NULL; the schema decides whether
    /// that is allowed.
    pub fn update_field(&self, table: Table, id: i64, field: &str, value: &dyn ToSql) -> Result<()> {
        let column = table
            .def()
            .get_column(field)
            .filter(|c| !c.primary_key)
            .ok_or_else(|| Error::UnknownField {
                table,
                field: field.to_string(),
            })?;

        let sql = format!("UPDATE {} SET {} = ?1 WHERE id = ?2", table.name(), column.name);
        let changed = self.conn.execute(&sql, params![value, id])?;
        if changed == 0 {
            return Err(Error::NotFound { table, id });
        }
        tracing::debug!("Updated {}.{} on #{}", table, column.name, id);
        Ok(())
    }

    /// Delete a record by id
    pub fn delete<R: Record>(&self, id: i64) -> Result<()> {
        self.delete_from(R::TABLE, id)
    }

    /// Delete a row by table and id. Fails with a foreign key Integrity
    /// Violation while other rows still reference it.
    pub fn delete_from(&self, table: Table, id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table.name());
        let changed = self.conn.execute(&sql, [id])?;
        if changed == 0 {
            return Err(Error::NotFound { table, id });
        }
        tracing::debug!("Deleted {} #{}", table, id);
        Ok(())
    }

    /// Count rows in a table
    pub fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Transactions ==========

    /// Run `f` as one unit of work. Any error rolls back every write made
    /// inside it. Nested calls join the outer transaction.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        let tx = self.conn.unchecked_transaction()?;
        // Dropping `tx` without commit rolls back
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    // ========== User Operations ==========

    /// Insert a user, hashing the password first
    pub fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let password_hash = bcrypt::hash(&user.password, self.options.password_cost)?;
        let values: [&dyn ToSql; 7] = [
            &user.name,
            &user.age,
            &user.gender,
            &user.weight,
            &user.height,
            &user.email,
            &password_hash,
        ];
        let id = self.insert_values(Table::Users, &User::COLUMNS[1..], &values)?;
        tracing::debug!("Inserted {} #{}", Table::Users, id);
        Ok(id)
    }

    /// Find a user by email
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS.join(", "));
        self.conn
            .query_row(&sql, [email], |row| User::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    /// Check credentials; returns the user when the password matches
    pub fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_user_by_email(email)? else {
            return Ok(None);
        };
        if bcrypt::verify(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Replace a user's password
    pub fn set_password(&self, user_id: i64, password: &str) -> Result<()> {
        let password_hash = bcrypt::hash(password, self.options.password_cost)?;
        self.update_field(Table::Users, user_id, "password", &password_hash)
    }

    /// Delete a user and every row that references it, in one transaction.
    ///
    /// The schema does not cascade, so a plain `delete` of a user with logs
    /// fails; this removes the children first.
    pub fn purge_user(&self, user_id: i64) -> Result<PurgeSummary> {
        self.transaction(|store| {
            let mut removed = Vec::new();
            for table in Table::user_owned() {
                let sql = format!("DELETE FROM {} WHERE user_id = ?1", table.name());
                let rows = store.conn.execute(&sql, [user_id])?;
                removed.push((*table, rows));
            }
            store.delete_from(Table::Users, user_id)?;
            let summary = PurgeSummary { user_id, removed };
            tracing::info!(
                "Purged user #{} and {} dependent rows",
                user_id,
                summary.total_children()
            );
            Ok(summary)
        })
    }

    // ========== Catalog Operations ==========

    /// Find a catalog food by its unique name
    pub fn find_food_by_name(&self, name: &str) -> Result<Option<Food>> {
        let sql = format!("SELECT {} FROM food WHERE name = ?1", Food::COLUMNS.join(", "));
        self.conn
            .query_row(&sql, [name], |row| Food::from_row(row))
            .optional()
            .map_err(Into::into)
    }

    // ========== Workout Operations ==========

    /// Store a user-defined workout and its log entry together. Returns
    /// `(user_workout_id, workout_log_id)`.
    pub fn log_user_workout(
        &self,
        user_id: i64,
        workout: &NewUserWorkout,
        stats: WorkoutStats,
    ) -> Result<(i64, i64)> {
        self.transaction(|store| {
            let workout_id = store.insert(workout)?;
            let log_id = store.insert(&NewWorkoutLog::new(
                user_id,
                WorkoutSource::UserWorkout(workout_id),
                stats,
            ))?;
            Ok((workout_id, log_id))
        })
    }

    /// Log a workout that followed a catalog recommendation
    pub fn log_recommended_workout(
        &self,
        user_id: i64,
        recommendation_id: i64,
        stats: WorkoutStats,
    ) -> Result<i64> {
        self.insert(&NewWorkoutLog::new(
            user_id,
            WorkoutSource::Recommendation(recommendation_id),
            stats,
        ))
    }

    // ========== Statistics ==========

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let tables = Table::all()
            .iter()
            .map(|table| {
                Ok(TableCount {
                    table: table.name(),
                    rows: self.count(*table)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DbStats { tables })
    }

    /// Count rows with a parameterized WHERE clause
    pub(crate) fn count_where(&self, table: Table, filter: &str, values: &[&dyn ToSql]) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table.name(), filter);
        let count: i64 = self.conn.query_row(&sql, values, |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Rows removed by `purge_user`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurgeSummary {
    pub user_id: i64,
    pub removed: Vec<(Table, usize)>,
}

impl PurgeSummary {
    pub fn total_children(&self) -> usize {
        self.removed.iter().map(|(_, rows)| rows).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: usize,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub tables: Vec<TableCount>,
}

impl DbStats {
    pub fn rows(&self, table: Table) -> usize {
        self.tables
            .iter()
            .find(|t| t.table == table.name())
            .map(|t| t.rows)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for count in &self.tables {
            writeln!(f, "  {}: {}", count.table, count.rows)?;
        }
        write!(f, "  Total: {}", self.total())
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
