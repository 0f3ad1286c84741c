//! Record traits - the seam between typed rows and the store
//!
//! Every table has a `Record` (a stored row, id included) and, except for
//! users, a `NewRecord` payload that carries everything but the id. The
//! store builds its SQL from `Record::COLUMNS`, so the column list and the
//! value order must agree.

use crate::storage::Table;
use rusqlite::Row;
use rusqlite::types::ToSql;

/// A stored row.
pub trait Record: Sized {
    /// Table the row lives in
    const TABLE: Table;

    /// Column names in select order. `id` is always first.
    const COLUMNS: &'static [&'static str];

    /// Surrogate key
    fn id(&self) -> i64;

    /// Build a record from a row selected with `COLUMNS`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values for every column after `id`, in `COLUMNS` order
    fn values(&self) -> Vec<&dyn ToSql>;
}

/// An insert payload; the database assigns the id.
pub trait NewRecord {
    type Output: Record;

    /// Values for every column after `id`, in `Output::COLUMNS` order
    fn values(&self) -> Vec<&dyn ToSql>;
}

/// A record owned by a user through a required `user_id` foreign key.
///
/// Listing a user's records is an indexed equality query on that key.
pub trait UserOwned: Record {
    /// ORDER BY clause used for per-user listings (newest first)
    const ORDER_BY: &'static str;

    fn user_id(&self) -> i64;
}
