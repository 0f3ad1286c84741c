//! Integrity classification
//!
//! SQLite reports every constraint failure as `SQLITE_CONSTRAINT` with an
//! extended code naming the rule. Those are folded into one Integrity
//! Violation error with a kind, so callers can tell a rejected write apart
//! from an I/O or SQL failure without matching on message text.

use rusqlite::ErrorCode;
use rusqlite::ffi;
use serde::Serialize;
use std::fmt;

/// Which rule rejected a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityKind {
    /// A required column was NULL
    NotNull,
    /// A column domain or composite CHECK failed
    Check,
    /// A UNIQUE column was duplicated
    Unique,
    /// A foreign key matched no parent row, or a parent still has children
    ForeignKey,
    /// A primary key was duplicated
    PrimaryKey,
    /// Any other constraint failure
    Other,
}

impl IntegrityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrityKind::NotNull => "not null",
            IntegrityKind::Check => "check",
            IntegrityKind::Unique => "unique",
            IntegrityKind::ForeignKey => "foreign key",
            IntegrityKind::PrimaryKey => "primary key",
            IntegrityKind::Other => "constraint",
        }
    }

    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_NOTNULL => IntegrityKind::NotNull,
            ffi::SQLITE_CONSTRAINT_CHECK => IntegrityKind::Check,
            ffi::SQLITE_CONSTRAINT_UNIQUE => IntegrityKind::Unique,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => IntegrityKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => IntegrityKind::PrimaryKey,
            _ => IntegrityKind::Other,
        }
    }
}

impl fmt::Display for IntegrityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a SQLite error. Returns `None` for anything that is not a
/// constraint failure.
///
/// The detail is the part of SQLite's message naming the rule, e.g. the
/// CHECK constraint name or `table.column`.
pub fn classify(err: &rusqlite::Error) -> Option<(IntegrityKind, String)> {
    match err {
        rusqlite::Error::SqliteFailure(inner, message)
            if inner.code == ErrorCode::ConstraintViolation =>
        {
            let kind = IntegrityKind::from_extended_code(inner.extended_code);
            let detail = message
                .as_deref()
                .map(rule_detail)
                .unwrap_or_else(|| kind.as_str().to_string());
            Some((kind, detail))
        }
        _ => None,
    }
}

/// "CHECK constraint failed: ck_users_age" -> "ck_users_age"
fn rule_detail(message: &str) -> String {
    match message.split_once("failed: ") {
        Some((_, rule)) => rule.trim().to_string(),
        None => message.trim().to_string(),
    }
}
