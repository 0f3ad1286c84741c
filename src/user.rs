//! Users - the root entity every per-user log hangs off

use crate::kinds::Gender;
use crate::record::Record;
use crate::storage::Table;
use rusqlite::Row;
use rusqlite::types::ToSql;
use serde::{Deserialize, Serialize};

/// A stored user.
///
/// The email is unique but the surrogate id is the key everything else
/// references; emails are neither compact nor a natural lookup for logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Centimetres
    pub height: Option<f64>,
    pub email: String,
    /// bcrypt hash, never the plain password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl Record for User {
    const TABLE: Table = Table::Users;
    const COLUMNS: &'static [&'static str] = &[
        "id", "name", "age", "gender", "weight", "height", "email", "password",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            weight: row.get(4)?,
            height: row.get(5)?,
            email: row.get(6)?,
            password_hash: row.get(7)?,
        })
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        let values: [&dyn ToSql; 7] = [
            &self.name,
            &self.age,
            &self.gender,
            &self.weight,
            &self.height,
            &self.email,
            &self.password_hash,
        ];
        values.to_vec()
    }
}

/// A user to be created. The password is hashed by the store on insert.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Create a new user with the required fields
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age: None,
            gender: None,
            weight: None,
            height: None,
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Set body measurements (kg, cm)
    pub fn with_body(mut self, weight: f64, height: f64) -> Self {
        self.weight = Some(weight);
        self.height = Some(height);
        self
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("age", &self.age)
            .field("gender", &self.gender)
            .field("weight", &self.weight)
            .field("height", &self.height)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
