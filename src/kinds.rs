//! Coded enumerations
//!
//! Several columns store small integer codes. Each code set is a named
//! enumeration here so the numeric meaning lives in one place:
//! - `Gender`: 1 = male, 2 = female, 3 = nonbinary
//! - `FoodCategory`: 1 = protein, 2 = carb, 3 = fat, 4 = veggie, 5 = fruit
//! - `ExerciseType`: 1 = cardio, 2 = strength, 3 = flexibility
//! - `Difficulty`: 1 = easy, 2 = medium, 3 = hard
//! - `GoalType`: 1 = sleep, 2 = nutrition, 3 = workout
//!
//! Values are written as their integer code and the schema's CHECK
//! constraints reject any other integer.

use crate::{Error, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Inclusive bounds of a sleep quality score
pub const SLEEP_QUALITY_MIN: i64 = 1;
pub const SLEEP_QUALITY_MAX: i64 = 5;

/// Longest workout a definition may declare, in hours
pub const MAX_WORKOUT_HOURS: i64 = 3;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $label:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $code,
            )+
        }

        impl $name {
            /// The integer code stored in the database
            pub fn code(self) -> i64 {
                self as i64
            }

            /// Look up a variant by its stored code
            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Get the string representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Get all variants in code order
            pub fn all() -> &'static [$name] {
                &[ $( $name::$variant, )+ ]
            }

            /// All valid codes, for CHECK constraint rendering
            pub fn codes() -> &'static [i64] {
                &[ $( $code, )+ ]
            }
        }

        impl FromStr for $name {
            type Err = Error;

            /// Accepts either the label (or an alias) or the numeric code
            fn from_str(s: &str) -> Result<Self> {
                let lowered = s.trim().to_lowercase();
                if let Ok(code) = lowered.parse::<i64>() {
                    return $name::from_code(code).ok_or_else(|| {
                        Error::InvalidValue(format!("Unknown {} code: {}", stringify!($name), code))
                    });
                }
                match lowered.as_str() {
                    $( $label $(| $alias)* => Ok($name::$variant), )+
                    _ => Err(Error::InvalidValue(format!("Unknown {}: {}", stringify!($name), s))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::Owned(Value::Integer(self.code())))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let code = value.as_i64()?;
                $name::from_code(code).ok_or(FromSqlError::OutOfRange(code))
            }
        }
    };
}

coded_enum! {
    /// Gender as recorded on a user profile
    Gender {
        Male = 1 => "male" | "m",
        Female = 2 => "female" | "f",
        Nonbinary = 3 => "nonbinary" | "non-binary" | "nb",
    }
}

coded_enum! {
    /// Food catalog category
    FoodCategory {
        Protein = 1 => "protein",
        Carb = 2 => "carb" | "carbs" | "carbohydrate",
        Fat = 3 => "fat",
        Veggie = 4 => "veggie" | "vegetable",
        Fruit = 5 => "fruit",
    }
}

coded_enum! {
    /// What a workout trains
    ExerciseType {
        Cardio = 1 => "cardio",
        Strength = 2 => "strength",
        Flexibility = 3 => "flexibility" | "mobility",
    }
}

coded_enum! {
    /// Perceived workout difficulty
    Difficulty {
        Easy = 1 => "easy",
        Medium = 2 => "medium",
        Hard = 3 => "hard",
    }
}

coded_enum! {
    /// Area a goal belongs to, used for filtering and reporting
    GoalType {
        Sleep = 1 => "sleep",
        Nutrition = 2 => "nutrition" | "food",
        Workout = 3 => "workout" | "fitness",
    }
}
