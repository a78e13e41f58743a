//! Golfer model.

use serde::{Deserialize, Serialize};

use super::Record;

/// A golfer row as stored by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Golfer {
    pub id: i64,
    pub name: String,
    /// `None` when the submitted salary was not a number.
    #[serde(default)]
    pub salary: Option<f64>,
}

impl Record for Golfer {
    const TABLE: &'static str = "golfers";
    const ORDER_KEY: &'static str = "id";
}

/// Client-assigned fields of a golfer to insert. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGolfer {
    pub name: String,
    /// Omitted when the source row had no salary field; a NaN serializes as `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
}

impl NewGolfer {
    pub fn new(name: impl Into<String>, salary: f64) -> Self {
        Self {
            name: name.into(),
            salary: Some(salary),
        }
    }

    /// Salary as the store will persist it: non-finite values become null.
    pub fn stored_salary(&self) -> Option<f64> {
        self.salary.filter(|s| s.is_finite())
    }
}

/// Request body for an insert: either a single row or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InsertBody {
    Many(Vec<NewGolfer>),
    One(NewGolfer),
}

impl InsertBody {
    pub fn into_rows(self) -> Vec<NewGolfer> {
        match self {
            InsertBody::Many(rows) => rows,
            InsertBody::One(row) => vec![row],
        }
    }
}

/// Response body for a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: u64,
}
