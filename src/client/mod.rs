//! Bindings to the collaborators the admin pages call: the table store and the
//! settings/backgrounds admin API.
//!
//! Both are traits so the page controllers can run against the HTTP
//! implementations here or any other store with the same contract.

mod admin;
mod store;

pub use admin::*;
pub use store::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{BackgroundImage, Filter, Order, Record, RowQuery, Settings};

/// One row as exchanged with the store: field name to scalar value.
pub type Row = serde_json::Map<String, Value>;

/// Errors returned by the collaborator bindings.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The collaborator answered with an error; `message` is its error text.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// A response or row did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: String,
    pub query: RowQuery,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            query: RowQuery::default(),
        }
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        let column = column.into();
        self.query.order = Some(if ascending {
            Order::asc(column)
        } else {
            Order::desc(column)
        });
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.query.filters.push(Filter::eq(column, value));
        self
    }

    pub fn gt(mut self, column: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.query.filters.push(Filter::gt(column, value));
        self
    }
}

/// A filtered delete against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub table: String,
    pub filters: Vec<Filter>,
}

impl Delete {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn gt(mut self, column: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.filters.push(Filter::gt(column, value));
        self
    }
}

/// Table-oriented remote store: select, insert and filtered delete.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, select: &Select) -> Result<Vec<Row>, ClientError>;

    /// Insert every row in one request; the store accepts or rejects the batch as a unit.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), ClientError>;

    async fn delete(&self, delete: &Delete) -> Result<(), ClientError>;
}

/// An image file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Settings and background-image admin API.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn get_settings(&self) -> Result<Settings, ClientError>;

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), ClientError>;

    async fn list_backgrounds(&self) -> Result<Vec<BackgroundImage>, ClientError>;

    async fn upload_background(&self, image: ImageUpload) -> Result<BackgroundImage, ClientError>;

    async fn delete_background(&self, key: &str) -> Result<(), ClientError>;
}

/// Select every row of `T`'s table in its natural order and decode it.
pub async fn fetch_records<T: Record>(store: &dyn TableStore) -> Result<Vec<T>, ClientError> {
    let rows = store
        .select(&Select::from(T::TABLE).order(T::ORDER_KEY, true))
        .await?;
    rows.into_iter().map(from_row).collect()
}

/// Encode a value as a store row. Only JSON objects are rows.
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row, ClientError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(ClientError::Decode(format!("not a row: {}", other))),
        Err(e) => Err(ClientError::Decode(e.to_string())),
    }
}

/// Decode a store row.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, ClientError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| ClientError::Decode(e.to_string()))
}
