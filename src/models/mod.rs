//! Data models shared by the admin pages and the backend serving them.
//!
//! These models match the JSON shapes the pages exchange with the store and
//! the admin API exactly.

mod background;
mod golfer;
mod query;
mod setting;

pub use background::*;
pub use golfer::*;
pub use query::*;
pub use setting::*;

use serde::{de::DeserializeOwned, Serialize};

/// A row type mirrored from a table of the remote store.
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Table the rows live in.
    const TABLE: &'static str;
    /// Column the natural ordering of the collection follows.
    const ORDER_KEY: &'static str;
}
