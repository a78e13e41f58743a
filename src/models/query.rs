//! Row filters and ordering, encoded as PostgREST-style query parameters.
//!
//! `id=eq.3`, `id=gt.0`, `order=id.asc`.

use std::fmt;

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
        }
    }

    /// SQL comparison operator, padded for query building.
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => " = ",
            FilterOp::Gt => " > ",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(FilterOp::Eq),
            "gt" => Some(FilterOp::Gt),
            _ => None,
        }
    }
}

/// A `column op value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.to_string(),
        }
    }

    pub fn gt(column: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Gt,
            value: value.to_string(),
        }
    }

    /// Parse a query pair such as `("id", "eq.3")`.
    pub fn parse(column: &str, raw: &str) -> Option<Self> {
        let (op, value) = raw.split_once('.')?;
        Some(Self {
            column: column.to_string(),
            op: FilterOp::parse(op)?,
            value: value.to_string(),
        })
    }

    pub fn to_param(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.op.as_str(), self.value),
        )
    }
}

/// Ordering of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Parse `id.asc` / `id.desc`; a bare column sorts ascending.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.rsplit_once('.') {
            Some((column, "asc")) => Some(Self::asc(column)),
            Some((column, "desc")) => Some(Self::desc(column)),
            Some(_) => None,
            None if !raw.is_empty() => Some(Self::asc(raw)),
            None => None,
        }
    }

    pub fn to_param(&self) -> (String, String) {
        let direction = if self.ascending { "asc" } else { "desc" };
        ("order".to_string(), format!("{}.{}", self.column, direction))
    }
}

/// Query parameters understood by the store, split into filters and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl RowQuery {
    /// Build from raw query pairs. `select` is accepted and ignored (every
    /// column is always returned).
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut query = RowQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "select" => {}
                "order" => {
                    let order = Order::parse(value)
                        .ok_or_else(|| format!("invalid order: {}", value))?;
                    query.order = Some(order);
                }
                column => {
                    let filter = Filter::parse(column, value)
                        .ok_or_else(|| format!("invalid filter: {}={}", column, value))?;
                    query.filters.push(filter);
                }
            }
        }
        Ok(query)
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self.filters.iter().map(Filter::to_param).collect();
        if let Some(order) = &self.order {
            pairs.push(order.to_param());
        }
        pairs
    }
}
