//! Database repository for golfer and settings operations.
//!
//! Uses bound parameters throughout; batch inserts run in one transaction.

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{Filter, Golfer, NewGolfer, Order, Settings};

/// Columns of the golfers table that filters and ordering may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GolferColumn {
    Id,
    Name,
    Salary,
}

impl GolferColumn {
    fn parse(column: &str) -> Result<Self, AppError> {
        match column {
            "id" => Ok(GolferColumn::Id),
            "name" => Ok(GolferColumn::Name),
            "salary" => Ok(GolferColumn::Salary),
            other => Err(AppError::BadRequest(format!(
                "Unknown column golfers.{}",
                other
            ))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            GolferColumn::Id => "id",
            GolferColumn::Name => "name",
            GolferColumn::Salary => "salary",
        }
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== GOLFER OPERATIONS ====================

    /// Select golfers matching every filter, ordered by `order` (ascending id by default).
    pub async fn select_golfers(
        &self,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Golfer>, AppError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name, salary FROM golfers");
        push_filters(&mut builder, filters)?;

        let (column, ascending) = match order {
            Some(order) => (GolferColumn::parse(&order.column)?, order.ascending),
            None => (GolferColumn::Id, true),
        };
        builder.push(" ORDER BY ");
        builder.push(column.as_str());
        builder.push(if ascending { " ASC" } else { " DESC" });

        let rows = builder.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(golfer_from_row).collect())
    }

    /// Insert a batch of golfers as a unit. Either every row is written or none is.
    pub async fn insert_golfers(&self, golfers: &[NewGolfer]) -> Result<Vec<Golfer>, AppError> {
        if golfers.is_empty() {
            return Err(AppError::Validation("No rows to insert".to_string()));
        }
        if let Some(position) = golfers.iter().position(|g| g.name.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "Row {}: name must not be empty",
                position + 1
            )));
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(golfers.len());

        for golfer in golfers {
            let salary = golfer.stored_salary();
            let result =
                sqlx::query("INSERT INTO golfers (name, salary, created_at) VALUES (?, ?, ?)")
                    .bind(&golfer.name)
                    .bind(salary)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;

            inserted.push(Golfer {
                id: result.last_insert_rowid(),
                name: golfer.name.clone(),
                salary,
            });
        }

        tx.commit().await?;

        tracing::debug!("Inserted {} golfers", inserted.len());
        Ok(inserted)
    }

    /// Delete golfers matching every filter. At least one filter is required.
    pub async fn delete_golfers(&self, filters: &[Filter]) -> Result<u64, AppError> {
        if filters.is_empty() {
            return Err(AppError::BadRequest(
                "DELETE requires at least one filter".to_string(),
            ));
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM golfers");
        push_filters(&mut builder, filters)?;

        let result = builder.build().execute(&self.pool).await?;
        tracing::debug!("Deleted {} golfers", result.rows_affected());
        Ok(result.rows_affected())
    }

    // ==================== SETTINGS OPERATIONS ====================

    /// Get every stored setting.
    pub async fn list_settings(&self) -> Result<Settings, AppError> {
        let rows = sqlx::query("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = Settings::default();
        for row in rows {
            settings.set(row.get::<String, _>("key"), row.get::<String, _>("value"));
        }
        Ok(settings)
    }

    /// Insert or replace a setting by key.
    pub async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filters: &[Filter],
) -> Result<(), AppError> {
    for (i, filter) in filters.iter().enumerate() {
        let column = GolferColumn::parse(&filter.column)?;
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(column.as_str());
        builder.push(filter.op.sql());

        match column {
            GolferColumn::Id => {
                let value: i64 = filter.value.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid integer for id: {}", filter.value))
                })?;
                builder.push_bind(value);
            }
            GolferColumn::Salary => {
                let value: f64 = filter.value.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid number for salary: {}", filter.value))
                })?;
                builder.push_bind(value);
            }
            GolferColumn::Name => {
                builder.push_bind(filter.value.clone());
            }
        }
    }
    Ok(())
}

// Helper functions for row conversion

fn golfer_from_row(row: &sqlx::sqlite::SqliteRow) -> Golfer {
    Golfer {
        id: row.get("id"),
        name: row.get("name"),
        salary: row.get("salary"),
    }
}
