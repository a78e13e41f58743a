//! HTTP binding to the table store.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;

use super::{ClientError, Delete, Row, Select, TableStore};
use crate::errors::ErrorResponse;

/// Table store reached over HTTP at `{base_url}/{table}`.
#[derive(Debug, Clone)]
pub struct HttpTableStore {
    client: Client,
    base_url: String,
}

impl HttpTableStore {
    /// `base_url` is the store root, for example `http://localhost:8080/api/rest`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }
}

#[async_trait]
impl TableStore for HttpTableStore {
    async fn select(&self, select: &Select) -> Result<Vec<Row>, ClientError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(select.query.to_pairs());

        let response = self
            .client
            .get(self.table_url(&select.table))
            .query(&params)
            .send()
            .await?;

        let rows: Vec<Value> = ensure_success(response).await?.json().await?;
        rows.into_iter()
            .map(|row| match row {
                Value::Object(row) => Ok(row),
                other => Err(ClientError::Decode(format!("not a row: {}", other))),
            })
            .collect()
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), ClientError> {
        tracing::debug!("Inserting {} rows into {}", rows.len(), table);
        let response = self
            .client
            .post(self.table_url(table))
            .json(&rows)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, delete: &Delete) -> Result<(), ClientError> {
        let params: Vec<(String, String)> = delete.filters.iter().map(|f| f.to_param()).collect();
        let response = self
            .client
            .delete(self.table_url(&delete.table))
            .query(&params)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

/// Pass a 2xx response through; turn anything else into [`ClientError::Api`]
/// carrying the `{error}` text of the body when there is one.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => envelope.error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.to_string(),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
