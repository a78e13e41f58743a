//! In-memory collaborators for controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{AdminApi, ClientError, Delete, ImageUpload, Row, Select, TableStore};
use crate::models::{BackgroundImage, Filter, FilterOp, Settings};
use crate::sync::Confirm;

/// A confirmation that always gives `answer`.
pub fn confirm_with(answer: bool) -> Arc<dyn Confirm> {
    Arc::new(move |_: &str| answer)
}

fn injected_failure(slot: &Mutex<Option<String>>) -> Result<(), ClientError> {
    match slot.lock().unwrap().take() {
        Some(message) => Err(ClientError::Api {
            status: 500,
            message,
        }),
        None => Ok(()),
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let Some(value) = row.get(&filter.column) else {
        return false;
    };
    let ordering = match value {
        Value::Number(n) => match (n.as_f64(), filter.value.parse::<f64>()) {
            (Some(a), Ok(b)) => a.partial_cmp(&b),
            _ => None,
        },
        Value::String(s) => Some(s.as_str().cmp(filter.value.as_str())),
        _ => None,
    };
    match (filter.op, ordering) {
        (FilterOp::Eq, Some(std::cmp::Ordering::Equal)) => true,
        (FilterOp::Gt, Some(std::cmp::Ordering::Greater)) => true,
        _ => false,
    }
}

/// Table store keeping rows in memory, assigning ascending integer ids.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    fail_next: Mutex<Option<String>>,
    insert_batches: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        }
    }

    /// Insert rows directly, bypassing call counting.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.lock().unwrap();
        let entries = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(mut row) = row {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                row.insert("id".to_string(), Value::from(id as i64));
                entries.push(row);
            }
        }
    }

    /// Make the next call fail with `message` as the store's error text.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Number of calls made through the [`TableStore`] interface.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Row count of each successful insert, in order.
    pub fn insert_batches(&self) -> Vec<usize> {
        self.insert_batches.lock().unwrap().clone()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, select: &Select) -> Result<Vec<Row>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;

        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Row> = tables
            .get(&select.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| select.query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &select.query.order {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).and_then(Value::as_f64).unwrap_or_default();
                let b = b.get(&order.column).and_then(Value::as_f64).unwrap_or_default();
                let ordering = a.total_cmp(&b);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;

        self.insert_batches.lock().unwrap().push(rows.len());
        self.seed(table, rows.into_iter().map(Value::Object).collect());
        Ok(())
    }

    async fn delete(&self, delete: &Delete) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;

        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(&delete.table) {
            rows.retain(|row| !delete.filters.iter().all(|f| matches(row, f)));
        }
        Ok(())
    }
}

/// Admin API keeping settings and images in memory.
#[derive(Default)]
pub struct MemoryAdminApi {
    settings: Mutex<Settings>,
    backgrounds: Mutex<Vec<BackgroundImage>>,
    saves: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    uploads: AtomicUsize,
    fail_next: Mutex<Option<String>>,
}

impl MemoryAdminApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(settings: &[(&str, &str)], backgrounds: &[(&str, &str)]) -> Self {
        let api = Self::new();
        for (key, value) in settings {
            api.settings.lock().unwrap().set(*key, *value);
        }
        *api.backgrounds.lock().unwrap() = backgrounds
            .iter()
            .map(|(key, url)| BackgroundImage {
                key: key.to_string(),
                public_url: url.to_string(),
            })
            .collect();
        api
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.settings.lock().unwrap().get(key).map(str::to_string)
    }

    /// Every successful `save_setting`, in order.
    pub fn saves(&self) -> Vec<(String, String)> {
        self.saves.lock().unwrap().clone()
    }

    pub fn background_keys(&self) -> Vec<String> {
        self.backgrounds
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.key.clone())
            .collect()
    }
}

#[async_trait]
impl AdminApi for MemoryAdminApi {
    async fn get_settings(&self) -> Result<Settings, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;
        self.settings.lock().unwrap().set(key, value);
        self.saves
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn list_backgrounds(&self) -> Result<Vec<BackgroundImage>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;
        Ok(self.backgrounds.lock().unwrap().clone())
    }

    async fn upload_background(&self, image: ImageUpload) -> Result<BackgroundImage, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;

        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        let key = format!("{}-{}", n, image.file_name);
        let uploaded = BackgroundImage {
            public_url: format!("https://cdn.test/{}", key),
            key,
        };
        self.backgrounds.lock().unwrap().push(uploaded.clone());
        Ok(uploaded)
    }

    async fn delete_background(&self, key: &str) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        injected_failure(&self.fail_next)?;

        let mut backgrounds = self.backgrounds.lock().unwrap();
        let before = backgrounds.len();
        backgrounds.retain(|b| b.key != key);
        if backgrounds.len() == before {
            return Err(ClientError::Api {
                status: 404,
                message: format!("Background {} not found", key),
            });
        }
        Ok(())
    }
}
