//! Golfer roster page: list, add, delete, CSV import and clear-all.

use std::sync::{Arc, Mutex, PoisonError};

use crate::client::{fetch_records, to_row, ClientError, Delete, Row, TableStore};
use crate::import::{coerce_number, ImportPolicy};
use crate::models::{Golfer, NewGolfer, Record};
use crate::sync::{Confirm, Mirror, Notification, Notifier, Phase, SyncError};

pub const CONFIRM_DELETE_GOLFER: &str = "Are you sure you want to delete this golfer?";
pub const CONFIRM_CLEAR_ALL: &str = "This will delete ALL golfers. Continue?";

/// A roster file chosen for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub name: String,
    pub text: String,
}

/// Contents of the add-golfer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GolferDraft {
    pub name: String,
    pub salary: String,
}

/// Controller for the golfer roster page.
pub struct RosterPage {
    store: Arc<dyn TableStore>,
    confirm: Arc<dyn Confirm>,
    golfers: Mirror<Golfer>,
    policy: ImportPolicy,
    draft: Mutex<GolferDraft>,
    csv_file: Mutex<Option<CsvFile>>,
}

impl RosterPage {
    pub fn new(
        store: Arc<dyn TableStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            store,
            confirm,
            golfers: Mirror::new("golfers", notifier),
            policy: ImportPolicy::default(),
            draft: Mutex::new(GolferDraft::default()),
            csv_file: Mutex::new(None),
        }
    }

    /// Use `policy` for CSV imports instead of the permissive default.
    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.policy
    }

    /// Golfers as last loaded, ascending by id.
    pub fn golfers(&self) -> Arc<Vec<Golfer>> {
        self.golfers.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.golfers.is_loading()
    }

    pub fn phase(&self) -> Phase {
        self.golfers.phase()
    }

    pub fn draft(&self) -> GolferDraft {
        self.draft
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_draft(&self, name: impl Into<String>, salary: impl Into<String>) {
        *self.draft.lock().unwrap_or_else(PoisonError::into_inner) = GolferDraft {
            name: name.into(),
            salary: salary.into(),
        };
    }

    pub fn csv_file(&self) -> Option<CsvFile> {
        self.csv_file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn choose_csv(&self, file: Option<CsvFile>) {
        *self.csv_file.lock().unwrap_or_else(PoisonError::into_inner) = file;
    }

    async fn fetch(&self) -> Result<Vec<Golfer>, ClientError> {
        fetch_records(self.store.as_ref()).await
    }

    /// Load every golfer from the store.
    pub async fn load(&self) -> Result<(), SyncError> {
        self.golfers.reload(|| self.fetch()).await.map(|_| ())
    }

    async fn insert(&self, golfers: &[NewGolfer]) -> Result<(), ClientError> {
        let rows = golfers.iter().map(to_row).collect::<Result<Vec<Row>, _>>()?;
        self.store.insert(Golfer::TABLE, rows).await
    }

    /// Insert the golfer in the add form, then clear the form.
    pub async fn add_golfer(&self) -> Result<(), SyncError> {
        let draft = self.draft();
        let name = draft.name.trim();
        if name.is_empty() || draft.salary.is_empty() {
            let reason = "Name and salary are required";
            self.golfers.notifier().notify(Notification::warning(reason));
            return Err(SyncError::Skipped(reason.to_string()));
        }

        let golfer = NewGolfer::new(name, coerce_number(&draft.salary));
        let result = self
            .golfers
            .mutate(
                "Insert",
                || self.insert(std::slice::from_ref(&golfer)),
                || self.fetch(),
            )
            .await;

        if !matches!(result, Err(SyncError::Mutation(_) | SyncError::Busy)) {
            self.set_draft("", "");
        }
        result
    }

    /// Delete one golfer after confirmation.
    pub async fn delete_golfer(&self, id: i64) -> Result<(), SyncError> {
        if self.golfers.is_busy() {
            return Err(SyncError::Busy);
        }
        if !self.confirm.confirm(CONFIRM_DELETE_GOLFER) {
            return Err(SyncError::Declined);
        }

        let delete = Delete::from(Golfer::TABLE).eq("id", id);
        self.golfers
            .mutate("Delete", || self.store.delete(&delete), || self.fetch())
            .await
    }

    /// Import the chosen CSV file as one bulk insert.
    pub async fn import_csv(&self) -> Result<(), SyncError> {
        let Some(file) = self.csv_file() else {
            let reason = "Choose a CSV file first";
            self.golfers.notifier().notify(Notification::warning(reason));
            return Err(SyncError::Skipped(reason.to_string()));
        };

        let golfers = match self.policy.parse(&file.text) {
            Ok(golfers) => golfers,
            Err(errors) => {
                let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
                let reason = format!("{}: {}", file.name, lines.join("; "));
                self.golfers
                    .notifier()
                    .notify(Notification::warning(reason.clone()));
                return Err(SyncError::Skipped(reason));
            }
        };
        if golfers.is_empty() {
            let reason = format!("{} contains no golfers", file.name);
            self.golfers
                .notifier()
                .notify(Notification::warning(reason.clone()));
            return Err(SyncError::Skipped(reason));
        }

        tracing::info!("Importing {} golfers from {}", golfers.len(), file.name);
        let result = self
            .golfers
            .mutate("CSV upload", || self.insert(&golfers), || self.fetch())
            .await;

        if !matches!(result, Err(SyncError::Mutation(_) | SyncError::Busy)) {
            self.choose_csv(None);
        }
        result
    }

    /// Delete every golfer after confirmation.
    pub async fn clear_all(&self) -> Result<(), SyncError> {
        if self.golfers.is_busy() {
            return Err(SyncError::Busy);
        }
        if !self.confirm.confirm(CONFIRM_CLEAR_ALL) {
            return Err(SyncError::Declined);
        }

        let delete = Delete::from(Golfer::TABLE).gt("id", 0);
        self.golfers
            .mutate("Clear all", || self.store.delete(&delete), || self.fetch())
            .await
    }
}
