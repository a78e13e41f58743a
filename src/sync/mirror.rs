use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{BusyGate, BusyGuard, Notification, Notifier, Phase, SyncError};

/// Local copy of a remote collection.
///
/// The contents are only ever replaced wholesale by [`reload`](Mirror::reload);
/// [`mutate`](Mirror::mutate) performs one remote write and then reloads, so the
/// mirror never holds a locally computed post-write state. Readers get cheap
/// `Arc` snapshots; a failed load or write leaves the current snapshot in place.
pub struct Mirror<T> {
    label: String,
    items: Mutex<Arc<Vec<T>>>,
    loading: AtomicBool,
    gate: BusyGate,
    notifier: Arc<dyn Notifier>,
}

impl<T: Send + Sync> Mirror<T> {
    /// `label` names the collection in load-failure messages ("Failed to load {label}").
    pub fn new(label: impl Into<String>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            label: label.into(),
            items: Mutex::new(Arc::new(Vec::new())),
            loading: AtomicBool::new(false),
            gate: BusyGate::new(),
            notifier,
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Enter the busy state for a multi-step operation that manages its own writes.
    pub fn begin(&self) -> Result<BusyGuard<'_>, SyncError> {
        self.gate.try_enter()
    }

    /// Replace the contents with a fresh fetch from the store.
    ///
    /// On failure the error is logged and reported, and the previous contents stay.
    pub async fn reload<F, Fut, E>(&self, fetch: F) -> Result<Arc<Vec<T>>, SyncError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        self.loading.store(true, Ordering::Release);
        let fetched = fetch().await;
        self.loading.store(false, Ordering::Release);

        match fetched {
            Ok(items) => {
                let items = Arc::new(items);
                *self.items.lock().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&items);
                tracing::debug!("Reloaded {} ({} items)", self.label, items.len());
                Ok(items)
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", self.label, e);
                self.notifier
                    .notify(Notification::error(format!("Failed to load {}", self.label)));
                Err(SyncError::Load(e.to_string()))
            }
        }
    }

    /// Perform one remote write, then reload, all while busy.
    ///
    /// Fails with [`SyncError::Busy`] without calling `write` if another
    /// mutation is in flight. If `write` fails, the failure is reported as
    /// "{action} failed: {error}" and no reload happens.
    pub async fn mutate<W, WFut, F, FFut, E1, E2>(
        &self,
        action: &str,
        write: W,
        fetch: F,
    ) -> Result<(), SyncError>
    where
        W: FnOnce() -> WFut,
        WFut: Future<Output = Result<(), E1>>,
        E1: Display,
        F: FnOnce() -> FFut,
        FFut: Future<Output = Result<Vec<T>, E2>>,
        E2: Display,
    {
        let _busy = self.gate.try_enter()?;

        if let Err(e) = write().await {
            return Err(self.write_failed(action, e));
        }

        self.reload(fetch).await.map(|_| ())
    }

    /// Edit the contents locally. Reserved for display hints that the next
    /// reload supersedes.
    pub fn patch(&self, edit: impl FnOnce(&mut Vec<T>))
    where
        T: Clone,
    {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        edit(Arc::make_mut(&mut items));
    }

    /// Log and report a failed write as "{action} failed: {error}".
    pub fn write_failed(&self, action: &str, error: impl Display) -> SyncError {
        tracing::error!("{} failed: {}", action, error);
        self.notifier
            .notify(Notification::error(format!("{} failed: {}", action, error)));
        SyncError::Mutation(error.to_string())
    }
}
