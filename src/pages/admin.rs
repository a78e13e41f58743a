//! Form settings page: title, rules text and the background image gallery.

use std::sync::{Arc, Mutex, PoisonError};

use crate::client::{AdminApi, ClientError, ImageUpload};
use crate::models::{BackgroundImage, Settings, BACKGROUND_IMAGE, FORM_TITLE, RULES};
use crate::sync::{Confirm, Mirror, Notification, Notifier, Phase, SyncError};

pub const CONFIRM_DELETE_IMAGE: &str = "Really delete this image?";

/// Key of the gallery entry whose URL is the persisted `background_image`.
///
/// Derived on demand and never stored: an unset setting or a URL that matches
/// no entry gives `None` without touching the setting.
pub fn resolve_active_key<'a>(
    gallery: &'a [BackgroundImage],
    background_image: &str,
) -> Option<&'a str> {
    if background_image.is_empty() {
        return None;
    }
    gallery
        .iter()
        .find(|image| image.public_url == background_image)
        .map(|image| image.key.as_str())
}

#[derive(Debug, Default)]
struct Drafts {
    form_title: String,
    rules: String,
    image: Option<ImageUpload>,
    /// Gallery entry the user picked; overrides the derived active image.
    picked: Option<BackgroundImage>,
}

/// Controller for the form settings page.
pub struct AdminPage {
    api: Arc<dyn AdminApi>,
    confirm: Arc<dyn Confirm>,
    settings: Mutex<Settings>,
    gallery: Mirror<BackgroundImage>,
    drafts: Mutex<Drafts>,
}

impl AdminPage {
    pub fn new(
        api: Arc<dyn AdminApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            confirm,
            settings: Mutex::new(Settings::default()),
            gallery: Mirror::new("admin data", notifier),
            drafts: Mutex::new(Drafts::default()),
        }
    }

    fn drafts(&self) -> std::sync::MutexGuard<'_, Drafts> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, notification: Notification) {
        self.gallery.notifier().notify(notification);
    }

    /// Settings as last loaded or saved.
    pub fn settings(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Uploaded images, newest first.
    pub fn gallery(&self) -> Arc<Vec<BackgroundImage>> {
        self.gallery.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.gallery.is_loading()
    }

    /// `Busy` while an upload or delete is in flight.
    pub fn phase(&self) -> Phase {
        self.gallery.phase()
    }

    /// Key of the persisted background, derived from the settings and gallery.
    pub fn active_key(&self) -> Option<String> {
        let settings = self.settings();
        resolve_active_key(&self.gallery(), settings.background_image()).map(str::to_string)
    }

    /// The image the gallery shows as selected: the user's pick, else the active one.
    pub fn selection(&self) -> Option<BackgroundImage> {
        if let Some(picked) = self.drafts().picked.clone() {
            return Some(picked);
        }
        let key = self.active_key()?;
        self.gallery().iter().find(|image| image.key == key).cloned()
    }

    pub fn form_title(&self) -> String {
        self.drafts().form_title.clone()
    }

    pub fn set_form_title(&self, title: impl Into<String>) {
        self.drafts().form_title = title.into();
    }

    pub fn rules(&self) -> String {
        self.drafts().rules.clone()
    }

    /// Change callback for the rules editor.
    pub fn set_rules(&self, rules: impl Into<String>) {
        self.drafts().rules = rules.into();
    }

    pub fn choose_image(&self, image: Option<ImageUpload>) {
        self.drafts().image = image;
    }

    pub fn chosen_image(&self) -> Option<ImageUpload> {
        self.drafts().image.clone()
    }

    /// Pick a gallery entry. Returns false if no entry has `key`.
    pub fn select_background(&self, key: &str) -> bool {
        let found = self.gallery().iter().find(|image| image.key == key).cloned();
        let selected = found.is_some();
        if selected {
            self.drafts().picked = found;
        }
        selected
    }

    /// Load settings and the gallery. Drafts are reset to the loaded values.
    pub async fn load_all(&self) -> Result<(), SyncError> {
        let loaded = Mutex::new(None);
        let (api, slot) = (self.api.as_ref(), &loaded);
        self.gallery
            .reload(|| async move {
                let settings = api.get_settings().await?;
                let backgrounds = api.list_backgrounds().await?;
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings);
                Ok::<_, ClientError>(backgrounds)
            })
            .await?;

        if let Some(settings) = loaded.into_inner().unwrap_or_else(PoisonError::into_inner) {
            let mut drafts = self.drafts();
            drafts.form_title = settings.form_title().to_string();
            drafts.rules = settings.rules().to_string();
            drafts.picked = None;
            *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;
        }
        Ok(())
    }

    /// Persist one setting, reporting "Saved!" or the failure.
    pub async fn save_setting(&self, key: &str, value: &str) -> Result<(), SyncError> {
        match self.api.save_setting(key, value).await {
            Ok(()) => {
                self.settings
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set(key, value);
                tracing::info!("Saved setting {}", key);
                self.notify(Notification::info("Saved!"));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Saving setting {} failed: {}", key, e);
                self.notify(Notification::error(format!("Save failed: {}", e)));
                Err(SyncError::Mutation(e.to_string()))
            }
        }
    }

    pub async fn save_form_title(&self) -> Result<(), SyncError> {
        let title = self.form_title();
        self.save_setting(FORM_TITLE, &title).await
    }

    pub async fn save_rules(&self) -> Result<(), SyncError> {
        let rules = self.rules();
        self.save_setting(RULES, &rules).await
    }

    /// Upload the chosen image, show it first in the gallery, select it and
    /// make it the background.
    pub async fn upload_background(&self) -> Result<(), SyncError> {
        let Some(image) = self.chosen_image() else {
            let reason = "Pick a file first";
            self.notify(Notification::warning(reason));
            return Err(SyncError::Skipped(reason.to_string()));
        };

        let _busy = self.gallery.begin()?;
        let file_name = image.file_name.clone();
        let uploaded = match self.api.upload_background(image).await {
            Ok(uploaded) => uploaded,
            Err(e) => return Err(self.gallery.write_failed("Upload", e)),
        };
        tracing::info!("Uploaded {} as {}", file_name, uploaded.key);

        // Shown first until the next load.
        self.gallery.patch(|gallery| gallery.insert(0, uploaded.clone()));
        {
            let mut drafts = self.drafts();
            drafts.image = None;
            drafts.picked = Some(uploaded.clone());
        }

        self.save_setting(BACKGROUND_IMAGE, &uploaded.public_url).await
    }

    /// Persist the selected image as the background.
    pub async fn apply_selected_background(&self) -> Result<(), SyncError> {
        let Some(selected) = self.selection() else {
            let reason = "Select one first";
            self.notify(Notification::warning(reason));
            return Err(SyncError::Skipped(reason.to_string()));
        };
        self.save_setting(BACKGROUND_IMAGE, &selected.public_url).await
    }

    /// Delete the selected image.
    pub async fn delete_selected(&self) -> Result<(), SyncError> {
        let Some(selected) = self.selection() else {
            let reason = "Select one to delete";
            self.notify(Notification::warning(reason));
            return Err(SyncError::Skipped(reason.to_string()));
        };
        self.delete_background(&selected.key).await
    }

    /// Delete an image after confirmation. If it was the active background,
    /// the background setting is cleared as well.
    pub async fn delete_background(&self, key: &str) -> Result<(), SyncError> {
        let _busy = self.gallery.begin()?;
        if !self.confirm.confirm(CONFIRM_DELETE_IMAGE) {
            return Err(SyncError::Declined);
        }

        if let Err(e) = self.api.delete_background(key).await {
            return Err(self.gallery.write_failed("Delete", e));
        }

        let was_active = self.active_key().as_deref() == Some(key);
        self.gallery.patch(|gallery| gallery.retain(|image| image.key != key));
        {
            let mut drafts = self.drafts();
            if drafts.picked.as_ref().is_some_and(|picked| picked.key == key) {
                drafts.picked = None;
            }
        }

        let cleared = if was_active {
            self.save_setting(BACKGROUND_IMAGE, "").await
        } else {
            Ok(())
        };

        self.notify(Notification::info("Deleted!"));
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::NotificationQueue;
    use crate::testing::{confirm_with, MemoryAdminApi};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn image(key: &str, url: &str) -> BackgroundImage {
        BackgroundImage {
            key: key.to_string(),
            public_url: url.to_string(),
        }
    }

    struct Harness {
        page: AdminPage,
        api: Arc<MemoryAdminApi>,
        queue: Arc<NotificationQueue>,
    }

    async fn loaded(api: MemoryAdminApi, answer: bool) -> Harness {
        let api = Arc::new(api);
        let queue = Arc::new(NotificationQueue::new());
        let page = AdminPage::new(api.clone(), queue.clone(), confirm_with(answer));
        page.load_all().await.unwrap();
        Harness { page, api, queue }
    }

    #[test]
    fn test_resolve_active_key() {
        let gallery = vec![image("a", "u1")];
        assert_eq!(resolve_active_key(&gallery, "u1"), Some("a"));
        assert_eq!(resolve_active_key(&gallery, "u2"), None);
        assert_eq!(resolve_active_key(&gallery, ""), None);
        assert_eq!(resolve_active_key(&[], "u1"), None);
    }

    #[tokio::test]
    async fn test_load_all_fills_drafts_and_derives_active() {
        let api = MemoryAdminApi::with_state(
            &[
                ("form_title", "Spring Open"),
                ("rules", "<p>Play fair</p>"),
                ("background_image", "u1"),
            ],
            &[("a", "u1"), ("b", "u2")],
        );
        let h = loaded(api, true).await;

        assert_eq!(h.page.form_title(), "Spring Open");
        assert_eq!(h.page.rules(), "<p>Play fair</p>");
        assert_eq!(h.page.gallery().len(), 2);
        assert_eq!(h.page.active_key().as_deref(), Some("a"));
        assert_eq!(h.page.selection().unwrap().key, "a");
    }

    #[tokio::test]
    async fn test_unmatched_background_leaves_selection_empty() {
        let api = MemoryAdminApi::with_state(&[("background_image", "u2")], &[("a", "u1")]);
        let h = loaded(api, true).await;

        assert_eq!(h.page.active_key(), None);
        assert!(h.page.selection().is_none());
        assert_eq!(h.api.stored("background_image").as_deref(), Some("u2"));
        assert!(h.api.saves().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_reports_and_keeps_state() {
        let api = Arc::new(MemoryAdminApi::new());
        let queue = Arc::new(NotificationQueue::new());
        let page = AdminPage::new(api.clone(), queue.clone(), confirm_with(true));
        api.fail_next("boom");

        assert!(matches!(page.load_all().await, Err(SyncError::Load(_))));
        assert_eq!(queue.messages(), vec!["Failed to load admin data"]);
        assert!(page.gallery().is_empty());
    }

    #[tokio::test]
    async fn test_save_title_and_rules() {
        let h = loaded(MemoryAdminApi::new(), true).await;
        h.page.set_form_title("Fall Classic");
        h.page.set_rules("<strong>No mulligans</strong>");

        h.page.save_form_title().await.unwrap();
        h.page.save_rules().await.unwrap();

        assert_eq!(h.api.stored("form_title").as_deref(), Some("Fall Classic"));
        assert_eq!(h.api.stored("rules").as_deref(), Some("<strong>No mulligans</strong>"));
        assert_eq!(h.queue.messages(), vec!["Saved!", "Saved!"]);
    }

    #[tokio::test]
    async fn test_failed_save_reports_error_text() {
        let h = loaded(MemoryAdminApi::new(), true).await;
        h.api.fail_next("read-only");

        let err = h.page.save_setting("form_title", "x").await.unwrap_err();

        assert_eq!(err, SyncError::Mutation("read-only".to_string()));
        assert_eq!(h.queue.messages(), vec!["Save failed: read-only"]);
        assert_eq!(h.page.settings().form_title(), "");
    }

    #[tokio::test]
    async fn test_upload_prepends_selects_and_saves() {
        let api = MemoryAdminApi::with_state(&[], &[("a", "u1")]);
        let h = loaded(api, true).await;
        h.page.choose_image(Some(ImageUpload {
            file_name: "green.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }));

        h.page.upload_background().await.unwrap();

        let gallery = h.page.gallery();
        assert_eq!(gallery[0].key, "0-green.png");
        assert_eq!(gallery[1].key, "a");
        assert!(h.page.chosen_image().is_none());
        assert_eq!(h.page.selection().unwrap().key, "0-green.png");
        assert_eq!(h.page.active_key().as_deref(), Some("0-green.png"));
        assert_eq!(
            h.api.saves(),
            vec![(
                "background_image".to_string(),
                "https://cdn.test/0-green.png".to_string()
            )]
        );
        assert_eq!(h.page.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_skipped() {
        let h = loaded(MemoryAdminApi::new(), true).await;
        let calls = h.api.calls();

        let err = h.page.upload_background().await.unwrap_err();

        assert_eq!(err, SyncError::Skipped("Pick a file first".to_string()));
        assert_eq!(h.api.calls(), calls);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_gallery() {
        let h = loaded(MemoryAdminApi::with_state(&[], &[("a", "u1")]), true).await;
        let before = h.page.gallery();
        h.page.choose_image(Some(ImageUpload {
            file_name: "big.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; 4],
        }));
        h.api.fail_next("too large");

        h.page.upload_background().await.unwrap_err();

        assert!(Arc::ptr_eq(&before, &h.page.gallery()));
        assert!(h.page.chosen_image().is_some());
        assert_eq!(h.queue.messages(), vec!["Upload failed: too large"]);
    }

    #[tokio::test]
    async fn test_deleting_active_background_clears_setting() {
        let api = MemoryAdminApi::with_state(
            &[("background_image", "u1")],
            &[("a", "u1"), ("b", "u2")],
        );
        let h = loaded(api, true).await;

        h.page.delete_selected().await.unwrap();

        assert_eq!(h.api.background_keys(), vec!["b"]);
        assert_eq!(h.page.gallery().len(), 1);
        assert_eq!(
            h.api.saves(),
            vec![("background_image".to_string(), String::new())]
        );
        assert_eq!(h.api.stored("background_image").as_deref(), Some(""));
        assert!(h.page.selection().is_none());
        assert_eq!(h.queue.messages(), vec!["Saved!", "Deleted!"]);
    }

    #[tokio::test]
    async fn test_deleting_inactive_background_keeps_setting() {
        let api = MemoryAdminApi::with_state(
            &[("background_image", "u1")],
            &[("a", "u1"), ("b", "u2")],
        );
        let h = loaded(api, true).await;
        assert!(h.page.select_background("b"));

        h.page.delete_selected().await.unwrap();

        assert!(h.api.saves().is_empty());
        assert_eq!(h.page.active_key().as_deref(), Some("a"));
        assert_eq!(h.queue.messages(), vec!["Deleted!"]);
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let api = MemoryAdminApi::with_state(&[("background_image", "u1")], &[("a", "u1")]);
        let h = loaded(api, false).await;
        let calls = h.api.calls();

        assert_eq!(h.page.delete_selected().await.unwrap_err(), SyncError::Declined);
        assert_eq!(h.api.calls(), calls);
        assert_eq!(h.page.gallery().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_while_busy_is_refused_before_prompting() {
        let api = Arc::new(MemoryAdminApi::with_state(&[], &[("a", "u1")]));
        let prompts = Arc::new(AtomicUsize::new(0));
        let counter = prompts.clone();
        let confirm: Arc<dyn Confirm> = Arc::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let page = AdminPage::new(api.clone(), Arc::new(NotificationQueue::new()), confirm);
        page.load_all().await.unwrap();
        let calls = api.calls();

        let busy = page.gallery.begin().unwrap();
        assert_eq!(page.delete_background("a").await.unwrap_err(), SyncError::Busy);
        drop(busy);

        assert_eq!(prompts.load(Ordering::SeqCst), 0);
        assert_eq!(api.calls(), calls);
        assert_eq!(api.background_keys(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_apply_selected_background() {
        let api = MemoryAdminApi::with_state(&[], &[("a", "u1"), ("b", "u2")]);
        let h = loaded(api, true).await;

        let err = h.page.apply_selected_background().await.unwrap_err();
        assert_eq!(err, SyncError::Skipped("Select one first".to_string()));

        assert!(h.page.select_background("b"));
        assert!(!h.page.select_background("missing"));
        h.page.apply_selected_background().await.unwrap();

        assert_eq!(h.api.stored("background_image").as_deref(), Some("u2"));
        assert_eq!(h.page.active_key().as_deref(), Some("b"));
    }
}
