//! Key/value settings model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const FORM_TITLE: &str = "form_title";
pub const RULES: &str = "rules";
pub const BACKGROUND_IMAGE: &str = "background_image";

/// Flat settings map. Last write wins; no schema beyond string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, String>);

impl Settings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or the empty string when unset.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn form_title(&self) -> &str {
        self.value(FORM_TITLE)
    }

    pub fn rules(&self) -> &str {
        self.value(RULES)
    }

    pub fn background_image(&self) -> &str {
        self.value(BACKGROUND_IMAGE)
    }
}

/// Response body for `GET /settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: Settings,
}

/// Request body for `POST /settings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSettingRequest {
    pub key: String,
    #[serde(default)]
    pub value: String,
}
