//! Background image model.

use serde::{Deserialize, Serialize};

/// An uploaded background image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    /// Blob identifier assigned by the store.
    pub key: String,
    pub public_url: String,
}

/// Response body for `GET /backgrounds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundsResponse {
    pub backgrounds: Vec<BackgroundImage>,
}

/// Request body for `POST /backgrounds/delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBackgroundRequest {
    pub key: String,
}
