//! HTTP binding to the settings and background-image admin API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::store::ensure_success;
use super::{AdminApi, ClientError, ImageUpload};
use crate::models::{
    BackgroundImage, BackgroundsResponse, DeleteBackgroundRequest, SaveSettingRequest, Settings,
    SettingsResponse,
};

/// Multipart field name the upload endpoint reads.
const IMAGE_FIELD: &str = "image";

/// Admin API reached over HTTP under `{base_url}/settings` and `{base_url}/backgrounds`.
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
}

impl HttpAdminApi {
    /// `base_url` is the admin root, for example `http://localhost:8080/api/admin`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn get_settings(&self) -> Result<Settings, ClientError> {
        let response = self.client.get(self.url("/settings")).send().await?;
        let body: SettingsResponse = ensure_success(response).await?.json().await?;
        Ok(body.settings)
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let request = SaveSettingRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        let response = self
            .client
            .post(self.url("/settings"))
            .json(&request)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn list_backgrounds(&self) -> Result<Vec<BackgroundImage>, ClientError> {
        let response = self.client.get(self.url("/backgrounds")).send().await?;
        let body: BackgroundsResponse = ensure_success(response).await?.json().await?;
        Ok(body.backgrounds)
    }

    async fn upload_background(&self, image: ImageUpload) -> Result<BackgroundImage, ClientError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(self.url("/backgrounds/upload"))
            .multipart(form)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete_background(&self, key: &str) -> Result<(), ClientError> {
        let request = DeleteBackgroundRequest {
            key: key.to_string(),
        };
        let response = self
            .client
            .post(self.url("/backgrounds/delete"))
            .json(&request)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
