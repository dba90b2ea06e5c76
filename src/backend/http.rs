//! HTTP implementation of the delivery backend
//!
//! Responses are judged by their JSON body only: the backend reports
//! failures through `success: false`, so the HTTP status is logged but not
//! interpreted. A body that cannot be parsed is treated like a network
//! failure.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{AckResponse, GroupsResponse};
use super::{Backend, BackendError, BackendResult, Group, SendMediaRequest, SendMessageRequest};
use crate::config::BackendConfig;
use crate::error::{GroupcastError, Result};

/// `reqwest` client for the delivery backend
///
/// # Examples
///
/// ```
/// use groupcast::backend::HttpBackend;
/// use groupcast::config::BackendConfig;
///
/// let backend = HttpBackend::new(&BackendConfig::default());
/// assert!(backend.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for the configured base URL
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("groupcast/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GroupcastError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized backend client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read backend response: {}", e);
            BackendError::Transport(e.to_string())
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unparsable backend response (status {}): {}", status, e);
            BackendError::Transport(format!("invalid response body: {}", e))
        })
    }

    fn check_ack(ack: AckResponse, operation: &str) -> BackendResult<()> {
        if ack.success {
            Ok(())
        } else {
            tracing::warn!("Backend rejected {}: {:?}", operation, ack.error);
            Err(BackendError::Rejected(ack.error))
        }
    }

    fn transport_error(operation: &str, e: reqwest::Error) -> BackendError {
        tracing::error!("Failed to {}: {}", operation, e);
        BackendError::Transport(e.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_groups(&self) -> BackendResult<Vec<Group>> {
        let url = self.endpoint("/api/groups");
        tracing::debug!("Fetching groups: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error("fetch groups", e))?;

        let body: GroupsResponse = Self::read_body(response).await?;
        if !body.success {
            tracing::warn!("Backend rejected group listing: {:?}", body.error);
            return Err(BackendError::Rejected(body.error));
        }

        tracing::debug!("Fetched {} groups", body.groups.len());
        Ok(body.groups)
    }

    async fn delete_group(&self, id: &str) -> BackendResult<()> {
        let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        let url = self.endpoint(&format!("/api/groups/{}", encoded));
        tracing::debug!("Deleting group: {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error("delete group", e))?;

        Self::check_ack(Self::read_body(response).await?, "group deletion")
    }

    async fn send_message(&self, request: &SendMessageRequest) -> BackendResult<()> {
        let url = self.endpoint("/api/send-message");
        tracing::debug!(
            "Sending message to {} groups ({} bytes)",
            request.group_ids.len(),
            request.message.len()
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::transport_error("send message", e))?;

        Self::check_ack(Self::read_body(response).await?, "message send")
    }

    async fn send_media(&self, request: &SendMediaRequest) -> BackendResult<()> {
        let url = self.endpoint("/api/send-media-files");
        tracing::debug!(
            "Sending {} media files to {} groups",
            request.files.len(),
            request.group_ids.len()
        );

        let mut form = Form::new();
        for file in &request.files {
            let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
                BackendError::LocalFile(format!("{}: {}", file.path.display(), e))
            })?;
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.mime)
                .map_err(|e| BackendError::LocalFile(format!("{}: {}", file.name, e)))?;
            form = form.part("media", part);
        }

        let group_ids = request
            .group_ids_json()
            .map_err(|e| BackendError::LocalFile(format!("failed to encode group ids: {}", e)))?;
        form = form
            .text("groupIds", group_ids)
            .text("caption", request.caption.clone());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::transport_error("send media", e))?;

        Self::check_ack(Self::read_body(response).await?, "media send")
    }
}
