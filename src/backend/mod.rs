//! Delivery backend abstraction
//!
//! The backend owns group registration, persistence and message delivery.
//! This client only talks to it through the four REST operations of the
//! [`Backend`] trait:
//!
//! - `GET /api/groups`
//! - `DELETE /api/groups/{id}`
//! - `POST /api/send-message` (JSON)
//! - `POST /api/send-media-files` (multipart)
//!
//! [`http::HttpBackend`] is the `reqwest` implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::notice::messages;

pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;
pub use types::{Group, SendMediaRequest, SendMessageRequest};

/// Failure of a backend operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request could not be sent or the response could not be read
    #[error("could not reach the backend: {0}")]
    Transport(String),

    /// The backend answered `success: false`
    #[error("backend rejected the request: {}", .0.as_deref().unwrap_or("no details"))]
    Rejected(Option<String>),

    /// An attached file could not be read before sending
    #[error("could not read attachment: {0}")]
    LocalFile(String),
}

impl BackendError {
    /// Text to show the user
    ///
    /// Backend-provided messages win; otherwise `generic` for backend
    /// failures and the connectivity text for transport failures.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            BackendError::Transport(_) => messages::SERVER_UNREACHABLE.to_string(),
            BackendError::Rejected(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            BackendError::Rejected(_) => generic.to_string(),
            BackendError::LocalFile(msg) => msg.clone(),
        }
    }
}

/// Result of a backend call
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The delivery backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// List every registered group
    async fn list_groups(&self) -> BackendResult<Vec<Group>>;

    /// Unregister one group
    async fn delete_group(&self, id: &str) -> BackendResult<()>;

    /// Broadcast an HTML message
    async fn send_message(&self, request: &SendMessageRequest) -> BackendResult<()>;

    /// Broadcast media files with an HTML caption
    async fn send_media(&self, request: &SendMediaRequest) -> BackendResult<()>;
}
