//! Error types for groupcast
//!
//! This module defines the application error enum and the crate-wide
//! `Result` alias, using `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::backend::BackendError;

/// Main error type for groupcast operations
///
/// Covers configuration loading, identity provider interactions, backend
/// calls, client-side validation, media handling and draft persistence.
#[derive(Error, Debug)]
pub enum GroupcastError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity provider errors (sign-in, sign-out, credential restore)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A command that needs a session was run without one
    #[error("Not signed in: {0}")]
    NotSignedIn(String),

    /// Remote backend errors (connectivity or backend-reported failure)
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Client-side validation errors; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Media attachment errors (unreadable file, unknown type)
    #[error("Media error: {0}")]
    Media(String),

    /// Draft storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for groupcast operations
///
/// Uses `anyhow::Error` so that call sites can attach context while still
/// carrying a [`GroupcastError`] underneath.
pub type Result<T> = anyhow::Result<T>;
