//! groupcast - compose-and-broadcast client library
//!
//! This library provides the pieces of the groupcast client: a password
//! sign-in gate, the group selector, a rich-text composer with media
//! attachments and draft autosave, and the compose page that sends the
//! result to a delivery backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Session state, authentication gate, identity provider and login form
//! - `backend`: Delivery backend REST client
//! - `selector`: Group list state and the selection
//! - `composer`: Document editing, markup rendering, media and drafts
//! - `compose`: The compose page and its send flow
//! - `notice`: Transient notifications and user-facing messages
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use groupcast::{ComposePage, Config};
//! use groupcast::backend::HttpBackend;
//! use groupcast::composer::{draft::MemoryDraftStore, media::PreviewRegistry, Composer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let composer = Composer::open(
//!         &config.composer,
//!         Arc::new(MemoryDraftStore::new()),
//!         None,
//!         PreviewRegistry::new(),
//!     )?;
//!     let mut page = ComposePage::new(backend, composer);
//!     page.open().await;
//!     page.select_all();
//!     page.composer_mut().set_markup("Hello **everyone**")?;
//!     page.submit().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod compose;
pub mod composer;
pub mod config;
pub mod error;
pub mod notice;
pub mod selector;

// Re-export commonly used types
pub use compose::{ComposePage, SubmitOutcome};
pub use composer::Composer;
pub use config::Config;
pub use error::{GroupcastError, Result};
pub use notice::{Notice, NoticeLevel};
pub use selector::{GroupSelector, Selection};

#[cfg(test)]
pub mod test_utils;
