//! Observable session state
//!
//! [`SessionHub`] holds the one process-wide session value. Pages subscribe
//! for as long as they are active; dropping the [`SessionSubscription`]
//! unsubscribes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{GroupcastError, Result};

/// The signed-in identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider-assigned user id
    pub uid: String,
    /// Sign-in email, when the provider reports one
    pub email: Option<String>,
}

impl AuthUser {
    /// Email if known, else the uid
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Authentication state as last reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The provider has not reported yet
    #[default]
    Unknown,
    /// A user is signed in
    Authenticated(AuthUser),
    /// Nobody is signed in
    Unauthenticated,
}

impl SessionState {
    /// Whether the provider has reported at least once
    pub fn is_known(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Process-wide session value
#[derive(Debug, Clone)]
pub struct SessionHub {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    /// A hub in the `Unknown` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unknown);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the state and notify every subscriber
    pub fn publish(&self, state: SessionState) {
        tracing::debug!("Session state: {:?}", state);
        self.tx.send_replace(state);
    }

    /// The current state
    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Start observing the session
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription to the session hub
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<SessionState>,
}

impl SessionSubscription {
    /// The current state
    pub fn current(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> Result<SessionState> {
        self.rx
            .changed()
            .await
            .map_err(|_| GroupcastError::Auth("session hub closed".into()))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the provider has reported at least once
    pub async fn wait_ready(&mut self) -> Result<SessionState> {
        let state = self
            .rx
            .wait_for(SessionState::is_known)
            .await
            .map_err(|_| GroupcastError::Auth("session hub closed".into()))?;
        Ok((*state).clone())
    }
}
