//! Login form
//!
//! Both fields are required. Every provider failure collapses into one
//! generic message so the form never reveals whether the login exists.

use crate::auth::gate::{View, DEFAULT_VIEW};
use crate::auth::provider::IdentityProvider;
use crate::notice::messages;

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Signed in; replace the current view with this one
    Navigate(View),
    /// A required field was empty; nothing was sent
    Invalid(&'static str),
    /// The provider refused
    Failed(String),
}

/// Login form state
#[derive(Debug, Default)]
pub struct LoginForm {
    login: String,
    password: String,
    error: Option<String>,
    busy: bool,
}

impl LoginForm {
    /// Empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the login field
    pub fn set_login(&mut self, login: impl Into<String>) {
        self.login = login.into();
    }

    /// Set the password field
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Login field as typed
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Error from the last attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether an attempt is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Label of the submit button
    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            messages::LOGIN_BUSY_LABEL
        } else {
            messages::LOGIN_LABEL
        }
    }

    /// Check the fields and mark the form busy
    ///
    /// Returns the trimmed login and the raw password to sign in with.
    pub fn begin(&mut self) -> Result<(String, String), LoginOutcome> {
        self.error = None;
        if self.login.is_empty() {
            self.error = Some(messages::LOGIN_REQUIRED.to_string());
            return Err(LoginOutcome::Invalid(messages::LOGIN_REQUIRED));
        }
        if self.password.is_empty() {
            self.error = Some(messages::PASSWORD_REQUIRED.to_string());
            return Err(LoginOutcome::Invalid(messages::PASSWORD_REQUIRED));
        }
        self.busy = true;
        Ok((self.login.trim().to_string(), self.password.clone()))
    }

    /// Apply the provider's answer
    pub fn finish<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> LoginOutcome {
        self.busy = false;
        match result {
            Ok(_) => LoginOutcome::Navigate(DEFAULT_VIEW),
            Err(e) => {
                tracing::debug!("Sign-in failed: {}", e);
                self.error = Some(messages::LOGIN_FAILED.to_string());
                LoginOutcome::Failed(messages::LOGIN_FAILED.to_string())
            }
        }
    }

    /// Submit the form
    pub async fn submit(&mut self, provider: &dyn IdentityProvider) -> LoginOutcome {
        let (login, password) = match self.begin() {
            Ok(fields) => fields,
            Err(outcome) => return outcome,
        };
        let result = provider.sign_in_with_password(&login, &password).await;
        self.finish(result)
    }
}
