//! Identity provider abstraction

use async_trait::async_trait;

use crate::auth::session::{AuthUser, SessionHub};
use crate::error::Result;

/// A password identity provider
///
/// Implementations publish every state change to their [`SessionHub`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The hub this provider publishes to
    fn hub(&self) -> &SessionHub;

    /// Publish the initial state from persisted credentials
    async fn restore(&self) -> Result<()>;

    /// Sign in; errors on any failure
    async fn sign_in_with_password(&self, login: &str, password: &str) -> Result<AuthUser>;

    /// Sign out and forget persisted credentials
    async fn sign_out(&self) -> Result<()>;
}
