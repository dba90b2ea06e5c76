//! Credential persistence via OS keyring
//!
//! The identity provider's sign-in response is kept opaque and stored as
//! JSON so that a later run can restore the session without asking for the
//! password again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::auth::session::AuthUser;
use crate::error::{GroupcastError, Result};

/// Keyring service the credential is stored under
pub const KEYRING_SERVICE: &str = "groupcast-identity";

/// Keyring account the credential is stored under
pub const KEYRING_ACCOUNT: &str = "default";

/// A persisted sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Provider user id
    pub local_id: String,
    /// Sign-in email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Opaque ID token
    pub id_token: String,
    /// Opaque refresh token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    /// When the sign-in happened
    pub signed_in_at: DateTime<Utc>,
}

impl Credential {
    /// The identity this credential belongs to
    pub fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.local_id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Storage for the single persisted credential
pub trait CredentialStore: Send + Sync {
    /// The stored credential, if any
    fn load(&self) -> Result<Option<Credential>>;

    /// Replace the stored credential
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the stored credential; a no-op when none exists
    fn delete(&self) -> Result<()>;
}

/// Credential store backed by the OS native keyring
///
/// # Examples
///
/// ```no_run
/// use groupcast::auth::token_store::{CredentialStore, KeyringCredentialStore};
///
/// let store = KeyringCredentialStore::default();
/// match store.load().unwrap() {
///     Some(cred) => println!("Signed in as {}", cred.local_id),
///     None => println!("Not signed in"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }
}

impl KeyringCredentialStore {
    /// Store under a specific service and account
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, &self.account).map_err(GroupcastError::Keyring)?)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match self.entry()?.get_password() {
            Ok(json_str) => {
                let credential: Credential = serde_json::from_str(&json_str)?;
                Ok(Some(credential))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(GroupcastError::Keyring(e).into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let json_str = serde_json::to_string(credential)?;
        self.entry()?
            .set_password(&json_str)
            .map_err(GroupcastError::Keyring)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(GroupcastError::Keyring(e).into()),
        }
    }
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential
    pub fn with(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
        self.credential
            .lock()
            .map_err(|_| GroupcastError::Auth("credential store lock poisoned".into()).into())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot()? = Some(credential.clone());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
