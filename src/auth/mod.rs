//! Authentication
//!
//! The identity provider publishes into a [`session::SessionHub`]; the
//! [`gate::AuthGate`] turns the current state into a routing decision for
//! each view, and [`login::LoginForm`] drives password sign-in.

pub mod gate;
pub mod identity_toolkit;
pub mod login;
pub mod provider;
pub mod session;
pub mod token_store;

pub use gate::{AuthGate, GateDecision, View};
pub use identity_toolkit::IdentityToolkitProvider;
pub use login::{LoginForm, LoginOutcome};
pub use provider::IdentityProvider;
pub use session::{AuthUser, SessionHub, SessionState, SessionSubscription};
pub use token_store::{CredentialStore, KeyringCredentialStore, MemoryCredentialStore};
