//! Authentication gate
//!
//! Decides, for the view a user is trying to reach, whether to show a
//! loading state, redirect, or render it.

use crate::auth::session::{SessionState, SessionSubscription};
use crate::error::Result;

/// A routable view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The sign-in form
    Login,
    /// The compose page (default after sign-in)
    Compose,
}

/// Where signed-in users land
pub const DEFAULT_VIEW: View = View::Compose;

/// What the gate tells the caller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The provider has not reported yet
    Loading,
    /// Navigate elsewhere, replacing the current entry
    Redirect(View),
    /// Render the requested view
    Render(View),
}

/// Gate decision for one state and view
pub fn decide(state: &SessionState, view: View) -> GateDecision {
    match (state, view) {
        (SessionState::Unknown, _) => GateDecision::Loading,
        (SessionState::Unauthenticated, View::Login) => GateDecision::Render(View::Login),
        (SessionState::Unauthenticated, _) => GateDecision::Redirect(View::Login),
        (SessionState::Authenticated(_), View::Login) => GateDecision::Redirect(DEFAULT_VIEW),
        (SessionState::Authenticated(_), view) => GateDecision::Render(view),
    }
}

/// Gate bound to a session subscription
#[derive(Debug)]
pub struct AuthGate {
    subscription: SessionSubscription,
}

impl AuthGate {
    /// Gate observing `subscription`; dropping the gate unsubscribes
    pub fn new(subscription: SessionSubscription) -> Self {
        Self { subscription }
    }

    /// Whether the first provider event has arrived
    pub fn is_ready(&self) -> bool {
        self.subscription.current().is_known()
    }

    /// Decision for `view` under the current state
    pub fn decide(&self, view: View) -> GateDecision {
        decide(&self.subscription.current(), view)
    }

    /// Wait for the first provider event, then decide
    ///
    /// Never resolves if the provider never reports.
    pub async fn wait_ready(&mut self, view: View) -> Result<GateDecision> {
        let state = self.subscription.wait_ready().await?;
        Ok(decide(&state, view))
    }

    /// The current session state
    pub fn state(&self) -> SessionState {
        self.subscription.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::{AuthUser, SessionHub};

    fn signed_in() -> SessionState {
        SessionState::Authenticated(AuthUser {
            uid: "u1".into(),
            email: None,
        })
    }

    #[test]
    fn test_every_state_view_pair() {
        let cases = [
            (SessionState::Unknown, View::Login, GateDecision::Loading),
            (SessionState::Unknown, View::Compose, GateDecision::Loading),
            (
                SessionState::Unauthenticated,
                View::Login,
                GateDecision::Render(View::Login),
            ),
            (
                SessionState::Unauthenticated,
                View::Compose,
                GateDecision::Redirect(View::Login),
            ),
            (signed_in(), View::Login, GateDecision::Redirect(View::Compose)),
            (signed_in(), View::Compose, GateDecision::Render(View::Compose)),
        ];
        for (state, view, expected) in cases {
            assert_eq!(decide(&state, view), expected, "{:?} at {:?}", state, view);
        }
    }

    #[test]
    fn test_gate_follows_hub() {
        let hub = SessionHub::new();
        let gate = AuthGate::new(hub.subscribe());
        assert!(!gate.is_ready());
        assert_eq!(gate.decide(View::Compose), GateDecision::Loading);

        hub.publish(SessionState::Unauthenticated);
        assert!(gate.is_ready());
        assert_eq!(gate.decide(View::Compose), GateDecision::Redirect(View::Login));

        hub.publish(signed_in());
        assert_eq!(gate.decide(View::Compose), GateDecision::Render(View::Compose));
    }

    #[tokio::test]
    async fn test_wait_ready_decides_on_first_event() {
        let hub = SessionHub::new();
        let mut gate = AuthGate::new(hub.subscribe());
        hub.publish(signed_in());
        assert_eq!(
            gate.wait_ready(View::Login).await.unwrap(),
            GateDecision::Redirect(View::Compose)
        );
    }

    #[test]
    fn test_dropping_gate_unsubscribes() {
        let hub = SessionHub::new();
        let gate = AuthGate::new(hub.subscribe());
        assert_eq!(hub.subscriber_count(), 1);
        drop(gate);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
