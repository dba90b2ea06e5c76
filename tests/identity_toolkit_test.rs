//! Password sign-in integration tests
//!
//! Runs `IdentityToolkitProvider` against a `wiremock` server standing in
//! for the identity toolkit REST API, together with the login form and the
//! authentication gate.

use std::sync::Arc;

use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupcast::auth::{
    AuthGate, CredentialStore, GateDecision, IdentityProvider, IdentityToolkitProvider, LoginForm,
    LoginOutcome, MemoryCredentialStore, SessionHub, SessionState, View,
};
use groupcast::config::IdentityConfig;
use groupcast::notice::messages;

fn provider(server: &MockServer, store: Arc<MemoryCredentialStore>) -> IdentityToolkitProvider {
    let config = IdentityConfig {
        endpoint: format!("{}/v1/", server.uri()),
        api_key: Some("test-key".to_string()),
    };
    IdentityToolkitProvider::new(&config, store, SessionHub::new()).expect("provider")
}

async fn mount_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_json(serde_json::json!({
            "email": "ops@example.com",
            "password": "hunter2",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-1",
            "email": "ops@example.com",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600",
            "registered": true
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_persists_credential_and_publishes_state() {
    let server = MockServer::start().await;
    mount_success(&server).await;

    let store = Arc::new(MemoryCredentialStore::new());
    let provider = provider(&server, store.clone());

    let user = provider
        .sign_in_with_password("ops@example.com", "hunter2")
        .await
        .expect("sign in");

    assert_eq!(user.uid, "uid-1");
    assert_eq!(provider.hub().current(), SessionState::Authenticated(user));
    let saved = store.load().unwrap().expect("credential saved");
    assert_eq!(saved.id_token, "id-token");
    assert_eq!(saved.refresh_token.as_deref(), Some("refresh-token"));
}

#[tokio::test]
async fn test_rejected_sign_in_keeps_session_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 400, "message": "INVALID_PASSWORD"}
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let provider = provider(&server, store.clone());
    provider.restore().await.unwrap();

    let err = provider
        .sign_in_with_password("ops@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("INVALID_PASSWORD"));
    assert_eq!(provider.hub().current(), SessionState::Unauthenticated);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_login_form_shows_generic_error_on_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 400, "message": "EMAIL_NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let provider = provider(&server, Arc::new(MemoryCredentialStore::new()));
    let mut form = LoginForm::new();
    form.set_login("nobody@example.com");
    form.set_password("pw");

    let outcome = form.submit(&provider).await;
    assert_eq!(outcome, LoginOutcome::Failed(messages::LOGIN_FAILED.to_string()));
    assert_eq!(form.error(), Some(messages::LOGIN_FAILED));
    assert!(!form.is_busy());
}

#[tokio::test]
async fn test_gate_follows_sign_in_and_sign_out() {
    let server = MockServer::start().await;
    mount_success(&server).await;

    let store = Arc::new(MemoryCredentialStore::new());
    let provider = provider(&server, store.clone());
    let mut gate = AuthGate::new(provider.hub().subscribe());
    assert_eq!(gate.decide(View::Compose), GateDecision::Loading);

    provider.restore().await.unwrap();
    assert_eq!(
        gate.wait_ready(View::Compose).await.unwrap(),
        GateDecision::Redirect(View::Login)
    );

    let mut form = LoginForm::new();
    form.set_login(" ops@example.com ");
    form.set_password("hunter2");
    assert_eq!(form.submit(&provider).await, LoginOutcome::Navigate(View::Compose));
    assert_eq!(gate.decide(View::Compose), GateDecision::Render(View::Compose));
    assert_eq!(gate.decide(View::Login), GateDecision::Redirect(View::Compose));

    provider.sign_out().await.unwrap();
    assert_eq!(gate.decide(View::Compose), GateDecision::Redirect(View::Login));
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_restored_credential_survives_new_provider() {
    let server = MockServer::start().await;
    mount_success(&server).await;

    let store = Arc::new(MemoryCredentialStore::new());
    provider(&server, store.clone())
        .sign_in_with_password("ops@example.com", "hunter2")
        .await
        .unwrap();

    let restored = provider(&server, store);
    restored.restore().await.unwrap();
    assert_eq!(
        restored.hub().current().user().map(|u| u.uid.clone()),
        Some("uid-1".to_string())
    );
}
