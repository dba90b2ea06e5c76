//! End-to-end compose flow against a mocked delivery backend
//!
//! Drives `ComposePage` over the real HTTP client: load groups, select,
//! write, attach and send, plus the delete path.

mod common;

use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupcast::notice::{messages, NoticeLevel};
use groupcast::selector::LoadState;
use groupcast::SubmitOutcome;

async fn mount_groups(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::groups_body()))
        .mount(server)
        .await;
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true}))
}

#[tokio::test]
async fn test_text_broadcast_to_selected_groups() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/send-message"))
        .and(body_json(serde_json::json!({
            "groupIds": ["42"],
            "message": "<p>Deploy at <strong>5pm</strong></p>"
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    assert_eq!(page.selector().state(), &LoadState::Loaded);
    assert_eq!(page.selector().count(), 2);

    assert!(page.toggle("42"));
    page.composer_mut()
        .set_markup("Deploy at **5pm**")
        .unwrap();

    assert_eq!(page.submit().await, SubmitOutcome::Sent);
    let notices = page.drain_notices();
    assert_eq!(notices.last().map(|n| n.level), Some(NoticeLevel::Success));
    assert!(!page.is_sending());
    assert!(!page.composer().is_disabled());
}

#[tokio::test]
async fn test_media_broadcast_uses_multipart_endpoint() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/send-media-files"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/send-message"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let photo = common::create_media_file(&dir, "photo.jpg", 2048);

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    page.select_all();
    let report = page.composer_mut().attach_paths(&[photo]);
    assert!(!report.batch_rejected());

    // No text: the attachment alone is enough to send.
    assert_eq!(page.submit().await, SubmitOutcome::Sent);
    assert!(page.composer().media().is_empty());
}

#[tokio::test]
async fn test_validation_blocks_send_without_groups() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    Mock::given(method("POST"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    page.composer_mut().set_markup("Hello").unwrap();

    assert_eq!(
        page.submit().await,
        SubmitOutcome::Rejected(messages::PICK_GROUP.to_string())
    );

    page.toggle("-1001");
    page.composer_mut().set_html("<p></p>").unwrap();
    assert_eq!(
        page.submit().await,
        SubmitOutcome::Rejected(messages::MESSAGE_EMPTY.to_string())
    );
}

#[tokio::test]
async fn test_backend_rejection_keeps_content() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/send-message"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": false, "error": "Bot was kicked"})),
        )
        .mount(&server)
        .await;

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    page.toggle("42");
    page.composer_mut().set_markup("Hi").unwrap();

    assert_eq!(
        page.submit().await,
        SubmitOutcome::Failed("Bot was kicked".to_string())
    );
    assert_eq!(page.composer().html(), "<p>Hi</p>");
    assert!(page.selection().contains("42"));
}

#[tokio::test]
async fn test_group_list_failure_shows_error_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": false, "error": "db down"})),
        )
        .mount(&server)
        .await;

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    assert_eq!(page.selector().error(), Some("db down"));
    assert!(page.selector().groups().is_empty());
}

#[tokio::test]
async fn test_delete_removes_group_from_list_and_selection() {
    let server = MockServer::start().await;
    mount_groups(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/groups/42"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut page = common::compose_page(&server.uri());
    page.open().await;
    page.toggle("42");

    assert!(page.request_delete("42"));
    assert!(page.confirm_delete().await);
    assert!(!page.selector().is_known("42"));
    assert!(!page.selection().contains("42"));
    assert_eq!(page.selector().count(), 1);
}
