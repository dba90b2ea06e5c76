//! Delivery backend client integration tests
//!
//! Runs `HttpBackend` against a `wiremock` server. The backend reports
//! failures through the `success` flag of the JSON body, so most failure
//! cases answer with a JSON body regardless of HTTP status.

mod common;

use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupcast::backend::{Backend, BackendError, SendMediaRequest, SendMessageRequest};
use groupcast::composer::media::MediaFile;

#[tokio::test]
async fn test_list_groups_parses_backend_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::groups_body()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    let groups = backend.list_groups().await.expect("groups");

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key(), "-1001");
    assert_eq!(groups[0].kind, "supergroup");
    assert_eq!(groups[1].title, "Ops");
}

#[tokio::test]
async fn test_list_groups_failure_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"success": false, "error": "db down"})),
        )
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    let err = backend.list_groups().await.unwrap_err();
    assert_eq!(err, BackendError::Rejected(Some("db down".to_string())));
}

#[tokio::test]
async fn test_unparsable_body_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    let err = backend.list_groups().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_failure() {
    let backend = common::http_backend("http://127.0.0.1:1");
    let err = backend.list_groups().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn test_delete_group_uses_id_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/groups/-1001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    backend.delete_group("-1001").await.expect("delete");
}

#[tokio::test]
async fn test_delete_group_rejected_without_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/groups/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    let err = backend.delete_group("7").await.unwrap_err();
    assert_eq!(err, BackendError::Rejected(None));
}

#[tokio::test]
async fn test_send_message_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/send-message"))
        .and(body_json(serde_json::json!({
            "groupIds": ["-1001", "42"],
            "message": "<p><strong>Hi</strong></p>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = common::http_backend(&server.uri());
    backend
        .send_message(&SendMessageRequest {
            group_ids: vec!["-1001".to_string(), "42".to_string()],
            message: "<p><strong>Hi</strong></p>".to_string(),
        })
        .await
        .expect("send");
}

#[tokio::test]
async fn test_send_media_posts_multipart_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/send-media-files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let photo = MediaFile::from_path(common::create_media_file(&dir, "photo.png", 16)).unwrap();
    let clip = MediaFile::from_path(common::create_media_file(&dir, "clip.mp4", 32)).unwrap();

    let backend = common::http_backend(&server.uri());
    backend
        .send_media(&SendMediaRequest {
            group_ids: vec!["-1001".to_string()],
            caption: "<p>Look</p>".to_string(),
            files: vec![photo, clip],
        })
        .await
        .expect("send media");

    let requests = server.received_requests().await.expect("recorded requests");
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert_eq!(body.matches("name=\"media\"").count(), 2);
    assert!(body.contains("filename=\"photo.png\""));
    assert!(body.contains("filename=\"clip.mp4\""));
    assert!(body.contains("name=\"groupIds\""));
    assert!(body.contains(r#"["-1001"]"#));
    assert!(body.contains("name=\"caption\""));
    assert!(body.contains("<p>Look</p>"));
}

#[tokio::test]
async fn test_send_media_with_missing_file_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = common::create_media_file(&dir, "gone.png", 8);
    let file = MediaFile::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let backend = common::http_backend(&server.uri());
    let err = backend
        .send_media(&SendMediaRequest {
            group_ids: vec!["1".to_string()],
            caption: String::new(),
            files: vec![file],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::LocalFile(_)));
}
