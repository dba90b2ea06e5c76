use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use groupcast::backend::HttpBackend;
use groupcast::composer::draft::MemoryDraftStore;
use groupcast::composer::media::PreviewRegistry;
use groupcast::config::{BackendConfig, ComposerConfig};
use groupcast::{ComposePage, Composer};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn create_media_file(dir: &TempDir, name: &str, size: u64) -> PathBuf {
    let path = dir.path().join(name);
    let file = fs::File::create(&path).expect("failed to create media file");
    file.set_len(size).expect("failed to size media file");
    path
}

#[allow(dead_code)]
pub fn http_backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        request_timeout_seconds: Some(5),
    })
    .expect("failed to build backend client")
}

#[allow(dead_code)]
pub fn compose_page(base_url: &str) -> ComposePage {
    let composer = Composer::open(
        &ComposerConfig::default(),
        Arc::new(MemoryDraftStore::new()),
        None,
        PreviewRegistry::new(),
    )
    .expect("failed to open composer");
    ComposePage::new(Arc::new(http_backend(base_url)), composer)
}

#[allow(dead_code)]
pub fn groups_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "groups": [
            {"id": -1001, "title": "Team", "type": "supergroup", "addedAt": "2024-05-01T10:00:00.000Z"},
            {"id": 42, "title": "Ops", "type": "group", "addedAt": "2024-05-02T08:30:00.000Z"}
        ]
    })
}
