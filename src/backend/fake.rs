//! In-process backend used by unit tests
//!
//! Responses are queued per operation and every call is recorded, so tests
//! can assert both on state changes and on what would have gone over the
//! wire.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Backend, BackendResult, Group, SendMediaRequest, SendMessageRequest};

/// A recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `list_groups`
    ListGroups,
    /// `delete_group(id)`
    DeleteGroup(String),
    /// `send_message`
    SendMessage(SendMessageRequest),
    /// `send_media` (group ids, caption, file names)
    SendMedia {
        group_ids: Vec<String>,
        caption: String,
        files: Vec<String>,
    },
}

/// Scripted backend
#[derive(Debug, Default)]
pub struct FakeBackend {
    groups: Mutex<VecDeque<BackendResult<Vec<Group>>>>,
    deletes: Mutex<VecDeque<BackendResult<()>>>,
    sends: Mutex<VecDeque<BackendResult<()>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    /// Backend with no scripted responses; unscripted calls succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `list_groups` response
    pub fn push_groups(&self, result: BackendResult<Vec<Group>>) {
        self.groups.lock().unwrap().push_back(result);
    }

    /// Queue a `delete_group` response
    pub fn push_delete(&self, result: BackendResult<()>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    /// Queue a send response (shared by both send kinds)
    pub fn push_send(&self, result: BackendResult<()>) {
        self.sends.lock().unwrap().push_back(result);
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// A group fixture
pub fn group(id: i64, title: &str) -> Group {
    Group {
        id,
        title: title.to_string(),
        kind: "supergroup".to_string(),
        added_at: "2024-05-01T10:00:00.000Z".to_string(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_groups(&self) -> BackendResult<Vec<Group>> {
        self.record(Call::ListGroups);
        self.groups
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete_group(&self, id: &str) -> BackendResult<()> {
        self.record(Call::DeleteGroup(id.to_string()));
        self.deletes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn send_message(&self, request: &SendMessageRequest) -> BackendResult<()> {
        self.record(Call::SendMessage(request.clone()));
        self.sends.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn send_media(&self, request: &SendMediaRequest) -> BackendResult<()> {
        self.record(Call::SendMedia {
            group_ids: request.group_ids.clone(),
            caption: request.caption.clone(),
            files: request.files.iter().map(|f| f.name.clone()).collect(),
        });
        self.sends.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
