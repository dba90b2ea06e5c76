//! Group selection
//!
//! [`Selection`] is the ordered set of chosen group ids owned by the compose
//! page. [`GroupSelector`] fetches the registered groups, keeps the cached
//! list, and mutates the selection it is handed. Fetches carry sequence
//! tickets so a slow response can never overwrite a newer one.

use std::collections::HashSet;

use crate::backend::{Backend, BackendResult, Group};
use crate::notice::messages;

/// Insertion-ordered set of selected group ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Whether `id` is selected
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Selected ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Number of selected ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection, dropping duplicates
    pub fn replace_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.clear();
        for id in ids {
            let id = id.into();
            if !self.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Keep only ids matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&String) -> bool) {
        self.ids.retain(keep);
    }
}

/// Fetch state of the group list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Never fetched
    Idle,
    /// A fetch is outstanding
    Loading,
    /// The cached list reflects the latest fetch
    Loaded,
    /// The latest fetch failed with this message
    Errored(String),
}

/// Tag of one outstanding fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    seq: u64,
}

/// Tag of one outstanding delete
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct DeleteTicket {
    id: String,
}

impl DeleteTicket {
    /// The group being deleted
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Group list state machine
#[derive(Debug)]
pub struct GroupSelector {
    groups: Vec<Group>,
    state: LoadState,
    issued: u64,
    applied: u64,
    confirming: Option<String>,
    deleting: HashSet<String>,
    delete_error: Option<String>,
}

impl Default for GroupSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupSelector {
    /// Selector that has never fetched
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            state: LoadState::Idle,
            issued: 0,
            applied: 0,
            confirming: None,
            deleting: HashSet::new(),
            delete_error: None,
        }
    }

    /// Cached groups in backend order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Current fetch state
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Fetch error of the latest request, if it failed
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Errored(msg) => Some(msg),
            _ => None,
        }
    }

    /// Whether `id` names a cached group
    pub fn is_known(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.key() == id)
    }

    /// Start a fetch
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.issued += 1;
        self.state = LoadState::Loading;
        FetchTicket { seq: self.issued }
    }

    /// Apply the response of a fetch
    ///
    /// Returns false when the response was older than one already applied
    /// and got discarded. Only the newest ticket moves the state out of
    /// `Loading`.
    pub fn finish_refresh(
        &mut self,
        ticket: FetchTicket,
        result: BackendResult<Vec<Group>>,
        selection: &mut Selection,
    ) -> bool {
        if ticket.seq <= self.applied {
            tracing::debug!("Discarding stale group fetch #{}", ticket.seq);
            return false;
        }
        self.applied = ticket.seq;
        let latest = ticket.seq == self.issued;

        match result {
            Ok(groups) => {
                tracing::debug!("Fetched {} groups (fetch #{})", groups.len(), ticket.seq);
                self.groups = groups;
                let known: HashSet<String> = self.groups.iter().map(Group::key).collect();
                selection.retain(|id| known.contains(id));
                if latest {
                    self.state = LoadState::Loaded;
                }
            }
            Err(err) => {
                tracing::warn!("Group fetch #{} failed: {}", ticket.seq, err);
                if latest {
                    self.state = LoadState::Errored(err.user_message(messages::GROUPS_LOAD_FAILED));
                }
            }
        }
        true
    }

    /// Fetch the group list
    pub async fn refresh(&mut self, backend: &dyn Backend, selection: &mut Selection) {
        let ticket = self.begin_refresh();
        let result = backend.list_groups().await;
        self.finish_refresh(ticket, result, selection);
    }

    /// Fetch again after an error
    pub async fn retry(&mut self, backend: &dyn Backend, selection: &mut Selection) {
        self.refresh(backend, selection).await;
    }

    /// Flip a known group's membership; unknown ids are ignored
    ///
    /// Returns whether the selection changed.
    pub fn toggle(&self, selection: &mut Selection, id: &str) -> bool {
        if !self.is_known(id) {
            tracing::debug!("Ignoring toggle of unknown group {}", id);
            return false;
        }
        selection.toggle(id);
        true
    }

    /// Whether every cached group is selected
    pub fn all_selected(&self, selection: &Selection) -> bool {
        !self.groups.is_empty() && self.groups.iter().all(|g| selection.contains(&g.key()))
    }

    /// Select every group, or clear when all are already selected
    pub fn select_all(&self, selection: &mut Selection) {
        if self.all_selected(selection) || self.groups.is_empty() {
            selection.clear();
        } else {
            selection.replace_all(self.groups.iter().map(Group::key));
        }
    }

    /// Open the delete confirmation for a known group
    pub fn request_delete(&mut self, id: &str) -> bool {
        if !self.is_known(id) {
            return false;
        }
        self.confirming = Some(id.to_string());
        true
    }

    /// Close the delete confirmation
    pub fn cancel_delete(&mut self) {
        self.confirming = None;
    }

    /// Group awaiting delete confirmation
    pub fn confirming(&self) -> Option<&str> {
        self.confirming.as_deref()
    }

    /// Whether a delete for `id` is in flight
    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    /// Error of the last failed delete
    pub fn delete_error(&self) -> Option<&str> {
        self.delete_error.as_deref()
    }

    /// Mark a delete in flight; refuses a second delete of the same id
    pub fn begin_delete(&mut self, id: &str) -> Option<DeleteTicket> {
        if !self.is_known(id) || !self.deleting.insert(id.to_string()) {
            return None;
        }
        self.delete_error = None;
        if self.confirming.as_deref() == Some(id) {
            self.confirming = None;
        }
        Some(DeleteTicket { id: id.to_string() })
    }

    /// Apply the result of a delete
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        result: BackendResult<()>,
        selection: &mut Selection,
    ) -> bool {
        self.deleting.remove(&ticket.id);
        match result {
            Ok(()) => {
                tracing::info!("Deleted group {}", ticket.id);
                self.groups.retain(|g| g.key() != ticket.id);
                selection.retain(|id| *id != ticket.id);
                true
            }
            Err(err) => {
                tracing::warn!("Deleting group {} failed: {}", ticket.id, err);
                self.delete_error = Some(err.user_message(messages::GROUP_DELETE_FAILED));
                false
            }
        }
    }

    /// Delete the group awaiting confirmation
    ///
    /// Returns false when nothing was confirming or the delete failed.
    pub async fn confirm_delete(&mut self, backend: &dyn Backend, selection: &mut Selection) -> bool {
        let Some(id) = self.confirming.clone() else {
            return false;
        };
        let Some(ticket) = self.begin_delete(&id) else {
            return false;
        };
        let result = backend.delete_group(ticket.id()).await;
        self.finish_delete(ticket, result, selection)
    }

    /// Header counter
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    /// Footer text, only when something is selected
    pub fn selected_summary(&self, selection: &Selection) -> Option<String> {
        (!selection.is_empty()).then(|| messages::groups_selected(selection.len()))
    }

    /// Empty-state text when the latest fetch returned no groups
    pub fn empty_hint(&self) -> Option<(&'static str, &'static str)> {
        (self.state == LoadState::Loaded && self.groups.is_empty())
            .then_some((messages::NO_GROUPS, messages::NO_GROUPS_HINT))
    }
}
