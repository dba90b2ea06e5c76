//! Compose page
//!
//! Ties the group selector and the composer together and owns the send
//! flow: validate, dispatch to the right endpoint, report the outcome.
//! Only one send can be outstanding at a time.

use std::sync::Arc;

use crate::backend::{Backend, BackendResult, SendMediaRequest, SendMessageRequest};
use crate::composer::markup::is_empty_document;
use crate::composer::Composer;
use crate::notice::{messages, Notice, NoticeLog};
use crate::selector::{GroupSelector, Selection};

/// The request a submit resolved to
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Text-only broadcast
    Message(SendMessageRequest),
    /// Media broadcast with the HTML as caption
    Media(SendMediaRequest),
}

impl Dispatch {
    /// Send this request through `backend`
    pub async fn send(&self, backend: &dyn Backend) -> BackendResult<()> {
        match self {
            Dispatch::Message(request) => backend.send_message(request).await,
            Dispatch::Media(request) => backend.send_media(request).await,
        }
    }
}

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A send was already outstanding; nothing happened
    Busy,
    /// Validation failed; nothing was sent
    Rejected(String),
    /// The backend accepted the broadcast
    Sent,
    /// The backend or the transport failed
    Failed(String),
}

/// Check a submission before anything is sent
///
/// Groups are checked first. Content counts as empty when it is blank or
/// the empty document, unless at least one file is attached.
pub fn validate(selection: &Selection, html: &str, media_count: usize) -> Result<(), &'static str> {
    if selection.is_empty() {
        return Err(messages::PICK_GROUP);
    }
    if media_count == 0 && is_empty_document(html) {
        return Err(messages::MESSAGE_EMPTY);
    }
    Ok(())
}

/// The compose page
pub struct ComposePage {
    backend: Arc<dyn Backend>,
    selection: Selection,
    selector: GroupSelector,
    composer: Composer,
    notices: NoticeLog,
    idle_label: String,
    sending: bool,
}

impl ComposePage {
    /// Build the page around an opened composer
    pub fn new(backend: Arc<dyn Backend>, composer: Composer) -> Self {
        let idle_label = composer.submit_label().to_string();
        Self {
            backend,
            selection: Selection::new(),
            selector: GroupSelector::new(),
            composer,
            notices: NoticeLog::new(),
            idle_label,
            sending: false,
        }
    }

    /// Initial fetch of the group list
    pub async fn open(&mut self) {
        self.refresh().await;
    }

    /// Refetch the group list
    pub async fn refresh(&mut self) {
        self.selector
            .refresh(self.backend.as_ref(), &mut self.selection)
            .await;
    }

    /// Flip a known group in the selection
    pub fn toggle(&mut self, id: &str) -> bool {
        self.selector.toggle(&mut self.selection, id)
    }

    /// Select every group, or clear when all are selected
    pub fn select_all(&mut self) {
        self.selector.select_all(&mut self.selection);
    }

    /// Open the delete confirmation for a group
    pub fn request_delete(&mut self, id: &str) -> bool {
        self.selector.request_delete(id)
    }

    /// Close the delete confirmation
    pub fn cancel_delete(&mut self) {
        self.selector.cancel_delete();
    }

    /// Delete the group awaiting confirmation
    pub async fn confirm_delete(&mut self) -> bool {
        self.selector
            .confirm_delete(self.backend.as_ref(), &mut self.selection)
            .await
    }

    /// The backend this page sends through
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Selected group ids
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Group list state
    pub fn selector(&self) -> &GroupSelector {
        &self.selector
    }

    /// The composer
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The composer, for edits
    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    /// Whether a send is outstanding
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Notices not yet shown
    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    /// Take the pending notices for display
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Queue extra notices, e.g. from attaching files
    pub fn push_notices(&mut self, notices: impl IntoIterator<Item = Notice>) {
        self.notices.extend(notices);
    }

    /// Validate and start a send
    ///
    /// On success the page is marked sending, the composer is disabled and
    /// shows the busy label until [`ComposePage::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<Dispatch, SubmitOutcome> {
        if self.sending {
            self.notices.push(Notice::info(messages::SEND_IN_PROGRESS));
            return Err(SubmitOutcome::Busy);
        }
        let Some(submission) = self.composer.submission() else {
            return Err(SubmitOutcome::Busy);
        };

        if let Err(msg) = validate(&self.selection, &submission.html, submission.media.len()) {
            tracing::debug!("Submit rejected: {}", msg);
            self.notices.push(Notice::error(msg));
            return Err(SubmitOutcome::Rejected(msg.to_string()));
        }

        let group_ids = self.selection.ids().to_vec();
        let dispatch = if submission.media.is_empty() {
            Dispatch::Message(SendMessageRequest {
                group_ids,
                message: submission.html,
            })
        } else {
            Dispatch::Media(SendMediaRequest {
                group_ids,
                caption: submission.html,
                files: submission.media,
            })
        };

        self.sending = true;
        self.composer.set_disabled(true);
        self.composer.set_submit_label(messages::SENDING_LABEL);
        Ok(dispatch)
    }

    /// Apply the result of the send started by [`ComposePage::begin_submit`]
    pub fn finish_submit(&mut self, result: BackendResult<()>) -> SubmitOutcome {
        self.sending = false;
        self.composer.set_disabled(false);
        self.composer.set_submit_label(self.idle_label.clone());

        match result {
            Ok(()) => {
                tracing::info!("Broadcast sent to {} groups", self.selection.len());
                self.notices.push(Notice::success(messages::SEND_OK));
                if let Err(e) = self.composer.clear_persisted_draft() {
                    tracing::warn!("Failed to clear draft: {}", e);
                }
                self.composer.discard_media();
                SubmitOutcome::Sent
            }
            Err(err) => {
                tracing::warn!("Broadcast failed: {}", err);
                let msg = err.user_message(messages::SEND_FAILED);
                self.notices.push(Notice::error(msg.clone()));
                SubmitOutcome::Failed(msg)
            }
        }
    }

    /// Validate, send and report in one step
    pub async fn submit(&mut self) -> SubmitOutcome {
        let dispatch = match self.begin_submit() {
            Ok(dispatch) => dispatch,
            Err(outcome) => return outcome,
        };
        let result = dispatch.send(self.backend.as_ref()).await;
        self.finish_submit(result)
    }
}
