//! Rich-text composer
//!
//! Holds the document HTML, autosaves it to a [`DraftStore`] on every edit,
//! keeps undo/redo history, and collects pending media. The composer does
//! no network I/O: [`Composer::submission`] hands the current HTML and
//! files to the caller, who decides what to do with them and controls the
//! `disabled` flag and the submit label.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ComposerConfig;
use crate::error::Result;

pub mod draft;
pub mod markup;
pub mod media;

use draft::DraftStore;
use markup::{append_html, is_empty_document, Markup, EMPTY_DOCUMENT};
use media::{AttachReport, MediaFile, MediaList, PreviewRegistry};

/// What the submit action hands to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Current document HTML
    pub html: String,
    /// Attached files in order
    pub media: Vec<MediaFile>,
}

/// The composer state
pub struct Composer {
    store: Arc<dyn DraftStore>,
    storage_key: String,
    markup: Markup,
    html: String,
    undo: Vec<String>,
    redo: Vec<String>,
    media: MediaList,
    placeholder: String,
    submit_label: String,
    disabled: bool,
}

impl Composer {
    /// Open a composer, restoring the stored draft
    ///
    /// Initial content is the draft stored under `config.storage_key` when
    /// present and non-empty, else `seed`, else the empty document.
    ///
    /// # Errors
    ///
    /// Returns error if the draft store cannot be read
    pub fn open(
        config: &ComposerConfig,
        store: Arc<dyn DraftStore>,
        seed: Option<&str>,
        previews: PreviewRegistry,
    ) -> Result<Self> {
        let saved = store
            .load(&config.storage_key)?
            .filter(|html| !html.is_empty());
        let restored = saved.is_some();
        let html = saved
            .or_else(|| seed.filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| EMPTY_DOCUMENT.to_string());

        tracing::debug!(
            "Opened composer {} (restored draft: {})",
            config.storage_key,
            restored
        );

        Ok(Self {
            store,
            storage_key: config.storage_key.clone(),
            markup: Markup::new()?,
            html,
            undo: Vec::new(),
            redo: Vec::new(),
            media: MediaList::new(previews),
            placeholder: config.placeholder.clone(),
            submit_label: config.submit_label.clone(),
            disabled: false,
        })
    }

    /// Current document HTML
    pub fn html(&self) -> &str {
        &self.html
    }

    /// True when the document serializes as empty
    pub fn is_empty(&self) -> bool {
        is_empty_document(&self.html)
    }

    /// Placeholder text for an empty document
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Key the draft is stored under
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Spans used for inspection and rendering
    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    // Every edit goes through here: record history, then autosave.
    fn apply_edit(&mut self, html: String) -> Result<()> {
        if html == self.html {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.html, html);
        self.undo.push(previous);
        self.redo.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.storage_key, &self.html)
    }

    /// Replace the whole document
    pub fn set_html(&mut self, html: impl Into<String>) -> Result<()> {
        let html = html.into();
        let html = if html.trim().is_empty() {
            EMPTY_DOCUMENT.to_string()
        } else {
            html
        };
        self.apply_edit(html)
    }

    /// Replace the whole document with rendered markup
    pub fn set_markup(&mut self, input: &str) -> Result<()> {
        let html = self.markup.render(input);
        self.apply_edit(html)
    }

    /// Append rendered markup as new blocks
    pub fn append_markup(&mut self, input: &str) -> Result<()> {
        let blocks = self.markup.render(input);
        if is_empty_document(&blocks) {
            return Ok(());
        }
        let html = append_html(&self.html, &blocks);
        self.apply_edit(html)
    }

    /// Link the first unlinked occurrence of `text`; an empty URL unsets
    ///
    /// Returns whether the document changed.
    pub fn set_link(&mut self, text: &str, url: &str) -> Result<bool> {
        match self.markup.set_link(&self.html, text, url) {
            Some(html) => {
                self.apply_edit(html)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the link around `text`; returns whether the document changed
    pub fn unset_link(&mut self, text: &str) -> Result<bool> {
        match self.markup.unset_link(&self.html, text) {
            Some(html) => {
                self.apply_edit(html)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether there is an edit to undo
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether there is an undone edit to redo
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Revert the last edit; returns whether anything changed
    pub fn undo(&mut self) -> Result<bool> {
        let Some(previous) = self.undo.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut self.html, previous);
        self.redo.push(current);
        self.persist()?;
        Ok(true)
    }

    /// Reapply the last undone edit; returns whether anything changed
    pub fn redo(&mut self) -> Result<bool> {
        let Some(next) = self.redo.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut self.html, next);
        self.undo.push(current);
        self.persist()?;
        Ok(true)
    }

    /// Remove the persisted draft; the in-memory document is untouched
    pub fn clear_persisted_draft(&self) -> Result<()> {
        self.store.clear(&self.storage_key)
    }

    /// Text characters in the document
    pub fn characters(&self) -> usize {
        self.markup.characters(&self.html)
    }

    /// Words in the document
    pub fn words(&self) -> usize {
        self.markup.words(&self.html)
    }

    /// Attach a picked batch of files
    pub fn attach(&mut self, batch: Vec<MediaFile>) -> AttachReport {
        self.media.attach(batch)
    }

    /// Describe and attach files from disk
    ///
    /// Unreadable paths get an error notice; the rest form one batch.
    pub fn attach_paths(&mut self, paths: &[PathBuf]) -> AttachReport {
        let mut unreadable = Vec::new();
        let mut batch = Vec::new();
        for path in paths {
            match MediaFile::from_path(path) {
                Ok(file) => batch.push(file),
                Err(e) => {
                    tracing::warn!("Cannot attach {}: {}", path.display(), e);
                    unreadable.push(crate::notice::Notice::error(e.to_string()));
                }
            }
        }
        let mut report = self.media.attach(batch);
        unreadable.append(&mut report.notices);
        report.notices = unreadable;
        report
    }

    /// Pending media
    pub fn media(&self) -> &MediaList {
        &self.media
    }

    /// Remove one attachment by index
    pub fn remove_media(&mut self, index: usize) -> Option<MediaFile> {
        self.media.remove(index)
    }

    /// Clear all attachments (only when more than one is attached)
    pub fn clear_media(&mut self) -> bool {
        self.media.clear_all()
    }

    /// Drop every attachment
    pub fn discard_media(&mut self) {
        self.media.discard();
    }

    /// Set by the caller while a send is outstanding
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether the submit action is greyed out
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Set the submit label shown to the user
    pub fn set_submit_label(&mut self, label: impl Into<String>) {
        self.submit_label = label.into();
    }

    /// Current submit label
    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    /// The submit action: current HTML and files, unless disabled
    pub fn submission(&self) -> Option<Submission> {
        if self.disabled {
            return None;
        }
        Some(Submission {
            html: self.html.clone(),
            media: self.media.files(),
        })
    }
}
