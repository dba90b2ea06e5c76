//! Pending media attachments
//!
//! Files and their previews live in one entry list, so the two views
//! always have the same length and order. Previews are owned handles: an
//! entry leaving the list (removal, clear, successful send, or the composer
//! going away) drops its handle and releases the preview.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{GroupcastError, Result};
use crate::notice::{messages, Notice};

/// Maximum number of attached files
pub const MAX_MEDIA_FILES: usize = 10;

/// Maximum size of one attached file in bytes (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A local file picked for attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Location on disk
    pub path: PathBuf,
    /// File name sent to the backend
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type
    pub mime: String,
}

impl MediaFile {
    /// Describe a file on disk, sniffing its MIME type from the extension
    ///
    /// # Errors
    ///
    /// Returns [`GroupcastError::Media`] if the path is not a readable file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| GroupcastError::Media(format!("{}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(GroupcastError::Media(format!("{} is not a file", path.display())).into());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            mime,
        })
    }

    /// The preview kind for this file
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime)
    }

    /// Whether the picker would offer this file (`image/*,video/*`)
    pub fn is_accepted_type(&self) -> bool {
        self.mime.starts_with("image/") || self.mime.starts_with("video/")
    }
}

/// How a preview is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Rendered as an image
    Image,
    /// Rendered as a video
    Video,
}

impl MediaKind {
    /// `Video` for `video/*`, `Image` for everything else
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// Issues and resolves client-only preview URLs
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<Uuid, PathBuf>>>,
}

impl PreviewRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview for `path`
    pub fn create(&self, path: &Path, kind: MediaKind) -> PreviewHandle {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id, path.to_path_buf());
        }
        PreviewHandle {
            id,
            kind,
            registry: Arc::clone(&self.live),
        }
    }

    /// Resolve a preview URL to its file, if still live
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let id = url.strip_prefix("preview:")?.parse::<Uuid>().ok()?;
        self.live.lock().ok()?.get(&id).cloned()
    }

    /// Number of previews not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// An owned preview reference; dropping it releases the preview
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    kind: MediaKind,
    registry: Arc<Mutex<HashMap<Uuid, PathBuf>>>,
}

impl PreviewHandle {
    /// The preview URL, `preview:<uuid>`
    pub fn url(&self) -> String {
        format!("preview:{}", self.id)
    }

    /// Rendering kind
    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.registry.lock() {
            live.remove(&self.id);
        }
    }
}

/// One attachment: the file plus its preview
#[derive(Debug)]
pub struct MediaEntry {
    /// The file
    pub file: MediaFile,
    /// Its preview
    pub preview: PreviewHandle,
}

/// What happened to a picked batch
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AttachReport {
    /// Files appended
    pub accepted: usize,
    /// Notices for the batch or for individual files
    pub notices: Vec<Notice>,
}

impl AttachReport {
    /// True when the whole batch was turned away
    pub fn batch_rejected(&self) -> bool {
        self.accepted == 0 && self.notices.iter().any(|n| n.message == messages::TOO_MANY_FILES)
    }
}

/// Ordered list of pending attachments
#[derive(Debug, Default)]
pub struct MediaList {
    entries: Vec<MediaEntry>,
    previews: PreviewRegistry,
}

impl MediaList {
    /// Empty list issuing previews from `previews`
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            entries: Vec::new(),
            previews,
        }
    }

    /// Attach a picked batch
    ///
    /// The whole batch is refused when it would push the list past
    /// [`MAX_MEDIA_FILES`]. Otherwise each file is checked on its own:
    /// wrong type or more than [`MAX_FILE_SIZE`] bytes gets a per-file
    /// notice, the rest are appended in order.
    pub fn attach(&mut self, batch: Vec<MediaFile>) -> AttachReport {
        let mut report = AttachReport::default();
        if batch.is_empty() {
            return report;
        }

        if self.entries.len() + batch.len() > MAX_MEDIA_FILES {
            tracing::debug!(
                "Refusing batch of {} files with {} attached",
                batch.len(),
                self.entries.len()
            );
            report.notices.push(Notice::error(messages::TOO_MANY_FILES));
            return report;
        }

        for file in batch {
            if !file.is_accepted_type() {
                report
                    .notices
                    .push(Notice::error(messages::unsupported_media(&file.name)));
                continue;
            }
            if file.size > MAX_FILE_SIZE {
                report
                    .notices
                    .push(Notice::error(messages::file_too_large(&file.name)));
                continue;
            }
            let preview = self.previews.create(&file.path, file.kind());
            self.entries.push(MediaEntry { file, preview });
            report.accepted += 1;
        }

        report
    }

    /// Remove one entry by index, returning its file
    pub fn remove(&mut self, index: usize) -> Option<MediaFile> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index).file)
    }

    /// Whether clear-all is offered (more than one item)
    pub fn can_clear_all(&self) -> bool {
        self.entries.len() > 1
    }

    /// Remove every entry; only acts when [`Self::can_clear_all`]
    pub fn clear_all(&mut self) -> bool {
        if !self.can_clear_all() {
            return false;
        }
        self.entries.clear();
        true
    }

    /// Drop every entry unconditionally
    pub fn discard(&mut self) {
        self.entries.clear();
    }

    /// Attached files in order
    pub fn files(&self) -> Vec<MediaFile> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }

    /// Preview handles in the same order as [`Self::files`]
    pub fn previews(&self) -> impl Iterator<Item = &PreviewHandle> {
        self.entries.iter().map(|e| &e.preview)
    }

    /// Entries in order
    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    /// Number of attached files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is attached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
