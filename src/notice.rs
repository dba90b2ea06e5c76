//! Transient notifications
//!
//! Pages push [`Notice`]s while handling user actions; the terminal front
//! end drains and prints them after each action, the way toasts are shown
//! and dismissed in a graphical client.

use colored::Colorize;
use std::fmt;

/// User-facing message texts
pub mod messages {
    /// Submit rejected: the selection is empty
    pub const PICK_GROUP: &str = "Pick at least one group";
    /// Submit rejected: no content and no media
    pub const MESSAGE_EMPTY: &str = "Message is empty";
    /// Send confirmed by the backend
    pub const SEND_OK: &str = "Message sent";
    /// Backend refused the send without a message
    pub const SEND_FAILED: &str = "Failed to send message";
    /// A send is already in flight
    pub const SEND_IN_PROGRESS: &str = "A message is already being sent";
    /// Network failure or unreadable response
    pub const SERVER_UNREACHABLE: &str = "Could not reach the server";
    /// Backend reported a failure while listing groups
    pub const GROUPS_LOAD_FAILED: &str = "Failed to load groups";
    /// Backend reported a failure while deleting a group
    pub const GROUP_DELETE_FAILED: &str = "Failed to delete group";
    /// Group list loaded but empty
    pub const NO_GROUPS: &str = "No groups found";
    /// Hint shown under [`NO_GROUPS`]
    pub const NO_GROUPS_HINT: &str = "Add the bot to a group and make it an admin";
    /// Delete confirmation question
    pub const DELETE_CONFIRM: &str = "Delete this group?";
    /// Identity provider refused the credentials (any cause)
    pub const LOGIN_FAILED: &str = "Login or password is incorrect.";
    /// Login form field missing
    pub const LOGIN_REQUIRED: &str = "Login is required";
    /// Login form field missing
    pub const PASSWORD_REQUIRED: &str = "Password is required";
    /// Login submit label while idle
    pub const LOGIN_LABEL: &str = "Sign in";
    /// Login submit label while a sign-in is outstanding
    pub const LOGIN_BUSY_LABEL: &str = "Checking...";
    /// Composer submit label while a send is outstanding
    pub const SENDING_LABEL: &str = "Sending...";
    /// Batch rejected: media cap reached
    pub const TOO_MANY_FILES: &str = "You can attach at most 10 files";

    /// Per-file rejection: file over the size cap
    pub fn file_too_large(name: &str) -> String {
        format!("{} - must not exceed 10 MB", name)
    }

    /// Per-file rejection: neither image nor video
    pub fn unsupported_media(name: &str) -> String {
        format!("{} - only images and videos can be attached", name)
    }

    /// Selector footer
    pub fn groups_selected(count: usize) -> String {
        if count == 1 {
            "1 group selected".to_string()
        } else {
            format!("{} groups selected", count)
        }
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Action succeeded
    Success,
    /// Action failed or was rejected
    Error,
    /// Informational
    Info,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub message: String,
}

impl Notice {
    /// Create a success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Create an error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Create an informational notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "{} {}", "✓".green(), self.message),
            NoticeLevel::Error => write!(f, "{} {}", "✗".red(), self.message.red()),
            NoticeLevel::Info => write!(f, "{} {}", "•".cyan(), self.message),
        }
    }
}

/// Queue of pending notices
#[derive(Debug, Default)]
pub struct NoticeLog {
    pending: Vec<Notice>,
}

impl NoticeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice
    pub fn push(&mut self, notice: Notice) {
        tracing::debug!(level = ?notice.level, "notice: {}", notice.message);
        self.pending.push(notice);
    }

    /// Queue several notices in order
    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.push(notice);
        }
    }

    /// Pending notices, oldest first
    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    /// Take all pending notices
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }
}
