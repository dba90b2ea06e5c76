//! One-shot send command
//!
//! Builds the same compose page the interactive session uses, applies the
//! command-line selection and content to it, and submits once.

use std::path::PathBuf;

use super::{build_backend, build_provider, open_composer, print_notices, require_session};
use crate::compose::{ComposePage, SubmitOutcome};
use crate::config::Config;
use crate::error::{GroupcastError, Result};
use crate::notice::{messages, Notice};

/// Arguments of `groupcast send`
#[derive(Debug, Clone, Default)]
pub struct SendArgs {
    /// Group ids to select
    pub groups: Vec<String>,
    /// Select every group
    pub all: bool,
    /// Markup replacing the draft
    pub message: Option<String>,
    /// HTML replacing the draft
    pub html: Option<String>,
    /// Files to attach
    pub media: Vec<PathBuf>,
}

/// Run `groupcast send`
pub async fn run_send(config: Config, args: SendArgs) -> Result<()> {
    let provider = build_provider(&config)?;
    require_session(provider.as_ref()).await?;

    let mut page = ComposePage::new(build_backend(&config)?, open_composer(&config)?);
    page.open().await;

    let outcome = send(&mut page, args).await;
    print_notices(page.drain_notices());

    match outcome? {
        SubmitOutcome::Sent => Ok(()),
        SubmitOutcome::Rejected(msg) => Err(GroupcastError::Validation(msg).into()),
        SubmitOutcome::Failed(msg) => Err(anyhow::anyhow!(msg)),
        SubmitOutcome::Busy => Err(anyhow::anyhow!(messages::SEND_IN_PROGRESS)),
    }
}

/// Apply `args` to an opened page and submit
///
/// # Errors
///
/// Returns error when the group list could not be loaded or the draft
/// could not be updated.
pub async fn send(page: &mut ComposePage, args: SendArgs) -> Result<SubmitOutcome> {
    if let Some(err) = page.selector().error() {
        return Err(GroupcastError::Validation(err.to_string()).into());
    }

    if args.all {
        page.select_all();
    }
    for id in &args.groups {
        if !page.selection().contains(id) && !page.toggle(id) {
            page.push_notices([Notice::error(format!("Unknown group {}", id))]);
        }
    }

    if let Some(markup) = &args.message {
        page.composer_mut().set_markup(markup)?;
    } else if let Some(html) = &args.html {
        page.composer_mut().set_html(html.as_str())?;
    }

    // Every named file must be attached; a partial broadcast cannot be recalled.
    if !args.media.is_empty() {
        let report = page.composer_mut().attach_paths(&args.media);
        if report.accepted < args.media.len() {
            let reason = report
                .notices
                .first()
                .map(|n| n.message.clone())
                .unwrap_or_else(|| messages::TOO_MANY_FILES.to_string());
            page.push_notices(report.notices);
            page.composer_mut().discard_media();
            return Ok(SubmitOutcome::Rejected(reason));
        }
        page.push_notices(report.notices);
    }

    Ok(page.submit().await)
}
