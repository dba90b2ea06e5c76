//! Interactive compose session
//!
//! A readline loop over one [`ComposePage`]. Plain lines are markup
//! appended to the draft (fenced code blocks are collected until the
//! closing fence); slash commands drive selection, media and sending.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::special_commands::{parse_compose_command, print_help, ComposeCommand};
use super::{build_backend, build_provider, open_composer, print_notices, require_session};
use crate::auth::AuthUser;
use crate::compose::ComposePage;
use crate::config::Config;
use crate::error::Result;
use crate::notice::messages;
use crate::selector::LoadState;

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading input
    Continue,
    /// Leave the session
    Quit,
    /// Sign out, then leave
    Logout,
}

/// Collects fenced code blocks typed over several lines
#[derive(Debug, Default)]
pub struct MarkupLines {
    fence: Option<Vec<String>>,
}

impl MarkupLines {
    /// Feed one line; returns markup ready to append
    ///
    /// Returns `None` while a code fence is open.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        let is_fence = line.trim_start().starts_with("```");
        match self.fence.as_mut() {
            Some(lines) => {
                lines.push(line.to_string());
                if is_fence {
                    self.fence.take().map(|lines| lines.join("\n"))
                } else {
                    None
                }
            }
            None if is_fence => {
                self.fence = Some(vec![line.to_string()]);
                None
            }
            None => Some(line.to_string()),
        }
    }

    /// Whether a code fence is open
    pub fn is_open(&self) -> bool {
        self.fence.is_some()
    }
}

/// Start the interactive compose session
pub async fn run_compose(config: Config) -> Result<()> {
    let provider = build_provider(&config)?;
    let user = require_session(provider.as_ref()).await?;

    let mut page = ComposePage::new(build_backend(&config)?, open_composer(&config)?);
    print_welcome_banner(&user);
    page.open().await;
    print_groups(&page);

    let mut rl = DefaultEditor::new()?;
    let mut pending = MarkupLines::default();

    loop {
        let prompt = format_prompt(&page, pending.is_open());
        match rl.readline(&prompt) {
            Ok(line) => {
                if pending.is_open() {
                    if let Some(markup) = pending.feed(&line) {
                        if let Err(e) = page.composer_mut().append_markup(&markup) {
                            eprintln!("Error: {}\n", e);
                        }
                    }
                    continue;
                }
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = match parse_compose_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}\n", e);
                        continue;
                    }
                };

                let flow = match command {
                    ComposeCommand::Text(text) => {
                        if let Some(markup) = pending.feed(&text) {
                            page.composer_mut().append_markup(&markup).map(|_| Flow::Continue)
                        } else {
                            Ok(Flow::Continue)
                        }
                    }
                    command => handle_command(&mut page, command).await,
                };
                print_notices(page.drain_notices());

                match flow {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Logout) => {
                        provider.sign_out().await?;
                        println!("Signed out");
                        break;
                    }
                    Err(e) => eprintln!("Error: {}\n", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Apply one slash command to the page
pub async fn handle_command(page: &mut ComposePage, command: ComposeCommand) -> Result<Flow> {
    match command {
        ComposeCommand::Groups => print_groups(page),
        ComposeCommand::Refresh => {
            page.refresh().await;
            print_groups(page);
        }
        ComposeCommand::Toggle(id) => {
            if page.toggle(&id) {
                print_selection(page);
            } else {
                println!("Unknown group {}", id);
            }
        }
        ComposeCommand::SelectAll => {
            page.select_all();
            print_selection(page);
        }
        ComposeCommand::Delete(id) => {
            if page.selector().is_deleting(&id) {
                println!("Group {} is already being deleted", id);
            } else if page.request_delete(&id) {
                println!("{} {} [/yes, /no]", messages::DELETE_CONFIRM, id);
            } else {
                println!("Unknown group {}", id);
            }
        }
        ComposeCommand::ConfirmDelete => match page.selector().confirming().map(str::to_string) {
            None => println!("Nothing to confirm"),
            Some(id) => {
                if page.confirm_delete().await {
                    println!("Deleted group {}", id);
                } else if let Some(err) = page.selector().delete_error() {
                    eprintln!("{} {}", "✗".red(), err.red());
                }
            }
        },
        ComposeCommand::CancelDelete => page.cancel_delete(),
        ComposeCommand::Attach(paths) => {
            let report = page.composer_mut().attach_paths(&paths);
            if report.accepted > 0 {
                println!("Attached {} file(s)", report.accepted);
            }
            page.push_notices(report.notices);
        }
        ComposeCommand::Media => print_media(page),
        ComposeCommand::Remove(index) => match page.composer_mut().remove_media(index) {
            Some(file) => println!("Removed {}", file.name),
            None => println!("No attachment #{}", index + 1),
        },
        ComposeCommand::ClearMedia => {
            if !page.composer_mut().clear_media() {
                println!("Clearing all needs more than one attachment");
            }
        }
        ComposeCommand::Link { url, text } => {
            if !page.composer_mut().set_link(&text, &url)? {
                println!("No plain \"{}\" to link", text);
            }
        }
        ComposeCommand::Unlink(text) => {
            if !page.composer_mut().unset_link(&text)? {
                println!("No link on \"{}\"", text);
            }
        }
        ComposeCommand::Undo => {
            if !page.composer_mut().undo()? {
                println!("Nothing to undo");
            }
        }
        ComposeCommand::Redo => {
            if !page.composer_mut().redo()? {
                println!("Nothing to redo");
            }
        }
        ComposeCommand::Show => super::draft::print_draft(page.composer()),
        ComposeCommand::Stats => println!(
            "{} characters, {} words",
            page.composer().characters(),
            page.composer().words()
        ),
        ComposeCommand::Send => {
            if let Ok(dispatch) = page.begin_submit() {
                println!("{}", page.composer().submit_label().dimmed());
                let backend = page.backend();
                let result = dispatch.send(backend.as_ref()).await;
                page.finish_submit(result);
            }
        }
        ComposeCommand::Help => print_help(),
        ComposeCommand::Logout => return Ok(Flow::Logout),
        ComposeCommand::Quit => return Ok(Flow::Quit),
        ComposeCommand::Text(markup) => {
            page.composer_mut().append_markup(&markup)?;
        }
    }
    Ok(Flow::Continue)
}

fn format_prompt(page: &ComposePage, in_fence: bool) -> String {
    if in_fence {
        return "... ".to_string();
    }
    let media = page.composer().media().len();
    let tag = if media > 0 {
        format!("{} | {} file(s)", page.selection().len(), media)
    } else {
        page.selection().len().to_string()
    };
    format!("[{}] >> ", tag.cyan())
}

fn print_welcome_banner(user: &AuthUser) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              groupcast compose session                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Signed in as {}", user.display_name().cyan());
    println!("Type text to write, '/help' for commands, '/send' to send, '/quit' to quit\n");
}

fn print_groups(page: &ComposePage) {
    let selector = page.selector();
    println!("\nGroups ({})", selector.count());
    match selector.state() {
        LoadState::Idle | LoadState::Loading => println!("  loading..."),
        LoadState::Errored(msg) => {
            println!("  {} {}", "✗".red(), msg.red());
            println!("  /retry to try again");
        }
        LoadState::Loaded => {
            if let Some((title, hint)) = selector.empty_hint() {
                println!("  {}", title);
                println!("  {}", hint.dimmed());
            }
            for group in selector.groups() {
                let mark = if page.selection().contains(&group.key()) {
                    "[x]".green()
                } else {
                    "[ ]".normal()
                };
                println!("  {} {} {}", mark, group.title, group.key().dimmed());
            }
        }
    }
    print_selection(page);
}

fn print_selection(page: &ComposePage) {
    if let Some(summary) = page.selector().selected_summary(page.selection()) {
        println!("{}", summary.dimmed());
    }
}

fn print_media(page: &ComposePage) {
    let media = page.composer().media();
    if media.is_empty() {
        println!("No attachments");
        return;
    }
    for (i, entry) in media.entries().iter().enumerate() {
        println!(
            "  {}. {} ({:?}, {} bytes) {}",
            i + 1,
            entry.file.name,
            entry.preview.kind(),
            entry.file.size,
            entry.preview.url().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{group, Call, FakeBackend};
    use crate::composer::draft::MemoryDraftStore;
    use crate::composer::media::PreviewRegistry;
    use crate::composer::Composer;
    use crate::config::ComposerConfig;
    use std::sync::Arc;

    async fn page(backend: Arc<FakeBackend>) -> ComposePage {
        backend.push_groups(Ok(vec![group(1, "A"), group(2, "B")]));
        let composer = Composer::open(
            &ComposerConfig::default(),
            Arc::new(MemoryDraftStore::new()),
            None,
            PreviewRegistry::new(),
        )
        .unwrap();
        let mut page = ComposePage::new(backend, composer);
        page.open().await;
        page
    }

    #[test]
    fn test_markup_lines_collects_fences() {
        let mut lines = MarkupLines::default();
        assert_eq!(lines.feed("plain"), Some("plain".to_string()));
        assert_eq!(lines.feed("```"), None);
        assert!(lines.is_open());
        assert_eq!(lines.feed("let x = 1;"), None);
        assert_eq!(lines.feed("```"), Some("```\nlet x = 1;\n```".to_string()));
        assert!(!lines.is_open());
    }

    #[tokio::test]
    async fn test_session_flow() {
        let backend = Arc::new(FakeBackend::new());
        let mut page = page(backend.clone()).await;

        handle_command(&mut page, ComposeCommand::Text("Hello".into()))
            .await
            .unwrap();
        handle_command(&mut page, ComposeCommand::Toggle("2".into()))
            .await
            .unwrap();
        assert_eq!(
            handle_command(&mut page, ComposeCommand::Send).await.unwrap(),
            Flow::Continue
        );

        assert!(matches!(
            backend.calls().last(),
            Some(Call::SendMessage(req)) if req.group_ids == ["2"]
        ));
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let backend = Arc::new(FakeBackend::new());
        let mut page = page(backend.clone()).await;

        handle_command(&mut page, ComposeCommand::Delete("1".into()))
            .await
            .unwrap();
        handle_command(&mut page, ComposeCommand::CancelDelete)
            .await
            .unwrap();
        handle_command(&mut page, ComposeCommand::ConfirmDelete)
            .await
            .unwrap();
        assert_eq!(page.selector().count(), 2);

        handle_command(&mut page, ComposeCommand::Delete("1".into()))
            .await
            .unwrap();
        handle_command(&mut page, ComposeCommand::ConfirmDelete)
            .await
            .unwrap();
        assert_eq!(page.selector().count(), 1);
        assert!(backend.calls().contains(&Call::DeleteGroup("1".into())));
    }

    #[tokio::test]
    async fn test_quit_and_logout_flow() {
        let backend = Arc::new(FakeBackend::new());
        let mut page = page(backend).await;
        assert_eq!(
            handle_command(&mut page, ComposeCommand::Quit).await.unwrap(),
            Flow::Quit
        );
        assert_eq!(
            handle_command(&mut page, ComposeCommand::Logout).await.unwrap(),
            Flow::Logout
        );
    }
}
