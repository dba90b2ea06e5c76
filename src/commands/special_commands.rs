//! Slash commands for the interactive compose session
//!
//! Lines starting with `/` drive the page: group selection, attachments,
//! links, history and sending. Anything else is markup appended to the
//! draft. Command names are case-insensitive; arguments keep their case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing compose commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// A parsed compose-session input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeCommand {
    /// List groups with selection marks
    Groups,
    /// Refetch the group list
    Refresh,
    /// Flip one group in the selection
    Toggle(String),
    /// Select all groups, or clear when all are selected
    SelectAll,
    /// Ask to delete a group
    Delete(String),
    /// Confirm the pending delete
    ConfirmDelete,
    /// Cancel the pending delete
    CancelDelete,
    /// Attach files as one batch
    Attach(Vec<PathBuf>),
    /// List attachments
    Media,
    /// Remove one attachment (zero-based)
    Remove(usize),
    /// Remove every attachment
    ClearMedia,
    /// Link the first plain occurrence of `text`
    Link { url: String, text: String },
    /// Remove the link around `text`
    Unlink(String),
    /// Undo the last edit
    Undo,
    /// Redo the last undone edit
    Redo,
    /// Print the draft HTML
    Show,
    /// Print character and word counts
    Stats,
    /// Send to the selected groups
    Send,
    /// Show help
    Help,
    /// Sign out and leave
    Logout,
    /// Leave the session
    Quit,
    /// Markup to append to the draft
    Text(String),
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn unexpected(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

/// Parse one input line
///
/// # Examples
///
/// ```
/// use groupcast::commands::special_commands::{parse_compose_command, ComposeCommand};
///
/// assert_eq!(parse_compose_command("/send").unwrap(), ComposeCommand::Send);
/// assert_eq!(
///     parse_compose_command("/toggle -1001").unwrap(),
///     ComposeCommand::Toggle("-1001".to_string())
/// );
/// assert_eq!(
///     parse_compose_command("Hello **team**").unwrap(),
///     ComposeCommand::Text("Hello **team**".to_string())
/// );
/// assert!(parse_compose_command("/foo").is_err());
/// ```
pub fn parse_compose_command(input: &str) -> Result<ComposeCommand, CommandError> {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return Ok(ComposeCommand::Text(input.to_string()));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let no_args = |cmd: ComposeCommand| {
        if rest.is_empty() {
            Ok(cmd)
        } else {
            Err(unexpected(&name, rest))
        }
    };

    match name.as_str() {
        "/groups" => no_args(ComposeCommand::Groups),
        "/refresh" | "/retry" => no_args(ComposeCommand::Refresh),
        "/all" => no_args(ComposeCommand::SelectAll),
        "/yes" => no_args(ComposeCommand::ConfirmDelete),
        "/no" => no_args(ComposeCommand::CancelDelete),
        "/media" => no_args(ComposeCommand::Media),
        "/clear-media" => no_args(ComposeCommand::ClearMedia),
        "/undo" => no_args(ComposeCommand::Undo),
        "/redo" => no_args(ComposeCommand::Redo),
        "/show" => no_args(ComposeCommand::Show),
        "/stats" => no_args(ComposeCommand::Stats),
        "/send" => no_args(ComposeCommand::Send),
        "/help" | "/?" => no_args(ComposeCommand::Help),
        "/logout" => no_args(ComposeCommand::Logout),
        "/quit" | "/exit" => no_args(ComposeCommand::Quit),

        "/toggle" if rest.is_empty() => Err(missing("/toggle", "/toggle <group_id>")),
        "/toggle" => Ok(ComposeCommand::Toggle(rest.to_string())),

        "/delete" if rest.is_empty() => Err(missing("/delete", "/delete <group_id>")),
        "/delete" => Ok(ComposeCommand::Delete(rest.to_string())),

        "/attach" if rest.is_empty() => Err(missing("/attach", "/attach <path>...")),
        "/attach" => Ok(ComposeCommand::Attach(
            rest.split_whitespace().map(PathBuf::from).collect(),
        )),

        "/remove" if rest.is_empty() => Err(missing("/remove", "/remove <n>")),
        "/remove" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(ComposeCommand::Remove(n - 1)),
            _ => Err(unexpected("/remove", rest)),
        },

        "/link" => match rest.split_once(char::is_whitespace) {
            Some((url, text)) if !text.trim().is_empty() => Ok(ComposeCommand::Link {
                url: url.to_string(),
                text: text.trim().to_string(),
            }),
            _ => Err(missing("/link", "/link <url> <text>")),
        },

        "/unlink" if rest.is_empty() => Err(missing("/unlink", "/unlink <text>")),
        "/unlink" => Ok(ComposeCommand::Unlink(rest.to_string())),

        _ => Err(CommandError::UnknownCommand(name.clone())),
    }
}

/// Print compose-session help
pub fn print_help() {
    println!(
        r#"
Compose Session Commands
========================

Plain lines are appended to the draft as markup:
  **bold**  *italic*  __underline__  ~~strike~~  `code`
  [text](https://...)  ![alt](https://...)
  - item    1. item    > quote    ``` code block ```

GROUPS:
  /groups          - List groups ([x] marks the selection)
  /refresh         - Reload the group list (also /retry)
  /toggle <id>     - Select or deselect a group
  /all             - Select all groups, or clear when all are selected
  /delete <id>     - Delete a group (confirm with /yes, cancel with /no)

MEDIA:
  /attach <path>.. - Attach images or videos (max 10 files, 10 MB each)
  /media           - List attachments
  /remove <n>      - Remove attachment number n
  /clear-media     - Remove all attachments

EDITING:
  /link <url> <text> - Link the first occurrence of text
  /unlink <text>   - Remove the link around text
  /undo, /redo     - Step through edit history
  /show            - Print the draft HTML
  /stats           - Character and word count

SESSION:
  /send            - Send to the selected groups
  /logout          - Sign out and leave
  /help            - Show this help
  /quit            - Leave (the draft is kept)
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_markup() {
        assert_eq!(
            parse_compose_command("  - item").unwrap(),
            ComposeCommand::Text("  - item".to_string())
        );
    }

    #[test]
    fn test_names_are_case_insensitive_args_are_not() {
        assert_eq!(
            parse_compose_command("/ATTACH /tmp/Cat.PNG b.mp4").unwrap(),
            ComposeCommand::Attach(vec![PathBuf::from("/tmp/Cat.PNG"), PathBuf::from("b.mp4")])
        );
        assert_eq!(parse_compose_command("/Send").unwrap(), ComposeCommand::Send);
    }

    #[test]
    fn test_remove_is_one_based() {
        assert_eq!(
            parse_compose_command("/remove 1").unwrap(),
            ComposeCommand::Remove(0)
        );
        assert!(matches!(
            parse_compose_command("/remove 0"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_link_requires_url_and_text() {
        assert_eq!(
            parse_compose_command("/link https://x.io the docs").unwrap(),
            ComposeCommand::Link {
                url: "https://x.io".to_string(),
                text: "the docs".to_string()
            }
        );
        assert!(matches!(
            parse_compose_command("/link https://x.io"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_missing_and_unexpected_arguments() {
        assert_eq!(
            parse_compose_command("/toggle"),
            Err(CommandError::MissingArgument {
                command: "/toggle".to_string(),
                usage: "/toggle <group_id>".to_string()
            })
        );
        assert_eq!(
            parse_compose_command("/send now"),
            Err(CommandError::UnsupportedArgument {
                command: "/send".to_string(),
                arg: "now".to_string()
            })
        );
    }

    #[test]
    fn test_quit_aliases() {
        for input in ["/quit", "/EXIT", "/exit"] {
            assert_eq!(parse_compose_command(input).unwrap(), ComposeCommand::Quit);
        }
    }

    #[test]
    fn test_bare_quit_words_are_text() {
        for input in ["exit", "quit", "QUIT"] {
            assert_eq!(
                parse_compose_command(input).unwrap(),
                ComposeCommand::Text(input.to_string())
            );
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_compose_command("/foo bar"),
            Err(CommandError::UnknownCommand("/foo".to_string()))
        );
    }
}
