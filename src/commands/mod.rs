/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `auth`: sign in, sign out and session status
- `groups`: list and delete registered groups
- `draft`: inspect and edit the persisted draft
- `send`: one-shot broadcast
- `compose`: interactive compose session

Every handler except the ones in `auth` goes through [`require_session`]
first, which runs the authentication gate for the compose view.
*/

use std::borrow::Cow;
use std::sync::Arc;

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Config as EditorConfig, Editor, Helper};

use crate::auth::{
    AuthGate, AuthUser, GateDecision, IdentityProvider, IdentityToolkitProvider,
    KeyringCredentialStore, View,
};
use crate::backend::{Backend, HttpBackend};
use crate::composer::draft::{DraftStore, SqliteDraftStore};
use crate::composer::media::PreviewRegistry;
use crate::composer::Composer;
use crate::config::Config;
use crate::error::{GroupcastError, Result};
use crate::notice::Notice;

// Compose-session slash commands
pub mod special_commands;

// Group management commands
pub mod groups;

// One-shot send command
pub mod send;

// Interactive compose session
pub mod compose;

/// Build the identity provider backed by the OS keyring
pub fn build_provider(config: &Config) -> Result<Arc<dyn IdentityProvider>> {
    let store = Arc::new(KeyringCredentialStore::default());
    let provider =
        IdentityToolkitProvider::new(&config.identity, store, crate::auth::SessionHub::new())?;
    Ok(Arc::new(provider))
}

/// Build the HTTP backend client
pub fn build_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(HttpBackend::new(&config.backend)?))
}

/// Open the configured draft store
pub fn open_draft_store(config: &Config) -> Result<Arc<dyn DraftStore>> {
    let store = match &config.storage.draft_db {
        Some(path) => SqliteDraftStore::new_with_path(path)?,
        None => SqliteDraftStore::new()?,
    };
    tracing::debug!("Using draft database {}", store.path().display());
    Ok(Arc::new(store))
}

/// Open the composer on the persisted draft
pub fn open_composer(config: &Config) -> Result<Composer> {
    Composer::open(
        &config.composer,
        open_draft_store(config)?,
        None,
        PreviewRegistry::new(),
    )
}

/// Restore the session and pass the gate for the compose view
///
/// # Errors
///
/// Returns [`GroupcastError::NotSignedIn`] when the gate redirects to the
/// login view.
pub async fn require_session(provider: &dyn IdentityProvider) -> Result<AuthUser> {
    let mut gate = AuthGate::new(provider.hub().subscribe());
    provider.restore().await?;

    match gate.wait_ready(View::Compose).await? {
        GateDecision::Render(_) => gate.state().user().cloned().ok_or_else(|| {
            GroupcastError::NotSignedIn("run `groupcast login` first".to_string()).into()
        }),
        GateDecision::Redirect(_) | GateDecision::Loading => {
            Err(GroupcastError::NotSignedIn("run `groupcast login` first".to_string()).into())
        }
    }
}

/// Print notices to the terminal
pub fn print_notices(notices: impl IntoIterator<Item = Notice>) {
    for notice in notices {
        match notice.level {
            crate::notice::NoticeLevel::Error => eprintln!("{}", notice),
            _ => println!("{}", notice),
        }
    }
}

/// Ask a yes/no question; anything but `y`/`yes` is no
pub fn confirm(question: &str) -> Result<bool> {
    let mut rl = rustyline::DefaultEditor::new()?;
    let answer = rl.readline(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Line editor helper that draws every typed character as `*`
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskedInput;

impl Helper for MaskedInput {}

impl Completer for MaskedInput {
    type Candidate = String;
}

impl Hinter for MaskedInput {
    type Hint = String;
}

impl Validator for MaskedInput {}

impl Highlighter for MaskedInput {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// Read a secret from the terminal with the input masked
///
/// The line is never added to the editor history.
pub fn read_masked(prompt: &str) -> Result<String> {
    let editor_config = EditorConfig::builder()
        .color_mode(ColorMode::Forced)
        .auto_add_history(false)
        .build();
    let mut rl: Editor<MaskedInput, DefaultHistory> = Editor::with_config(editor_config)?;
    rl.set_helper(Some(MaskedInput));
    Ok(rl.readline(prompt)?)
}

// Sign-in commands
pub mod auth {
    //! Sign-in, sign-out and status handlers.
    //!
    //! `login` runs the gate for the login view: an existing session is
    //! redirected (reported as already signed in) instead of signing in
    //! again.

    use super::*;
    use crate::auth::{LoginForm, LoginOutcome, SessionState};
    use crate::notice::messages;
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Sign in with login and password
    ///
    /// Missing fields are prompted for interactively; the password prompt
    /// is masked.
    pub async fn login(config: Config, email: Option<String>, password: Option<String>) -> Result<()> {
        let provider = build_provider(&config)?;
        sign_in(&config, provider.as_ref(), email, password).await
    }

    /// Run the login view against `provider`
    ///
    /// An existing session is reported and left alone; the API key is only
    /// required once a sign-in is actually attempted.
    pub async fn sign_in(
        config: &Config,
        provider: &dyn IdentityProvider,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        let mut gate = AuthGate::new(provider.hub().subscribe());
        provider.restore().await?;

        if let GateDecision::Redirect(_) = gate.wait_ready(View::Login).await? {
            if let Some(user) = gate.state().user() {
                println!("Already signed in as {}", user.display_name().cyan());
            }
            return Ok(());
        }

        config.require_api_key()?;

        let mut form = LoginForm::new();
        form.set_login(match email {
            Some(email) => email,
            None => DefaultEditor::new()?.readline("Login: ")?,
        });
        form.set_password(match password {
            Some(password) => password,
            None => read_masked("Password: ")?,
        });

        println!("{}", form.submit_label());
        match form.submit(provider).await {
            LoginOutcome::Navigate(_) => {
                let who = gate
                    .state()
                    .user()
                    .map(|u| u.display_name().to_string())
                    .unwrap_or_else(|| form.login().trim().to_string());
                println!("{} Signed in as {}", "✓".green(), who.cyan());
                Ok(())
            }
            LoginOutcome::Invalid(msg) => Err(GroupcastError::Validation(msg.to_string()).into()),
            LoginOutcome::Failed(_) => {
                Err(GroupcastError::Auth(messages::LOGIN_FAILED.to_string()).into())
            }
        }
    }

    /// Sign out and forget the stored credential
    pub async fn logout(config: Config) -> Result<()> {
        let provider = build_provider(&config)?;
        provider.restore().await?;
        provider.sign_out().await?;
        println!("Signed out");
        Ok(())
    }

    /// Print the session state
    pub async fn status(config: Config) -> Result<()> {
        let provider = build_provider(&config)?;
        let mut subscription = provider.hub().subscribe();
        provider.restore().await?;
        let state = subscription.wait_ready().await?;
        println!("{}", status_line(&state));
        println!("Backend: {}", config.backend.base_url);
        Ok(())
    }

    /// One-line description of a session state
    pub fn status_line(state: &SessionState) -> String {
        match state {
            SessionState::Authenticated(user) => {
                format!("Signed in as {}", user.display_name())
            }
            SessionState::Unauthenticated => "Not signed in".to_string(),
            SessionState::Unknown => "Checking session...".to_string(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use crate::auth::provider::fake::FakeIdentityProvider;

        #[tokio::test]
        async fn test_signed_in_user_needs_no_api_key() {
            let provider = FakeIdentityProvider::new("ops@example.com", "pw");
            provider
                .sign_in_with_password("ops@example.com", "pw")
                .await
                .unwrap();

            let config = Config::default();
            assert!(config.identity.api_key.is_none());
            sign_in(&config, &provider, None, None).await.unwrap();
            assert_eq!(provider.attempts.lock().unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_signed_out_user_needs_api_key() {
            let provider = FakeIdentityProvider::new("ops@example.com", "pw");
            let result = sign_in(
                &Config::default(),
                &provider,
                Some("ops@example.com".into()),
                Some("pw".into()),
            )
            .await;

            crate::test_utils::assert_error_contains(result, "identity.api_key");
            assert!(provider.attempts.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_sign_in_with_supplied_fields() {
            let provider = FakeIdentityProvider::new("ops@example.com", "pw");
            let mut config = Config::default();
            config.identity.api_key = Some("key".into());

            sign_in(
                &config,
                &provider,
                Some(" ops@example.com ".into()),
                Some("pw".into()),
            )
            .await
            .unwrap();
            assert!(provider.hub().current().user().is_some());
        }

        #[test]
        fn test_status_line() {
            let user = AuthUser {
                uid: "u1".into(),
                email: Some("ops@example.com".into()),
            };
            assert_eq!(
                status_line(&SessionState::Authenticated(user)),
                "Signed in as ops@example.com"
            );
            assert_eq!(status_line(&SessionState::Unauthenticated), "Not signed in");
        }
    }
}

// Draft commands
pub mod draft {
    //! Draft inspection and editing handlers.

    use super::*;
    use crate::cli::DraftCommand;
    use colored::Colorize;

    /// Run a draft subcommand
    pub async fn handle_draft(config: Config, command: DraftCommand) -> Result<()> {
        let provider = build_provider(&config)?;
        require_session(provider.as_ref()).await?;
        let mut composer = open_composer(&config)?;
        run(&mut composer, command)
    }

    /// Apply a draft subcommand to an opened composer
    pub fn run(composer: &mut Composer, command: DraftCommand) -> Result<()> {
        match command {
            DraftCommand::Show => {
                print_draft(composer);
            }
            DraftCommand::Set { markup } => {
                composer.set_markup(&markup)?;
                println!("Draft saved ({} characters)", composer.characters());
            }
            DraftCommand::Clear => {
                composer.clear_persisted_draft()?;
                println!("Draft cleared");
            }
        }
        Ok(())
    }

    /// Print the draft HTML, or the placeholder when empty
    pub fn print_draft(composer: &Composer) {
        if composer.is_empty() {
            println!("{}", composer.placeholder().dimmed());
        } else {
            println!("{}", composer.html());
        }
        println!(
            "{}",
            format!("{} characters, {} words", composer.characters(), composer.words()).dimmed()
        );
    }

}
