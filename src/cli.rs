//! Command-line interface definition for groupcast
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for signing in, managing groups, editing the draft
//! and broadcasting messages.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// groupcast - broadcast rich-text messages to registered groups
///
/// Compose a message (text plus images or videos) and deliver it to any
/// subset of the groups registered with the delivery backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "groupcast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for groupcast
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in with login and password
    Login {
        /// Login (email address); prompted when omitted
        #[arg(short, long)]
        email: Option<String>,

        /// Password; prompted when omitted
        #[arg(short, long, env = "GROUPCAST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget stored credentials
    Logout,

    /// Show the current session state
    Status,

    /// Manage destination groups
    Groups {
        /// Group management subcommand
        #[command(subcommand)]
        command: GroupCommand,
    },

    /// Inspect or edit the persisted draft
    Draft {
        /// Draft subcommand
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Send the draft (or the given message) to the selected groups
    Send {
        /// Destination group id (repeatable)
        #[arg(short, long = "group", allow_negative_numbers = true)]
        groups: Vec<String>,

        /// Send to every registered group
        #[arg(long, conflicts_with = "groups")]
        all: bool,

        /// Message in inline markup; replaces the draft
        #[arg(short, long, conflicts_with = "html")]
        message: Option<String>,

        /// Message as raw HTML; replaces the draft
        #[arg(long)]
        html: Option<String>,

        /// Image or video file to attach (repeatable)
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },

    /// Start an interactive compose session
    Compose,
}

/// Group management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommand {
    /// List registered groups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a registered group
    Delete {
        /// Group id
        #[arg(allow_negative_numbers = true)]
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Draft subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Print the persisted draft HTML
    Show,

    /// Replace the draft with the given inline markup
    Set {
        /// Message in inline markup
        markup: String,
    },

    /// Remove the persisted draft
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_url: None,
            verbose: false,
            command: Commands::Status,
        }
    }
}
