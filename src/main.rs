//! groupcast - broadcast rich-text messages to registered groups
//!
#![doc = "groupcast - compose-and-broadcast client"]
#![doc = "Main entry point for the groupcast command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use groupcast::cli::{Cli, Commands};
use groupcast::commands;
use groupcast::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Login { email, password } => {
            tracing::info!("Starting sign-in");
            commands::auth::login(config, email, password).await
        }
        Commands::Logout => commands::auth::logout(config).await,
        Commands::Status => commands::auth::status(config).await,
        Commands::Groups { command } => {
            tracing::info!("Starting group management command");
            commands::groups::handle_groups(config, command).await
        }
        Commands::Draft { command } => commands::draft::handle_draft(config, command).await,
        Commands::Send {
            groups,
            all,
            message,
            html,
            media,
        } => {
            tracing::info!("Starting one-shot send");
            if !media.is_empty() {
                tracing::debug!("Attaching {} file(s)", media.len());
            }
            let args = commands::send::SendArgs {
                groups,
                all,
                message,
                html,
                media,
            };
            commands::send::run_send(config, args).await
        }
        Commands::Compose => {
            tracing::info!("Starting interactive compose session");
            commands::compose::run_compose(config).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "groupcast=debug"
    } else {
        "groupcast=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
