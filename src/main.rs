//! Scholia - social science research assistant
//!
//! Main entry point for the Scholia CLI.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scholia::cli::{Cli, Commands};
use scholia::commands;
use scholia::config::Config;

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

    // Execute command
    match cli.command {
        Commands::Chat { model } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }

            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Analyze {
            images,
            prompt,
            json,
            model,
        } => {
            tracing::info!("Starting image analysis");
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }

            commands::analyze::run_analyze(config, images, prompt, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with rendered output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "scholia=debug" } else { "scholia=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
