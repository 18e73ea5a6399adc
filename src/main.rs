//! Hubsim - in-memory social-protocol hub simulator
//!
//! Main application entry point with unified CLI command structure.

mod commands;

use clap::Command;
use hubsim::{config::Config, error};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    error::install_error_handlers()?;

    // Load configuration from file and/or environment variables
    let config = Config::load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load configuration: {}", e))?;

    // Initialize logging
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.default_level));

    // Apply dependency filters if configured
    if let Some(dep_filter) = &config.logging.dependency_filter {
        let filter_string = format!("{},{}", env_filter, dep_filter);
        env_filter = EnvFilter::try_new(&filter_string).unwrap_or(env_filter);
    }

    let format = fmt::format().with_thread_ids(true).with_target(false);
    if config.logging.format == "json" {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().event_format(format))
            .init();
    }

    // Define base CLI structure
    let base_app = Command::new("Hubsim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("In-memory social-protocol hub simulator");

    // Register all command modules
    let app = commands::register_commands(base_app);

    // Parse command line arguments
    let matches = app.get_matches();

    // Handle commands based on matches
    commands::handle_commands(matches, &config).await?;

    info!("Execution completed successfully");
    Ok(())
}
