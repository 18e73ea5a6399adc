pub mod seed;

use clap::Command;
use color_eyre::eyre::Result;
use hubsim::config::Config;

/// Register all application commands
pub fn register_commands(app: Command) -> Command {
    app.subcommand(seed::register_commands(Command::new("seed")))
}

/// Handle all application commands
pub async fn handle_commands(matches: clap::ArgMatches, config: &Config) -> Result<()> {
    match matches.subcommand() {
        Some(("seed", seed_matches)) => seed::handle_command(seed_matches, config).await,
        _ => {
            println!("Please specify a subcommand. Use --help for more information.");
            Ok(())
        },
    }
}
