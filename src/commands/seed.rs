//! `seed` command: populate the in-memory hub with a simulated dataset
use clap::{Arg, ArgMatches, Command};
use color_eyre::eyre::{Result, eyre};
use hubsim::{
    app::StateProvider,
    config::Config,
    generator::{GeneratorError, run_fixed, run_timeline},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Register the seed command and its arguments
pub fn register_commands(command: Command) -> Command {
    command
        .about("Populate the in-memory hub with a simulated dataset")
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .value_parser(["timeline", "fixed"])
                .default_value("timeline")
                .help("Generation strategy: time-based adoption growth or fixed population"),
        )
        .arg(
            Arg::new("identities")
                .long("identities")
                .value_parser(clap::value_parser!(u64))
                .help("Number of identities to create (overrides config)"),
        )
        .arg(
            Arg::new("months")
                .long("months")
                .value_parser(clap::value_parser!(u32))
                .help("Simulated window length in months (timeline strategy)"),
        )
        .arg(
            Arg::new("casts-per-identity")
                .long("casts-per-identity")
                .value_parser(clap::value_parser!(u32))
                .help("Base casts per identity (fixed strategy)"),
        )
        .arg(
            Arg::new("reply-rounds")
                .long("reply-rounds")
                .value_parser(clap::value_parser!(u32))
                .help("Reply rounds (fixed strategy)"),
        )
        .arg(
            Arg::new("replies-per-cast")
                .long("replies-per-cast")
                .value_parser(clap::value_parser!(u32))
                .help("Replies per selected cast (fixed strategy)"),
        )
}

/// Handle the seed command
pub async fn handle_command(matches: &ArgMatches, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if let Some(identities) = matches.get_one::<u64>("identities") {
        config.generator.identities = *identities;
        config.generator.final_daily_active =
            config.generator.final_daily_active.min(*identities);
        config.generator.initial_daily_active =
            config.generator.initial_daily_active.min(config.generator.final_daily_active);
    }
    if let Some(months) = matches.get_one::<u32>("months") {
        config.generator.months = *months;
    }
    if let Some(casts) = matches.get_one::<u32>("casts-per-identity") {
        config.generator.casts_per_identity = *casts;
    }
    if let Some(rounds) = matches.get_one::<u32>("reply-rounds") {
        config.generator.reply_rounds = *rounds;
    }
    if let Some(replies) = matches.get_one::<u32>("replies-per-cast") {
        config.generator.replies_per_cast = *replies;
    }

    let state = StateProvider::new(&config)?.provide()?;

    // Ctrl-C cancels generation cooperatively; whatever is stored stays.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling generation");
            signal_cancel.cancel();
        }
    });

    let strategy =
        matches.get_one::<String>("strategy").map(String::as_str).unwrap_or("timeline");
    let started = std::time::Instant::now();
    let result = match strategy {
        "fixed" => run_fixed(&state, &config.generator, &cancel).await,
        _ => run_timeline(&state, &config.generator, &cancel).await,
    };

    match result {
        Ok(summary) => {
            info!(
                strategy,
                identities = summary.identities,
                messages = summary.messages(),
                events = state.events.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "seed complete"
            );
            Ok(())
        },
        Err(GeneratorError::Cancelled) => {
            warn!(
                messages = state.messages.len(),
                events = state.events.len(),
                "generation cancelled, partial dataset kept"
            );
            Ok(())
        },
        Err(e) => {
            error!("generation failed: {}", e);
            Err(eyre!("generation failed: {}", e))
        },
    }
}
