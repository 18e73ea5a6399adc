//! Fixed-population generation strategy.
//!
//! Creates N identities with profile records, M base casts per identity,
//! then D reply rounds. Each round selects up to 10 casts from the
//! previous round's output and attaches R replies per selected cast from
//! randomly chosen identities; the new replies seed the next round.
use crate::{
    app::AppState,
    config::GeneratorConfig,
    core::types::{CastId, Fid},
    core::util::get_farcaster_time,
    generator::{
        GenerationSummary, GeneratorError, Progress, Result, build_cast_add, fake_cast_text,
        identity::IdentityProfile,
    },
    metrics,
};
use rand::Rng;
use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Per-round cap on how many casts receive replies
const MAX_PARENTS_PER_ROUND: usize = 10;

/// How many merges between cooperative yields
const YIELD_EVERY: u64 = 64;

/// Exact operation total for progress reporting: identities, base casts,
/// and the reply recurrence with the per-round parent cap applied.
fn planned_operations(config: &GeneratorConfig) -> u64 {
    let identities = config.identities;
    let base_casts = identities * config.casts_per_identity as u64;

    let mut total = identities + base_casts;
    let mut previous_round = base_casts;
    for _ in 0..config.reply_rounds {
        let parents = previous_round.min(MAX_PARENTS_PER_ROUND as u64);
        let replies = parents * config.replies_per_cast as u64;
        total += replies;
        previous_round = replies;
    }
    total
}

/// Run the fixed-population strategy to completion
pub async fn run_fixed(
    state: &AppState,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<GenerationSummary> {
    let mut rng = rand::rng();
    let mut summary = GenerationSummary::default();
    let mut progress = Progress::new(planned_operations(config));
    let now = get_farcaster_time().map_err(|e| GeneratorError::Clock(e.to_string()))?;

    if config.identities == 0 {
        info!("fixed generation requested with 0 identities, nothing to do");
        return Ok(summary);
    }

    info!(
        identities = config.identities,
        casts_per_identity = config.casts_per_identity,
        reply_rounds = config.reply_rounds,
        "starting fixed-population generation"
    );

    // Identities join at some point in the 30 days before "now".
    let window = 30 * 86400u32;
    let mut profiles = Vec::with_capacity(config.identities as usize);
    for id in 1..=config.identities {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }

        let join_time = now.saturating_sub(rng.random_range(0..window));
        let profile = IdentityProfile::generate(&mut rng, Fid::new(id), join_time, 1.0);
        for message in profile.user_data_messages() {
            state.merge_message(message).map_err(|e| GeneratorError::Write(e.to_string()))?;
            summary.user_data += 1;
        }
        metrics::incr_identities_generated();
        summary.identities += 1;
        profiles.push(profile);

        progress.record(1);
        if id % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }

    // Base casts, timestamped between join and now.
    let mut current_round: Vec<(CastId, u32)> = Vec::new();
    let mut written = 0u64;
    for profile in &profiles {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }

        for _ in 0..config.casts_per_identity {
            let timestamp = if profile.join_time < now {
                rng.random_range(profile.join_time..=now)
            } else {
                now
            };
            let message =
                build_cast_add(profile.fid, fake_cast_text(&mut rng), None, vec![], timestamp);
            let cast_id = CastId::new(profile.fid, message.hash);
            state.merge_message(message).map_err(|e| GeneratorError::Write(e.to_string()))?;
            current_round.push((cast_id, timestamp));
            summary.casts += 1;

            progress.record(1);
            written += 1;
            if written % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
        }
    }

    // Reply rounds: each round replies to a sample of the previous round.
    for round in 0..config.reply_rounds {
        if current_round.is_empty() {
            break;
        }

        current_round.shuffle(&mut rng);
        let parents: Vec<(CastId, u32)> =
            current_round.iter().take(MAX_PARENTS_PER_ROUND).copied().collect();

        let mut next_round = Vec::new();
        for (parent_id, parent_ts) in parents {
            if cancel.is_cancelled() {
                return Err(GeneratorError::Cancelled);
            }

            for _ in 0..config.replies_per_cast {
                let author = Fid::new(rng.random_range(1..=config.identities));
                let timestamp = parent_ts.saturating_add(rng.random_range(60..3600));
                let mentions = if rng.random_bool(0.25) { vec![parent_id.fid] } else { vec![] };
                let message = build_cast_add(
                    author,
                    fake_cast_text(&mut rng),
                    Some(parent_id),
                    mentions,
                    timestamp,
                );
                let reply_id = CastId::new(author, message.hash);
                state.merge_message(message).map_err(|e| GeneratorError::Write(e.to_string()))?;
                next_round.push((reply_id, timestamp));
                summary.replies += 1;
                progress.record(1);
            }
            tokio::task::yield_now().await;
        }

        info!(round = round + 1, replies = next_round.len(), "reply round complete");
        current_round = next_round;
    }

    info!(
        identities = summary.identities,
        casts = summary.casts,
        replies = summary.replies,
        user_data = summary.user_data,
        "fixed-population generation complete"
    );

    Ok(summary)
}
