//! Time-based generation strategy.
//!
//! Simulates months of adoption: an S-curve growth model maps each month
//! to a daily-active target, identities join uniformly across the window
//! with earlier joiners skewing more active, and the generator walks the
//! window day by day emitting casts and age-decayed reply threads.
use crate::{
    app::AppState,
    config::GeneratorConfig,
    core::types::{CastId, Fid},
    core::util::{from_farcaster_time, get_farcaster_time},
    generator::{
        GenerationSummary, GeneratorError, Result, build_cast_add, fake_cast_text,
        identity::IdentityProfile,
    },
    metrics,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const SECONDS_PER_DAY: u32 = 86_400;

/// Months are a fixed 30 simulated days; the model needs no calendar
const DAYS_PER_MONTH: u32 = 30;

/// Replies consider casts from this many trailing days
const REPLY_WINDOW_DAYS: u32 = 30;

/// Reply interest halves roughly every week of cast age
const REPLY_DECAY_DAYS: f64 = 7.0;

/// How many identities between cooperative yields during the day walk
const YIELD_EVERY: usize = 64;

/// S-curve adoption model over a window of months.
///
/// The curve rises quadratically through the first third of the window,
/// linearly through the middle third, and eases out sinusoidally through
/// the final third, interpolating between the configured initial and
/// final daily-active counts.
#[derive(Debug, Clone, Copy)]
pub struct GrowthModel {
    months: u32,
    initial_daily_active: f64,
    final_daily_active: f64,
}

impl GrowthModel {
    pub fn new(months: u32, initial_daily_active: u64, final_daily_active: u64) -> Self {
        Self {
            months,
            initial_daily_active: initial_daily_active as f64,
            final_daily_active: final_daily_active as f64,
        }
    }

    /// Fraction of total growth realized at normalized time t in [0, 1]
    fn curve(t: f64) -> f64 {
        // Segment boundary values; chosen so each piece joins the next.
        const RAMP_END: f64 = 0.15;
        const LINEAR_END: f64 = 0.6;

        let t = t.clamp(0.0, 1.0);
        if t <= 1.0 / 3.0 {
            RAMP_END * (3.0 * t).powi(2)
        } else if t <= 2.0 / 3.0 {
            RAMP_END + (LINEAR_END - RAMP_END) * (3.0 * t - 1.0)
        } else {
            LINEAR_END + (1.0 - LINEAR_END) * ((3.0 * t - 2.0) * std::f64::consts::FRAC_PI_2).sin()
        }
    }

    /// Target count of daily-active identities for a month of the window
    pub fn daily_active_target(&self, month: u32) -> f64 {
        if self.months == 0 {
            return self.final_daily_active;
        }
        let t = month as f64 / self.months as f64;
        self.initial_daily_active
            + (self.final_daily_active - self.initial_daily_active) * Self::curve(t)
    }
}

/// A cast eligible to receive replies
#[derive(Debug, Clone, Copy)]
struct PoolCast {
    id: CastId,
    timestamp: u32,
    day: u32,
}

/// Run the time-based strategy to completion
pub async fn run_timeline(
    state: &AppState,
    config: &GeneratorConfig,
    cancel: &CancellationToken,
) -> Result<GenerationSummary> {
    let mut rng = rand::rng();
    let mut summary = GenerationSummary::default();

    if config.identities == 0 || config.months == 0 {
        info!("timeline generation requested with an empty window, nothing to do");
        return Ok(summary);
    }

    let total_days = config.months * DAYS_PER_MONTH;
    let now = get_farcaster_time().map_err(|e| GeneratorError::Clock(e.to_string()))?;
    let window_start = now.saturating_sub(total_days * SECONDS_PER_DAY);
    let model =
        GrowthModel::new(config.months, config.initial_daily_active, config.final_daily_active);

    let window_start_utc = chrono::DateTime::from_timestamp_millis(
        from_farcaster_time(window_start) as i64,
    )
    .map(|t| t.to_rfc3339())
    .unwrap_or_default();
    info!(
        identities = config.identities,
        months = config.months,
        initial_daily_active = config.initial_daily_active,
        final_daily_active = config.final_daily_active,
        window_start = %window_start_utc,
        "starting timeline generation"
    );

    // Identities join uniformly across the window; earlier joiners get a
    // higher activity weight. Profile records land on the join day.
    let mut profiles = Vec::with_capacity(config.identities as usize);
    for id in 1..=config.identities {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }

        let join_day = rng.random_range(0..total_days);
        let weight = (1.0 - join_day as f64 / total_days as f64).max(0.1);
        let join_time =
            window_start + join_day * SECONDS_PER_DAY + rng.random_range(0..SECONDS_PER_DAY);
        let profile = IdentityProfile::generate(&mut rng, Fid::new(id), join_time, weight);

        for message in profile.user_data_messages() {
            state.merge_message(message).map_err(|e| GeneratorError::Write(e.to_string()))?;
            summary.user_data += 1;
        }
        metrics::incr_identities_generated();
        summary.identities += 1;
        profiles.push(profile);

        if id % YIELD_EVERY as u64 == 0 {
            tokio::task::yield_now().await;
        }
    }

    // Sorted by join time so "who has joined by day X" is a partition point.
    profiles.sort_by_key(|p| p.join_time);

    let mut visit_order: Vec<usize> = (0..profiles.len()).collect();
    let mut reply_pool: VecDeque<PoolCast> = VecDeque::new();

    for day in 0..total_days {
        if cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }

        let month = day / DAYS_PER_MONTH;
        let day_start = window_start + day * SECONDS_PER_DAY;
        let day_end = day_start + SECONDS_PER_DAY - 1;

        // Independent smoothing of the same S-curve: the admission cap gets
        // its own +/-15% daily jitter.
        let target = model.daily_active_target(month);
        let day_cap = (target * rng.random_range(0.85..1.15)).round().max(0.0) as u64;
        let base_probability = (target / config.identities as f64).clamp(0.0, 1.0);

        let joined_count = profiles.partition_point(|p| p.join_time <= day_end);

        // Visit identities in a fresh random order each day so admission
        // pressure near the cap does not always favor the same FIDs.
        visit_order.shuffle(&mut rng);

        let mut active = 0u64;
        let mut day_casts: Vec<PoolCast> = Vec::new();
        for (visited, &idx) in visit_order.iter().enumerate() {
            if active >= day_cap {
                break;
            }
            let profile = &profiles[idx];
            if profile.join_time > day_end {
                continue;
            }

            if rng.random::<f64>() < base_probability * profile.activity_weight {
                active += 1;
                let casts = rng.random_range(1..=5);
                for _ in 0..casts {
                    let timestamp = rng.random_range(day_start..=day_end).max(profile.join_time);
                    let message = build_cast_add(
                        profile.fid,
                        fake_cast_text(&mut rng),
                        None,
                        vec![],
                        timestamp,
                    );
                    let cast_id = CastId::new(profile.fid, message.hash);
                    state
                        .merge_message(message)
                        .map_err(|e| GeneratorError::Write(e.to_string()))?;
                    day_casts.push(PoolCast { id: cast_id, timestamp, day });
                    summary.casts += 1;
                }
            }

            if visited % YIELD_EVERY == YIELD_EVERY - 1 {
                if cancel.is_cancelled() {
                    return Err(GeneratorError::Cancelled);
                }
                tokio::task::yield_now().await;
            }
        }

        reply_pool.extend(day_casts.iter().copied());
        while let Some(front) = reply_pool.front() {
            if front.day + REPLY_WINDOW_DAYS < day {
                reply_pool.pop_front();
            } else {
                break;
            }
        }

        let day_replies = generate_replies(
            state,
            config,
            &mut rng,
            &profiles[..joined_count],
            &mut reply_pool,
            day,
            day_end,
            &mut summary,
        )?;

        // Occasionally the day's replies themselves draw replies.
        if !day_replies.is_empty() && rng.random_bool(0.3) {
            generate_nested_replies(
                state,
                &mut rng,
                &profiles[..joined_count],
                &day_replies,
                &mut reply_pool,
                day,
                day_end,
                &mut summary,
            )?;
        }

        if day % DAYS_PER_MONTH == 0 {
            let percent = (day as f64 / total_days as f64) * 100.0;
            info!(
                month = month + 1,
                day,
                casts = summary.casts,
                replies = summary.replies,
                "simulated month underway"
            );
            metrics::gauge_generation_progress(percent);
        } else {
            debug!(day, active, pool = reply_pool.len(), "simulated day complete");
        }

        tokio::task::yield_now().await;
    }

    metrics::gauge_generation_progress(100.0);
    info!(
        identities = summary.identities,
        casts = summary.casts,
        replies = summary.replies,
        user_data = summary.user_data,
        "timeline generation complete"
    );

    Ok(summary)
}

/// Generate the day's replies from the trailing cast pool.
///
/// Selects `max(5, pool/10)` casts; each receives a uniform number of
/// replies bounded by an exponential decay in the cast's age. Reply
/// timestamps are strictly after the parent and never beyond the current
/// simulated day.
#[allow(clippy::too_many_arguments)]
fn generate_replies<R: Rng>(
    state: &AppState,
    config: &GeneratorConfig,
    rng: &mut R,
    joined: &[IdentityProfile],
    reply_pool: &mut VecDeque<PoolCast>,
    day: u32,
    day_end: u32,
    summary: &mut GenerationSummary,
) -> Result<Vec<PoolCast>> {
    let mut new_replies = Vec::new();
    if reply_pool.is_empty() || joined.is_empty() {
        return Ok(new_replies);
    }

    let select_count = (reply_pool.len() / 10).max(5).min(reply_pool.len());
    let selected =
        rand::seq::index::sample(rng, reply_pool.len(), select_count).into_iter();

    for pool_index in selected {
        let parent = reply_pool[pool_index];
        let age_days = day.saturating_sub(parent.day);
        let decayed_bound =
            (config.max_replies_per_cast as f64 * (-(age_days as f64) / REPLY_DECAY_DAYS).exp())
                .floor() as u32;
        if decayed_bound == 0 {
            continue;
        }

        let replies = rng.random_range(1..=decayed_bound);
        for _ in 0..replies {
            if let Some(reply) =
                write_reply(state, rng, joined, parent, day, day_end, summary)?
            {
                new_replies.push(reply);
            }
        }
    }

    reply_pool.extend(new_replies.iter().copied());
    Ok(new_replies)
}

/// Replies to the day's new replies, a single bounded pass
#[allow(clippy::too_many_arguments)]
fn generate_nested_replies<R: Rng>(
    state: &AppState,
    rng: &mut R,
    joined: &[IdentityProfile],
    day_replies: &[PoolCast],
    reply_pool: &mut VecDeque<PoolCast>,
    day: u32,
    day_end: u32,
    summary: &mut GenerationSummary,
) -> Result<()> {
    let bound = day_replies.len().min(10);
    let count = rng.random_range(1..=bound);
    let selected = rand::seq::index::sample(rng, day_replies.len(), count).into_iter();

    for index in selected {
        if let Some(reply) =
            write_reply(state, rng, joined, day_replies[index], day, day_end, summary)?
        {
            reply_pool.push_back(reply);
        }
    }

    Ok(())
}

/// Write a single reply to `parent`, timestamped strictly after it and at
/// or before the end of the current simulated day. Returns None when the
/// parent sits too close to the day boundary to fit a later timestamp.
fn write_reply<R: Rng>(
    state: &AppState,
    rng: &mut R,
    joined: &[IdentityProfile],
    parent: PoolCast,
    day: u32,
    day_end: u32,
    summary: &mut GenerationSummary,
) -> Result<Option<PoolCast>> {
    if parent.timestamp >= day_end {
        return Ok(None);
    }

    let author = &joined[rng.random_range(0..joined.len())];
    let timestamp = rng.random_range(parent.timestamp + 1..=day_end);
    let mentions = if rng.random_bool(0.25) { vec![parent.id.fid] } else { vec![] };
    let message =
        build_cast_add(author.fid, fake_cast_text(rng), Some(parent.id), mentions, timestamp);
    let reply_id = CastId::new(author.fid, message.hash);
    state.merge_message(message).map_err(|e| GeneratorError::Write(e.to_string()))?;
    summary.replies += 1;

    Ok(Some(PoolCast { id: reply_id, timestamp, day }))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod growth_model_tests {
        use super::*;

        #[test]
        fn test_endpoints_match_configured_range() {
            let model = GrowthModel::new(6, 50, 5_000);
            assert!((model.daily_active_target(0) - 50.0).abs() < f64::EPSILON);
            assert!((model.daily_active_target(6) - 5_000.0).abs() < 1e-9);
        }

        #[test]
        fn test_targets_are_monotonic() {
            let model = GrowthModel::new(12, 100, 10_000);
            let mut previous = f64::MIN;
            for month in 0..=12 {
                let target = model.daily_active_target(month);
                assert!(target >= previous, "month {} regressed", month);
                previous = target;
            }
        }

        #[test]
        fn test_curve_is_continuous_at_segment_joints() {
            let just_below = GrowthModel::curve(1.0 / 3.0 - 1e-9);
            let just_above = GrowthModel::curve(1.0 / 3.0 + 1e-9);
            assert!((just_below - just_above).abs() < 1e-6);

            let just_below = GrowthModel::curve(2.0 / 3.0 - 1e-9);
            let just_above = GrowthModel::curve(2.0 / 3.0 + 1e-9);
            assert!((just_below - just_above).abs() < 1e-6);
        }

        #[test]
        fn test_curve_stays_in_unit_range() {
            for i in 0..=100 {
                let value = GrowthModel::curve(i as f64 / 100.0);
                assert!((0.0..=1.0).contains(&value));
            }
        }

        #[test]
        fn test_zero_month_window_pins_to_final() {
            let model = GrowthModel::new(0, 10, 500);
            assert_eq!(model.daily_active_target(0), 500.0);
        }
    }

    mod run_tests {
        use super::*;

        fn config(identities: u64, months: u32) -> GeneratorConfig {
            GeneratorConfig {
                identities,
                months,
                initial_daily_active: 2,
                final_daily_active: identities.min(10),
                max_replies_per_cast: 4,
                ..GeneratorConfig::default()
            }
        }

        #[tokio::test]
        async fn test_zero_identities_is_empty_success() {
            let state = AppState::new();
            let cancel = CancellationToken::new();

            let summary = run_timeline(&state, &config(0, 3), &cancel).await.unwrap();
            assert_eq!(summary, GenerationSummary::default());
            assert!(state.messages.is_empty());
            assert!(state.events.is_empty());
        }

        #[tokio::test]
        async fn test_zero_months_is_empty_success() {
            let state = AppState::new();
            let cancel = CancellationToken::new();

            let summary = run_timeline(&state, &config(10, 0), &cancel).await.unwrap();
            assert_eq!(summary, GenerationSummary::default());
            assert!(state.messages.is_empty());
        }

        #[tokio::test]
        async fn test_small_run_pairs_messages_with_events() {
            let state = AppState::new();
            let cancel = CancellationToken::new();

            let summary = run_timeline(&state, &config(20, 1), &cancel).await.unwrap();

            assert_eq!(summary.identities, 20);
            assert_eq!(summary.user_data, 80);
            assert_eq!(state.messages.len() as u64, summary.messages());
            assert_eq!(state.events.len() as u64, summary.messages());
        }

        #[tokio::test]
        async fn test_cancellation_aborts_promptly() {
            let state = AppState::new();
            let cancel = CancellationToken::new();
            cancel.cancel();

            let result = run_timeline(&state, &config(20, 1), &cancel).await;
            assert!(matches!(result, Err(GeneratorError::Cancelled)));
        }

        #[tokio::test]
        async fn test_replies_are_strictly_after_parents() {
            let state = AppState::new();
            let cancel = CancellationToken::new();
            run_timeline(&state, &config(30, 2), &cancel).await.unwrap();

            let mut checked = 0;
            for id in 1..=30u64 {
                let casts = state.messages.get_casts_by_fid(
                    Fid::new(id),
                    &crate::store::PageRequest::with_size(1000),
                );
                for cast in &casts.messages {
                    if let Some(parent_id) = cast.parent() {
                        let parent = state
                            .messages
                            .get_by_hash(&parent_id.hash)
                            .expect("parent must be stored before its replies");
                        assert!(cast.timestamp > parent.timestamp);
                        checked += 1;
                    }
                }
            }
            // A 2-month run with 30 identities reliably produces replies.
            assert!(checked > 0);
        }
    }
}
