//! Integration tests over the workload generator: both strategies drive
//! the store exclusively through the merge path, so everything they write
//! must be indexed, paginated, and event-paired.
use hubsim::{
    app::AppState,
    config::GeneratorConfig,
    core::types::{Fid, MessageType},
    generator::{run_fixed, run_timeline},
    store::PageRequest,
};
use tokio_util::sync::CancellationToken;

fn fixed_config() -> GeneratorConfig {
    GeneratorConfig {
        identities: 6,
        casts_per_identity: 2,
        reply_rounds: 2,
        replies_per_cast: 2,
        ..GeneratorConfig::default()
    }
}

fn timeline_config(identities: u64, months: u32) -> GeneratorConfig {
    GeneratorConfig {
        identities,
        months,
        initial_daily_active: 2,
        final_daily_active: identities.min(8),
        max_replies_per_cast: 4,
        ..GeneratorConfig::default()
    }
}

#[tokio::test]
async fn timeline_with_zero_identities_completes_empty() {
    let state = AppState::new();
    let summary = run_timeline(&state, &timeline_config(0, 3), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.messages(), 0);
    assert!(state.messages.is_empty());
    assert!(state.events.is_empty());
}

#[tokio::test]
async fn fixed_run_matches_exact_plan() {
    let state = AppState::new();
    let summary =
        run_fixed(&state, &fixed_config(), &CancellationToken::new()).await.unwrap();

    assert_eq!(summary.identities, 6);
    assert_eq!(summary.casts, 12);
    assert_eq!(summary.user_data, 24);
    // Round 1: min(10, 12) = 10 parents, 2 replies each = 20.
    // Round 2: min(10, 20) = 10 parents, 2 replies each = 20.
    assert_eq!(summary.replies, 40);

    assert_eq!(state.messages.len() as u64, summary.messages());
    assert_eq!(state.events.len() as u64, summary.messages());
}

#[tokio::test]
async fn every_identity_gets_four_profile_attributes() {
    let state = AppState::new();
    run_fixed(&state, &fixed_config(), &CancellationToken::new()).await.unwrap();

    for id in 1..=6u64 {
        let attrs = state.messages.get_user_data_by_fid(Fid::new(id));
        assert_eq!(attrs.len(), 4, "fid {} should carry four attribute records", id);
        assert!(attrs.iter().all(|m| m.message_type() == MessageType::UserDataAdd));
    }
}

#[tokio::test]
async fn generated_casts_paginate_consistently() {
    let state = AppState::new();
    run_timeline(&state, &timeline_config(15, 1), &CancellationToken::new()).await.unwrap();

    for id in 1..=15u64 {
        let fid = Fid::new(id);
        let all = state.messages.get_casts_by_fid(fid, &PageRequest::with_size(1000));
        assert!(all.next_page_token.is_none(), "1000 is more than any test fid writes");

        // Walking in pages of 3 reproduces the one-shot result exactly.
        let mut walked = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let request =
                PageRequest { page_size: 3, page_token: token.clone(), reverse: false };
            let page = state.messages.get_casts_by_fid(fid, &request);
            walked.extend(page.messages);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(walked, all.messages);
    }
}

#[tokio::test]
async fn timeline_replies_thread_back_to_stored_parents() {
    let state = AppState::new();
    run_timeline(&state, &timeline_config(25, 2), &CancellationToken::new()).await.unwrap();

    let mut replies_checked = 0;
    for id in 1..=25u64 {
        let casts =
            state.messages.get_casts_by_fid(Fid::new(id), &PageRequest::with_size(1000));
        for cast in &casts.messages {
            if let Some(parent_id) = cast.parent() {
                let parent = state
                    .messages
                    .get_by_hash(&parent_id.hash)
                    .expect("every reply's parent must exist in the store");
                assert_eq!(parent.fid, parent_id.fid);
                assert!(cast.timestamp > parent.timestamp, "replies come strictly after parents");

                // The reply is visible through the parent index too.
                let thread = state
                    .messages
                    .get_casts_by_parent(&parent_id, &PageRequest::with_size(1000));
                assert!(thread.messages.iter().any(|m| m.hash == cast.hash));
                replies_checked += 1;
            }
        }
    }
    assert!(replies_checked > 0, "a 2-month run must produce reply threads");
}

#[tokio::test]
async fn cancellation_keeps_partial_dataset() {
    let state = AppState::new();
    let cancel = CancellationToken::new();

    let mut config = fixed_config();
    config.identities = 500;

    // Cancel from another task once some records exist.
    let watcher_state_len = {
        let watcher_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            watcher_cancel.cancel();
        });
        run_fixed(&state, &config, &cancel).await
    };

    // Either the run finished fast or it was cancelled mid-flight; in both
    // cases nothing is rolled back and counts stay event-paired.
    if watcher_state_len.is_err() {
        assert_eq!(state.messages.len(), state.events.len());
    } else {
        assert_eq!(state.messages.len() as u64, watcher_state_len.unwrap().messages());
    }
}
