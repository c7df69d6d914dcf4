//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on mutations
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple threads
//! - Keeps change order and revisions consistent

mod common;

use common::{bahrain, canada};
use countries::models::{CountriesListRouting, CountryDetailsRouting, Routing};
use countries::state::ChangeKind;
use countries::{Deduplicated, Loadable, StateManager};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

#[tokio::test]
async fn test_state_change_events_emitted() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.set_countries(Loadable::Loading(None));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(event.revision, 1);
    assert_eq!(event.kinds, vec![ChangeKind::Countries]);
    assert_eq!(event.state.user_data.countries, Loadable::Loading(None));
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();
    let mut rx3 = state.subscribe();

    state.show_country_details(Some(bahrain().code().clone()));

    for rx in [&mut rx1, &mut rx2, &mut rx3] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");
        assert_eq!(event.kinds, vec![ChangeKind::CountriesListRouting]);
    }
}

#[tokio::test]
async fn test_noop_update_publishes_nothing() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    let kinds = state.set_system_active(true);

    assert!(kinds.is_empty());
    assert_eq!(state.revision(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_restore_routing_reports_each_part() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    let kinds = state.restore_routing(Routing {
        countries_list: CountriesListRouting {
            country_details: Some(canada().code().clone()),
        },
        country_details: CountryDetailsRouting { flag_sheet: true },
    });

    assert_eq!(
        kinds,
        vec![ChangeKind::CountriesListRouting, ChangeKind::CountryDetailsRouting]
    );
    let event = rx.recv().await.unwrap();
    assert!(event.state.routing.country_details.flag_sheet);
}

#[test]
fn test_concurrent_updates_are_ordered() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                for n in 0..10 {
                    state.set_flag_sheet((i + n) % 2 == 0);
                    state.set_system_active(n % 3 != 0);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Revisions arrive strictly increasing with no gaps
    let mut expected = 1;
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.revision, expected);
        expected += 1;
    }
    assert_eq!(expected - 1, state.revision());
}

#[test]
fn test_lagging_filter_resyncs_to_live_state() {
    let state = Arc::new(StateManager::new());
    let mut filter = Deduplicated::new(Arc::clone(&state), |s: &countries::AppState| {
        s.routing.countries_list.country_details.clone()
    });

    // Overflow the change channel
    for i in 0..250 {
        let code = if i % 2 == 0 { bahrain() } else { canada() };
        state.show_country_details(Some(code.code().clone()));
    }
    state.show_country_details(None);

    // Only the live value is forwarded, never the stale backlog
    assert_eq!(filter.drain(), vec![None]);
    assert_eq!(filter.current(), &None);
}
