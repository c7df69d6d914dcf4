//! Integration tests for the load operation driving the countries slot
//!
//! These tests verify that RealCountriesInteractor:
//! - Walks the Loadable lifecycle, carrying the last list into Loading
//! - Never lets an older load overwrite a newer one
//! - Falls back to the stale list, or fails, when cancelled

mod common;

use common::{ScriptedRepository, bahrain, canada, interactors, wait_for_countries};
use countries::ui::{Content, CountriesList, CountriesListAction};
use countries::{LoadError, Loadable, StateManager};
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_full_transition_chain() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    // NotRequested -> Loading(None) -> Loaded([Bahrain])
    let first = repository.script();
    let handle = interactors.countries.load_countries();
    assert_eq!(state.read(|s| s.user_data.countries.clone()), Loadable::Loading(None));
    first.send(Ok(vec![bahrain()])).unwrap();
    handle.finished().await;
    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loaded(vec![bahrain()])
    );

    // Loaded(V) -> Loading(Some(V)) -> Loaded(V2)
    let second = repository.script();
    let handle = interactors.countries.load_countries();
    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loading(Some(vec![bahrain()]))
    );
    second.send(Ok(vec![bahrain(), canada()])).unwrap();
    handle.finished().await;
    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loaded(vec![bahrain(), canada()])
    );

    // Loading(Some(V)) -> Failed(E)
    let third = repository.script();
    let handle = interactors.countries.load_countries();
    third.send(Err(LoadError::Status { status: 503 })).unwrap();
    handle.finished().await;
    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Failed(LoadError::Status { status: 503 })
    );

    // Retry after failure still shows the last loaded list
    let _fourth = repository.script();
    let _handle = interactors.countries.load_countries();
    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loading(Some(vec![bahrain(), canada()]))
    );
}

#[tokio::test]
async fn test_newer_load_wins_when_older_completes_last() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    let older_tx = repository.script();
    let newer_tx = repository.script();

    let older = interactors.countries.load_countries();
    repository.wait_for_calls(1).await;
    let newer = interactors.countries.load_countries();
    assert!(newer.token() > older.token());

    newer_tx.send(Ok(vec![canada()])).unwrap();
    newer.finished().await;

    // The older load was superseded; its late result has nowhere to go
    let _ = older_tx.send(Ok(vec![bahrain()]));
    older.finished().await;

    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loaded(vec![canada()])
    );
    assert_eq!(state.metrics().stale_completions.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_newer_load_wins_when_older_completes_first() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    let older_tx = repository.script();
    let newer_tx = repository.script();

    let older = interactors.countries.load_countries();
    repository.wait_for_calls(1).await;
    let newer = interactors.countries.load_countries();

    let _ = older_tx.send(Err(LoadError::Timeout));
    older.finished().await;
    assert!(state.read(|s| s.user_data.countries.is_loading()));

    newer_tx.send(Ok(vec![bahrain()])).unwrap();
    newer.finished().await;

    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Loaded(vec![bahrain()])
    );
}

#[tokio::test]
async fn test_cancel_without_previous_value_fails() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    let _pending = repository.script();
    let handle = interactors.countries.load_countries();
    repository.wait_for_calls(1).await;
    handle.cancel();
    handle.finished().await;

    assert_eq!(
        state.read(|s| s.user_data.countries.clone()),
        Loadable::Failed(LoadError::Cancelled)
    );
}

#[tokio::test]
async fn test_cancel_with_previous_value_restores_it() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    let first = repository.script();
    let handle = interactors.countries.load_countries();
    first.send(Ok(vec![bahrain()])).unwrap();
    handle.finished().await;

    let _pending = repository.script();
    let handle = interactors.countries.load_countries();
    drop(handle);

    let countries = wait_for_countries(&state, |c| !c.is_loading()).await;
    assert_eq!(countries, Loadable::Loaded(vec![bahrain()]));
}

#[tokio::test]
async fn test_detached_load_survives_handle() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();
    let interactors = interactors(Arc::clone(&repository), &state);

    let response = repository.script();
    interactors.countries.load_countries().detach();
    response.send(Ok(vec![canada()])).unwrap();

    let countries = wait_for_countries(&state, |c| c.is_loaded()).await;
    assert_eq!(countries, Loadable::Loaded(vec![canada()]));
}

#[tokio::test]
async fn test_dropping_screen_cancels_its_load() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();

    let _pending = repository.script();
    let mut screen = CountriesList::new(
        Arc::clone(&state),
        interactors(Arc::clone(&repository), &state),
    );
    screen.body();
    repository.wait_for_calls(1).await;
    drop(screen);

    let countries = wait_for_countries(&state, |c| !c.is_loading()).await;
    assert_eq!(countries, Loadable::Failed(LoadError::Cancelled));
}

#[tokio::test]
async fn test_cancelled_first_load_is_retryable() {
    let state = Arc::new(StateManager::new());
    let repository = ScriptedRepository::new();

    let _abandoned = repository.script();
    let handle = interactors(Arc::clone(&repository), &state)
        .countries
        .load_countries();
    repository.wait_for_calls(1).await;
    drop(handle);
    wait_for_countries(&state, |c| !c.is_loading()).await;

    // A screen appearing now shows the error instead of loading again
    let mut screen = CountriesList::new(
        Arc::clone(&state),
        interactors(Arc::clone(&repository), &state),
    );
    assert_eq!(screen.body().content, Content::error(&LoadError::Cancelled));
    assert_eq!(repository.calls(), 1);

    let response = repository.script();
    screen.dispatch(CountriesListAction::Retry);
    response.send(Ok(vec![bahrain()])).unwrap();

    let countries = wait_for_countries(&state, |c| c.is_loaded()).await;
    assert_eq!(countries, Loadable::Loaded(vec![bahrain()]));
    assert_eq!(repository.calls(), 2);
}
