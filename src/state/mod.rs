// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and publishes every effective change on a broadcast channel.
// Deduplicated narrows that stream to one screen's snapshot.

pub mod dedup;

pub use dedup::Deduplicated;

use crate::metrics::Metrics;
use crate::models::{AppState, Country, CountryCode, CountryDetailsRouting, Loadable, Routing};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Capacity of the change channel. Subscribers that fall further behind
/// re-synchronise from the live state.
pub const CHANGE_CHANNEL_CAPACITY: usize = 100;

/// Which part of the state an update touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Countries,
    CountriesListRouting,
    CountryDetailsRouting,
    System,
}

/// A published state change.
///
/// Carries the full state as it was right after the update so subscribers
/// can project exactly the state that produced the notification.
#[derive(Clone, Debug)]
pub struct StateChange {
    /// Monotonic revision, starting at 1 for the first effective update
    pub revision: u64,
    pub kinds: Vec<ChangeKind>,
    pub state: Arc<AppState>,
}

/// Thread-safe state manager with change publication.
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects which parts of the state an update changed
/// - Publishes a [`StateChange`] for every effective update, in write order
///
/// # Usage
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) or the named operations for mutations
/// - [`subscribe()`](Self::subscribe) for listening to changes, usually through
///   a [`Deduplicated`] filter
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    inner: Arc<Shared>,
}

struct Shared {
    state_tx: broadcast::Sender<StateChange>,
    revision: AtomicU64,
    metrics: Arc<Metrics>,
}

impl StateManager {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Create a manager seeded with `state`, e.g. for previews and tests.
    pub fn with_state(state: AppState) -> Self {
        let (state_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(state)),
            inner: Arc::new(Shared {
                state_tx,
                revision: AtomicU64::new(0),
                metrics: Arc::new(Metrics::new()),
            }),
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let loading = state_manager.read(|state| state.user_data.countries.is_loading());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_guard();
        f(&state)
    }

    /// Like [`read()`](Self::read), also returning the revision of the state
    /// that was read.
    ///
    /// Revisions are bumped under the write lock, so the pair is consistent.
    pub fn read_with_revision<F, R>(&self, f: F) -> (R, u64)
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_guard();
        (f(&state), self.revision())
    }

    /// Update the state and publish the change
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Publishes one [`StateChange`] if anything did
    ///
    /// The write lock is held until the change is published, so subscribers
    /// see changes in the order they were written.
    ///
    /// # Returns
    /// The kinds of change detected; empty for a no-op update
    pub fn update<F>(&self, update_fn: F) -> Vec<ChangeKind>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.write_guard();
        let old_state = state.clone();

        update_fn(&mut state);

        let kinds = detect_changes(&old_state, &state);
        if kinds.is_empty() {
            return kinds;
        }

        if kinds.contains(&ChangeKind::Countries)
            && !Loadable::is_valid_transition(
                &old_state.user_data.countries,
                &state.user_data.countries,
            )
        {
            tracing::warn!(
                from = old_state.user_data.countries.state_name(),
                to = state.user_data.countries.state_name(),
                "Countries state skipped the loading step"
            );
        }

        let revision = self
            .inner
            .revision
            .fetch_add(1, Ordering::SeqCst)
            + 1;
        self.inner.metrics.record_state_update();

        let change = StateChange {
            revision,
            kinds: kinds.clone(),
            state: Arc::new(state.clone()),
        };

        // It's OK if no one is listening
        if self.inner.state_tx.send(change).is_ok() {
            self.inner.metrics.record_state_broadcast();
        }

        tracing::trace!(revision, ?kinds, "State updated");
        kinds
    }

    /// Subscribe to state changes
    ///
    /// Returns a receiver for all future changes. Multiple subscribers can
    /// listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.inner.state_tx.subscribe()
    }

    /// Revision of the most recent effective update (0 before any).
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    // Named operations

    /// Replace the countries slot. Called by the load operation only.
    pub fn set_countries(&self, countries: Loadable<Vec<Country>>) -> Vec<ChangeKind> {
        tracing::debug!(state = countries.state_name(), "Setting countries");
        self.update(|state| {
            state.user_data.countries = countries;
        })
    }

    /// Push the detail screen for `code`, or pop it with `None`.
    ///
    /// Popping also clears the detail screen's own routing.
    pub fn show_country_details(&self, code: Option<CountryCode>) -> Vec<ChangeKind> {
        tracing::debug!(code = ?code, "Routing countries list");
        self.update(|state| {
            if code.is_none() {
                state.routing.country_details = CountryDetailsRouting::default();
            }
            state.routing.countries_list.country_details = code;
        })
    }

    pub fn set_flag_sheet(&self, presented: bool) -> Vec<ChangeKind> {
        self.update(|state| {
            state.routing.country_details.flag_sheet = presented;
        })
    }

    pub fn set_system_active(&self, is_active: bool) -> Vec<ChangeKind> {
        self.update(|state| {
            state.system.is_active = is_active;
        })
    }

    /// Replace all routing, e.g. when restoring navigation or following a deep link.
    pub fn restore_routing(&self, routing: Routing) -> Vec<ChangeKind> {
        tracing::info!(?routing, "Restoring routing");
        self.update(|state| {
            state.routing = routing;
        })
    }
}

/// Detect what changed between two states.
fn detect_changes(old: &AppState, new: &AppState) -> Vec<ChangeKind> {
    let mut kinds = Vec::new();

    if old.user_data.countries != new.user_data.countries {
        kinds.push(ChangeKind::Countries);
    }
    if old.routing.countries_list != new.routing.countries_list {
        kinds.push(ChangeKind::CountriesListRouting);
    }
    if old.routing.country_details != new.routing.country_details {
        kinds.push(ChangeKind::CountryDetailsRouting);
    }
    if old.system != new.system {
        kinds.push(ChangeKind::System);
    }

    kinds
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same state and change channel
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            inner: Arc::clone(&self.inner),
        }
    }
}
