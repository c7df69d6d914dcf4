//! Load operations exposed to screens.
//!
//! [`RealCountriesInteractor::load_countries`] drives the countries slot of the
//! global state through `Loading -> Loaded | Failed`:
//!
//! 1. Takes the next request token and publishes it as the latest
//! 2. Writes `Loading`, carrying the last loaded list forward
//! 3. Spawns the repository call on the tokio runtime
//! 4. Writes the outcome, unless a newer load has started since
//!
//! A load ends with whichever comes first: the repository result, its
//! [`LoadHandle`] being cancelled or dropped, or a newer load superseding it.

use crate::models::{Country, LoadError, Loadable};
use crate::services::countries::CountriesRepository;
use crate::state::StateManager;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Business operations the countries screens can trigger.
#[cfg_attr(test, mockall::automock)]
pub trait CountriesInteractor: Send + Sync {
    /// Start loading the country list. Returns immediately.
    fn load_countries(&self) -> LoadHandle;
}

/// Interactors handed to screens.
#[derive(Clone)]
pub struct Interactors {
    pub countries: Arc<dyn CountriesInteractor>,
}

impl Interactors {
    pub fn new(countries: Arc<dyn CountriesInteractor>) -> Self {
        Self { countries }
    }

    /// Interactors that never touch state, for previews.
    pub fn stub() -> Self {
        Self::new(Arc::new(StubCountriesInteractor))
    }
}

/// Does nothing. Used by [`Interactors::stub`].
pub struct StubCountriesInteractor;

impl CountriesInteractor for StubCountriesInteractor {
    fn load_countries(&self) -> LoadHandle {
        LoadHandle::inert()
    }
}

/// Handle to an in-flight load.
///
/// Dropping the handle cancels the load, like dropping the screen that
/// started it. Use [`detach()`](Self::detach) to let it run unobserved.
///
/// Cancellation is written to the shared slot. A refresh falls back to the
/// list it was showing; a first load has nothing to fall back to and leaves
/// `Failed(LoadError::Cancelled)`. Screens appearing later render that as a
/// retryable error rather than starting a load of their own.
#[derive(Debug)]
pub struct LoadHandle {
    token: u64,
    cancel_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl LoadHandle {
    fn new(token: u64, cancel_tx: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self {
            token,
            cancel_tx: Some(cancel_tx),
            task: Some(task),
        }
    }

    /// A handle with nothing behind it.
    pub fn inert() -> Self {
        Self {
            token: 0,
            cancel_tx: None,
            task: None,
        }
    }

    /// Request token of this load; 0 for an inert handle.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn cancel(&self) {
        if let Some(tx) = &self.cancel_tx {
            let _ = tx.send(true);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Let the load run to completion even after the handle is gone.
    pub fn detach(mut self) {
        self.cancel_tx = None;
    }

    /// Wait until the load has written its outcome (or been discarded).
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Load task failed: {}", e);
            }
        }
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// How a load ended.
#[derive(Debug)]
enum LoadOutcome {
    Finished(Result<Vec<Country>, LoadError>),
    Cancelled,
    Superseded,
}

#[derive(Debug, Default)]
struct LoadTracker {
    next_token: u64,
    /// Last list that reached `Loaded`, carried into the next `Loading`
    last_loaded: Option<Vec<Country>>,
}

/// Coordinates request tokens between `load_countries` and completions.
struct LoadCoordinator {
    tracker: Mutex<LoadTracker>,
    latest_tx: watch::Sender<u64>,
}

impl LoadCoordinator {
    fn lock(&self) -> MutexGuard<'_, LoadTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, token: u64) -> bool {
        *self.latest_tx.borrow() == token
    }

    /// Write the outcome of load `token`, unless a newer load has started.
    ///
    /// Runs under the tracker lock, the same lock `load_countries` takes to
    /// issue tokens, so a stale completion cannot interleave with a new load.
    fn complete(&self, state: &StateManager, token: u64, outcome: LoadOutcome) {
        let mut tracker = self.lock();
        let metrics = state.metrics();

        if !self.is_current(token) || matches!(outcome, LoadOutcome::Superseded) {
            tracing::debug!(token, "Discarding completion of superseded load");
            metrics.record_stale_completion();
            return;
        }

        match outcome {
            LoadOutcome::Finished(Ok(countries)) => {
                tracing::info!(token, count = countries.len(), "Countries loaded");
                metrics.record_load_succeeded();
                tracker.last_loaded = Some(countries.clone());
                state.set_countries(Loadable::Loaded(countries));
            }
            LoadOutcome::Finished(Err(error)) => {
                tracing::warn!(token, code = error.code(), "Countries load failed: {}", error);
                metrics.record_load_failed();
                state.set_countries(Loadable::Failed(error));
            }
            LoadOutcome::Cancelled => {
                tracing::info!(token, "Countries load cancelled");
                metrics.record_load_cancelled();
                // Fall back to the stale list; without one the slot must not
                // read NotRequested, or the next screen would reload on its own
                let fallback = state.read(|s| match &s.user_data.countries {
                    Loadable::Loading(Some(previous)) => Loadable::Loaded(previous.clone()),
                    _ => Loadable::Failed(LoadError::Cancelled),
                });
                state.set_countries(fallback);
            }
            LoadOutcome::Superseded => {}
        }
    }
}

/// Loads countries from a [`CountriesRepository`] into the global state.
pub struct RealCountriesInteractor {
    repository: Arc<dyn CountriesRepository>,
    state: Arc<StateManager>,
    runtime: Handle,
    coordinator: Arc<LoadCoordinator>,
}

impl RealCountriesInteractor {
    pub fn new(
        repository: Arc<dyn CountriesRepository>,
        state: Arc<StateManager>,
        runtime: Handle,
    ) -> Self {
        let (latest_tx, _) = watch::channel(0);
        Self {
            repository,
            state,
            runtime,
            coordinator: Arc::new(LoadCoordinator {
                tracker: Mutex::new(LoadTracker::default()),
                latest_tx,
            }),
        }
    }

    async fn run_load(
        repository: Arc<dyn CountriesRepository>,
        state: Arc<StateManager>,
        coordinator: Arc<LoadCoordinator>,
        token: u64,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let latest_rx = coordinator.latest_tx.subscribe();

        let outcome = tokio::select! {
            result = repository.load_countries() => LoadOutcome::Finished(result),
            _ = cancelled(cancel_rx) => LoadOutcome::Cancelled,
            _ = superseded(latest_rx, token) => LoadOutcome::Superseded,
        };

        coordinator.complete(&state, token, outcome);
    }
}

impl CountriesInteractor for RealCountriesInteractor {
    fn load_countries(&self) -> LoadHandle {
        let token = {
            let mut tracker = self.coordinator.lock();
            tracker.next_token += 1;
            let token = tracker.next_token;

            let (loading, in_flight) = self.state.read(|s| {
                let current = &s.user_data.countries;
                (
                    current.begin_loading(tracker.last_loaded.clone()),
                    current.is_loading(),
                )
            });
            if let Loadable::Loading(Some(previous)) = &loading {
                tracker.last_loaded = Some(previous.clone());
            }

            if in_flight {
                tracing::info!(token, "Superseding in-flight countries load");
            }
            self.coordinator.latest_tx.send_replace(token);
            self.state.set_countries(loading);
            token
        };

        self.state.metrics().record_load_started();
        tracing::debug!(token, "Starting countries load");

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = self.runtime.spawn(Self::run_load(
            Arc::clone(&self.repository),
            Arc::clone(&self.state),
            Arc::clone(&self.coordinator),
            token,
            cancel_rx,
        ));

        LoadHandle::new(token, cancel_tx, task)
    }
}

/// Resolves once cancellation is requested. A dropped sender without a
/// request means the handle was detached, so this never resolves.
async fn cancelled(mut cancel_rx: watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves once a load newer than `token` has started.
async fn superseded(mut latest_rx: watch::Receiver<u64>, token: u64) {
    loop {
        if *latest_rx.borrow_and_update() != token {
            return;
        }
        if latest_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
