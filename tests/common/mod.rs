//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mock_service;

use async_trait::async_trait;
use countries::services::{CountriesRepository, Interactors, RealCountriesInteractor};
use countries::{Country, LoadError, Loadable, StateManager};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::time::{Duration, timeout};

pub type LoadResult = Result<Vec<Country>, LoadError>;

pub const WAIT: Duration = Duration::from_secs(2);

pub fn bahrain() -> Country {
    Country {
        name: "Bahrain".to_string(),
        population: 1_701_575,
        flag: Some("https://flagcdn.com/bh.svg".to_string()),
        alpha3_code: "BHR".parse().unwrap(),
    }
}

pub fn canada() -> Country {
    Country {
        name: "Canada".to_string(),
        population: 38_005_238,
        flag: Some("https://flagcdn.com/ca.svg".to_string()),
        alpha3_code: "CAN".parse().unwrap(),
    }
}

/// Repository whose responses are handed out by the test.
///
/// Each call takes the next scripted receiver and waits on it, so the test
/// decides when (and in which order) loads complete.
#[derive(Default)]
pub struct ScriptedRepository {
    pending: Mutex<VecDeque<oneshot::Receiver<LoadResult>>>,
    calls: AtomicUsize,
}

impl ScriptedRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response slot for the next call.
    pub fn script(&self) -> oneshot::Sender<LoadResult> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until the repository has been called `n` times.
    pub async fn wait_for_calls(&self, n: usize) {
        timeout(WAIT, async {
            while self.calls() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("Timeout waiting for repository call");
    }
}

#[async_trait]
impl CountriesRepository for ScriptedRepository {
    async fn load_countries(&self) -> LoadResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LoadError::Network("script dropped".to_string()))),
            None => Err(LoadError::Network("no scripted response".to_string())),
        }
    }
}

/// Real interactor over `repository`, on the current runtime.
pub fn interactors(repository: Arc<ScriptedRepository>, state: &Arc<StateManager>) -> Interactors {
    let interactor = RealCountriesInteractor::new(
        repository,
        Arc::clone(state),
        tokio::runtime::Handle::current(),
    );
    Interactors::new(Arc::new(interactor))
}

/// Wait until the countries slot satisfies `done`, returning it.
pub async fn wait_for_countries<F>(state: &StateManager, done: F) -> Loadable<Vec<Country>>
where
    F: Fn(&Loadable<Vec<Country>>) -> bool,
{
    // Subscribe before checking so no change slips in between
    let mut rx = state.subscribe();
    timeout(WAIT, async {
        loop {
            let current = state.read(|s| s.user_data.countries.clone());
            if done(&current) {
                return current;
            }
            let _ = rx.recv().await;
        }
    })
    .await
    .expect("Timeout waiting for countries state")
}
