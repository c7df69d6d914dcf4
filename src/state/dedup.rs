//! Snapshot-based change filter.
//!
//! A [`StateManager`] publishes every effective update. A screen that only
//! depends on a few fields wraps the stream in a [`Deduplicated`] filter: each
//! published state is projected to the screen's snapshot and compared with the
//! last snapshot the filter forwarded. Only a different snapshot reaches the
//! screen.

use super::{StateChange, StateManager};
use crate::models::AppState;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

type Projection<S> = Box<dyn Fn(&AppState) -> S + Send + Sync>;
type Comparator<S> = Box<dyn Fn(&S, &S) -> bool + Send + Sync>;

/// A [`StateManager`] subscription narrowed to one screen's snapshot.
///
/// The filter remembers the last forwarded snapshot; it is never recomputed
/// from scratch between notifications. The full state stays reachable through
/// [`read()`](Self::read) for actions that need more than the snapshot holds.
///
/// # Example
/// ```ignore
/// let mut filter = Deduplicated::new(state_manager.clone(), AppState::countries_list_snapshot);
/// while let Some(snapshot) = filter.changed().await {
///     render(&snapshot);
/// }
/// ```
pub struct Deduplicated<S> {
    manager: Arc<StateManager>,
    project: Projection<S>,
    same: Comparator<S>,
    current: S,
    /// Revision `current` was last synchronised to; older changes are stale
    synced_revision: u64,
    rx: broadcast::Receiver<StateChange>,
}

impl<S: PartialEq + 'static> Deduplicated<S> {
    /// Filter using the snapshot's own equality.
    pub fn new<P>(manager: Arc<StateManager>, project: P) -> Self
    where
        P: Fn(&AppState) -> S + Send + Sync + 'static,
    {
        Self::with_comparator(manager, project, |a: &S, b: &S| a == b)
    }
}

impl<S> Deduplicated<S> {
    /// Filter with a custom equality over snapshots.
    pub fn with_comparator<P, C>(manager: Arc<StateManager>, project: P, same: C) -> Self
    where
        P: Fn(&AppState) -> S + Send + Sync + 'static,
        C: Fn(&S, &S) -> bool + Send + Sync + 'static,
    {
        // Subscribe before taking the first snapshot so no update can fall in
        // between; an update already covered by the snapshot is skipped by
        // its revision.
        let rx = manager.subscribe();
        let (current, synced_revision) = manager.read_with_revision(&project);

        Self {
            manager,
            project: Box::new(project),
            same: Box::new(same),
            current,
            synced_revision,
            rx,
        }
    }

    /// The last forwarded snapshot.
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Read the full global state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        self.manager.read(f)
    }

    pub fn manager(&self) -> &Arc<StateManager> {
        &self.manager
    }

    /// Handle one published change.
    fn receive(&mut self, change: &StateChange) -> bool {
        if change.revision <= self.synced_revision {
            return false;
        }
        self.synced_revision = change.revision;
        let next = (self.project)(&change.state);
        self.accept(next)
    }

    /// Keep `next` if it differs from the current snapshot.
    fn accept(&mut self, next: S) -> bool {
        if (self.same)(&self.current, &next) {
            self.manager.metrics().record_snapshot_suppressed();
            false
        } else {
            self.current = next;
            self.manager.metrics().record_snapshot_forwarded();
            true
        }
    }

    /// Jump to the live state after falling behind. Changes still buffered
    /// from before the jump are then skipped by [`receive()`](Self::receive).
    fn resync(&mut self, skipped: u64) -> bool {
        tracing::warn!(skipped, "Change filter lagged behind, re-reading live state");
        let (next, revision) = self.manager.read_with_revision(&self.project);
        self.synced_revision = revision;
        self.accept(next)
    }
}

impl<S: Clone> Deduplicated<S> {
    /// Wait for the next snapshot that differs from the current one.
    ///
    /// Returns `None` once the state manager is gone.
    pub async fn changed(&mut self) -> Option<S> {
        loop {
            let forwarded = match self.rx.recv().await {
                Ok(change) => self.receive(&change),
                Err(RecvError::Lagged(skipped)) => self.resync(skipped),
                Err(RecvError::Closed) => return None,
            };
            if forwarded {
                return Some(self.current.clone());
            }
        }
    }

    /// Process every pending notification without waiting.
    ///
    /// Returns the forwarded snapshots in order; empty when nothing relevant
    /// changed.
    pub fn drain(&mut self) -> Vec<S> {
        let mut forwarded = Vec::new();
        loop {
            let accepted = match self.rx.try_recv() {
                Ok(change) => self.receive(&change),
                Err(TryRecvError::Lagged(skipped)) => self.resync(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            };
            if accepted {
                forwarded.push(self.current.clone());
            }
        }
        forwarded
    }
}
