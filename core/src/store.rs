//! Observable container for `SearchState`.
//!
//! The state lives inside a `tokio::sync::watch` channel. `dispatch` is the
//! only way to change it; every applied action notifies subscribers, so a UI
//! can re-render from `subscribe()` without polling.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::state::{Action, Generation, SearchState};

#[derive(Debug)]
pub struct SearchStore {
    state: watch::Sender<SearchState>,
    next_generation: AtomicU64,
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStore {
    pub fn new() -> Self {
        Self::with_state(SearchState::new())
    }

    pub fn with_state(state: SearchState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            state: tx,
            next_generation: AtomicU64::new(1),
        }
    }

    /// Apply `action`. Returns `false` if the reducer discarded it.
    pub fn dispatch(&self, action: Action) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    /// A fresh generation for a new dispatch. Never repeats within a store.
    pub fn next_generation(&self) -> Generation {
        Generation(self.next_generation.fetch_add(1, Ordering::Relaxed))
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&SearchState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }
}
