//! Linear undo/redo over collection snapshots.
//!
//! [`HistoryManager`] keeps `past` (oldest first), `present` and `future`
//! (nearest first). It subscribes to a [`ComponentStore`] and records every
//! user edit whose snapshot is a different allocation from `present`. Undo and
//! redo push a stored snapshot back into the store with
//! [`ChangeOrigin::History`], which the subscription ignores, so stepping
//! never records itself.
//!
//! There is no coalescing and no depth cap. A new edit after an undo discards
//! the future.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::store::{ChangeOrigin, ComponentStore, Snapshot, SubscriptionId};

#[derive(Debug)]
struct HistoryState {
    past: Vec<Snapshot>,
    present: Snapshot,
    future: VecDeque<Snapshot>,
}

impl HistoryState {
    /// Records an external snapshot. Returns `false` for the present value.
    fn record(&mut self, snapshot: &Snapshot) -> bool {
        if Arc::ptr_eq(&self.present, snapshot) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, Arc::clone(snapshot));
        self.past.push(previous);
        self.future.clear();
        true
    }

    fn step_back(&mut self) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        Some(Arc::clone(&self.present))
    }

    fn step_forward(&mut self) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        Some(Arc::clone(&self.present))
    }
}

fn lock(state: &Mutex<HistoryState>) -> MutexGuard<'_, HistoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Undo/redo history attached to one store.
pub struct HistoryManager {
    state: Arc<Mutex<HistoryState>>,
    subscription: Option<SubscriptionId>,
}

impl HistoryManager {
    /// Starts a history at the store's current snapshot and subscribes to
    /// its replacements.
    pub fn attach(store: &mut ComponentStore) -> Self {
        let state = Arc::new(Mutex::new(HistoryState {
            past: Vec::new(),
            present: store.get_components(),
            future: VecDeque::new(),
        }));

        let observer = Arc::clone(&state);
        let listener = move |snapshot: &Snapshot, origin: ChangeOrigin| {
            if origin == ChangeOrigin::History {
                return;
            }
            let mut state = lock(&observer);
            if state.record(snapshot) {
                tracing::debug!(
                    past = state.past.len(),
                    components = snapshot.len(),
                    "recorded history entry"
                );
            }
        };
        let subscription = store.subscribe(Box::new(listener));

        HistoryManager {
            state,
            subscription: Some(subscription),
        }
    }

    /// Stops observing `store`. Stored snapshots are kept.
    pub fn detach(&mut self, store: &mut ComponentStore) {
        if let Some(id) = self.subscription.take() {
            store.unsubscribe(id);
        }
    }

    /// Steps back one entry and forces the store to it. Returns `false` at
    /// the oldest entry.
    pub fn undo(&self, store: &mut ComponentStore) -> bool {
        // The guard must be released before the store notifies listeners.
        let target = lock(&self.state).step_back();
        let Some(snapshot) = target else {
            return false;
        };
        tracing::debug!(components = snapshot.len(), "undo");
        store.replace_with(snapshot, ChangeOrigin::History);
        true
    }

    /// Steps forward one entry and forces the store to it. Returns `false` at
    /// the newest entry.
    pub fn redo(&self, store: &mut ComponentStore) -> bool {
        let target = lock(&self.state).step_forward();
        let Some(snapshot) = target else {
            return false;
        };
        tracing::debug!(components = snapshot.len(), "redo");
        store.replace_with(snapshot, ChangeOrigin::History);
        true
    }

    pub fn can_undo(&self) -> bool {
        !lock(&self.state).past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !lock(&self.state).future.is_empty()
    }

    pub fn present(&self) -> Snapshot {
        Arc::clone(&lock(&self.state).present)
    }

    /// Number of entries behind `present`.
    pub fn past_len(&self) -> usize {
        lock(&self.state).past.len()
    }

    /// Number of entries ahead of `present`.
    pub fn future_len(&self) -> usize {
        lock(&self.state).future.len()
    }

    /// Forgets every entry but `present`.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.past.clear();
        state.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solblocks_core::component::ComponentType;
    use solblocks_core::factory::{attach_position, create_typed};
    use solblocks_core::types::Position;

    fn snapshot(ids: &[&str]) -> Snapshot {
        Arc::new(
            ids.iter()
                .map(|id| {
                    let data = create_typed((*id).into(), ComponentType::Event, None);
                    attach_position(&data, Position::default())
                })
                .collect(),
        )
    }

    #[test]
    fn record_ignores_present() {
        let s0 = snapshot(&[]);
        let mut state = HistoryState {
            past: Vec::new(),
            present: Arc::clone(&s0),
            future: VecDeque::new(),
        };
        assert!(!state.record(&s0));
        assert!(state.past.is_empty());

        // Equal contents in a new allocation are a change.
        assert!(state.record(&snapshot(&[])));
        assert_eq!(state.past.len(), 1);
    }

    #[test]
    fn steps_move_between_stacks() {
        let (s0, s1) = (snapshot(&[]), snapshot(&["a"]));
        let mut state = HistoryState {
            past: Vec::new(),
            present: Arc::clone(&s0),
            future: VecDeque::new(),
        };
        state.record(&s1);

        let back = state.step_back().unwrap();
        assert!(Arc::ptr_eq(&back, &s0));
        assert!(state.step_back().is_none());
        assert!(Arc::ptr_eq(&state.future[0], &s1));

        let forward = state.step_forward().unwrap();
        assert!(Arc::ptr_eq(&forward, &s1));
        assert!(state.step_forward().is_none());
    }

    #[test]
    fn forced_replacements_are_not_recorded() {
        let mut store = ComponentStore::default();
        let history = HistoryManager::attach(&mut store);

        store.replace_components(snapshot(&["a"]));
        assert_eq!(history.past_len(), 1);

        assert!(history.undo(&mut store));
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 1);
        assert!(store.get_components().is_empty());
    }

    #[test]
    fn detached_history_stops_recording() {
        let mut store = ComponentStore::default();
        let mut history = HistoryManager::attach(&mut store);
        history.detach(&mut store);
        store.replace_components(snapshot(&["a"]));
        assert!(!history.can_undo());
    }

    #[test]
    fn poisoned_state_is_recovered() {
        let mut store = ComponentStore::default();
        let history = HistoryManager::attach(&mut store);

        let state = Arc::clone(&history.state);
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("poison the history lock");
        })
        .join();

        store.replace_components(snapshot(&["a"]));
        assert!(history.can_undo());
    }
}
