//! Integration tests for editing sessions with undo/redo.
//!
//! Tests cover:
//! - The S0 -> S1 -> S2 walk with undo/redo and the can_undo/can_redo edges
//! - Same-reference replacement adds no entry
//! - New edits after undo discard the future
//! - Shared workspaces edited from several threads
//! - Property: undo all then redo all returns to the latest snapshot

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use solblocks_core::component::{ComponentType, DraggableComponent};
use solblocks_core::factory::{attach_position, create_typed};
use solblocks_core::types::Position;
use solblocks_history::{ComponentStore, HistoryManager, Snapshot, Workspace};

fn snapshot(names: &[&str]) -> Snapshot {
    Arc::new(
        names
            .iter()
            .map(|name| {
                let mut data = create_typed((*name).into(), ComponentType::Variable, None);
                data.name = name.to_string();
                attach_position(&data, Position::default())
            })
            .collect::<Vec<DraggableComponent>>(),
    )
}

#[test]
fn three_state_walk() {
    let s0 = snapshot(&[]);
    let s1 = snapshot(&["a"]);
    let s2 = snapshot(&["a", "b"]);

    let mut store = ComponentStore::new(Vec::new());
    store.replace_components(Arc::clone(&s0));
    let history = HistoryManager::attach(&mut store);
    assert!(!history.can_undo());
    assert!(!history.can_redo());

    store.replace_components(Arc::clone(&s1));
    store.replace_components(Arc::clone(&s2));
    assert!(history.can_undo());
    assert!(!history.can_redo());

    assert!(history.undo(&mut store));
    assert!(Arc::ptr_eq(&store.get_components(), &s1));
    assert!(history.can_undo());
    assert!(history.can_redo());

    assert!(history.undo(&mut store));
    assert!(Arc::ptr_eq(&store.get_components(), &s0));
    assert!(!history.can_undo());
    assert!(!history.undo(&mut store));

    assert!(history.redo(&mut store));
    assert!(history.redo(&mut store));
    assert!(Arc::ptr_eq(&store.get_components(), &s2));
    assert!(!history.can_redo());
    assert!(!history.redo(&mut store));
    assert_eq!(history.past_len(), 2);
}

#[test]
fn same_reference_replacement_is_not_recorded() {
    let mut store = ComponentStore::default();
    let history = HistoryManager::attach(&mut store);

    store.replace_components(snapshot(&["a"]));
    let current = store.get_components();
    store.replace_components(Arc::clone(&current));
    store.replace_components(current);

    assert_eq!(history.past_len(), 1);
}

#[test]
fn edit_after_undo_discards_future() {
    let mut store = ComponentStore::default();
    let history = HistoryManager::attach(&mut store);

    store.replace_components(snapshot(&["a"]));
    store.replace_components(snapshot(&["a", "b"]));
    history.undo(&mut store);
    assert!(history.can_redo());

    let branch = snapshot(&["c"]);
    store.replace_components(Arc::clone(&branch));
    assert!(!history.can_redo());
    assert_eq!(history.past_len(), 2);
    assert!(Arc::ptr_eq(&history.present(), &branch));

    history.undo(&mut store);
    assert_eq!(store.get_components()[0].data.name, "a");
}

#[test]
fn workspace_edits_flow_through_history() {
    let mut ws = Workspace::default();
    let id = ws
        .add_component("function", None, Position::new(5.0, 5.0))
        .unwrap();
    ws.remove_component(&id).unwrap();
    assert!(ws.components().is_empty());

    assert!(ws.undo());
    assert_eq!(ws.components()[0].id(), &id);
    assert!(ws.undo());
    assert!(ws.components().is_empty());
    assert!(!ws.can_undo());
}

#[test]
fn shared_workspace_orders_concurrent_edits() {
    let shared = Workspace::default().into_shared();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ws = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..5 {
                    ws.lock()
                        .unwrap()
                        .add_component("event", None, Position::default())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut ws = shared.lock().unwrap();
    assert_eq!(ws.components().len(), 20);
    assert_eq!(ws.history().past_len(), 20);
    while ws.undo() {}
    assert!(ws.components().is_empty());
}

proptest! {
    #[test]
    fn undo_all_then_redo_all(edits in 1usize..12, undos in 0usize..16) {
        let mut store = ComponentStore::default();
        let history = HistoryManager::attach(&mut store);

        let mut names = Vec::new();
        for i in 0..edits {
            names.push(format!("v{i}"));
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            store.replace_components(snapshot(&refs));
        }
        let latest = store.get_components();

        let stepped = (0..undos).filter(|_| history.undo(&mut store)).count();
        prop_assert_eq!(stepped, undos.min(edits));
        prop_assert_eq!(store.get_components().len(), edits - stepped);

        while history.redo(&mut store) {}
        prop_assert!(Arc::ptr_eq(&store.get_components(), &latest));
        prop_assert_eq!(history.past_len(), edits);
    }
}
