//! The component collection and its change notifications.
//!
//! The collection is one shared, immutable [`Snapshot`] that every edit
//! replaces wholesale. Two snapshots are the same value exactly when they are
//! the same allocation, so observers detect change with [`Arc::ptr_eq`]
//! instead of deep comparison.
//!
//! Every replacement carries a [`ChangeOrigin`]. Observers use it to tell
//! user edits apart from replacements forced by the history itself.

use std::sync::Arc;

use solblocks_core::component::DraggableComponent;
use solblocks_core::error::CoreError;
use solblocks_core::id::ComponentId;
use solblocks_core::patch::{apply_patch, ComponentPatch};
use solblocks_core::types::Position;

use crate::error::HistoryError;

/// An immutable collection value.
pub type Snapshot = Arc<Vec<DraggableComponent>>;

/// Who caused a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A user edit. Recorded by the history.
    Edit,
    /// An undo or redo step. Never recorded.
    History,
}

/// Handle returned by [`ComponentStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change callback. Runs synchronously inside the replacement call.
pub type Listener = Box<dyn FnMut(&Snapshot, ChangeOrigin) + Send>;

/// Owner of the current component collection.
pub struct ComponentStore {
    components: Snapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for ComponentStore {
    fn default() -> Self {
        ComponentStore::new(Vec::new())
    }
}

impl ComponentStore {
    pub fn new(components: Vec<DraggableComponent>) -> Self {
        ComponentStore {
            components: Arc::new(components),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current snapshot. Cheap: clones the `Arc`, not the collection.
    pub fn get_components(&self) -> Snapshot {
        Arc::clone(&self.components)
    }

    /// Replaces the collection as a user edit.
    pub fn replace_components(&mut self, next: Snapshot) {
        self.replace_with(next, ChangeOrigin::Edit);
    }

    /// Replaces the collection and notifies every listener in subscription
    /// order. Listeners are notified even when `next` is the current
    /// snapshot; deciding whether that is a change is up to them.
    pub fn replace_with(&mut self, next: Snapshot, origin: ChangeOrigin) {
        tracing::debug!(
            components = next.len(),
            origin = ?origin,
            unchanged = Arc::ptr_eq(&self.components, &next),
            "replacing component collection"
        );
        self.components = next;
        for (_, listener) in &mut self.listeners {
            listener(&self.components, origin);
        }
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn component(&self, id: &ComponentId) -> Option<&DraggableComponent> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Appends a component. Ids must be unique within the collection.
    pub fn add_component(&mut self, component: DraggableComponent) -> Result<(), HistoryError> {
        if self.component(component.id()).is_some() {
            return Err(CoreError::DuplicateComponentId {
                id: component.id().clone(),
            }
            .into());
        }
        let mut next = self.components.as_ref().clone();
        next.push(component);
        self.replace_components(Arc::new(next));
        Ok(())
    }

    /// Applies `patch` to the component `id`. An empty patch leaves the
    /// collection untouched.
    pub fn update_component(
        &mut self,
        id: &ComponentId,
        patch: &ComponentPatch,
    ) -> Result<(), HistoryError> {
        let index = self.index_of(id)?;
        if patch.is_empty() {
            return Ok(());
        }
        let mut next = self.components.as_ref().clone();
        next[index].data = apply_patch(&next[index].data, patch);
        self.replace_components(Arc::new(next));
        Ok(())
    }

    /// Moves the component `id` on the canvas.
    pub fn move_component(
        &mut self,
        id: &ComponentId,
        position: Position,
    ) -> Result<(), HistoryError> {
        let index = self.index_of(id)?;
        let mut next = self.components.as_ref().clone();
        next[index].position = position;
        self.replace_components(Arc::new(next));
        Ok(())
    }

    /// Removes the component `id` and returns it.
    pub fn remove_component(
        &mut self,
        id: &ComponentId,
    ) -> Result<DraggableComponent, HistoryError> {
        let index = self.index_of(id)?;
        let mut next = self.components.as_ref().clone();
        let removed = next.remove(index);
        self.replace_components(Arc::new(next));
        Ok(removed)
    }

    fn index_of(&self, id: &ComponentId) -> Result<usize, HistoryError> {
        self.components
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| CoreError::ComponentNotFound { id: id.clone() }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use solblocks_core::component::ComponentType;
    use solblocks_core::factory::{attach_position, create_typed};

    fn placed(id: &str) -> DraggableComponent {
        let data = create_typed(id.into(), ComponentType::Variable, None);
        attach_position(&data, Position::default())
    }

    fn recording(store: &mut ComponentStore) -> (SubscriptionId, Arc<Mutex<Vec<ChangeOrigin>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(Box::new(move |_: &Snapshot, origin: ChangeOrigin| {
            sink.lock().unwrap().push(origin)
        }));
        (id, seen)
    }

    #[test]
    fn listeners_see_origin() {
        let mut store = ComponentStore::default();
        let (_, seen) = recording(&mut store);

        store.add_component(placed("a")).unwrap();
        let current = store.get_components();
        store.replace_with(current, ChangeOrigin::History);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ChangeOrigin::Edit, ChangeOrigin::History]
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = ComponentStore::default();
        let (id, seen) = recording(&mut store);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.add_component(placed("a")).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut store = ComponentStore::default();
        store.add_component(placed("a")).unwrap();
        let err = store.add_component(placed("a")).unwrap_err();
        assert_eq!(
            err,
            HistoryError::Core(CoreError::DuplicateComponentId { id: "a".into() })
        );
        assert_eq!(store.get_components().len(), 1);
    }

    #[test]
    fn edits_produce_new_snapshots() {
        let mut store = ComponentStore::new(vec![placed("a"), placed("b")]);
        let before = store.get_components();

        let patch = ComponentPatch {
            name: Some("renamed".into()),
            ..Default::default()
        };
        store.update_component(&"a".into(), &patch).unwrap();
        let after = store.get_components();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before[0].data.name, "newVariable");
        assert_eq!(after[0].data.name, "renamed");
    }

    #[test]
    fn empty_patch_keeps_snapshot() {
        let mut store = ComponentStore::new(vec![placed("a")]);
        let before = store.get_components();
        store
            .update_component(&"a".into(), &ComponentPatch::default())
            .unwrap();
        assert!(Arc::ptr_eq(&before, &store.get_components()));
    }

    #[test]
    fn missing_component_errors() {
        let mut store = ComponentStore::default();
        assert!(matches!(
            store.remove_component(&"ghost".into()),
            Err(HistoryError::Core(CoreError::ComponentNotFound { .. }))
        ));
        assert!(store
            .move_component(&"ghost".into(), Position::new(1.0, 1.0))
            .is_err());
    }

    #[test]
    fn remove_and_move() {
        let mut store = ComponentStore::new(vec![placed("a"), placed("b")]);
        store
            .move_component(&"b".into(), Position::new(3.0, 4.0))
            .unwrap();
        assert_eq!(store.component(&"b".into()).unwrap().position, Position::new(3.0, 4.0));

        let removed = store.remove_component(&"a".into()).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        let ids: Vec<_> = store.get_components().iter().map(|c| c.id().clone()).collect();
        assert_eq!(ids, vec![ComponentId::from("b")]);
    }
}
