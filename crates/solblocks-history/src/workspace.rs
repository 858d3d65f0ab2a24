//! An editing session: one store plus its history.
//!
//! [`Workspace`] is the narrow edit API hosts drive. Every mutation goes
//! through the store, so the history sees it; undo and redo go through the
//! history, so the store is forced without recording. Concurrent hosts share
//! a [`SharedWorkspace`], whose mutex gives all replacements one global
//! order.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use solblocks_core::component::DraggableComponent;
use solblocks_core::factory::{attach_position, create_component, ComponentSeed};
use solblocks_core::id::ComponentId;
use solblocks_core::patch::ComponentPatch;
use solblocks_core::types::Position;

use crate::error::HistoryError;
use crate::history::HistoryManager;
use crate::store::{ComponentStore, Snapshot};

/// A workspace behind a mutex, for hosts that edit from several threads.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// One recorded edit, as stored in a replay script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WorkspaceOp {
    /// Drop a new component from the palette. The id is generated unless
    /// given.
    #[serde(rename_all = "camelCase")]
    Add {
        component_type: String,
        #[serde(default)]
        id: Option<ComponentId>,
        #[serde(default)]
        seed: Option<ComponentSeed>,
        #[serde(default)]
        position: Position,
    },
    Update {
        id: ComponentId,
        patch: ComponentPatch,
    },
    Move {
        id: ComponentId,
        position: Position,
    },
    Remove {
        id: ComponentId,
    },
    Undo,
    Redo,
}

pub struct Workspace {
    store: ComponentStore,
    history: HistoryManager,
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new(Vec::new())
    }
}

impl Workspace {
    /// Starts a session whose oldest history entry is `components`.
    pub fn new(components: Vec<DraggableComponent>) -> Self {
        let mut store = ComponentStore::new(components);
        let history = HistoryManager::attach(&mut store);
        Workspace { store, history }
    }

    /// Wraps the workspace for sharing across threads.
    pub fn into_shared(self) -> SharedWorkspace {
        Arc::new(Mutex::new(self))
    }

    pub fn components(&self) -> Snapshot {
        self.store.get_components()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Replaces the whole collection as one edit.
    pub fn edit(&mut self, next: Snapshot) {
        self.store.replace_components(next);
    }

    /// Creates a component of `component_type` and appends it.
    pub fn add_component(
        &mut self,
        component_type: &str,
        seed: Option<&ComponentSeed>,
        position: Position,
    ) -> Result<ComponentId, HistoryError> {
        self.add_component_with_id(ComponentId::generate(), component_type, seed, position)
    }

    pub fn add_component_with_id(
        &mut self,
        id: ComponentId,
        component_type: &str,
        seed: Option<&ComponentSeed>,
        position: Position,
    ) -> Result<ComponentId, HistoryError> {
        let data = create_component(id.clone(), component_type, seed)?;
        self.store.add_component(attach_position(&data, position))?;
        Ok(id)
    }

    pub fn update_component(
        &mut self,
        id: &ComponentId,
        patch: &ComponentPatch,
    ) -> Result<(), HistoryError> {
        self.store.update_component(id, patch)
    }

    pub fn move_component(
        &mut self,
        id: &ComponentId,
        position: Position,
    ) -> Result<(), HistoryError> {
        self.store.move_component(id, position)
    }

    pub fn remove_component(
        &mut self,
        id: &ComponentId,
    ) -> Result<DraggableComponent, HistoryError> {
        self.store.remove_component(id)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Applies one scripted edit. Undo and redo past either end are no-ops.
    pub fn apply(&mut self, op: &WorkspaceOp) -> Result<(), HistoryError> {
        match op {
            WorkspaceOp::Add {
                component_type,
                id,
                seed,
                position,
            } => {
                let id = id.clone().unwrap_or_else(ComponentId::generate);
                self.add_component_with_id(id, component_type, seed.as_ref(), *position)?;
            }
            WorkspaceOp::Update { id, patch } => self.update_component(id, patch)?,
            WorkspaceOp::Move { id, position } => self.move_component(id, *position)?,
            WorkspaceOp::Remove { id } => {
                self.remove_component(id)?;
            }
            WorkspaceOp::Undo => {
                self.undo();
            }
            WorkspaceOp::Redo => {
                self.redo();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solblocks_core::error::CoreError;

    #[test]
    fn unsupported_variant_leaves_history_alone() {
        let mut ws = Workspace::default();
        let err = ws
            .add_component("bogus-type", None, Position::default())
            .unwrap_err();
        assert_eq!(
            err,
            HistoryError::Core(CoreError::UnsupportedVariant {
                name: "bogus-type".into()
            })
        );
        assert!(!ws.can_undo());
        assert!(ws.components().is_empty());
    }

    #[test]
    fn add_generates_unique_ids() {
        let mut ws = Workspace::default();
        let a = ws.add_component("event", None, Position::default()).unwrap();
        let b = ws.add_component("event", None, Position::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(ws.history().past_len(), 2);
    }

    #[test]
    fn ops_deserialize_from_script() {
        let script = r#"[
            {"op": "add", "componentType": "variable", "id": "v", "seed": {"name": "total"}},
            {"op": "update", "id": "v", "patch": {"name": "supply"}},
            {"op": "move", "id": "v", "position": {"x": 1.0, "y": 2.0}},
            {"op": "undo"},
            {"op": "redo"},
            {"op": "remove", "id": "v"}
        ]"#;
        let ops: Vec<WorkspaceOp> = serde_json::from_str(script).unwrap();
        assert_eq!(ops.len(), 6);

        let mut ws = Workspace::default();
        for op in &ops[..5] {
            ws.apply(op).unwrap();
        }
        let components = ws.components();
        assert_eq!(components[0].data.name, "supply");
        assert_eq!(components[0].position, Position::new(1.0, 2.0));

        ws.apply(&ops[5]).unwrap();
        assert!(ws.components().is_empty());
        assert_eq!(ws.history().past_len(), 4);
    }

    #[test]
    fn undo_at_start_is_a_noop_op() {
        let mut ws = Workspace::default();
        ws.apply(&WorkspaceOp::Undo).unwrap();
        ws.apply(&WorkspaceOp::Redo).unwrap();
        assert!(!ws.can_undo());
        assert!(!ws.can_redo());
    }
}
