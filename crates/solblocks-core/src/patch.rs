//! Partial updates to a component.
//!
//! A [`ComponentPatch`] names only the fields an edit touches. Applying it
//! yields a new [`ComponentData`]; the original is left untouched so the
//! previous collection snapshot stays valid for history.
//!
//! Fields that do not exist on the target variant are ignored, never
//! coerced: patching `overrides` onto a variable is a no-op.

use serde::{Deserialize, Serialize};

use crate::component::{ComponentData, ComponentKind, OverrideImplementation};
use crate::types::{ComponentCategory, Parameter, Visibility};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ComponentCategory>,
    pub visibility: Option<Visibility>,
    pub parameters: Option<Vec<Parameter>>,
    pub body: Option<String>,
    pub overrides: Option<Vec<OverrideImplementation>>,
}

impl ComponentPatch {
    /// Returns `true` if the patch touches nothing.
    pub fn is_empty(&self) -> bool {
        *self == ComponentPatch::default()
    }

    pub fn with_overrides(overrides: Vec<OverrideImplementation>) -> Self {
        ComponentPatch {
            overrides: Some(overrides),
            ..Default::default()
        }
    }
}

/// Applies `patch` to a copy of `component`.
pub fn apply_patch(component: &ComponentData, patch: &ComponentPatch) -> ComponentData {
    let mut next = component.clone();

    if let Some(name) = &patch.name {
        next.name = name.clone();
    }
    if let Some(description) = &patch.description {
        next.description = description.clone();
    }
    if let Some(category) = patch.category {
        next.category = category;
    }

    if let Some(visibility) = patch.visibility {
        match &mut next.kind {
            ComponentKind::Function(f) => f.visibility = visibility,
            ComponentKind::Variable(v) => v.visibility = visibility,
            ComponentKind::Mapping(m) => m.visibility = visibility,
            ComponentKind::Array(a) => a.visibility = visibility,
            _ => {}
        }
    }

    if let Some(parameters) = &patch.parameters {
        match &mut next.kind {
            ComponentKind::Function(f) => f.parameters = parameters.clone(),
            ComponentKind::Constructor(c) => c.parameters = parameters.clone(),
            ComponentKind::Event(e) => e.parameters = parameters.clone(),
            ComponentKind::Error(e) => e.parameters = parameters.clone(),
            ComponentKind::Modifier(m) => m.parameters = parameters.clone(),
            _ => {}
        }
    }

    if let Some(body) = &patch.body {
        match &mut next.kind {
            ComponentKind::Function(f) => f.body = body.clone(),
            ComponentKind::Constructor(c) => c.body = body.clone(),
            ComponentKind::Modifier(m) => m.body = body.clone(),
            _ => {}
        }
    }

    if let Some(overrides) = &patch.overrides {
        if let ComponentKind::Function(f) = &mut next.kind {
            f.overrides = overrides.clone();
        }
    }

    next
}
