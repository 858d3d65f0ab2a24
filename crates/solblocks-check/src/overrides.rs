//! Override resolution over declared parent contracts.
//!
//! [`list_overridable`] walks a contract's `inherits` list through the
//! project registry and collects the parents' virtual functions.
//! [`count_conflicts`] reports stored overrides that no longer point at an
//! overridable function. Everything here is read-only and total: a missing
//! parent contributes nothing and an orphaned override is counted, never
//! removed.

use serde::{Deserialize, Serialize};

use solblocks_core::component::{ComponentData, OverrideImplementation};
use solblocks_core::contract::{Contract, ContractRegistry};
use solblocks_core::id::ComponentId;
use solblocks_core::patch::ComponentPatch;
use solblocks_core::types::{join_parameters, Parameter, StateMutability, Visibility};

/// A parent function that a descendant may override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideableFunction {
    pub id: ComponentId,
    pub name: String,
    pub visibility: Visibility,
    pub state_mutability: StateMutability,
    pub parameters: Vec<Parameter>,
    pub return_parameters: Vec<Parameter>,
    pub is_virtual: bool,
    /// Name of the parent contract declaring the function.
    pub source_contract: String,
    pub body: String,
}

/// Why a stored override is in conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictKind {
    /// The target function is no longer overridable.
    Orphaned,
    /// The target exists but the override is not compatible with it.
    Incompatible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideConflict {
    pub function_id: ComponentId,
    pub kind: ConflictKind,
}

/// Collects the virtual functions of every resolvable parent of `contract`,
/// concatenated in declaration order. Identically named functions from
/// different parents are all kept.
pub fn list_overridable<R>(contract: &Contract, registry: &R) -> Vec<OverrideableFunction>
where
    R: ContractRegistry + ?Sized,
{
    let mut result = Vec::new();

    for parent_ref in &contract.inherits {
        let Some(parent) = registry.lookup_contract(&parent_ref.contract_id) else {
            tracing::warn!(
                contract = %contract.name,
                parent = %parent_ref.contract_id,
                "parent contract not found; contributes no overridable functions"
            );
            continue;
        };

        result.extend(
            parent
                .functions()
                .filter(|(_, f)| f.is_virtual)
                .map(|(data, f)| OverrideableFunction {
                    id: data.id.clone(),
                    name: data.name.clone(),
                    visibility: f.visibility,
                    state_mutability: f.state_mutability,
                    parameters: f.parameters.clone(),
                    return_parameters: f.return_parameters.clone(),
                    is_virtual: f.is_virtual,
                    source_contract: parent.name.clone(),
                    body: f.body.clone(),
                }),
        );
    }

    result
}

/// The overrides stored on `component`; empty for anything but a function.
pub fn list_current_overrides(component: &ComponentData) -> &[OverrideImplementation] {
    match component.as_function() {
        Some(f) => &f.overrides,
        None => &[],
    }
}

/// Whether `implementation` is an acceptable override of `target`.
///
/// Always `true` today. Signature compatibility (parameter and return type
/// matching) plugs in here.
pub fn is_valid_override(
    _implementation: &OverrideImplementation,
    _target: &OverrideableFunction,
) -> bool {
    true
}

/// Every stored override of `component` that is orphaned or invalid, in
/// storage order.
pub fn find_conflicts<R>(
    component: &ComponentData,
    contract: &Contract,
    registry: &R,
) -> Vec<OverrideConflict>
where
    R: ContractRegistry + ?Sized,
{
    let overrides = list_current_overrides(component);
    if overrides.is_empty() {
        return Vec::new();
    }

    let overridable = list_overridable(contract, registry);
    overrides
        .iter()
        .filter_map(|implementation| {
            let kind = match overridable.iter().find(|f| f.id == implementation.function_id) {
                None => ConflictKind::Orphaned,
                Some(target) if !is_valid_override(implementation, target) => {
                    ConflictKind::Incompatible
                }
                Some(_) => return None,
            };
            if kind == ConflictKind::Orphaned {
                tracing::warn!(
                    component = %component.id,
                    function = %implementation.function_id,
                    "override target is no longer overridable"
                );
            }
            Some(OverrideConflict {
                function_id: implementation.function_id.clone(),
                kind,
            })
        })
        .collect()
}

/// Number of conflicting overrides stored on `component`.
pub fn count_conflicts<R>(component: &ComponentData, contract: &Contract, registry: &R) -> usize
where
    R: ContractRegistry + ?Sized,
{
    find_conflicts(component, contract, registry).len()
}

/// Builds the patch that enables or disables the override of `function_id`
/// on `component`. Enabling an already enabled override, or disabling an
/// absent one, yields the current list unchanged.
pub fn toggle_override(
    function_id: &ComponentId,
    enabled: bool,
    component: &ComponentData,
) -> ComponentPatch {
    let mut overrides = list_current_overrides(component).to_vec();
    if enabled {
        if !overrides.iter().any(|o| &o.function_id == function_id) {
            overrides.push(OverrideImplementation::fresh(function_id.clone()));
        }
    } else {
        overrides.retain(|o| &o.function_id != function_id);
    }
    ComponentPatch::with_overrides(overrides)
}

/// Human-readable signature, e.g.
/// `function transfer(address to, uint256 amount) public nonpayable returns (bool)`.
pub fn signature_of(function: &OverrideableFunction) -> String {
    let mut signature = format!(
        "function {}({}) {} {}",
        function.name,
        join_parameters(&function.parameters),
        function.visibility.keyword(),
        function.state_mutability.keyword(),
    );
    if !function.return_parameters.is_empty() {
        signature.push_str(&format!(
            " returns ({})",
            join_parameters(&function.return_parameters)
        ));
    }
    signature
}

/// The delegation statement, e.g. `super.transfer(to, amount);`.
pub fn super_call_of(function: &OverrideableFunction) -> String {
    let args: Vec<&str> = function
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    format!("super.{}({});", function.name, args.join(", "))
}
