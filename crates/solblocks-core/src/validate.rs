//! Per-variant validation rules.
//!
//! [`validate_component`] reports every problem it finds instead of stopping
//! at the first one, so an editor can surface them all at once. Validation is
//! advisory: the generator renders invalid components as-is.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::component::{ComponentData, ComponentKind, ComponentType};
use crate::contract::Contract;
use crate::id::ComponentId;
use crate::types::{Parameter, VariableMutability, Visibility};

/// A validation failure on a single component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    /// A name that cannot be used as an identifier.
    #[error("component {component}: '{name}' is not a valid identifier")]
    InvalidIdentifier { component: ComponentId, name: String },

    /// A required type name is blank.
    #[error("component {component}: missing type for {field}")]
    MissingType { component: ComponentId, field: String },

    /// State declarations cannot be `external`.
    #[error("component {component}: state declarations cannot be external")]
    ExternalStateDeclaration { component: ComponentId },

    /// `constant` declarations need an initializer.
    #[error("component {component}: constant '{name}' has no initial value")]
    ConstantWithoutValue { component: ComponentId, name: String },

    /// A struct or enum without members.
    #[error("component {component}: '{name}' has no members")]
    EmptyMembers { component: ComponentId, name: String },

    /// Two members, parameters or components share a name.
    #[error("component {component}: duplicate name '{name}'")]
    DuplicateName { component: ComponentId, name: String },

    /// Mapping keys must be value types.
    #[error("component {component}: '{key_type}' cannot be used as a mapping key")]
    InvalidMappingKey { component: ComponentId, key_type: String },

    /// A fixed-size array of length zero.
    #[error("component {component}: fixed array length must be greater than zero")]
    ZeroLengthArray { component: ComponentId },

    /// Two components in one contract share an id.
    #[error("duplicate component id '{component}'")]
    DuplicateId { component: ComponentId },
}

/// Returns `true` if `name` is a valid identifier: a letter, `_` or `$`
/// followed by letters, digits, `_` or `$`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Reference types and mappings cannot key a mapping.
fn is_valid_mapping_key(key_type: &str) -> bool {
    let key = key_type.trim();
    !key.is_empty() && !key.ends_with(']') && !key.starts_with("mapping")
}

/// Validates a single component against its variant's rules.
pub fn validate_component(component: &ComponentData) -> Vec<ValidationError> {
    let id = &component.id;
    let mut errors = Vec::new();

    // Kinds from a newer editor carry no rules this build knows.
    if matches!(component.kind, ComponentKind::Unknown(_)) {
        return errors;
    }

    // Constructors carry a fixed keyword name; everything else is declared.
    if !matches!(component.kind, ComponentKind::Constructor(_)) && !is_identifier(&component.name) {
        errors.push(ValidationError::InvalidIdentifier {
            component: id.clone(),
            name: component.name.clone(),
        });
    }

    if let Some(params) = component.parameters() {
        check_parameters(id, params, &mut errors);
    }

    match &component.kind {
        ComponentKind::Function(f) => {
            check_parameters(id, &f.return_parameters, &mut errors);
        }
        ComponentKind::Variable(v) => {
            if v.data_type.trim().is_empty() {
                errors.push(missing_type(id, "dataType"));
            }
            if v.visibility == Visibility::External {
                errors.push(ValidationError::ExternalStateDeclaration {
                    component: id.clone(),
                });
            }
            let has_value = v
                .initial_value
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty());
            if v.mutability == VariableMutability::Constant && !has_value {
                errors.push(ValidationError::ConstantWithoutValue {
                    component: id.clone(),
                    name: component.name.clone(),
                });
            }
        }
        ComponentKind::Struct(s) => {
            if s.members.is_empty() {
                errors.push(empty_members(component));
            }
            let mut seen = HashSet::new();
            for member in &s.members {
                if !is_identifier(&member.name) {
                    errors.push(ValidationError::InvalidIdentifier {
                        component: id.clone(),
                        name: member.name.clone(),
                    });
                }
                if member.data_type.trim().is_empty() {
                    errors.push(missing_type(id, &member.name));
                }
                if !seen.insert(member.name.as_str()) {
                    errors.push(ValidationError::DuplicateName {
                        component: id.clone(),
                        name: member.name.clone(),
                    });
                }
            }
        }
        ComponentKind::Enum(e) => {
            if e.members.is_empty() {
                errors.push(empty_members(component));
            }
            let mut seen = HashSet::new();
            for member in &e.members {
                if !is_identifier(member) {
                    errors.push(ValidationError::InvalidIdentifier {
                        component: id.clone(),
                        name: member.clone(),
                    });
                }
                if !seen.insert(member.as_str()) {
                    errors.push(ValidationError::DuplicateName {
                        component: id.clone(),
                        name: member.clone(),
                    });
                }
            }
        }
        ComponentKind::Mapping(m) => {
            if !is_valid_mapping_key(&m.key_type) {
                errors.push(ValidationError::InvalidMappingKey {
                    component: id.clone(),
                    key_type: m.key_type.clone(),
                });
            }
            if m.value_type.trim().is_empty() {
                errors.push(missing_type(id, "valueType"));
            }
            if m.visibility == Visibility::External {
                errors.push(ValidationError::ExternalStateDeclaration {
                    component: id.clone(),
                });
            }
        }
        ComponentKind::Array(a) => {
            if a.element_type.trim().is_empty() {
                errors.push(missing_type(id, "elementType"));
            }
            if a.length == Some(0) {
                errors.push(ValidationError::ZeroLengthArray {
                    component: id.clone(),
                });
            }
            if a.visibility == Visibility::External {
                errors.push(ValidationError::ExternalStateDeclaration {
                    component: id.clone(),
                });
            }
        }
        ComponentKind::Constructor(_)
        | ComponentKind::Event(_)
        | ComponentKind::Modifier(_)
        | ComponentKind::Error(_)
        | ComponentKind::Integration(_)
        | ComponentKind::Security(_)
        | ComponentKind::Oracle(_)
        | ComponentKind::ExternalCall(_)
        | ComponentKind::Unknown(_) => {}
    }

    errors
}

/// How a component occupies the contract's namespace.
enum Declaration<'a> {
    /// Functions and events overload on their parameter types.
    Overloadable(Vec<&'a str>),
    Unique,
}

fn declaration(component: &ComponentData) -> Option<Declaration<'_>> {
    fn types(params: &[Parameter]) -> Vec<&str> {
        params.iter().map(|p| p.data_type.trim()).collect()
    }
    match &component.kind {
        ComponentKind::Function(f) => Some(Declaration::Overloadable(types(&f.parameters))),
        ComponentKind::Event(e) => Some(Declaration::Overloadable(types(&e.parameters))),
        ComponentKind::Variable(_)
        | ComponentKind::Modifier(_)
        | ComponentKind::Error(_)
        | ComponentKind::Struct(_)
        | ComponentKind::Enum(_)
        | ComponentKind::Mapping(_)
        | ComponentKind::Array(_) => Some(Declaration::Unique),
        ComponentKind::Constructor(_)
        | ComponentKind::Integration(_)
        | ComponentKind::Security(_)
        | ComponentKind::Oracle(_)
        | ComponentKind::ExternalCall(_)
        | ComponentKind::Unknown(_) => None,
    }
}

/// Validates every component of a contract plus contract-level uniqueness:
/// ids must be distinct (repeats are reported once and skipped), and two
/// declarations may share a name only when both are overloads of the same
/// kind with different parameter types.
pub fn validate_contract(contract: &Contract) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    let mut declared: HashMap<&str, Vec<(ComponentType, Declaration<'_>)>> = HashMap::new();

    for placed in &contract.components {
        let data = &placed.data;
        if !ids.insert(&data.id) {
            errors.push(ValidationError::DuplicateId {
                component: data.id.clone(),
            });
            continue;
        }
        errors.extend(validate_component(data));

        let (Some(decl), Some(kind)) = (declaration(data), data.component_type()) else {
            continue;
        };
        let previous = declared.entry(data.name.as_str()).or_default();
        let clashes = previous.iter().any(|(other_kind, other)| match (other, &decl) {
            (Declaration::Overloadable(a), Declaration::Overloadable(b)) => {
                *other_kind != kind || a == b
            }
            _ => true,
        });
        if clashes {
            errors.push(ValidationError::DuplicateName {
                component: data.id.clone(),
                name: data.name.clone(),
            });
        }
        previous.push((kind, decl));
    }

    errors
}

fn check_parameters(id: &ComponentId, params: &[Parameter], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for param in params {
        if param.data_type.trim().is_empty() {
            errors.push(missing_type(id, &param.name));
        }
        // Unnamed parameters are legal; named ones must be identifiers.
        if param.name.is_empty() {
            continue;
        }
        if !is_identifier(&param.name) {
            errors.push(ValidationError::InvalidIdentifier {
                component: id.clone(),
                name: param.name.clone(),
            });
        }
        if !seen.insert(param.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                component: id.clone(),
                name: param.name.clone(),
            });
        }
    }
}

fn missing_type(id: &ComponentId, field: &str) -> ValidationError {
    ValidationError::MissingType {
        component: id.clone(),
        field: field.to_string(),
    }
}

fn empty_members(component: &ComponentData) -> ValidationError {
    ValidationError::EmptyMembers {
        component: component.id.clone(),
        name: component.name.clone(),
    }
}
