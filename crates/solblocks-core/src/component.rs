//! The closed component model.
//!
//! A [`ComponentData`] is the shared base (id, name, documentation, palette
//! category, default values) plus exactly one [`ComponentKind`] variant
//! carrying the fields that kind requires. A variable therefore cannot carry
//! parameters and a struct cannot carry a body: the shape is fixed by the tag.
//!
//! Adding a kind means adding a [`ComponentType`] tag, a [`ComponentKind`]
//! variant, a factory branch and a generator arm. All matches over the kind
//! are exhaustive so the compiler points at every site.
//!
//! Documents written by a newer editor may carry tags this build does not
//! know. Those load as [`ComponentKind::Unknown`] with their fields kept
//! verbatim, so one foreign block never rejects a whole project.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::id::ComponentId;
use crate::types::{
    ComponentCategory, ModifierRef, Parameter, Position, StateMutability, StructMember,
    VariableMutability, Visibility,
};

/// The variant tag of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Function,
    Variable,
    Constructor,
    Event,
    Modifier,
    Error,
    Struct,
    Enum,
    Mapping,
    Array,
    Integration,
    Security,
    Oracle,
    ExternalCall,
}

impl ComponentType {
    /// Every supported tag, in palette order.
    pub const ALL: [ComponentType; 14] = [
        ComponentType::Function,
        ComponentType::Variable,
        ComponentType::Constructor,
        ComponentType::Event,
        ComponentType::Modifier,
        ComponentType::Error,
        ComponentType::Struct,
        ComponentType::Enum,
        ComponentType::Mapping,
        ComponentType::Array,
        ComponentType::Integration,
        ComponentType::Security,
        ComponentType::Oracle,
        ComponentType::ExternalCall,
    ];

    /// The wire name of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Function => "function",
            ComponentType::Variable => "variable",
            ComponentType::Constructor => "constructor",
            ComponentType::Event => "event",
            ComponentType::Modifier => "modifier",
            ComponentType::Error => "error",
            ComponentType::Struct => "struct",
            ComponentType::Enum => "enum",
            ComponentType::Mapping => "mapping",
            ComponentType::Array => "array",
            ComponentType::Integration => "integration",
            ComponentType::Security => "security",
            ComponentType::Oracle => "oracle",
            ComponentType::ExternalCall => "externalCall",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedVariant {
                name: s.to_string(),
            })
    }
}

/// An override of an inherited virtual function, stored on the function
/// component that is being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideImplementation {
    /// The inherited function this override replaces.
    pub function_id: ComponentId,
    /// Replacement body text.
    pub body: String,
    /// Whether the synthesized body delegates to `super` first.
    pub super_call: bool,
    /// Set once the user edits the body after creation.
    pub is_modified: bool,
}

impl OverrideImplementation {
    /// A fresh override: empty body, delegating to `super`, untouched.
    pub fn fresh(function_id: ComponentId) -> Self {
        OverrideImplementation {
            function_id,
            body: String::new(),
            super_call: true,
            is_modified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionComponent {
    pub visibility: Visibility,
    pub state_mutability: StateMutability,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_parameters: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: Vec<ModifierRef>,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideImplementation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableComponent {
    pub data_type: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub mutability: VariableMutability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorComponent {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: Vec<ModifierRef>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventComponent {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorComponent {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierComponent {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructComponent {
    #[serde(default)]
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumComponent {
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingComponent {
    pub key_type: String,
    pub value_type: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayComponent {
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    pub visibility: Visibility,
}

/// Protocols an integration block can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationProtocol {
    Uniswap,
    Aave,
    Compound,
    OpenZeppelin,
    Custom,
}

/// Security features a security block can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityFeature {
    ReentrancyGuard,
    Pausable,
    AccessControl,
    Ownable,
    RateLimit,
}

/// Oracle networks an oracle block can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    Chainlink,
    Band,
    Uma,
    Custom,
}

/// Interface standards an external call block can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceStandard {
    Erc20,
    Erc721,
    Erc1155,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationComponent {
    pub protocol: IntegrationProtocol,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityComponent {
    pub feature: SecurityFeature,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleComponent {
    pub provider: OracleProvider,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCallComponent {
    pub standard: InterfaceStandard,
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// A component whose `type` tag is not a [`ComponentType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownComponent {
    #[serde(rename = "type", deserialize_with = "unknown_tag")]
    pub type_name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Accepts only tags outside [`ComponentType::ALL`], so a malformed known
/// component still fails to load.
fn unknown_tag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let tag = String::deserialize(deserializer)?;
    if tag.parse::<ComponentType>().is_ok() {
        return Err(de::Error::custom(format!("malformed '{}' component", tag)));
    }
    Ok(tag)
}

/// The variant-specific part of a component, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComponentKind {
    Function(FunctionComponent),
    Variable(VariableComponent),
    Constructor(ConstructorComponent),
    Event(EventComponent),
    Modifier(ModifierComponent),
    Error(ErrorComponent),
    Struct(StructComponent),
    Enum(EnumComponent),
    Mapping(MappingComponent),
    Array(ArrayComponent),
    Integration(IntegrationComponent),
    Security(SecurityComponent),
    Oracle(OracleComponent),
    ExternalCall(ExternalCallComponent),
    #[serde(untagged)]
    Unknown(UnknownComponent),
}

impl ComponentKind {
    /// The tag of the variant, `None` for [`ComponentKind::Unknown`].
    pub fn component_type(&self) -> Option<ComponentType> {
        let t = match self {
            ComponentKind::Function(_) => ComponentType::Function,
            ComponentKind::Variable(_) => ComponentType::Variable,
            ComponentKind::Constructor(_) => ComponentType::Constructor,
            ComponentKind::Event(_) => ComponentType::Event,
            ComponentKind::Modifier(_) => ComponentType::Modifier,
            ComponentKind::Error(_) => ComponentType::Error,
            ComponentKind::Struct(_) => ComponentType::Struct,
            ComponentKind::Enum(_) => ComponentType::Enum,
            ComponentKind::Mapping(_) => ComponentType::Mapping,
            ComponentKind::Array(_) => ComponentType::Array,
            ComponentKind::Integration(_) => ComponentType::Integration,
            ComponentKind::Security(_) => ComponentType::Security,
            ComponentKind::Oracle(_) => ComponentType::Oracle,
            ComponentKind::ExternalCall(_) => ComponentType::ExternalCall,
            ComponentKind::Unknown(_) => return None,
        };
        Some(t)
    }
}

/// A component: the shared base fields plus one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentData {
    pub id: ComponentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ComponentCategory,
    #[serde(default)]
    pub default_values: IndexMap<String, serde_json::Value>,
    #[serde(flatten)]
    pub kind: ComponentKind,
}

impl ComponentData {
    pub fn component_type(&self) -> Option<ComponentType> {
        self.kind.component_type()
    }

    /// Raw statement text, for the kinds that carry executable code.
    pub fn body(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Function(f) => Some(&f.body),
            ComponentKind::Constructor(c) => Some(&c.body),
            ComponentKind::Modifier(m) => Some(&m.body),
            _ => None,
        }
    }

    /// Declared parameters, for the kinds that take them.
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match &self.kind {
            ComponentKind::Function(f) => Some(&f.parameters),
            ComponentKind::Constructor(c) => Some(&c.parameters),
            ComponentKind::Event(e) => Some(&e.parameters),
            ComponentKind::Error(e) => Some(&e.parameters),
            ComponentKind::Modifier(m) => Some(&m.parameters),
            _ => None,
        }
    }

    /// Declared visibility, for the kinds that have one.
    pub fn visibility(&self) -> Option<Visibility> {
        match &self.kind {
            ComponentKind::Function(f) => Some(f.visibility),
            ComponentKind::Variable(v) => Some(v.visibility),
            ComponentKind::Mapping(m) => Some(m.visibility),
            ComponentKind::Array(a) => Some(a.visibility),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionComponent> {
        match &self.kind {
            ComponentKind::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// A component placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggableComponent {
    pub data: ComponentData,
    #[serde(default)]
    pub position: Position,
}

impl DraggableComponent {
    pub fn id(&self) -> &ComponentId {
        &self.data.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_round_trips_through_str() {
        for t in ComponentType::ALL {
            assert_eq!(t.as_str().parse::<ComponentType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_tag_is_unsupported_variant() {
        let err = "bogus-type".parse::<ComponentType>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnsupportedVariant {
                name: "bogus-type".into()
            }
        );
    }

    #[test]
    fn external_call_wire_name() {
        let json = serde_json::to_string(&ComponentType::ExternalCall).unwrap();
        assert_eq!(json, "\"externalCall\"");
    }

    #[test]
    fn component_serializes_with_flat_type_tag() {
        let c = ComponentData {
            id: "v1".into(),
            name: "total".into(),
            description: String::new(),
            category: ComponentCategory::Basic,
            default_values: IndexMap::new(),
            kind: ComponentKind::Variable(VariableComponent {
                data_type: "uint256".into(),
                visibility: Visibility::Public,
                mutability: VariableMutability::Mutable,
                initial_value: None,
            }),
        };
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["type"], "variable");
        assert_eq!(value["dataType"], "uint256");
        assert!(value.get("parameters").is_none());

        let back: ComponentData = serde_json::from_value(value).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn accessors_follow_the_variant() {
        let c = ComponentData {
            id: "s1".into(),
            name: "Point".into(),
            description: String::new(),
            category: ComponentCategory::DataStructures,
            default_values: IndexMap::new(),
            kind: ComponentKind::Struct(StructComponent {
                members: vec![StructMember::new("x", "uint256")],
            }),
        };
        assert_eq!(c.component_type(), Some(ComponentType::Struct));
        assert!(c.body().is_none());
        assert!(c.parameters().is_none());
        assert!(c.visibility().is_none());
        assert!(c.as_function().is_none());
    }

    #[test]
    fn unknown_tag_loads_as_unknown_kind() {
        let value = serde_json::json!({
            "id": "n1",
            "name": "Collection",
            "category": "advanced",
            "type": "nftCollection",
            "maxSupply": 10000
        });
        let c: ComponentData = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(c.component_type(), None);
        let ComponentKind::Unknown(unknown) = &c.kind else {
            panic!("expected unknown kind, got {:?}", c.kind);
        };
        assert_eq!(unknown.type_name, "nftCollection");
        assert_eq!(unknown.fields["maxSupply"], 10000);
        assert!(c.body().is_none());

        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["type"], "nftCollection");
        assert_eq!(back["maxSupply"], 10000);
    }

    #[test]
    fn malformed_known_tag_is_still_an_error() {
        let value = serde_json::json!({
            "id": "v1",
            "name": "total",
            "category": "basic",
            "type": "variable"
        });
        assert!(serde_json::from_value::<ComponentData>(value).is_err());
    }
}
