//! Component factory.
//!
//! [`create_component`] turns a palette drop (a type name plus optional seed
//! data) into a fully populated [`ComponentData`]. Every branch fills all
//! mandatory fields of its variant, so a freshly created component is always
//! renderable. An unknown type name is a hard [`CoreError::UnsupportedVariant`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::component::{
    ArrayComponent, ComponentData, ComponentKind, ComponentType, ConstructorComponent,
    DraggableComponent, EnumComponent, ErrorComponent, EventComponent, ExternalCallComponent,
    FunctionComponent, IntegrationComponent, IntegrationProtocol, InterfaceStandard,
    MappingComponent, ModifierComponent, OracleComponent, OracleProvider, SecurityComponent,
    SecurityFeature, StructComponent, VariableComponent,
};
use crate::error::CoreError;
use crate::id::ComponentId;
use crate::types::{
    ComponentCategory, Position, StateMutability, StructMember, VariableMutability, Visibility,
};

/// Optional data supplied with a palette drop. Any field left `None` falls
/// back to the variant's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSeed {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ComponentCategory>,
    pub visibility: Option<Visibility>,
    pub state_mutability: Option<StateMutability>,
    pub data_type: Option<String>,
    #[serde(default)]
    pub default_values: IndexMap<String, serde_json::Value>,
}

/// Creates a component from a type name as it arrives from the palette.
///
/// Returns [`CoreError::UnsupportedVariant`] if `component_type` is not one of
/// the fourteen supported tags.
pub fn create_component(
    id: ComponentId,
    component_type: &str,
    seed: Option<&ComponentSeed>,
) -> Result<ComponentData, CoreError> {
    let component_type: ComponentType = component_type.parse()?;
    Ok(create_typed(id, component_type, seed))
}

/// Creates a default-valued component for an already parsed tag.
pub fn create_typed(
    id: ComponentId,
    component_type: ComponentType,
    seed: Option<&ComponentSeed>,
) -> ComponentData {
    let empty = ComponentSeed::default();
    let seed = seed.unwrap_or(&empty);

    let (default_name, category, kind) = match component_type {
        ComponentType::Function => (
            "newFunction",
            ComponentCategory::Basic,
            ComponentKind::Function(FunctionComponent {
                visibility: seed.visibility.unwrap_or(Visibility::Public),
                state_mutability: seed
                    .state_mutability
                    .unwrap_or(StateMutability::Nonpayable),
                parameters: Vec::new(),
                return_parameters: Vec::new(),
                modifiers: Vec::new(),
                is_virtual: false,
                body: String::new(),
                overrides: Vec::new(),
            }),
        ),
        ComponentType::Variable => (
            "newVariable",
            ComponentCategory::Basic,
            ComponentKind::Variable(VariableComponent {
                data_type: seed
                    .data_type
                    .clone()
                    .unwrap_or_else(|| "uint256".to_string()),
                visibility: seed.visibility.unwrap_or(Visibility::Public),
                mutability: VariableMutability::Mutable,
                initial_value: None,
            }),
        ),
        ComponentType::Constructor => (
            "constructor",
            ComponentCategory::Basic,
            ComponentKind::Constructor(ConstructorComponent {
                parameters: Vec::new(),
                modifiers: Vec::new(),
                body: String::new(),
            }),
        ),
        ComponentType::Event => (
            "NewEvent",
            ComponentCategory::Basic,
            ComponentKind::Event(EventComponent {
                parameters: Vec::new(),
            }),
        ),
        ComponentType::Modifier => (
            "newModifier",
            ComponentCategory::Advanced,
            ComponentKind::Modifier(ModifierComponent {
                parameters: Vec::new(),
                body: "_;".to_string(),
            }),
        ),
        ComponentType::Error => (
            "CustomError",
            ComponentCategory::Advanced,
            ComponentKind::Error(ErrorComponent {
                parameters: Vec::new(),
            }),
        ),
        ComponentType::Struct => (
            "NewStruct",
            ComponentCategory::DataStructures,
            ComponentKind::Struct(StructComponent {
                members: vec![StructMember::new("id", "uint256")],
            }),
        ),
        ComponentType::Enum => (
            "NewEnum",
            ComponentCategory::DataStructures,
            ComponentKind::Enum(EnumComponent {
                members: vec!["Inactive".to_string(), "Active".to_string()],
            }),
        ),
        ComponentType::Mapping => (
            "balances",
            ComponentCategory::DataStructures,
            ComponentKind::Mapping(MappingComponent {
                key_type: "address".to_string(),
                value_type: seed
                    .data_type
                    .clone()
                    .unwrap_or_else(|| "uint256".to_string()),
                visibility: seed.visibility.unwrap_or(Visibility::Public),
            }),
        ),
        ComponentType::Array => (
            "items",
            ComponentCategory::DataStructures,
            ComponentKind::Array(ArrayComponent {
                element_type: seed
                    .data_type
                    .clone()
                    .unwrap_or_else(|| "uint256".to_string()),
                length: None,
                visibility: seed.visibility.unwrap_or(Visibility::Public),
            }),
        ),
        ComponentType::Integration => (
            "integration",
            ComponentCategory::Integrations,
            ComponentKind::Integration(IntegrationComponent {
                protocol: IntegrationProtocol::OpenZeppelin,
                parameters: IndexMap::new(),
                requirements: Vec::new(),
            }),
        ),
        ComponentType::Security => (
            "reentrancyGuard",
            ComponentCategory::Security,
            ComponentKind::Security(SecurityComponent {
                feature: SecurityFeature::ReentrancyGuard,
                parameters: IndexMap::new(),
                requirements: Vec::new(),
            }),
        ),
        ComponentType::Oracle => (
            "priceFeed",
            ComponentCategory::Integrations,
            ComponentKind::Oracle(OracleComponent {
                provider: OracleProvider::Chainlink,
                parameters: IndexMap::new(),
                requirements: Vec::new(),
            }),
        ),
        ComponentType::ExternalCall => (
            "externalCall",
            ComponentCategory::Integrations,
            ComponentKind::ExternalCall(ExternalCallComponent {
                standard: InterfaceStandard::Erc20,
                parameters: IndexMap::new(),
                requirements: Vec::new(),
            }),
        ),
    };

    ComponentData {
        id,
        name: seed
            .name
            .clone()
            .unwrap_or_else(|| default_name.to_string()),
        description: seed.description.clone().unwrap_or_default(),
        category: seed.category.unwrap_or(category),
        default_values: seed.default_values.clone(),
        kind,
    }
}

/// Places a component on the canvas. The input is left untouched.
pub fn attach_position(component: &ComponentData, position: Position) -> DraggableComponent {
    DraggableComponent {
        data: component.clone(),
        position,
    }
}
