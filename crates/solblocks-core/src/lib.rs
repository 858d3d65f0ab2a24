//! Component model for solblocks.
//!
//! Defines the closed set of contract building blocks, the factory that
//! creates them, partial-update patches, validation rules, and the
//! contract/project registry the analyses resolve inheritance through.

pub mod component;
pub mod contract;
pub mod error;
pub mod factory;
pub mod id;
pub mod patch;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use component::{
    ComponentData, ComponentKind, ComponentType, DraggableComponent, FunctionComponent,
    OverrideImplementation,
};
pub use contract::{Contract, ContractRegistry, DeploymentStatus, InheritanceRef, Project};
pub use error::CoreError;
pub use factory::{attach_position, create_component, create_typed, ComponentSeed};
pub use id::{ComponentId, ContractId, ProjectId};
pub use patch::{apply_patch, ComponentPatch};
pub use types::{
    join_parameters, ComponentCategory, DataLocation, ModifierRef, Parameter, Position,
    StateMutability, StructMember, VariableMutability, Visibility,
};
pub use validate::{validate_component, validate_contract, ValidationError};
