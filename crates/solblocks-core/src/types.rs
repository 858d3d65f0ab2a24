//! Shared value types used by the component variants.
//!
//! Visibility, state mutability, parameters and the other small vocabulary
//! types that several component kinds carry. Each type knows its source
//! keyword so the generator never has to match on strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility of a function or state declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
    External,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::External => "external",
        }
    }
}

/// Function state mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    Nonpayable,
}

impl StateMutability {
    pub fn keyword(self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::Payable => "payable",
            StateMutability::Nonpayable => "nonpayable",
        }
    }

    /// Returns `true` for `pure` and `view`, which cannot write state.
    pub fn is_read_only(self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// Mutability of a state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableMutability {
    #[default]
    Mutable,
    Immutable,
    Constant,
}

impl VariableMutability {
    /// The declaration keyword; empty for ordinary mutable storage.
    pub fn keyword(self) -> &'static str {
        match self {
            VariableMutability::Mutable => "",
            VariableMutability::Immutable => "immutable",
            VariableMutability::Constant => "constant",
        }
    }
}

/// Data location of a reference-typed parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataLocation {
    Memory,
    Storage,
    Calldata,
}

impl DataLocation {
    pub fn keyword(self) -> &'static str {
        match self {
            DataLocation::Memory => "memory",
            DataLocation::Storage => "storage",
            DataLocation::Calldata => "calldata",
        }
    }
}

/// A named, typed parameter of a function, event, error, constructor or
/// modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Only meaningful for event parameters.
    #[serde(default)]
    pub indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DataLocation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            data_type: data_type.into(),
            indexed: false,
            location: None,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn in_location(mut self, location: DataLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Renders `type [location] [indexed] name`, dropping absent parts.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data_type)?;
        if let Some(location) = self.location {
            write!(f, " {}", location.keyword())?;
        }
        if self.indexed {
            f.write_str(" indexed")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        Ok(())
    }
}

/// Comma-joins a parameter list as it appears between parentheses.
pub fn join_parameters(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single `(name, type)` member of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

impl StructMember {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        StructMember {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A modifier applied to a function or constructor: either a bare name or a
/// full reference with invocation arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierRef {
    Name(String),
    Reference {
        name: String,
        #[serde(default)]
        arguments: Vec<String>,
    },
}

impl ModifierRef {
    pub fn name(&self) -> &str {
        match self {
            ModifierRef::Name(name) => name,
            ModifierRef::Reference { name, .. } => name,
        }
    }

    /// Renders the modifier as it appears in a function header.
    pub fn invocation(&self) -> String {
        match self {
            ModifierRef::Name(name) => name.clone(),
            ModifierRef::Reference { name, arguments } if arguments.is_empty() => name.clone(),
            ModifierRef::Reference { name, arguments } => {
                format!("{}({})", name, arguments.join(", "))
            }
        }
    }
}

/// Canvas position of a component. Irrelevant to generation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Palette grouping a component is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentCategory {
    Basic,
    DataStructures,
    Advanced,
    Security,
    Integrations,
}
