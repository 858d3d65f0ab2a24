//! Contracts, projects and the contract registry.
//!
//! A [`Contract`] owns an ordered collection of placed components and refers
//! to its parents by [`ContractId`] only. Parents are resolved through a
//! [`ContractRegistry`], which [`Project`] implements; contracts never embed
//! each other.

use serde::{Deserialize, Serialize};

use crate::component::{ComponentData, DraggableComponent, FunctionComponent};
use crate::error::CoreError;
use crate::id::{ComponentId, ContractId, ProjectId};

/// A reference to a parent contract in the same project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceRef {
    pub contract_id: ContractId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub name: String,
    #[serde(default)]
    pub components: Vec<DraggableComponent>,
    /// Parents in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<InheritanceRef>,
}

impl Contract {
    pub fn new(id: ContractId, name: impl Into<String>) -> Self {
        Contract {
            id,
            name: name.into(),
            components: Vec::new(),
            inherits: Vec::new(),
        }
    }

    /// Adds a parent reference, ignoring repeats.
    pub fn inherit(&mut self, parent: ContractId) {
        if !self.inherits.iter().any(|r| r.contract_id == parent) {
            self.inherits.push(InheritanceRef {
                contract_id: parent,
            });
        }
    }

    pub fn component(&self, id: &ComponentId) -> Option<&ComponentData> {
        self.components
            .iter()
            .map(|placed| &placed.data)
            .find(|data| &data.id == id)
    }

    /// Function components in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = (&ComponentData, &FunctionComponent)> {
        self.components
            .iter()
            .filter_map(|placed| placed.data.as_function().map(|f| (&placed.data, f)))
    }
}

/// Status of the external deployment job. This workspace only carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Idle,
    Compiling,
    Deploying,
    Verifying,
    Success,
    Error,
}

/// Lookup of contracts by id, as seen by the analyses.
pub trait ContractRegistry {
    fn lookup_contract(&self, id: &ContractId) -> Option<&Contract>;

    fn current_contract(&self) -> Option<&Contract>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    contracts: Vec<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_contract: Option<ContractId>,
    #[serde(default)]
    pub deployment: DeploymentStatus,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Project {
            id,
            name: name.into(),
            contracts: Vec::new(),
            current_contract: None,
            deployment: DeploymentStatus::Idle,
        }
    }

    /// Registers a contract. The first contract added becomes current.
    pub fn add_contract(&mut self, contract: Contract) -> Result<(), CoreError> {
        if self.contract(&contract.id).is_some() {
            return Err(CoreError::DuplicateContractId { id: contract.id });
        }
        if self.current_contract.is_none() {
            self.current_contract = Some(contract.id.clone());
        }
        self.contracts.push(contract);
        Ok(())
    }

    /// Removes a contract and returns it with its component collection
    /// emptied. References from other contracts are left in place and become
    /// unresolvable parents.
    pub fn remove_contract(&mut self, id: &ContractId) -> Result<Contract, CoreError> {
        let index = self
            .contracts
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| CoreError::ContractNotFound { id: id.clone() })?;
        let mut removed = self.contracts.remove(index);
        removed.components.clear();
        if self.current_contract.as_ref() == Some(id) {
            self.current_contract = self.contracts.first().map(|c| c.id.clone());
        }
        Ok(removed)
    }

    pub fn contract(&self, id: &ContractId) -> Option<&Contract> {
        self.contracts.iter().find(|c| &c.id == id)
    }

    pub fn contract_mut(&mut self, id: &ContractId) -> Option<&mut Contract> {
        self.contracts.iter_mut().find(|c| &c.id == id)
    }

    pub fn contract_by_name(&self, name: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn set_current(&mut self, id: &ContractId) -> Result<(), CoreError> {
        if self.contract(id).is_none() {
            return Err(CoreError::ContractNotFound { id: id.clone() });
        }
        self.current_contract = Some(id.clone());
        Ok(())
    }
}

impl ContractRegistry for Project {
    fn lookup_contract(&self, id: &ContractId) -> Option<&Contract> {
        self.contract(id)
    }

    fn current_contract(&self) -> Option<&Contract> {
        self.current_contract
            .as_ref()
            .and_then(|id| self.contract(id))
    }
}
