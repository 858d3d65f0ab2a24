//! Security and lint checks over components.
//!
//! A [`SecurityChecker`] runs a list of [`SecurityRule`]s against each
//! component and collects [`SecurityIssue`]s. Rules are shallow: they look at
//! the component model and raw body text, never at a parsed program. Rules
//! that need the surrounding contract (orphaned overrides, constant
//! candidates) read it from the [`CheckContext`] and stay silent without it.

pub mod rules;

use serde::{Deserialize, Serialize};

use solblocks_core::component::ComponentData;
use solblocks_core::contract::{Contract, ContractRegistry};
use solblocks_core::id::ComponentId;

/// How serious an issue is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// The category of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueType {
    Reentrancy,
    TxOrigin,
    UncheckedCall,
    Selfdestruct,
    AccessControl,
    TimestampDependence,
    UnboundedLoop,
    OrphanedOverride,
    ConstantCandidate,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub message: String,
    pub severity: Severity,
    /// The component the finding is attached to.
    pub component: ComponentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// The offending source line, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// What a rule may see besides the component itself.
#[derive(Clone, Copy, Default)]
pub struct CheckContext<'a> {
    pub contract: Option<&'a Contract>,
    pub registry: Option<&'a dyn ContractRegistry>,
}

impl<'a> CheckContext<'a> {
    /// No surrounding contract: contract-level rules are skipped.
    pub fn none() -> Self {
        CheckContext::default()
    }

    pub fn for_contract(contract: &'a Contract, registry: &'a dyn ContractRegistry) -> Self {
        CheckContext {
            contract: Some(contract),
            registry: Some(registry),
        }
    }
}

/// One check. Implementations must be pure.
pub trait SecurityRule: Send + Sync {
    /// Stable rule name, used for filtering and reporting.
    fn id(&self) -> &'static str;

    fn check(&self, component: &ComponentData, ctx: &CheckContext<'_>) -> Vec<SecurityIssue>;
}

/// Runs a rule set over components.
pub struct SecurityChecker {
    rules: Vec<Box<dyn SecurityRule>>,
}

impl Default for SecurityChecker {
    /// The built-in rule set.
    fn default() -> Self {
        SecurityChecker {
            rules: rules::builtin(),
        }
    }
}

impl SecurityChecker {
    /// A checker with no rules.
    pub fn empty() -> Self {
        SecurityChecker { rules: Vec::new() }
    }

    /// Adds a rule after the existing ones.
    pub fn with_rule(mut self, rule: Box<dyn SecurityRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Runs every rule against one component, in rule order.
    pub fn check(&self, component: &ComponentData, ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        self.rules
            .iter()
            .flat_map(|rule| rule.check(component, ctx))
            .collect()
    }

    /// Runs every rule against every component of `contract`, in component
    /// order.
    pub fn check_contract(
        &self,
        contract: &Contract,
        registry: &dyn ContractRegistry,
    ) -> Vec<SecurityIssue> {
        let ctx = CheckContext::for_contract(contract, registry);
        let issues: Vec<SecurityIssue> = contract
            .components
            .iter()
            .flat_map(|placed| self.check(&placed.data, &ctx))
            .collect();
        tracing::debug!(
            contract = %contract.name,
            issues = issues.len(),
            "security checks complete"
        );
        issues
    }
}

/// Runs the built-in rules against a single component with no contract
/// context.
pub fn run_security_checks(component: &ComponentData) -> Vec<SecurityIssue> {
    SecurityChecker::default().check(component, &CheckContext::none())
}

/// The most severe issue level in `issues`, if any.
pub fn highest_severity(issues: &[SecurityIssue]) -> Option<Severity> {
    issues.iter().map(|i| i.severity).max()
}
