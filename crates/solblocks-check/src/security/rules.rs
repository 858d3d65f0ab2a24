//! Built-in security rules.
//!
//! Each rule is a unit struct implementing [`SecurityRule`]. Body inspection
//! works line by line on the raw statement text with `//` comments removed.

use solblocks_core::component::{ComponentData, ComponentKind, FunctionComponent};
use solblocks_core::types::{VariableMutability, Visibility};

use super::{CheckContext, IssueType, SecurityIssue, SecurityRule, Severity};
use crate::overrides::{find_conflicts, ConflictKind};

/// The rule set a default [`super::SecurityChecker`] runs.
pub fn builtin() -> Vec<Box<dyn SecurityRule>> {
    vec![
        Box::new(ReentrancyRule),
        Box::new(TxOriginRule),
        Box::new(UncheckedCallRule),
        Box::new(SelfdestructRule),
        Box::new(AccessControlRule),
        Box::new(TimestampRule),
        Box::new(UnboundedLoopRule),
        Box::new(OrphanedOverrideRule),
        Box::new(ConstantCandidateRule),
    ]
}

const EXTERNAL_CALLS: [&str; 6] = [
    ".call{", ".call(", ".delegatecall(", ".staticcall(", ".send(", ".transfer(",
];

const LOW_LEVEL_CALLS: [&str; 5] = [".call{", ".call(", ".delegatecall(", ".staticcall(", ".send("];

const PRIVILEGED_PREFIXES: [&str; 10] = [
    "set", "withdraw", "mint", "burn", "pause", "unpause", "upgrade", "transferownership",
    "destroy", "kill",
];

const GUARD_MODIFIERS: [&str; 2] = ["nonReentrant", "noReentrancy"];

/// Lines of `body` with line comments stripped and whitespace trimmed,
/// blank lines dropped.
fn code_lines(body: &str) -> Vec<&str> {
    body.lines()
        .map(|line| match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn contains_any(line: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| line.contains(n))
}

/// True if `line` contains a plain or compound assignment (not a comparison).
fn is_assignment(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'=' {
            return false;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        !matches!(next, b'=' | b'>') && !matches!(prev, b'=' | b'!' | b'<' | b'>')
    })
}

/// True if `line` declares a local rather than writing existing state.
fn is_local_declaration(line: &str) -> bool {
    const LOCAL_TYPES: [&str; 7] = ["uint", "int", "address", "bool", "bytes", "string", "("];
    LOCAL_TYPES.iter().any(|t| line.starts_with(t))
}

fn issue(
    component: &ComponentData,
    issue_type: IssueType,
    severity: Severity,
    message: String,
    suggestion: &str,
    code: Option<&str>,
) -> SecurityIssue {
    SecurityIssue {
        issue_type,
        message,
        severity,
        component: component.id.clone(),
        suggestion: Some(suggestion.to_string()),
        code: code.map(str::to_string),
    }
}

fn has_modifier(function: &FunctionComponent, names: &[&str]) -> bool {
    function
        .modifiers
        .iter()
        .any(|m| names.contains(&m.name()))
}

/// External call followed by a state write, without a reentrancy guard.
pub struct ReentrancyRule;

impl SecurityRule for ReentrancyRule {
    fn id(&self) -> &'static str {
        "reentrancy"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(function) = component.as_function() else {
            return Vec::new();
        };
        if has_modifier(function, &GUARD_MODIFIERS) {
            return Vec::new();
        }

        let lines = code_lines(&function.body);
        let Some(call_at) = lines.iter().position(|l| contains_any(l, &EXTERNAL_CALLS)) else {
            return Vec::new();
        };
        let writes_after = lines[call_at + 1..]
            .iter()
            .any(|l| is_assignment(l) && !is_local_declaration(l));
        if !writes_after {
            return Vec::new();
        }

        vec![issue(
            component,
            IssueType::Reentrancy,
            Severity::High,
            format!(
                "function '{}' writes state after an external call",
                component.name
            ),
            "Update state before the external call (checks-effects-interactions) or add a nonReentrant modifier",
            Some(lines[call_at]),
        )]
    }
}

/// Authorization through `tx.origin`.
pub struct TxOriginRule;

impl SecurityRule for TxOriginRule {
    fn id(&self) -> &'static str {
        "tx-origin"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(body) = component.body() else {
            return Vec::new();
        };
        code_lines(body)
            .into_iter()
            .filter(|l| l.contains("tx.origin"))
            .map(|line| {
                issue(
                    component,
                    IssueType::TxOrigin,
                    Severity::High,
                    format!("'{}' uses tx.origin", component.name),
                    "Use msg.sender for authorization",
                    Some(line),
                )
            })
            .collect()
    }
}

/// Low-level call whose success flag is discarded.
pub struct UncheckedCallRule;

impl SecurityRule for UncheckedCallRule {
    fn id(&self) -> &'static str {
        "unchecked-call"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(body) = component.body() else {
            return Vec::new();
        };
        code_lines(body)
            .into_iter()
            .filter(|l| contains_any(l, &LOW_LEVEL_CALLS))
            .filter(|l| {
                !is_assignment(l)
                    && !l.starts_with("require(")
                    && !l.starts_with("if")
                    && !l.starts_with("assert(")
                    && !l.starts_with("return")
            })
            .map(|line| {
                issue(
                    component,
                    IssueType::UncheckedCall,
                    Severity::Medium,
                    format!("'{}' ignores the result of a low-level call", component.name),
                    "Capture the returned success flag and require it",
                    Some(line),
                )
            })
            .collect()
    }
}

pub struct SelfdestructRule;

impl SecurityRule for SelfdestructRule {
    fn id(&self) -> &'static str {
        "selfdestruct"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(body) = component.body() else {
            return Vec::new();
        };
        code_lines(body)
            .into_iter()
            .filter(|l| l.contains("selfdestruct(") || l.contains("suicide("))
            .map(|line| {
                issue(
                    component,
                    IssueType::Selfdestruct,
                    Severity::Critical,
                    format!("'{}' can destroy the contract", component.name),
                    "Remove selfdestruct or restrict it behind a timelocked owner check",
                    Some(line),
                )
            })
            .collect()
    }
}

/// State-changing privileged entry point without any access restriction.
pub struct AccessControlRule;

impl SecurityRule for AccessControlRule {
    fn id(&self) -> &'static str {
        "access-control"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(function) = component.as_function() else {
            return Vec::new();
        };
        let exposed = matches!(function.visibility, Visibility::Public | Visibility::External);
        if !exposed || function.state_mutability.is_read_only() || !function.modifiers.is_empty() {
            return Vec::new();
        }
        let lowered = component.name.to_ascii_lowercase();
        if !PRIVILEGED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            return Vec::new();
        }
        if function.body.contains("msg.sender") {
            return Vec::new();
        }

        vec![issue(
            component,
            IssueType::AccessControl,
            Severity::Medium,
            format!(
                "privileged function '{}' is callable by anyone",
                component.name
            ),
            "Add an access modifier such as onlyOwner or check msg.sender",
            None,
        )]
    }
}

pub struct TimestampRule;

impl SecurityRule for TimestampRule {
    fn id(&self) -> &'static str {
        "timestamp"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(body) = component.body() else {
            return Vec::new();
        };
        code_lines(body)
            .into_iter()
            .find(|l| l.contains("block.timestamp") || l.contains("block.number"))
            .map(|line| {
                issue(
                    component,
                    IssueType::TimestampDependence,
                    Severity::Low,
                    format!("'{}' depends on block time", component.name),
                    "Avoid block values for randomness or tight deadlines",
                    Some(line),
                )
            })
            .into_iter()
            .collect()
    }
}

/// Loops bounded by a dynamic length or unbounded `while` loops.
pub struct UnboundedLoopRule;

impl SecurityRule for UnboundedLoopRule {
    fn id(&self) -> &'static str {
        "unbounded-loop"
    }

    fn check(&self, component: &ComponentData, _ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(body) = component.body() else {
            return Vec::new();
        };
        code_lines(body)
            .into_iter()
            .filter(|l| (l.starts_with("for") && l.contains(".length")) || l.starts_with("while"))
            .map(|line| {
                issue(
                    component,
                    IssueType::UnboundedLoop,
                    Severity::Low,
                    format!("'{}' loops over unbounded data", component.name),
                    "Bound the iteration count or paginate the work",
                    Some(line),
                )
            })
            .collect()
    }
}

/// Stored overrides whose target is no longer overridable.
pub struct OrphanedOverrideRule;

impl SecurityRule for OrphanedOverrideRule {
    fn id(&self) -> &'static str {
        "orphaned-override"
    }

    fn check(&self, component: &ComponentData, ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let (Some(contract), Some(registry)) = (ctx.contract, ctx.registry) else {
            return Vec::new();
        };
        find_conflicts(component, contract, registry)
            .into_iter()
            .map(|conflict| {
                let message = match conflict.kind {
                    ConflictKind::Orphaned => format!(
                        "'{}' overrides {} which is no longer inherited as virtual",
                        component.name, conflict.function_id
                    ),
                    ConflictKind::Incompatible => format!(
                        "'{}' overrides {} with an incompatible signature",
                        component.name, conflict.function_id
                    ),
                };
                issue(
                    component,
                    IssueType::OrphanedOverride,
                    Severity::Medium,
                    message,
                    "Remove the override or restore the parent contract link",
                    None,
                )
            })
            .collect()
    }
}

/// Mutable state with an initializer that no body in the contract writes.
pub struct ConstantCandidateRule;

impl SecurityRule for ConstantCandidateRule {
    fn id(&self) -> &'static str {
        "constant-candidate"
    }

    fn check(&self, component: &ComponentData, ctx: &CheckContext<'_>) -> Vec<SecurityIssue> {
        let Some(contract) = ctx.contract else {
            return Vec::new();
        };
        let ComponentKind::Variable(variable) = &component.kind else {
            return Vec::new();
        };
        if variable.mutability != VariableMutability::Mutable || variable.initial_value.is_none() {
            return Vec::new();
        }

        let name = component.name.as_str();
        if name.is_empty() {
            return Vec::new();
        }
        let written = contract
            .components
            .iter()
            .filter_map(|placed| placed.data.body())
            .flat_map(code_lines)
            .any(|line| writes_to(line, name));
        if written {
            return Vec::new();
        }

        vec![issue(
            component,
            IssueType::ConstantCandidate,
            Severity::Low,
            format!("'{}' is never written and could be constant", name),
            "Declare the variable constant to save gas",
            None,
        )]
    }
}

/// True if `line` assigns to `name`, e.g. `name = ...`, `name += ...`,
/// `name++` or `delete name`.
fn writes_to(line: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if line.starts_with(&format!("delete {}", name)) {
        return true;
    }
    let mut search = line;
    while let Some(idx) = search.find(name) {
        let before = search[..idx].chars().last();
        let rest = search[idx + name.len()..].trim_start();
        let boundary = before.map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '.'));
        let assigns = (rest.starts_with('=') && !rest.starts_with("=="))
            || ["+=", "-=", "*=", "/=", "++", "--", "["]
                .iter()
                .any(|op| rest.starts_with(op) && (*op != "[" || is_assignment(rest)));
        if boundary && assigns {
            return true;
        }
        search = &search[idx + name.len()..];
    }
    false
}
