//! Static analyses over solblocks contracts.
//!
//! # Modules
//!
//! - [`overrides`] -- Overridable parent functions and stored override conflicts
//! - [`inheritance`] -- Inheritance graph: missing parents, cycles, diamonds, ambiguity
//! - [`security`] -- Pluggable security and lint rules over component bodies

pub mod inheritance;
pub mod overrides;
pub mod security;

pub use inheritance::{analyze_inheritance, linearize, InheritanceGraph, InheritanceIssue};
pub use overrides::{
    count_conflicts, find_conflicts, is_valid_override, list_current_overrides, list_overridable,
    signature_of, super_call_of, toggle_override, ConflictKind, OverrideConflict,
    OverrideableFunction,
};
pub use security::{
    highest_severity, run_security_checks, CheckContext, IssueType, SecurityChecker, SecurityIssue,
    SecurityRule, Severity,
};
