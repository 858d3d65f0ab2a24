//! Inheritance graph analysis over a project.
//!
//! Builds a directed graph with one node per contract and an edge from each
//! child to each resolvable parent, then reports unresolvable parents,
//! inheritance cycles, diamonds (an ancestor reachable through two different
//! direct parents) and functions inherited ambiguously from more than one
//! contract. This analysis is independent of the per-parent walk in
//! [`crate::overrides`].

use std::collections::{HashMap, HashSet};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};

use solblocks_core::contract::{Contract, ContractRegistry, Project};
use solblocks_core::id::ContractId;

/// A structural problem in a project's inheritance graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InheritanceIssue {
    /// An `inherits` entry names a contract that is not in the project.
    #[error("contract {contract} inherits missing contract {parent}")]
    MissingParent {
        contract: ContractId,
        parent: ContractId,
    },

    /// The listed contracts inherit from each other in a loop.
    #[error("inheritance cycle through {}", join_ids(.members))]
    Cycle { members: Vec<ContractId> },

    /// `ancestor` is reachable from `contract` through two direct parents.
    #[error("contract {contract} reaches {ancestor} through more than one parent")]
    Diamond {
        contract: ContractId,
        ancestor: ContractId,
    },

    /// Several ancestors declare a function with this signature and
    /// `contract` does not resolve it.
    #[error("contract {contract} inherits '{signature}' from {}", .sources.join(", "))]
    AmbiguousFunction {
        contract: ContractId,
        signature: String,
        sources: Vec<String>,
    },
}

fn join_ids(ids: &[ContractId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// The project's inheritance graph. Edges point from child to parent.
pub struct InheritanceGraph<'a> {
    project: &'a Project,
    graph: DiGraph<ContractId, ()>,
    index: HashMap<ContractId, NodeIndex<u32>>,
    missing: Vec<(ContractId, ContractId)>,
}

impl<'a> InheritanceGraph<'a> {
    pub fn build(project: &'a Project) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for contract in project.contracts() {
            let idx = graph.add_node(contract.id.clone());
            index.insert(contract.id.clone(), idx);
        }

        let mut missing = Vec::new();
        for contract in project.contracts() {
            let child = index[&contract.id];
            for parent_ref in &contract.inherits {
                match index.get(&parent_ref.contract_id) {
                    Some(&parent) => {
                        graph.add_edge(child, parent, ());
                    }
                    None => missing.push((contract.id.clone(), parent_ref.contract_id.clone())),
                }
            }
        }

        InheritanceGraph {
            project,
            graph,
            index,
            missing,
        }
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Strongly connected groups that form inheritance loops, each sorted,
    /// the list itself sorted by first member.
    pub fn cycles(&self) -> Vec<Vec<ContractId>> {
        let mut cycles: Vec<Vec<ContractId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<ContractId> =
                    scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Every contract reachable from `id` through parent edges, excluding
    /// `id` itself unless it sits on a cycle.
    pub fn ancestors(&self, id: &ContractId) -> HashSet<ContractId> {
        let Some(&start) = self.index.get(id) else {
            return HashSet::new();
        };
        let mut result = HashSet::new();
        for parent in self.graph.neighbors(start) {
            let mut dfs = Dfs::new(&self.graph, parent);
            while let Some(node) = dfs.next(&self.graph) {
                result.insert(self.graph[node].clone());
            }
        }
        result
    }

    /// Runs every check and returns the issues in a stable order: missing
    /// parents, cycles, then per-contract diamonds and ambiguities in project
    /// order.
    pub fn issues(&self) -> Vec<InheritanceIssue> {
        let mut issues: Vec<InheritanceIssue> = self
            .missing
            .iter()
            .map(|(contract, parent)| InheritanceIssue::MissingParent {
                contract: contract.clone(),
                parent: parent.clone(),
            })
            .collect();

        let cycles = self.cycles();
        let cyclic: HashSet<&ContractId> = cycles.iter().flatten().collect();
        issues.extend(cycles.iter().map(|members| InheritanceIssue::Cycle {
            members: members.clone(),
        }));

        for contract in self.project.contracts() {
            // Reachability is meaningless around a loop.
            let ancestors = self.ancestors(&contract.id);
            if cyclic.contains(&contract.id) || ancestors.iter().any(|a| cyclic.contains(a)) {
                continue;
            }
            issues.extend(self.diamonds(contract));
            issues.extend(self.ambiguous_functions(contract));
        }

        issues
    }

    fn resolved_parents(&self, contract: &'a Contract) -> Vec<&'a Contract> {
        contract
            .inherits
            .iter()
            .filter_map(|r| self.project.lookup_contract(&r.contract_id))
            .collect()
    }

    /// The parent itself plus everything above it.
    fn lineage(&self, parent: &Contract) -> HashSet<ContractId> {
        let mut lineage = self.ancestors(&parent.id);
        lineage.insert(parent.id.clone());
        lineage
    }

    fn diamonds(&self, contract: &'a Contract) -> Vec<InheritanceIssue> {
        let parents = self.resolved_parents(contract);
        let direct: HashSet<&ContractId> = parents.iter().map(|p| &p.id).collect();
        let mut seen_through: HashMap<ContractId, usize> = HashMap::new();
        let mut reported = HashSet::new();
        let mut issues = Vec::new();

        for (i, parent) in parents.iter().enumerate() {
            let mut lineage: Vec<ContractId> = self.lineage(parent).into_iter().collect();
            lineage.sort();
            for ancestor in lineage {
                // `contract C is A, B` with `B is A` re-lists A on purpose.
                if direct.contains(&ancestor) {
                    continue;
                }
                match seen_through.get(&ancestor) {
                    Some(&first) if first != i => {
                        if reported.insert(ancestor.clone()) {
                            issues.push(InheritanceIssue::Diamond {
                                contract: contract.id.clone(),
                                ancestor,
                            });
                        }
                    }
                    Some(_) => {}
                    None => {
                        seen_through.insert(ancestor, i);
                    }
                }
            }
        }

        issues
    }

    fn ambiguous_functions(&self, contract: &'a Contract) -> Vec<InheritanceIssue> {
        let resolved: HashSet<String> = contract
            .functions()
            .map(|(data, f)| signature_key(&data.name, &f.parameters))
            .collect();
        let overridden: HashSet<_> = contract
            .functions()
            .flat_map(|(_, f)| f.overrides.iter().map(|o| o.function_id.clone()))
            .collect();

        let mut ancestors: Vec<&Contract> = self
            .ancestors(&contract.id)
            .iter()
            .filter_map(|id| self.project.lookup_contract(id))
            .collect();
        ancestors.sort_by(|a, b| a.id.cmp(&b.id));

        // signature -> (declaring contracts, whether any declaration is overridden)
        let mut declared: Vec<(String, Vec<&Contract>, bool)> = Vec::new();
        for ancestor in ancestors {
            for (data, f) in ancestor.functions() {
                let key = signature_key(&data.name, &f.parameters);
                let is_overridden = overridden.contains(&data.id);
                match declared.iter_mut().find(|(k, _, _)| *k == key) {
                    Some((_, sources, any_overridden)) => {
                        if !sources.iter().any(|c| c.id == ancestor.id) {
                            sources.push(ancestor);
                        }
                        *any_overridden |= is_overridden;
                    }
                    None => declared.push((key, vec![ancestor], is_overridden)),
                }
            }
        }

        declared
            .into_iter()
            .filter(|(key, _, any_overridden)| !any_overridden && !resolved.contains(key))
            .filter_map(|(signature, sources, _)| {
                // A declaration shadowed by a more derived declarer is not a rival.
                let rivals: Vec<String> = sources
                    .iter()
                    .filter(|candidate| {
                        !sources.iter().any(|other| {
                            other.id != candidate.id
                                && self.ancestors(&other.id).contains(&candidate.id)
                        })
                    })
                    .map(|c| c.name.clone())
                    .collect();
                (rivals.len() > 1).then(|| InheritanceIssue::AmbiguousFunction {
                    contract: contract.id.clone(),
                    signature,
                    sources: rivals,
                })
            })
            .collect()
    }
}

fn signature_key(name: &str, params: &[solblocks_core::types::Parameter]) -> String {
    let types: Vec<&str> = params.iter().map(|p| p.data_type.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// Runs the full inheritance analysis over `project`.
pub fn analyze_inheritance(project: &Project) -> Vec<InheritanceIssue> {
    InheritanceGraph::build(project).issues()
}

/// Ancestors of `id` in depth-first order, most-base first, each listed once.
/// Returns `None` if `id` is unknown or its ancestry contains a cycle.
pub fn linearize<R>(id: &ContractId, registry: &R) -> Option<Vec<ContractId>>
where
    R: ContractRegistry + ?Sized,
{
    fn visit<R: ContractRegistry + ?Sized>(
        contract: &Contract,
        registry: &R,
        on_path: &mut Vec<ContractId>,
        order: &mut Vec<ContractId>,
    ) -> bool {
        if on_path.contains(&contract.id) {
            return false;
        }
        on_path.push(contract.id.clone());
        for parent_ref in &contract.inherits {
            if let Some(parent) = registry.lookup_contract(&parent_ref.contract_id) {
                if !visit(parent, registry, on_path, order) {
                    return false;
                }
                if !order.contains(&parent.id) {
                    order.push(parent.id.clone());
                }
            }
        }
        on_path.pop();
        true
    }

    let contract = registry.lookup_contract(id)?;
    let mut order = Vec::new();
    if visit(contract, registry, &mut Vec::new(), &mut order) {
        Some(order)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solblocks_core::component::{ComponentKind, ComponentType, OverrideImplementation};
    use solblocks_core::factory::{attach_position, create_typed};
    use solblocks_core::types::Position;

    fn contract(id: &str, parents: &[&str]) -> Contract {
        let mut c = Contract::new(id.into(), id.to_uppercase());
        for p in parents {
            c.inherit((*p).into());
        }
        c
    }

    fn with_function(mut c: Contract, fn_id: &str, name: &str) -> Contract {
        let mut data = create_typed(fn_id.into(), ComponentType::Function, None);
        data.name = name.to_string();
        if let ComponentKind::Function(f) = &mut data.kind {
            f.is_virtual = true;
        }
        c.components.push(attach_position(&data, Position::default()));
        c
    }

    fn project(contracts: Vec<Contract>) -> Project {
        let mut p = Project::new("p".into(), "Demo");
        for c in contracts {
            p.add_contract(c).unwrap();
        }
        p
    }

    #[test]
    fn clean_chain_has_no_issues() {
        let p = project(vec![
            contract("a", &[]),
            contract("b", &["a"]),
            contract("c", &["b"]),
        ]);
        assert!(analyze_inheritance(&p).is_empty());
        assert_eq!(
            linearize(&"c".into(), &p).unwrap(),
            vec![ContractId::from("a"), ContractId::from("b")]
        );
    }

    #[test]
    fn missing_parent_reported() {
        let p = project(vec![contract("a", &["ghost"])]);
        assert_eq!(
            analyze_inheritance(&p),
            vec![InheritanceIssue::MissingParent {
                contract: "a".into(),
                parent: "ghost".into(),
            }]
        );
    }

    #[test]
    fn cycle_detected() {
        let p = project(vec![
            contract("a", &["c"]),
            contract("b", &["a"]),
            contract("c", &["b"]),
        ]);
        let graph = InheritanceGraph::build(&p);
        assert!(graph.has_cycles());
        assert_eq!(
            graph.cycles(),
            vec![vec![ContractId::from("a"), ContractId::from("b"), ContractId::from("c")]]
        );
        assert!(linearize(&"a".into(), &p).is_none());
        assert_eq!(analyze_inheritance(&p).len(), 1);
    }

    #[test]
    fn self_inheritance_is_a_cycle() {
        let p = project(vec![contract("a", &["a"])]);
        assert_eq!(InheritanceGraph::build(&p).cycles(), vec![vec![ContractId::from("a")]]);
    }

    #[test]
    fn diamond_detected() {
        let p = project(vec![
            contract("base", &[]),
            contract("left", &["base"]),
            contract("right", &["base"]),
            contract("child", &["left", "right"]),
        ]);
        assert_eq!(
            analyze_inheritance(&p),
            vec![InheritanceIssue::Diamond {
                contract: "child".into(),
                ancestor: "base".into(),
            }]
        );
        assert_eq!(
            linearize(&"child".into(), &p).unwrap(),
            vec![
                ContractId::from("base"),
                ContractId::from("left"),
                ContractId::from("right"),
            ]
        );
    }

    #[test]
    fn same_function_from_two_parents_is_ambiguous() {
        let p = project(vec![
            with_function(contract("left", &[]), "l-f", "pause"),
            with_function(contract("right", &[]), "r-f", "pause"),
            contract("child", &["left", "right"]),
        ]);
        assert_eq!(
            analyze_inheritance(&p),
            vec![InheritanceIssue::AmbiguousFunction {
                contract: "child".into(),
                signature: "pause()".into(),
                sources: vec!["LEFT".into(), "RIGHT".into()],
            }]
        );
    }

    #[test]
    fn override_resolves_ambiguity() {
        let mut child = contract("child", &["left", "right"]);
        let mut data = create_typed("c-f".into(), ComponentType::Function, None);
        data.name = "unrelated".into();
        if let ComponentKind::Function(f) = &mut data.kind {
            f.overrides = vec![OverrideImplementation::fresh("l-f".into())];
        }
        child.components.push(attach_position(&data, Position::default()));

        let p = project(vec![
            with_function(contract("left", &[]), "l-f", "pause"),
            with_function(contract("right", &[]), "r-f", "pause"),
            child,
        ]);
        assert!(analyze_inheritance(&p).is_empty());
    }

    #[test]
    fn redeclaring_a_direct_parent_is_not_a_diamond() {
        let p = project(vec![
            contract("a", &[]),
            contract("b", &["a"]),
            contract("c", &["a", "b"]),
        ]);
        assert!(analyze_inheritance(&p).is_empty());
    }

    #[test]
    fn override_along_a_chain_is_not_ambiguous() {
        let p = project(vec![
            with_function(contract("a", &[]), "a-f", "pause"),
            with_function(contract("b", &["a"]), "b-f", "pause"),
            contract("c", &["b"]),
        ]);
        assert!(analyze_inheritance(&p).is_empty());
    }

    #[test]
    fn issue_messages() {
        let issue = InheritanceIssue::Cycle {
            members: vec!["a".into(), "b".into()],
        };
        assert_eq!(issue.to_string(), "inheritance cycle through a -> b");
    }
}
