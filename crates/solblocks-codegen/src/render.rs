//! Per-variant rendering and contract assembly.
//!
//! Every component renders to one block of text at column zero; the
//! assembler indents each block once inside the contract and separates
//! blocks with a blank line. Bodies are copied verbatim and re-indented one
//! level: non-blank lines gain the indent, blank lines stay empty.
//!
//! Metadata variants (integration, security, oracle, external call) have no
//! source form and are omitted. Rendering never fails.

use solblocks_check::overrides::{
    is_valid_override, list_overridable, super_call_of, OverrideableFunction,
};
use solblocks_core::component::{
    ComponentData, ComponentKind, DraggableComponent, OverrideImplementation,
};
use solblocks_core::contract::{Contract, ContractRegistry, Project};
use solblocks_core::id::ContractId;
use solblocks_core::types::{join_parameters, ModifierRef, Parameter};

use crate::error::CodegenError;
use crate::{GeneratedSource, GeneratorOptions};

/// Renders `components` as contract `contract_name` with the default
/// options.
pub fn generate_source(contract_name: &str, components: &[DraggableComponent]) -> String {
    render_components(contract_name, components, &GeneratorOptions::default())
}

/// Renders `components` in order as contract `contract_name`.
pub fn render_components(
    contract_name: &str,
    components: &[DraggableComponent],
    options: &GeneratorOptions,
) -> String {
    let blocks: Vec<String> = components
        .iter()
        .filter_map(|placed| render_component(&placed.data, options))
        .collect();
    let header = format!("contract {} {{", contract_name);
    assemble(&header, &blocks, options)
}

/// Renders a registered contract: the inheritance list of every resolvable
/// parent, its components, and one synthesized function per stored override
/// whose target is still overridable. Each synthesized override follows the
/// component that stores it. Orphaned overrides are skipped.
pub fn render_contract<R>(contract: &Contract, registry: &R, options: &GeneratorOptions) -> String
where
    R: ContractRegistry + ?Sized,
{
    let parents: Vec<&str> = contract
        .inherits
        .iter()
        .filter_map(|r| registry.lookup_contract(&r.contract_id))
        .map(|parent| parent.name.as_str())
        .collect();
    let header = if parents.is_empty() {
        format!("contract {} {{", contract.name)
    } else {
        format!("contract {} is {} {{", contract.name, parents.join(", "))
    };

    let has_overrides = contract
        .functions()
        .any(|(_, function)| !function.overrides.is_empty());
    let overridable = if has_overrides {
        list_overridable(contract, registry)
    } else {
        Vec::new()
    };

    let mut blocks = Vec::new();
    for placed in &contract.components {
        blocks.extend(render_component(&placed.data, options));

        let Some(function) = placed.data.as_function() else {
            continue;
        };
        for implementation in &function.overrides {
            match overridable
                .iter()
                .find(|target| target.id == implementation.function_id)
            {
                Some(target) if is_valid_override(implementation, target) => {
                    blocks.push(render_override(target, implementation, options));
                }
                _ => tracing::debug!(
                    component = %placed.data.id,
                    function = %implementation.function_id,
                    "skipping override without a valid target"
                ),
            }
        }
    }

    assemble(&header, &blocks, options)
}

/// Renders the contract `contract_id` of `project` and digests the text.
pub fn generate(
    project: &Project,
    contract_id: &ContractId,
    options: &GeneratorOptions,
) -> Result<GeneratedSource, CodegenError> {
    let contract = project
        .contract(contract_id)
        .ok_or_else(|| CodegenError::ContractNotFound(contract_id.clone()))?;
    let source = GeneratedSource::new(render_contract(contract, project, options));
    tracing::debug!(
        contract = %contract.name,
        components = contract.components.len(),
        bytes = source.text.len(),
        digest = %source.digest,
        "rendered contract"
    );
    Ok(source)
}

fn assemble(header: &str, blocks: &[String], options: &GeneratorOptions) -> String {
    let pad = " ".repeat(options.indent);
    let mut out = String::new();

    if let Some(license) = &options.license {
        out.push_str("// SPDX-License-Identifier: ");
        out.push_str(license);
        out.push('\n');
    }
    out.push_str(&options.pragma);
    out.push_str("\n\n");
    out.push_str(header);
    out.push('\n');

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&indent_lines(block, &pad));
    }

    out.push_str("}\n");
    out
}

/// Prefixes every non-blank line with `pad`. Blank lines become empty, each
/// line ends in a newline, and whitespace-only text yields nothing.
fn indent_lines(text: &str, pad: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for line in text.lines() {
        if !line.trim().is_empty() {
            out.push_str(pad);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// `header {` + indented body + `}`.
fn braced(header: &str, body: &str, options: &GeneratorOptions) -> String {
    format!(
        "{} {{\n{}}}",
        header,
        indent_lines(body, &" ".repeat(options.indent))
    )
}

fn join_modifiers(modifiers: &[ModifierRef]) -> String {
    modifiers
        .iter()
        .map(ModifierRef::invocation)
        .collect::<Vec<_>>()
        .join(" ")
}

fn returns_clause(returns: &[Parameter]) -> String {
    if returns.is_empty() {
        String::new()
    } else {
        format!(" returns ({})", join_parameters(returns))
    }
}

/// Renders one component, or `None` for variants without a source form.
pub fn render_component(component: &ComponentData, options: &GeneratorOptions) -> Option<String> {
    let name = &component.name;
    let text = match &component.kind {
        ComponentKind::Variable(v) => {
            let mut line = format!(
                "{} {} {} {}",
                v.visibility.keyword(),
                v.mutability.keyword(),
                v.data_type,
                name
            );
            if let Some(initial) = &v.initial_value {
                line.push_str(" = ");
                line.push_str(initial);
            }
            line.push(';');
            line
        }
        ComponentKind::Function(f) => {
            let mut header = format!(
                "function {}({}) {} {}",
                name,
                join_parameters(&f.parameters),
                f.visibility.keyword(),
                f.state_mutability.keyword()
            );
            if f.is_virtual {
                header.push_str(" virtual");
            }
            if !f.modifiers.is_empty() {
                header.push(' ');
                header.push_str(&join_modifiers(&f.modifiers));
            }
            header.push_str(&returns_clause(&f.return_parameters));
            braced(&header, &f.body, options)
        }
        ComponentKind::Constructor(c) => {
            let header = format!(
                "constructor({}) {}",
                join_parameters(&c.parameters),
                join_modifiers(&c.modifiers)
            );
            braced(&header, &c.body, options)
        }
        ComponentKind::Modifier(m) => {
            let header = format!("modifier {}({})", name, join_parameters(&m.parameters));
            braced(&header, &m.body, options)
        }
        ComponentKind::Event(e) => format!("event {}({});", name, join_parameters(&e.parameters)),
        ComponentKind::Error(e) => format!("error {}({});", name, join_parameters(&e.parameters)),
        ComponentKind::Struct(s) => {
            let members: Vec<String> = s
                .members
                .iter()
                .map(|m| format!("{} {};", m.data_type, m.name))
                .collect();
            braced(&format!("struct {}", name), &members.join("\n"), options)
        }
        ComponentKind::Enum(e) => format!("enum {} {{ {} }}", name, e.members.join(", ")),
        ComponentKind::Mapping(m) => format!(
            "mapping({} => {}) {} {};",
            m.key_type,
            m.value_type,
            m.visibility.keyword(),
            name
        ),
        ComponentKind::Array(a) => {
            let length = a.length.map(|n| n.to_string()).unwrap_or_default();
            format!(
                "{}[{}] {} {};",
                a.element_type,
                length,
                a.visibility.keyword(),
                name
            )
        }
        ComponentKind::Integration(_)
        | ComponentKind::Security(_)
        | ComponentKind::Oracle(_)
        | ComponentKind::ExternalCall(_)
        | ComponentKind::Unknown(_) => return None,
    };
    Some(text)
}

/// Synthesizes the overriding function for `target`.
fn render_override(
    target: &OverrideableFunction,
    implementation: &OverrideImplementation,
    options: &GeneratorOptions,
) -> String {
    let header = format!(
        "function {}({}) {} {} override{}",
        target.name,
        join_parameters(&target.parameters),
        target.visibility.keyword(),
        target.state_mutability.keyword(),
        returns_clause(&target.return_parameters)
    );

    let mut body = String::new();
    if implementation.super_call {
        body.push_str(&super_call_of(target));
        if !implementation.body.trim().is_empty() {
            body.push('\n');
        }
    }
    body.push_str(&implementation.body);
    braced(&header, &body, options)
}
