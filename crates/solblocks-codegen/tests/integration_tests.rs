//! End-to-end tests for contract rendering.
//!
//! Each test assembles components through the factory, renders them through
//! the public entry points and checks the exact output text.
//!
//! Tests cover:
//! - The documented file layout (pragma, blank line, contract block)
//! - Determinism and order preservation
//! - Project-aware rendering: inheritance header and override synthesis
//! - Digest stability
//! - Property: rendering is a pure function of its inputs

use proptest::prelude::*;

use solblocks_codegen::{
    generate, generate_source, render_components, render_contract, CodegenError, GeneratorOptions,
};
use solblocks_core::component::{
    ComponentData, ComponentKind, ComponentType, DraggableComponent, OverrideImplementation,
};
use solblocks_core::contract::{Contract, Project};
use solblocks_core::factory::{attach_position, create_typed};
use solblocks_core::types::{Parameter, Position};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn component(t: ComponentType, id: &str, name: &str) -> ComponentData {
    let mut data = create_typed(id.into(), t, None);
    data.name = name.to_string();
    data
}

fn placed(data: &ComponentData) -> DraggableComponent {
    attach_position(data, Position::new(10.0, 20.0))
}

fn virtual_transfer(id: &str) -> ComponentData {
    let mut f = component(ComponentType::Function, id, "transfer");
    if let ComponentKind::Function(func) = &mut f.kind {
        func.is_virtual = true;
        func.parameters = vec![
            Parameter::new("to", "address"),
            Parameter::new("amount", "uint256"),
        ];
        func.return_parameters = vec![Parameter::new("", "bool")];
        func.body = "return true;".into();
    }
    f
}

/// Base declares a virtual `transfer`; Token inherits Base and stores an
/// override of it on its own `hook` function.
fn token_project(override_body: &str, super_call: bool) -> Project {
    let mut project = Project::new("p".into(), "Demo");

    let mut base = Contract::new("base".into(), "Base");
    base.components.push(placed(&virtual_transfer("base-transfer")));
    project.add_contract(base).unwrap();

    let mut hook = component(ComponentType::Function, "hook", "hook");
    if let ComponentKind::Function(func) = &mut hook.kind {
        func.overrides = vec![OverrideImplementation {
            function_id: "base-transfer".into(),
            body: override_body.to_string(),
            super_call,
            is_modified: true,
        }];
    }

    let mut token = Contract::new("token".into(), "Token");
    token.inherit("base".into());
    token.components.push(placed(&hook));
    project.add_contract(token).unwrap();
    project
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn single_public_variable() {
    let x = component(ComponentType::Variable, "x", "x");
    let text = generate_source("C", &[placed(&x)]);
    assert_eq!(
        text,
        "pragma solidity ^0.8.0;\n\ncontract C {\n    public  uint256 x;\n}\n"
    );
    assert!(text.contains("public  uint256 x;"));
}

#[test]
fn blocks_are_blank_line_separated() {
    let components = vec![
        placed(&component(ComponentType::Variable, "v", "total")),
        placed(&component(ComponentType::Event, "e", "Updated")),
        placed(&component(ComponentType::Function, "f", "update")),
    ];
    let expected = "\
pragma solidity ^0.8.0;

contract Counter {
    public  uint256 total;

    event Updated();

    function update() public nonpayable {
    }
}
";
    assert_eq!(generate_source("Counter", &components), expected);
}

#[test]
fn metadata_components_leave_no_gap() {
    let components = vec![
        placed(&component(ComponentType::Variable, "v", "a")),
        placed(&component(ComponentType::Oracle, "o", "feed")),
        placed(&component(ComponentType::Variable, "w", "b")),
    ];
    let text = generate_source("C", &components);
    assert!(text.contains("    public  uint256 a;\n\n    public  uint256 b;\n"));
    assert!(!text.contains("feed"));
}

#[test]
fn unknown_component_kinds_render_empty() {
    let mut project = Project::new("p".into(), "Demo");
    let mut contract = Contract::new("c".into(), "C");
    contract
        .components
        .push(placed(&component(ComponentType::Variable, "v", "a")));
    project.add_contract(contract).unwrap();

    let mut value = serde_json::to_value(&project).unwrap();
    let components = value["contracts"][0]["components"].as_array_mut().unwrap();
    components.push(serde_json::json!({
        "data": {
            "id": "n",
            "name": "drop",
            "category": "advanced",
            "type": "nftCollection",
            "maxSupply": 100
        },
        "position": { "x": 0.0, "y": 0.0 }
    }));
    let project: Project = serde_json::from_value(value).unwrap();

    let generated = generate(&project, &"c".into(), &GeneratorOptions::default()).unwrap();
    assert_eq!(
        generated.text,
        "pragma solidity ^0.8.0;\n\ncontract C {\n    public  uint256 a;\n}\n"
    );
}

#[test]
fn nested_body_indentation() {
    let mut f = component(ComponentType::Function, "f", "run");
    if let ComponentKind::Function(func) = &mut f.kind {
        func.body = "if (ready) {\n    go();\n}\n\ndone = true;".into();
    }
    let text = generate_source("C", &[placed(&f)]);
    let expected_block = "    function run() public nonpayable {\n        if (ready) {\n            go();\n        }\n\n        done = true;\n    }\n";
    assert!(text.contains(expected_block), "{text}");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn order_is_preserved() {
    let a = placed(&component(ComponentType::Variable, "a", "first"));
    let b = placed(&component(ComponentType::Variable, "b", "second"));

    let forward = generate_source("C", &[a.clone(), b.clone()]);
    let backward = generate_source("C", &[b, a]);
    assert_ne!(forward, backward);
    assert!(forward.find("first").unwrap() < forward.find("second").unwrap());
    assert!(backward.find("second").unwrap() < backward.find("first").unwrap());
}

#[test]
fn positions_do_not_affect_output() {
    let v = component(ComponentType::Variable, "v", "x");
    let here = attach_position(&v, Position::new(0.0, 0.0));
    let there = attach_position(&v, Position::new(500.0, -3.5));
    assert_eq!(generate_source("C", &[here]), generate_source("C", &[there]));
}

// ---------------------------------------------------------------------------
// Project-aware rendering
// ---------------------------------------------------------------------------

#[test]
fn override_with_super_call() {
    let project = token_project("emit Sent(to, amount);", true);
    let token = project.contract(&"token".into()).unwrap();
    let text = render_contract(token, &project, &GeneratorOptions::default());

    assert!(text.contains("contract Token is Base {\n"));
    let expected = "\
    function transfer(address to, uint256 amount) public nonpayable override returns (bool) {
        super.transfer(to, amount);
        emit Sent(to, amount);
    }
";
    assert!(text.contains(expected), "{text}");
    // The hook itself is rendered before its override.
    assert!(text.find("function hook()").unwrap() < text.find("override").unwrap());
}

#[test]
fn override_without_super_call() {
    let project = token_project("return false;", false);
    let token = project.contract(&"token".into()).unwrap();
    let text = render_contract(token, &project, &GeneratorOptions::default());
    assert!(!text.contains("super."));
    assert!(text.contains("override returns (bool) {\n        return false;\n    }\n"));
}

#[test]
fn fresh_override_renders_only_super_call() {
    let project = token_project("", true);
    let token = project.contract(&"token".into()).unwrap();
    let text = render_contract(token, &project, &GeneratorOptions::default());
    assert!(text.contains("override returns (bool) {\n        super.transfer(to, amount);\n    }\n"));
}

#[test]
fn orphaned_override_and_missing_parent_are_skipped() {
    let mut project = token_project("", true);
    project.remove_contract(&"base".into()).unwrap();
    let token = project.contract(&"token".into()).unwrap();
    let text = render_contract(token, &project, &GeneratorOptions::default());

    assert!(text.contains("contract Token {\n"));
    assert!(!text.contains("override"));
    assert!(text.contains("function hook() public nonpayable {\n    }\n"));
}

#[test]
fn generate_digests_and_reports_missing_contracts() {
    let project = token_project("", true);
    let options = GeneratorOptions::default();

    let first = generate(&project, &"token".into(), &options).unwrap();
    let second = generate(&project, &"token".into(), &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.digest, blake3::hash(first.text.as_bytes()).to_hex().to_string());

    let err = generate(&project, &"nope".into(), &options).unwrap_err();
    assert!(matches!(err, CodegenError::ContractNotFound(id) if id.as_str() == "nope"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_component() -> impl Strategy<Value = DraggableComponent> {
    (
        prop::sample::select(ComponentType::ALL.to_vec()),
        "[a-z][a-zA-Z0-9]{0,8}",
        "[a-z =;\n]{0,24}",
    )
        .prop_map(|(t, name, body)| {
            let mut data = create_typed(name.as_str().into(), t, None);
            data.name = name;
            match &mut data.kind {
                ComponentKind::Function(f) => f.body = body,
                ComponentKind::Modifier(m) => m.body = body,
                ComponentKind::Constructor(c) => c.body = body,
                _ => {}
            }
            attach_position(&data, Position::default())
        })
}

proptest! {
    #[test]
    fn rendering_is_deterministic(components in prop::collection::vec(arb_component(), 0..8)) {
        let options = GeneratorOptions::default();
        let a = render_components("Prop", &components, &options);
        let b = render_components("Prop", &components.clone(), &options);
        prop_assert_eq!(&a, &b);
        prop_assert!(
            a.starts_with("pragma solidity ^0.8.0;\n\ncontract Prop {\n"),
            "missing header"
        );
        prop_assert!(a.ends_with("}\n"), "missing footer");
        for line in a.lines() {
            prop_assert_eq!(line.trim_end().len() == 0, line.is_empty());
        }
    }
}
