//! solblocks command line tools.
//!
//! Provides the `solblocks` binary for working with saved projects: render a
//! contract to source, run the security checks, inspect overrides and the
//! inheritance graph, create components, and replay recorded edit sessions.
//!
//! Every subcommand returns a process exit code:
//! 0 = success, 1 = generation or validation error,
//! 2 = unsupported variant or findings at/above `--fail-on`,
//! 3 = I/O or parse error.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::Level;

use solblocks_check::inheritance::{analyze_inheritance, linearize};
use solblocks_check::overrides::{
    count_conflicts, list_current_overrides, list_overridable, signature_of,
};
use solblocks_check::security::{highest_severity, SecurityChecker, Severity};
use solblocks_codegen::{generate, generate_source, CodegenError, GeneratorOptions};
use solblocks_core::contract::{Contract, ContractRegistry, Project};
use solblocks_core::error::CoreError;
use solblocks_core::factory::{attach_position, create_component, ComponentSeed};
use solblocks_core::id::ComponentId;
use solblocks_core::types::Position;
use solblocks_core::validate::validate_contract;
use solblocks_history::{HistoryError, Workspace, WorkspaceOp};

/// Visual smart contract builder tools.
#[derive(Parser)]
#[command(name = "solblocks", about = "Visual smart contract builder tools")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render a contract of a project to source text.
    Generate {
        /// Path to the project JSON file.
        #[arg(short, long)]
        project: PathBuf,

        /// Contract id or name (default: the project's current contract).
        #[arg(short, long)]
        contract: Option<String>,

        /// Generator options JSON file, applied before the flags below.
        #[arg(long)]
        config: Option<PathBuf>,

        /// SPDX license identifier to emit before the pragma.
        #[arg(long)]
        license: Option<String>,

        /// Pragma line.
        #[arg(long)]
        pragma: Option<String>,

        /// Indent width in spaces.
        #[arg(long)]
        indent: Option<usize>,

        /// Write the source to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the source and its digest as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the security and lint checks.
    Check {
        /// Path to the project JSON file.
        #[arg(short, long)]
        project: PathBuf,

        /// Contract id or name (default: every contract).
        #[arg(short, long)]
        contract: Option<String>,

        /// Exit with code 2 when a finding is at least this severe.
        #[arg(long, value_enum)]
        fail_on: Option<FailOn>,
    },

    /// List overridable parent functions and stored override conflicts.
    Overrides {
        /// Path to the project JSON file.
        #[arg(short, long)]
        project: PathBuf,

        /// Contract id or name (default: the project's current contract).
        #[arg(short, long)]
        contract: Option<String>,
    },

    /// Analyze the inheritance graph of a project.
    Inheritance {
        /// Path to the project JSON file.
        #[arg(short, long)]
        project: PathBuf,

        /// Exit with code 2 when any issue is found.
        #[arg(long)]
        strict: bool,
    },

    /// Create a default component and print it as JSON.
    NewComponent {
        /// Component type, e.g. `function` or `externalCall`.
        component_type: String,

        /// Component id (default: freshly generated).
        #[arg(long)]
        id: Option<String>,

        /// Display name (default: the type's default name).
        #[arg(long)]
        name: Option<String>,
    },

    /// Replay a recorded edit script and print the resulting source.
    Replay {
        /// Path to a JSON array of workspace operations.
        #[arg(short, long)]
        script: PathBuf,

        /// Contract name used for rendering.
        #[arg(short, long, default_value = "Contract")]
        name: String,
    },
}

/// Severity threshold for `check --fail-on`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FailOn {
    Low,
    Medium,
    High,
    Critical,
}

impl From<FailOn> for Severity {
    fn from(value: FailOn) -> Self {
        match value {
            FailOn::Low => Severity::Low,
            FailOn::Medium => Severity::Medium,
            FailOn::High => Severity::High,
            FailOn::Critical => Severity::Critical,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Generate {
            project,
            contract,
            config,
            license,
            pragma,
            indent,
            output,
            json,
        } => {
            let flags = OptionFlags {
                license,
                pragma,
                indent,
            };
            run_generate(
                &project,
                contract.as_deref(),
                config.as_deref(),
                flags,
                output.as_deref(),
                json,
            )
        }
        Commands::Check {
            project,
            contract,
            fail_on,
        } => run_check(&project, contract.as_deref(), fail_on.map(Severity::from)),
        Commands::Overrides { project, contract } => run_overrides(&project, contract.as_deref()),
        Commands::Inheritance { project, strict } => run_inheritance(&project, strict),
        Commands::NewComponent {
            component_type,
            id,
            name,
        } => run_new_component(&component_type, id, name),
        Commands::Replay { script, name } => run_replay(&script, &name),
    };
    process::exit(exit_code);
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Generator option flags given on the command line.
struct OptionFlags {
    license: Option<String>,
    pragma: Option<String>,
    indent: Option<usize>,
}

impl OptionFlags {
    fn apply(self, options: &mut GeneratorOptions) {
        if let Some(license) = self.license {
            options.license = Some(license);
        }
        if let Some(pragma) = self.pragma {
            options.pragma = pragma;
        }
        if let Some(indent) = self.indent {
            options.indent = indent;
        }
    }
}

/// Execute the generate subcommand.
fn run_generate(
    project_path: &Path,
    selector: Option<&str>,
    config: Option<&Path>,
    flags: OptionFlags,
    output: Option<&Path>,
    json: bool,
) -> i32 {
    let project = match load_project(project_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let mut options = match config {
        Some(path) => match GeneratorOptions::load(path) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("Error: failed to load config '{}': {}", path.display(), e);
                return 3;
            }
        },
        None => GeneratorOptions::default(),
    };
    flags.apply(&mut options);

    let Some(contract) = select_contract(&project, selector) else {
        eprintln!("Error: {}", describe_missing(selector));
        return 1;
    };

    let errors = validate_contract(contract);
    if !errors.is_empty() {
        eprintln!(
            "Validation failed for '{}' with {} error(s):",
            contract.name,
            errors.len()
        );
        for err in &errors {
            eprintln!("  - {}", err);
        }
        return 1;
    }

    let source = match generate(&project, &contract.id, &options) {
        Ok(s) => s,
        Err(CodegenError::Io(e)) => {
            eprintln!("I/O error: {}", e);
            return 3;
        }
        Err(e) => {
            eprintln!("Generation error: {}", e);
            return 1;
        }
    };
    tracing::info!(contract = %contract.name, digest = %source.digest, "generated source");

    if json {
        return print_json(&source);
    }
    match output {
        Some(path) => match std::fs::write(path, &source.text) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                3
            }
        },
        None => {
            print!("{}", source.text);
            0
        }
    }
}

/// Execute the check subcommand.
fn run_check(project_path: &Path, selector: Option<&str>, fail_on: Option<Severity>) -> i32 {
    let project = match load_project(project_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let contracts: Vec<&Contract> = match selector {
        Some(_) => match select_contract(&project, selector) {
            Some(c) => vec![c],
            None => {
                eprintln!("Error: {}", describe_missing(selector));
                return 1;
            }
        },
        None => project.contracts().iter().collect(),
    };

    let checker = SecurityChecker::default();
    let mut report = serde_json::Map::new();
    let mut worst = None;
    for contract in contracts {
        let issues = checker.check_contract(contract, &project);
        worst = worst.max(highest_severity(&issues));
        report.insert(contract.name.clone(), json!(issues));
    }

    let code = print_json(&report);
    if code != 0 {
        return code;
    }
    match (fail_on, worst) {
        (Some(threshold), Some(found)) if found >= threshold => {
            eprintln!("Found issues at or above {:?}", threshold);
            2
        }
        _ => 0,
    }
}

/// Execute the overrides subcommand.
fn run_overrides(project_path: &Path, selector: Option<&str>) -> i32 {
    let project = match load_project(project_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let Some(contract) = select_contract(&project, selector) else {
        eprintln!("Error: {}", describe_missing(selector));
        return 1;
    };

    let overridable: Vec<_> = list_overridable(contract, &project)
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "name": f.name,
                "sourceContract": f.source_contract,
                "signature": signature_of(f),
            })
        })
        .collect();

    let components: Vec<_> = contract
        .functions()
        .map(|(data, _)| {
            json!({
                "id": data.id,
                "name": data.name,
                "overrides": list_current_overrides(data),
                "conflicts": count_conflicts(data, contract, &project),
            })
        })
        .collect();

    print_json(&json!({
        "contract": contract.name,
        "overridable": overridable,
        "functions": components,
    }))
}

/// Execute the inheritance subcommand.
fn run_inheritance(project_path: &Path, strict: bool) -> i32 {
    let project = match load_project(project_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let issues = analyze_inheritance(&project);
    let mut order = serde_json::Map::new();
    for contract in project.contracts() {
        order.insert(
            contract.name.clone(),
            json!(linearize(&contract.id, &project)),
        );
    }

    let code = print_json(&json!({
        "issues": issues,
        "linearization": order,
    }));
    if code != 0 {
        return code;
    }
    if strict && !issues.is_empty() {
        eprintln!("Found {} inheritance issue(s)", issues.len());
        return 2;
    }
    0
}

/// Execute the new-component subcommand.
fn run_new_component(component_type: &str, id: Option<String>, name: Option<String>) -> i32 {
    let id = id
        .map(|s| ComponentId::from(s.as_str()))
        .unwrap_or_else(ComponentId::generate);
    let seed = ComponentSeed {
        name,
        ..Default::default()
    };

    match create_component(id, component_type, Some(&seed)) {
        Ok(data) => print_json(&attach_position(&data, Position::default())),
        Err(e @ CoreError::UnsupportedVariant { .. }) => {
            eprintln!("Error: {}", e);
            2
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Execute the replay subcommand.
fn run_replay(script_path: &Path, name: &str) -> i32 {
    let ops: Vec<WorkspaceOp> = match read_json(script_path) {
        Ok(ops) => ops,
        Err(code) => return code,
    };

    let mut workspace = Workspace::default();
    for (index, op) in ops.iter().enumerate() {
        if let Err(e) = workspace.apply(op) {
            eprintln!("Error: operation {} failed: {}", index, e);
            return match e {
                HistoryError::Core(CoreError::UnsupportedVariant { .. }) => 2,
                HistoryError::Core(_) => 1,
            };
        }
    }

    let history = workspace.history();
    tracing::info!(
        operations = ops.len(),
        past = history.past_len(),
        future = history.future_len(),
        "replayed edit script"
    );
    print!("{}", generate_source(name, &workspace.components()));
    0
}

/// Resolves a contract by id, then by name; `None` selects the current
/// contract.
fn select_contract<'a>(project: &'a Project, selector: Option<&str>) -> Option<&'a Contract> {
    match selector {
        Some(s) => project
            .contract(&s.into())
            .or_else(|| project.contract_by_name(s)),
        None => project.current_contract(),
    }
}

fn describe_missing(selector: Option<&str>) -> String {
    match selector {
        Some(s) => format!("contract '{}' not found", s),
        None => "project has no contracts".to_string(),
    }
}

fn load_project(path: &Path) -> Result<Project, i32> {
    read_json(path)
}

/// Reads and parses a JSON file. Errors are reported and mapped to exit
/// code 3.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, i32> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", path.display(), e);
        3
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: failed to parse '{}': {}", path.display(), e);
        3
    })
}

/// Prints `value` as pretty JSON to stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            1
        }
    }
}
