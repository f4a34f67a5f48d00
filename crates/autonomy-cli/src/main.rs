// crates/autonomy-cli/src/main.rs
// ============================================================================
// Module: Autonomy CLI Entry Point
// Description: Command dispatcher for offline projection and coverage tooling.
// Purpose: Provide operator-facing commands that consume the core types directly.
// Dependencies: autonomy-core, autonomy-orchestrator, clap, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Unlike the pipeline, which runs embedded inside a host process, this CLI
//! is for offline inspection: rebuilding projections from an exported event
//! log, and checking that every tool with side effects has post-condition
//! coverage before it ships. Neither command talks to a running pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use autonomy_orchestrator::RequestProjection;
use autonomy_orchestrator::rebuild_projections;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "autonomy-cli", arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuilds per-request projections from an exported event log.
    RebuildEventProjections(RebuildEventProjectionsCommand),
    /// Checks post-condition coverage for every tool contract.
    PostconditionCoverage(PostconditionCoverageCommand),
}

/// Arguments for `rebuild-event-projections`.
#[derive(Args, Debug)]
struct RebuildEventProjectionsCommand {
    /// Path to a JSON file containing an array of execution events.
    #[arg(long, value_name = "PATH")]
    events_file: PathBuf,
    /// Directory to write `projections.json` and `projections.md` into.
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
}

/// Arguments for `postcondition-coverage`.
#[derive(Args, Debug)]
struct PostconditionCoverageCommand {
    /// Path to a JSON coverage manifest describing tool contracts and the
    /// tools with registered post-condition checks.
    #[arg(long, value_name = "PATH")]
    manifest: PathBuf,
    /// Exit with a non-zero status when a tool with side effects has no
    /// registered post-condition coverage.
    #[arg(long)]
    fail_on_missing: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs a `tracing` subscriber writing to stderr, honoring `RUST_LOG`
/// and defaulting to `info` when it is unset.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    info!(command = ?cli.command, "dispatching command");
    match cli.command {
        Commands::RebuildEventProjections(command) => command_rebuild_event_projections(&command),
        Commands::PostconditionCoverage(command) => command_postcondition_coverage(&command),
    }
}

// ============================================================================
// SECTION: rebuild-event-projections
// ============================================================================

/// Executes the `rebuild-event-projections` command.
fn command_rebuild_event_projections(command: &RebuildEventProjectionsCommand) -> CliResult<ExitCode> {
    let events = read_json::<Vec<autonomy_core::ExecutionEvent>>(&command.events_file)?;
    let projections = rebuild_projections(&events);

    fs::create_dir_all(&command.output_dir)
        .map_err(|err| CliError::new(format!("failed to create output dir {}: {err}", command.output_dir.display())))?;

    let json_path = command.output_dir.join("projections.json");
    let json_body = serde_json::to_string_pretty(&projections)
        .map_err(|err| CliError::new(format!("failed to serialize projections: {err}")))?;
    fs::write(&json_path, json_body).map_err(|err| CliError::new(format!("failed to write {}: {err}", json_path.display())))?;

    let markdown_path = command.output_dir.join("projections.md");
    let markdown_body = render_projections_markdown(&projections);
    fs::write(&markdown_path, markdown_body).map_err(|err| CliError::new(format!("failed to write {}: {err}", markdown_path.display())))?;

    write_stdout_line(&format!(
        "rebuilt {} projection(s): {}, {}",
        projections.len(),
        json_path.display(),
        markdown_path.display()
    ))
    .map_err(|err| CliError::new(output_error(&err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a Markdown table summarizing `projections`.
fn render_projections_markdown(projections: &BTreeMap<String, RequestProjection>) -> String {
    let mut out = String::from("# Request Projections\n\n| Request | Correlation | Events | Last Event | Terminal |\n|---|---|---|---|---|\n");
    for projection in projections.values() {
        out.push_str(&format!(
            "| {} | {} | {} | {:?} | {} |\n",
            projection.request_id.as_str(),
            projection.correlation_id.as_str(),
            projection.event_count,
            projection.last_event_type,
            projection.is_terminal()
        ));
    }
    out
}

// ============================================================================
// SECTION: postcondition-coverage
// ============================================================================

/// Describes the tool contracts and registered checks a deployment ships,
/// so coverage can be checked offline without constructing a live
/// `CheckRegistry`.
#[derive(Debug, Deserialize)]
struct CoverageManifest {
    /// Every tool contract in the deployment's registry.
    tools: Vec<ToolCoverageEntry>,
    /// Names of tools with at least one registered post-condition check.
    #[serde(default)]
    covered_tool_names: Vec<String>,
    /// Whether a global check (applied to every tool) is registered.
    #[serde(default)]
    has_global_check: bool,
}

/// One tool contract entry in a [`CoverageManifest`].
#[derive(Debug, Deserialize)]
struct ToolCoverageEntry {
    /// Tool name as registered in the tool registry.
    name: String,
    /// Whether the tool has side effects requiring post-condition coverage.
    #[serde(default)]
    has_side_effects: bool,
}

impl CoverageManifest {
    /// Returns the names of tools with side effects but no post-condition
    /// coverage, in manifest order.
    fn uncovered_tools(&self) -> Vec<&str> {
        if self.has_global_check {
            return Vec::new();
        }
        self.tools
            .iter()
            .filter(|entry| entry.has_side_effects)
            .filter(|entry| !self.covered_tool_names.iter().any(|covered| covered == &entry.name))
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

/// Executes the `postcondition-coverage` command.
fn command_postcondition_coverage(command: &PostconditionCoverageCommand) -> CliResult<ExitCode> {
    let manifest = read_json::<CoverageManifest>(&command.manifest)?;
    let uncovered = manifest.uncovered_tools();

    if uncovered.is_empty() {
        write_stdout_line(&format!("postcondition coverage: {} tool(s) covered", manifest.tools.len()))
            .map_err(|err| CliError::new(output_error(&err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    for name in &uncovered {
        write_stderr_line(&format!("missing post-condition coverage: {name}")).map_err(|err| CliError::new(output_error(&err)))?;
    }

    if command.fail_on_missing {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let bytes = fs::read(path).map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))?;
    serde_json::from_slice(&bytes).map_err(|err| CliError::new(format!("failed to parse {}: {err}", path.display())))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output-write failure message.
fn output_error(error: &std::io::Error) -> String {
    format!("failed to write output: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn uncovered_tools_finds_side_effecting_tools_without_coverage() {
        let manifest = CoverageManifest {
            tools: vec![
                ToolCoverageEntry {
                    name: "read_file".to_string(),
                    has_side_effects: false,
                },
                ToolCoverageEntry {
                    name: "write_file".to_string(),
                    has_side_effects: true,
                },
            ],
            covered_tool_names: Vec::new(),
            has_global_check: false,
        };
        assert_eq!(manifest.uncovered_tools(), vec!["write_file"]);
    }

    #[test]
    fn covered_tool_names_satisfy_coverage() {
        let manifest = CoverageManifest {
            tools: vec![ToolCoverageEntry {
                name: "write_file".to_string(),
                has_side_effects: true,
            }],
            covered_tool_names: vec!["write_file".to_string()],
            has_global_check: false,
        };
        assert!(manifest.uncovered_tools().is_empty());
    }

    #[test]
    fn global_check_satisfies_every_tool() {
        let manifest = CoverageManifest {
            tools: vec![ToolCoverageEntry {
                name: "write_file".to_string(),
                has_side_effects: true,
            }],
            covered_tool_names: Vec::new(),
            has_global_check: true,
        };
        assert!(manifest.uncovered_tools().is_empty());
    }

    #[test]
    fn rebuild_projections_writes_json_and_markdown_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let events_path = dir.path().join("events.json");
        fs::write(&events_path, "[]").expect("write events");

        let command = RebuildEventProjectionsCommand {
            events_file: events_path,
            output_dir: dir.path().to_path_buf(),
        };
        command_rebuild_event_projections(&command).expect("command succeeds");
        assert!(dir.path().join("projections.json").exists());
        assert!(dir.path().join("projections.md").exists());
    }
}
