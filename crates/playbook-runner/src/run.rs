use crate::cli::{OutputFormat, ReportFormat, RunCommand, ValidateCommand};
use crate::config::{build_action_router, load_runner_config, RunnerConfig, RunnerConfigError};
use crate::io::{read_alert_data, read_playbook_document, write_result_file};
use playbook_core::{StructuredIssue, Value};
use playbook_engine::{annotate_nodes, Execution, ExecutionStatus, NodeStatusReport};
use playbook_sdk::{assign_missing_ids, build_playbook, validate_playbook, IdGenerator, NodeSpec};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("read file failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write file failed `{path}`: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("alert data parse failed: {0}")]
    AlertDataParse(String),
    #[error("playbook parse failed:\n{}", render_issues(.0))]
    PlaybookParse(Vec<StructuredIssue>),
    #[error("playbook is invalid:\n{}", render_issues(.0))]
    PlaybookInvalid(Vec<StructuredIssue>),
    #[error("runner config load failed: {0}")]
    ConfigLoad(#[from] RunnerConfigError),
    #[error("action backend setup failed:\n{}", render_issues(.0))]
    BackendSetup(Vec<StructuredIssue>),
    #[error("no action backend configured: pass `--mock-scenarios <file>` or `--config <file>`")]
    NoBackends,
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
    #[error("yaml encode failed: {0}")]
    YamlEncode(#[from] serde_yaml::Error),
}

/// Rendered command output plus whether the command achieved what it was asked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub rendered: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_action_executions: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub exported: BTreeMap<String, Value>,
    pub nodes: Vec<NodeStatusReport>,
}

pub fn execute_run(command: &RunCommand) -> Result<CommandOutput, RunnerError> {
    let config = match &command.config {
        Some(path) => load_runner_config(path)?,
        None => RunnerConfig::default(),
    };
    if config.backends.is_empty() && command.mock_scenarios.is_none() {
        return Err(RunnerError::NoBackends);
    }
    let router = build_action_router(&config, command.mock_scenarios.as_deref())
        .map_err(RunnerError::BackendSetup)?;

    let mut document = read_playbook_document(&command.playbook)?;
    let mut ids = IdGenerator::new();
    assign_missing_ids(&mut document, &mut ids);
    let playbook = build_playbook(&document, &mut ids).map_err(RunnerError::PlaybookInvalid)?;
    let seed = read_alert_data(&command.alert_data)?;

    info!(
        playbook = %command.playbook.display(),
        alert_data = %command.alert_data.display(),
        backends = router.registrations().len(),
        "running playbook"
    );
    let execution = Execution::new(
        Arc::new(playbook),
        Arc::new(router),
        seed,
        config.engine.execution_options(),
    );
    let outcome = execution.start();
    if let Some(error) = &outcome.error {
        warn!(%error, "playbook halted");
    }

    let root = execution.root_scope();
    let report = RunReport {
        status: outcome.status,
        error: outcome.error.as_ref().map(ToString::to_string),
        total_action_executions: execution.total_action_executions(),
        exported: root.exported(),
        nodes: annotate_nodes(&document.nodes, root),
    };
    let rendered = match command.format {
        ReportFormat::Yaml => serde_yaml::to_string(&report)?,
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
    };
    if let Some(path) = &command.result_file {
        write_result_file(path, rendered.as_str())?;
    }

    Ok(CommandOutput {
        rendered,
        success: outcome.status == ExecutionStatus::Completed,
    })
}

pub fn execute_validate(command: &ValidateCommand) -> Result<CommandOutput, RunnerError> {
    let document = read_playbook_document(&command.playbook)?;
    let issues = validate_playbook(&document);
    let valid = !StructuredIssue::has_errors(&issues);
    let node_count = count_nodes(&document.nodes);

    let rendered = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "valid": valid,
            "nodes": node_count,
            "issues": issues,
        }))?,
        OutputFormat::Text => {
            let mut lines = vec![format!(
                "playbook {}: {node_count} nodes, {} issues",
                if valid { "valid" } else { "invalid" },
                issues.len()
            )];
            lines.extend(issues.iter().map(ToString::to_string));
            lines.join("\n")
        }
    };

    Ok(CommandOutput {
        rendered,
        success: valid,
    })
}

fn count_nodes(nodes: &[NodeSpec]) -> usize {
    nodes
        .iter()
        .map(|node| {
            1 + count_nodes(&node.on_true) + count_nodes(&node.on_false) + count_nodes(&node.body)
        })
        .sum()
}

fn render_issues(issues: &[StructuredIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
