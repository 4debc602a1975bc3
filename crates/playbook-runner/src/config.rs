use playbook_core::{FieldPath, StructuredIssue};
use playbook_engine::{
    load_mock_store_from_path, ActionRouter, ExecutionOptions, IterationFailurePolicy,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const RUNNER_CONFIG_SCHEMA: &str = "playbook-runner/0.0.1";

/// Upper bound for every engine timeout: one week.
pub const MAX_ENGINE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Backend name used for the catch-all `--mock-scenarios` registration.
pub const CLI_MOCK_BACKEND: &str = "cli-mock";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    #[serde(default)]
    pub engine: RunnerEngineConfig,
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            schema: default_runner_schema(),
            engine: RunnerEngineConfig::default(),
            backends: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerEngineConfig {
    #[serde(default = "default_action_timeout")]
    pub action_input_timeout_secs: u64,
    #[serde(default = "default_condition_timeout")]
    pub condition_input_timeout_secs: u64,
    #[serde(default = "default_loop_timeout")]
    pub loop_input_timeout_secs: u64,
    #[serde(default)]
    pub iteration_failure: IterationFailurePolicy,
}

impl Default for RunnerEngineConfig {
    fn default() -> Self {
        Self {
            action_input_timeout_secs: default_action_timeout(),
            condition_input_timeout_secs: default_condition_timeout(),
            loop_input_timeout_secs: default_loop_timeout(),
            iteration_failure: IterationFailurePolicy::default(),
        }
    }
}

impl RunnerEngineConfig {
    pub fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions {
            action_input_timeout: Duration::from_secs(self.action_input_timeout_secs),
            condition_input_timeout: Duration::from_secs(self.condition_input_timeout_secs),
            loop_input_timeout: Duration::from_secs(self.loop_input_timeout_secs),
            iteration_failure: self.iteration_failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub urn_prefix: String,
    pub scenarios: PathBuf,
    #[serde(default)]
    pub simulate_latency: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {0:?}")]
    Validation(Vec<StructuredIssue>),
}

/// Loads, expands and validates a runner config. Relative scenario paths are resolved
/// against the config file's directory.
pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let expanded = expand_env_placeholders(raw.as_str()).map_err(RunnerConfigError::Parse)?;
    let mut config: RunnerConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(expanded.as_str()).map_err(|error| {
            RunnerConfigError::Parse(format!("json decode error: {error}"))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str()).map_err(|error| {
            RunnerConfigError::Parse(format!("yaml decode error: {error}"))
        })?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };

    let mut issues = validate_runner_config(&config);
    StructuredIssue::sort_stable(&mut issues);
    if !issues.is_empty() {
        return Err(RunnerConfigError::Validation(issues));
    }

    if let Some(base) = path.parent() {
        for backend in config.backends.values_mut() {
            if backend.scenarios.is_relative() {
                backend.scenarios = base.join(&backend.scenarios);
            }
        }
    }
    Ok(config)
}

pub fn validate_runner_config(config: &RunnerConfig) -> Vec<StructuredIssue> {
    let mut issues = Vec::<StructuredIssue>::new();
    if config.schema != RUNNER_CONFIG_SCHEMA {
        issues.push(config_issue(
            "runner.config.schema",
            FieldPath::root().key("schema"),
            format!(
                "unsupported runner config schema `{}` (expected `{RUNNER_CONFIG_SCHEMA}`)",
                config.schema
            ),
        ));
    }

    let engine_path = FieldPath::root().key("engine");
    for (field, value) in [
        ("action_input_timeout_secs", config.engine.action_input_timeout_secs),
        ("condition_input_timeout_secs", config.engine.condition_input_timeout_secs),
        ("loop_input_timeout_secs", config.engine.loop_input_timeout_secs),
    ] {
        if value == 0 || value > MAX_ENGINE_TIMEOUT_SECS {
            issues.push(config_issue(
                "runner.config.timeout",
                engine_path.key(field),
                format!("engine.{field} must be between 1 and {MAX_ENGINE_TIMEOUT_SECS}"),
            ));
        }
    }

    let mut prefixes = BTreeMap::<&str, &str>::new();
    for (name, backend) in &config.backends {
        let path = FieldPath::root().key("backends").key(name.clone());
        if backend.scenarios.as_os_str().is_empty() {
            issues.push(config_issue(
                "runner.config.backend.scenarios",
                path.key("scenarios"),
                format!("backend `{name}` must point at a scenarios file"),
            ));
        }
        if let Some(previous) = prefixes.insert(backend.urn_prefix.as_str(), name.as_str()) {
            issues.push(config_issue(
                "runner.config.backend.prefix_unique",
                path.key("urn_prefix"),
                format!(
                    "backend `{name}` reuses urn_prefix `{}` of backend `{previous}`",
                    backend.urn_prefix
                ),
            ));
        }
    }

    issues
}

/// Registers one mock store per configured backend, then `catch_all` under the empty prefix.
pub fn build_action_router(
    config: &RunnerConfig,
    catch_all: Option<&Path>,
) -> Result<ActionRouter, Vec<StructuredIssue>> {
    let mut issues = Vec::<StructuredIssue>::new();
    let mut router = ActionRouter::new();

    for (name, backend) in &config.backends {
        match load_mock_store_from_path(&backend.scenarios) {
            Ok(store) => router.register(
                name.clone(),
                backend.urn_prefix.clone(),
                Box::new(store.with_simulated_latency(backend.simulate_latency)),
            ),
            Err(error) => issues.push(config_issue(
                "runner.config.backend.load",
                FieldPath::root()
                    .key("backends")
                    .key(name.clone())
                    .key("scenarios"),
                format!(
                    "load scenarios `{}` failed: {error}",
                    backend.scenarios.display()
                ),
            )),
        }
    }

    if let Some(path) = catch_all {
        match load_mock_store_from_path(path) {
            Ok(store) => router.register(CLI_MOCK_BACKEND, "", Box::new(store)),
            Err(error) => issues.push(config_issue(
                "runner.mock_scenarios.load",
                FieldPath::root(),
                format!("load scenarios `{}` failed: {error}", path.display()),
            )),
        }
    }

    if issues.is_empty() {
        Ok(router)
    } else {
        StructuredIssue::sort_stable(&mut issues);
        Err(issues)
    }
}

fn config_issue(reference: &str, path: FieldPath, message: String) -> StructuredIssue {
    StructuredIssue::error("runner_config_error", path, message, reference)
}

fn default_runner_schema() -> String {
    RUNNER_CONFIG_SCHEMA.to_string()
}

fn default_action_timeout() -> u64 {
    1000
}

fn default_condition_timeout() -> u64 {
    100
}

fn default_loop_timeout() -> u64 {
    120
}

/// Replaces `${NAME}` with the environment value of `NAME`, or `${NAME:-fallback}` with
/// `fallback` when `NAME` is unset.
fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body_start = start + 2;
        let Some(length) = rest[body_start..].find('}') else {
            return Err("unterminated env placeholder `${...`".to_string());
        };
        let body = &rest[body_start..body_start + length];
        let (key, fallback) = match body.split_once(":-") {
            Some((key, fallback)) => (key, Some(fallback)),
            None => (body, None),
        };
        if key.is_empty() {
            return Err(format!("empty env placeholder `${{{body}}}`"));
        }
        let value = match (std::env::var(key), fallback) {
            (Ok(value), _) => value,
            (Err(_), Some(fallback)) => fallback.to_string(),
            (Err(_), None) => {
                return Err(format!("missing env var for placeholder `${{{key}}}`"));
            }
        };
        out.push_str(value.as_str());
        rest = &rest[body_start + length + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
