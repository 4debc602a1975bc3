mod options;

pub use options::{ExecutionOptions, IterationFailurePolicy};

use crate::backend::{ActionBackend, ActionResult};
use crate::scope::signal::ChangeSignal;
use crate::scope::{LookupError, Scope, ScopeStack};
use playbook_cond::{Condition, ParseError};
use playbook_core::{needs_resolution, Value};
use playbook_sdk::{ActionNode, ForNode, IfNode, NodeKind, NodeRef, Playbook};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Error text stored on a node record whose input never resolved.
pub const DEPENDENCY_TIMEOUT_MESSAGE: &str = "timed out waiting for dependency";

/// Export expression that selects the raw action payload.
const RESULT_EXPORT: &str = "result";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("node `{node_id}` timed out waiting for `{reference}`")]
    DependencyTimeout { node_id: String, reference: String },
    #[error("action node `{node_id}` failed: {reason}")]
    ActionBackend { node_id: String, reason: String },
    #[error("condition `{expression}` on node `{node_id}` cannot be evaluated: {reason}")]
    ConditionUnevaluable {
        node_id: String,
        expression: String,
        reason: String,
    },
    #[error("condition on node `{node_id}` does not parse: {source}")]
    ConditionParse { node_id: String, source: ParseError },
    #[error("iteration {iteration} of loop `{node_id}` failed: {reason}")]
    IterationFailed {
        node_id: String,
        iteration: i64,
        reason: String,
    },
    #[error("execution cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Halted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub error: Option<ExecError>,
}

/// Requests cooperative cancellation of a running execution.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<ChangeSignal>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

/// One run of a playbook against seed data and an action backend.
pub struct Execution {
    playbook: Arc<Playbook>,
    backend: Arc<dyn ActionBackend>,
    root: Scope,
    options: ExecutionOptions,
    action_executions: AtomicU64,
}

impl Execution {
    pub fn new(
        playbook: Arc<Playbook>,
        backend: Arc<dyn ActionBackend>,
        seed: BTreeMap<String, Value>,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            playbook,
            backend,
            root: Scope::new(seed),
            options,
            action_executions: AtomicU64::new(0),
        }
    }

    pub fn root_scope(&self) -> &Scope {
        &self.root
    }

    pub fn playbook(&self) -> &Playbook {
        &self.playbook
    }

    pub fn total_action_executions(&self) -> u64 {
        self.action_executions.load(Ordering::SeqCst)
    }

    /// Exports values into the root scope, waking any node blocked on them.
    pub fn publish(&self, values: BTreeMap<String, Value>) {
        ScopeStack::new(self.root.clone()).export(&values);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            signal: Arc::clone(self.root.signal()),
        }
    }

    /// Walks the playbook from its root. Halts are recorded as the root scope's error.
    pub fn start(&self) -> ExecutionOutcome {
        info!(nodes = self.playbook.len(), "playbook execution started");
        let stack = ScopeStack::new(self.root.clone());
        let outcome = match self.run_from(self.playbook.root(), &stack) {
            Ok(()) => {
                self.root.mark_completed();
                ExecutionOutcome {
                    status: ExecutionStatus::Completed,
                    error: None,
                }
            }
            Err(error) => {
                self.root.set_done_with_error(error.to_string());
                let status = match error {
                    ExecError::Cancelled => ExecutionStatus::Cancelled,
                    _ => ExecutionStatus::Halted,
                };
                ExecutionOutcome {
                    status,
                    error: Some(error),
                }
            }
        };
        info!(
            status = ?outcome.status,
            actions = self.total_action_executions(),
            "playbook execution finished"
        );
        outcome
    }

    fn run_from(&self, start: Option<NodeRef>, stack: &ScopeStack) -> Result<(), ExecError> {
        for (_, node) in self.playbook.chain(start) {
            if stack.is_cancelled() {
                return Err(ExecError::Cancelled);
            }
            debug!(node_id = %node.id, depth = stack.depth(), "visiting node");
            match &node.kind {
                NodeKind::Action(action) => self.run_action(&node.id, action, stack)?,
                NodeKind::If(if_node) => self.run_if(&node.id, if_node, stack)?,
                NodeKind::For(for_node) => self.run_for(&node.id, for_node, stack)?,
            }
        }
        Ok(())
    }

    fn run_action(&self, id: &str, action: &ActionNode, stack: &ScopeStack) -> Result<(), ExecError> {
        let top = stack.top();
        top.start_action(id);

        let mut concrete = BTreeMap::new();
        for (name, value) in &action.params {
            if !needs_resolution(value) {
                concrete.insert(name.clone(), value.clone());
                continue;
            }
            let resolved = stack
                .lookup_blocking(value, self.options.action_input_timeout)
                .map_err(|error| {
                    let error = wait_error(id, error);
                    top.fail_action(id, record_message(&error));
                    error
                })?;
            concrete.insert(name.clone(), resolved.as_string());
        }
        top.record_action_params(id, concrete.clone(), true);

        let count = self.action_executions.fetch_add(1, Ordering::SeqCst) + 1;
        info!(node_id = %id, urn = %action.urn, count, "executing action");
        let result = self
            .backend
            .execute(&action.urn, &concrete)
            .map_err(|error| {
                let reason = error.to_string();
                warn!(node_id = %id, urn = %action.urn, %reason, "action failed");
                top.fail_action(id, reason.clone());
                ExecError::ActionBackend {
                    node_id: id.to_string(),
                    reason,
                }
            })?;

        let exports = compute_exports(&action.exports, &result);
        stack.export(&exports);
        top.complete_action(id, result, exports);
        Ok(())
    }

    fn run_if(&self, id: &str, if_node: &IfNode, stack: &ScopeStack) -> Result<(), ExecError> {
        let top = stack.top();
        top.start_if(id);

        let mut condition = Condition::parse(&if_node.condition).map_err(|source| {
            top.fail_if(id, source.to_string());
            ExecError::ConditionParse {
                node_id: id.to_string(),
                source,
            }
        })?;

        let mut vars_used = BTreeMap::new();
        for name in condition.unknown_vars().to_vec() {
            let value = stack
                .lookup_blocking(&name, self.options.condition_input_timeout)
                .map_err(|error| {
                    let error = wait_error(id, error);
                    top.fail_if(id, record_message(&error));
                    error
                })?;
            vars_used.insert(name.clone(), value.as_string());
            condition.set_var_value(name, value);
        }

        let outcome = condition.evaluate().map_err(|error| {
            warn!(node_id = %id, expression = %if_node.condition, %error, "condition not evaluable");
            top.fail_if(id, format!("Evaluation failed: {error}"));
            ExecError::ConditionUnevaluable {
                node_id: id.to_string(),
                expression: if_node.condition.clone(),
                reason: error.to_string(),
            }
        })?;
        debug!(node_id = %id, outcome, "condition evaluated");
        top.evaluate_if(id, outcome, vars_used);

        let branch = if outcome { if_node.yes } else { if_node.no };
        self.run_from(branch, stack)
    }

    fn run_for(&self, id: &str, for_node: &ForNode, stack: &ScopeStack) -> Result<(), ExecError> {
        let top = stack.top();
        top.start_for(id, true);

        let iterable = stack
            .lookup_blocking(&for_node.iterate_on, self.options.loop_input_timeout)
            .map_err(|error| {
                let error = wait_error(id, error);
                top.fail_for(id, record_message(&error));
                error
            })?;

        for (offset, value) in iterable.expand().into_iter().enumerate() {
            if stack.is_cancelled() {
                top.fail_for(id, "execution cancelled");
                return Err(ExecError::Cancelled);
            }
            let iteration = offset as i64 + 1;
            let child_stack = stack.push_child();
            let child = child_stack.top();
            top.start_for_iteration(id, iteration, value.clone(), child.clone());
            if let Some(item_as) = &for_node.item_as {
                child.export_values(&BTreeMap::from([(item_as.clone(), value)]));
            }
            debug!(node_id = %id, iteration, "starting loop iteration");

            let Err(error) = self.run_from(for_node.body, &child_stack) else {
                child.mark_completed();
                continue;
            };
            if error == ExecError::Cancelled {
                top.fail_for(id, "execution cancelled");
                return Err(error);
            }
            child_stack.top().set_done_with_error(error.to_string());
            match self.options.iteration_failure {
                IterationFailurePolicy::Continue => {
                    warn!(node_id = %id, iteration, %error, "loop iteration failed, continuing");
                }
                IterationFailurePolicy::Halt => {
                    let error = ExecError::IterationFailed {
                        node_id: id.to_string(),
                        iteration,
                        reason: error.to_string(),
                    };
                    warn!(node_id = %id, iteration, %error, "loop iteration failed, halting");
                    top.fail_for(id, error.to_string());
                    return Err(error);
                }
            }
        }

        top.end_for_loop(id);
        Ok(())
    }
}

fn compute_exports(
    declared: &BTreeMap<String, String>,
    result: &ActionResult,
) -> BTreeMap<String, Value> {
    declared
        .iter()
        .filter_map(|(name, expression)| {
            let value = if expression == RESULT_EXPORT {
                Some(result.raw.clone())
            } else {
                result.fields.get(expression).cloned()
            };
            value.map(|value| (name.clone(), Value::Scalar(value)))
        })
        .collect()
}

fn wait_error(node_id: &str, error: LookupError) -> ExecError {
    match error {
        LookupError::Cancelled { .. } => ExecError::Cancelled,
        LookupError::TimedOut { name, .. } => {
            warn!(node_id = %node_id, reference = %name, "dependency timed out");
            ExecError::DependencyTimeout {
                node_id: node_id.to_string(),
                reference: name,
            }
        }
    }
}

fn record_message(error: &ExecError) -> String {
    match error {
        ExecError::DependencyTimeout { .. } => DEPENDENCY_TIMEOUT_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
