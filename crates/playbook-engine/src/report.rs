use crate::scope::{ForIteration, Scope};
use playbook_core::Value;
use playbook_sdk::{NodeSpec, NODE_TYPE_EXECUTE, NODE_TYPE_FOR, NODE_TYPE_IF};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    #[serde(rename = "Not-Yet-Started")]
    NotYetStarted,
    #[serde(rename = "Waiting-Var-Resolution")]
    WaitingVarResolution,
    /// Inputs resolved, result not yet recorded.
    #[serde(rename = "Running")]
    Running,
    #[serde(rename = "Done")]
    Done,
}

/// A source node annotated with what the execution recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatusReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    pub state: NodeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(rename = "concreteParams", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub concrete_params: BTreeMap<String, String>,
    #[serde(rename = "resultRaw", default, skip_serializing_if = "Option::is_none")]
    pub result_raw: Option<String>,
    #[serde(rename = "resultFields", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub result_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exports: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "conditionEvaluatedTo", default, skip_serializing_if = "Option::is_none")]
    pub condition_evaluated_to: Option<bool>,
    #[serde(rename = "varsResolvedValues", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars_resolved_values: BTreeMap<String, String>,
    #[serde(rename = "onTrue", default, skip_serializing_if = "Vec::is_empty")]
    pub on_true: Vec<NodeStatusReport>,
    #[serde(rename = "onFalse", default, skip_serializing_if = "Vec::is_empty")]
    pub on_false: Vec<NodeStatusReport>,

    #[serde(rename = "iterateOn", default, skip_serializing_if = "Option::is_none")]
    pub iterate_on: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<ForIterationReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForIterationReport {
    pub index: i64,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub body: Vec<NodeStatusReport>,
}

/// Mirrors `nodes` with the records `scope` holds for them.
///
/// Only the branch an If node chose is annotated against the scope; the other branch, and both
/// branches of an unevaluated If, are mirrored as `Not-Yet-Started`. Loop bodies are annotated
/// once per iteration against that iteration's scope. Nodes without an id cannot be matched and
/// stay `Not-Yet-Started`.
pub fn annotate_nodes(nodes: &[NodeSpec], scope: &Scope) -> Vec<NodeStatusReport> {
    nodes.iter().map(|node| annotate_node(node, scope)).collect()
}

fn mirror_nodes(nodes: &[NodeSpec]) -> Vec<NodeStatusReport> {
    nodes.iter().map(unstarted_report).collect()
}

fn unstarted_report(node: &NodeSpec) -> NodeStatusReport {
    NodeStatusReport {
        id: node.id.clone(),
        node_type: node.effective_type().to_string(),
        state: NodeState::NotYetStarted,
        error: None,
        urn: node.urn.clone(),
        params: node.params.clone(),
        concrete_params: BTreeMap::new(),
        result_raw: None,
        result_fields: BTreeMap::new(),
        exports: node.exports.clone(),
        condition: node.condition.clone(),
        condition_evaluated_to: None,
        vars_resolved_values: BTreeMap::new(),
        on_true: mirror_nodes(&node.on_true),
        on_false: mirror_nodes(&node.on_false),
        iterate_on: node.iterate_on.clone(),
        iterations: Vec::new(),
    }
}

fn annotate_node(node: &NodeSpec, scope: &Scope) -> NodeStatusReport {
    let mut report = unstarted_report(node);
    let id = node.id.as_deref().unwrap_or_default();

    match node.effective_type() {
        NODE_TYPE_EXECUTE => annotate_action(&mut report, id, scope),
        NODE_TYPE_IF => {
            annotate_if(&mut report, id, scope);
            match report.condition_evaluated_to {
                Some(true) => report.on_true = annotate_nodes(&node.on_true, scope),
                Some(false) => report.on_false = annotate_nodes(&node.on_false, scope),
                None => {}
            }
        }
        NODE_TYPE_FOR => annotate_for(&mut report, node, id, scope),
        _ => {}
    }
    report
}

fn annotate_action(report: &mut NodeStatusReport, id: &str, scope: &Scope) {
    let Some(record) = scope.action_state(id) else {
        return;
    };
    report.state = if record.done {
        NodeState::Done
    } else if record.waiting_on_input {
        NodeState::WaitingVarResolution
    } else {
        NodeState::Running
    };
    report.error = record.error;
    report.concrete_params = record.params;
    if let Some(result) = record.result {
        if result.raw.is_empty() {
            report.result_fields = result.fields;
        } else {
            report.result_raw = Some(result.raw);
        }
    }
}

fn annotate_if(report: &mut NodeStatusReport, id: &str, scope: &Scope) {
    let Some(record) = scope.if_state(id) else {
        return;
    };
    report.state = if record.done {
        NodeState::Done
    } else {
        NodeState::WaitingVarResolution
    };
    report.error = record.error;
    report.condition_evaluated_to = record.outcome;
    report.vars_resolved_values = record.vars_used;
}

fn annotate_for(report: &mut NodeStatusReport, node: &NodeSpec, id: &str, scope: &Scope) {
    let Some(record) = scope.for_state(id) else {
        return;
    };
    report.state = if record.done {
        NodeState::Done
    } else if record.waiting_on_input {
        NodeState::WaitingVarResolution
    } else {
        NodeState::Running
    };
    report.error = record.error;

    let mut iterations = record.history;
    if let Some(current) = record.current {
        iterations.entry(record.current_index).or_insert(current);
    }
    report.iterations = iterations
        .into_iter()
        .map(|(index, ForIteration { value, scope })| ForIterationReport {
            index,
            value,
            error: scope.error(),
            body: annotate_nodes(&node.body, &scope),
        })
        .collect();
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
