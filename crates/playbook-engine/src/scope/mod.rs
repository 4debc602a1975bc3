pub(crate) mod signal;
mod stack;

pub use stack::{LookupError, ScopeStack};

use crate::backend::ActionResult;
use playbook_core::{NodeField, Value, VarRef};
use signal::{lock, ChangeSignal};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionExecState {
    pub waiting_on_input: bool,
    pub done: bool,
    pub error: Option<String>,
    pub params: BTreeMap<String, String>,
    pub result: Option<ActionResult>,
}

impl ActionExecState {
    pub fn succeeded(&self) -> bool {
        self.done && self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IfExecState {
    pub done: bool,
    pub error: Option<String>,
    /// Resolved text of each reference operand, for audit.
    pub vars_used: BTreeMap<String, String>,
    pub outcome: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ForIteration {
    pub value: Value,
    pub scope: Scope,
}

#[derive(Debug, Clone)]
pub struct ForExecState {
    pub waiting_on_input: bool,
    pub done: bool,
    pub error: Option<String>,
    /// 1-based; -1 before the first iteration starts.
    pub current_index: i64,
    pub current: Option<ForIteration>,
    pub history: BTreeMap<i64, ForIteration>,
}

impl ForExecState {
    fn new(waiting_on_input: bool) -> Self {
        Self {
            waiting_on_input,
            done: false,
            error: None,
            current_index: -1,
            current: None,
            history: BTreeMap::new(),
        }
    }

    fn freeze_current(&mut self) {
        if let Some(current) = self.current.clone() {
            self.history.insert(self.current_index, current);
        }
    }
}

#[derive(Debug)]
struct ScopeState {
    version: u64,
    started_at_ms: u64,
    updated_at_ms: u64,
    completed_at_ms: Option<u64>,
    error: Option<String>,
    actions: BTreeMap<String, ActionExecState>,
    ifs: BTreeMap<String, IfExecState>,
    loops: BTreeMap<String, ForExecState>,
    exported: BTreeMap<String, Value>,
    seed: BTreeMap<String, Value>,
}

struct ScopeInner {
    state: Mutex<ScopeState>,
    signal: Arc<ChangeSignal>,
}

/// Versioned store of per-node execution records and exported variables for one
/// lexical or loop-iteration context.
///
/// `Scope` is a shared handle; clones refer to the same records. Every mutation bumps the
/// version and wakes blocked lookups anywhere in the same execution tree.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Root scope of a new execution tree, seeded with alert data.
    pub fn new(seed: BTreeMap<String, Value>) -> Self {
        Self::with_signal(seed, Arc::new(ChangeSignal::default()))
    }

    /// Empty scope in the same execution tree.
    pub fn new_child(&self) -> Self {
        Self::with_signal(BTreeMap::new(), Arc::clone(&self.inner.signal))
    }

    fn with_signal(seed: BTreeMap<String, Value>, signal: Arc<ChangeSignal>) -> Self {
        let now = now_ms();
        Self {
            inner: Arc::new(ScopeInner {
                state: Mutex::new(ScopeState {
                    version: 0,
                    started_at_ms: now,
                    updated_at_ms: now,
                    completed_at_ms: None,
                    error: None,
                    actions: BTreeMap::new(),
                    ifs: BTreeMap::new(),
                    loops: BTreeMap::new(),
                    exported: BTreeMap::new(),
                    seed,
                }),
                signal,
            }),
        }
    }

    pub(crate) fn signal(&self) -> &Arc<ChangeSignal> {
        &self.inner.signal
    }

    pub fn same_scope(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn version(&self) -> u64 {
        self.read(|state| state.version)
    }

    pub fn started_at_ms(&self) -> u64 {
        self.read(|state| state.started_at_ms)
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.read(|state| state.updated_at_ms)
    }

    pub fn completed_at_ms(&self) -> Option<u64> {
        self.read(|state| state.completed_at_ms)
    }

    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    pub fn set_done_with_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.mutate(|state| {
            state.error = Some(error);
            state.completed_at_ms = Some(now_ms());
        });
    }

    pub fn mark_completed(&self) {
        self.mutate(|state| state.completed_at_ms = Some(now_ms()));
    }

    pub fn start_action(&self, id: &str) {
        self.mutate(|state| {
            state.actions.insert(
                id.to_string(),
                ActionExecState {
                    waiting_on_input: true,
                    ..ActionExecState::default()
                },
            );
        });
    }

    /// Merges resolved parameters; `waiting_on_input` clears only once all are resolved.
    pub fn record_action_params(&self, id: &str, values: BTreeMap<String, String>, all_resolved: bool) {
        self.mutate(|state| {
            let record = state.actions.entry(id.to_string()).or_default();
            record.params.extend(values);
            if all_resolved {
                record.waiting_on_input = false;
            }
        });
    }

    /// Marks the action done and merges `exports` into this scope's exported variables.
    pub fn complete_action(&self, id: &str, result: ActionResult, exports: BTreeMap<String, Value>) {
        self.mutate(|state| {
            let record = state.actions.entry(id.to_string()).or_default();
            record.done = true;
            record.waiting_on_input = false;
            record.result = Some(result);
            state.exported.extend(exports);
        });
    }

    pub fn fail_action(&self, id: &str, error: impl Into<String>) {
        let error = error.into();
        self.mutate(|state| {
            let record = state.actions.entry(id.to_string()).or_default();
            record.done = true;
            record.waiting_on_input = false;
            record.error = Some(error);
        });
    }

    pub fn start_if(&self, id: &str) {
        self.mutate(|state| {
            state.ifs.insert(id.to_string(), IfExecState::default());
        });
    }

    pub fn evaluate_if(&self, id: &str, outcome: bool, vars_used: BTreeMap<String, String>) {
        self.mutate(|state| {
            let record = state.ifs.entry(id.to_string()).or_default();
            record.done = true;
            record.outcome = Some(outcome);
            record.vars_used = vars_used;
        });
    }

    pub fn fail_if(&self, id: &str, error: impl Into<String>) {
        let error = error.into();
        self.mutate(|state| {
            let record = state.ifs.entry(id.to_string()).or_default();
            record.done = true;
            record.error = Some(error);
        });
    }

    pub fn start_for(&self, id: &str, waiting_on_input: bool) {
        self.mutate(|state| {
            state
                .loops
                .insert(id.to_string(), ForExecState::new(waiting_on_input));
        });
    }

    /// Freezes the previous iteration into history, then installs `index` as current.
    pub fn start_for_iteration(&self, id: &str, index: i64, value: Value, child: Scope) {
        self.mutate(|state| {
            let record = state
                .loops
                .entry(id.to_string())
                .or_insert_with(|| ForExecState::new(false));
            record.freeze_current();
            record.waiting_on_input = false;
            record.current_index = index;
            record.current = Some(ForIteration {
                value,
                scope: child,
            });
        });
    }

    /// Freezes the last iteration and marks the loop done.
    pub fn end_for_loop(&self, id: &str) {
        self.mutate(|state| {
            if let Some(record) = state.loops.get_mut(id) {
                record.freeze_current();
                record.waiting_on_input = false;
                record.done = true;
            }
        });
    }

    pub fn fail_for(&self, id: &str, error: impl Into<String>) {
        let error = error.into();
        self.mutate(|state| {
            let record = state
                .loops
                .entry(id.to_string())
                .or_insert_with(|| ForExecState::new(false));
            record.freeze_current();
            record.waiting_on_input = false;
            record.done = true;
            record.error = Some(error);
        });
    }

    /// Writes exported variables into this scope only.
    pub fn export_values(&self, values: &BTreeMap<String, Value>) {
        self.mutate(|state| {
            state
                .exported
                .extend(values.iter().map(|(name, value)| (name.clone(), value.clone())));
        });
    }

    /// Resolves one reference against this scope. Tokens outside the grammar are not found.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let reference = VarRef::parse(name)?;
        self.read(|state| match &reference {
            VarRef::Alert(key) => state.seed.get(key).cloned(),
            VarRef::Exported(key) => state.exported.get(key).cloned(),
            VarRef::Node { node_id, field } => {
                let record = state.actions.get(node_id).filter(|record| record.succeeded())?;
                let result = record.result.as_ref()?;
                match field {
                    NodeField::Raw => Some(Value::scalar(result.raw.clone())),
                    NodeField::Named(field) => result.fields.get(field).cloned().map(Value::Scalar),
                }
            }
        })
    }

    /// Flat-result field of a successfully completed action.
    pub fn node_result(&self, node_id: &str, field: &str) -> Option<String> {
        self.read(|state| {
            let record = state.actions.get(node_id).filter(|record| record.succeeded())?;
            record.result.as_ref()?.fields.get(field).cloned()
        })
    }

    pub fn action_state(&self, id: &str) -> Option<ActionExecState> {
        self.read(|state| state.actions.get(id).cloned())
    }

    pub fn if_state(&self, id: &str) -> Option<IfExecState> {
        self.read(|state| state.ifs.get(id).cloned())
    }

    pub fn for_state(&self, id: &str) -> Option<ForExecState> {
        self.read(|state| state.loops.get(id).cloned())
    }

    pub fn exported(&self) -> BTreeMap<String, Value> {
        self.read(|state| state.exported.clone())
    }

    fn read<R>(&self, f: impl FnOnce(&ScopeState) -> R) -> R {
        let state = lock(&self.inner.state);
        f(&state)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut ScopeState) -> R) -> R {
        let out = {
            let mut state = lock(&self.inner.state);
            let out = f(&mut state);
            state.version += 1;
            state.updated_at_ms = now_ms();
            out
        };
        self.inner.signal.notify();
        out
    }
}

impl Debug for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Scope")
            .field("version", &state.version)
            .field("error", &state.error)
            .field("actions", &state.actions.len())
            .field("exported", &state.exported)
            .finish()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
