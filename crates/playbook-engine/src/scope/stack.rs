use super::signal::ChangeSignal;
use super::Scope;
use playbook_core::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("timed out after {timeout:?} waiting for `{name}`")]
    TimedOut { name: String, timeout: Duration },
    #[error("execution cancelled while waiting for `{name}`")]
    Cancelled { name: String },
}

/// Active lexical nesting of scopes, innermost last.
///
/// The stack is a cheap view over shared scope handles: [`ScopeStack::push_child`] returns a
/// new stack and leaves this one untouched.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    signal: Arc<ChangeSignal>,
}

impl ScopeStack {
    pub fn new(root: Scope) -> Self {
        let signal = Arc::clone(root.signal());
        Self {
            scopes: vec![root],
            signal,
        }
    }

    /// Innermost scope.
    pub fn top(&self) -> &Scope {
        // A stack is never empty: it starts with a root and only grows.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// New stack with a fresh empty scope of the same execution tree on top.
    pub fn push_child(&self) -> ScopeStack {
        let mut scopes = self.scopes.clone();
        scopes.push(self.top().new_child());
        Self {
            scopes,
            signal: Arc::clone(&self.signal),
        }
    }

    /// Innermost-to-outermost search; the first scope holding `name` wins.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let _gate = self.signal.read_gate();
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Waits until `name` resolves, the timeout elapses or the execution is cancelled.
    /// A timeout too large to represent as an instant never elapses.
    pub fn lookup_blocking(&self, name: &str, timeout: Duration) -> Result<Value, LookupError> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let seen = self.signal.epoch();
            if self.signal.is_cancelled() {
                return Err(LookupError::Cancelled {
                    name: name.to_string(),
                });
            }
            if let Some(value) = self.lookup(name) {
                return Ok(value);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                debug!(%name, ?timeout, "lookup timed out");
                return Err(LookupError::TimedOut {
                    name: name.to_string(),
                    timeout,
                });
            }
            self.signal.wait_past(seen, deadline);
        }
    }

    /// Broadcasts `values` into every scope on the stack as one atomic step.
    pub fn export(&self, values: &BTreeMap<String, Value>) {
        if values.is_empty() {
            return;
        }
        let _gate = self.signal.write_gate();
        for scope in &self.scopes {
            scope.export_values(values);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

#[cfg(test)]
#[path = "stack_test.rs"]
mod tests;
