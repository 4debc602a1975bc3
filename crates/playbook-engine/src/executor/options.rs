use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a loop does when one iteration's body halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationFailurePolicy {
    /// Record the failure on the iteration's scope and run the next element.
    #[default]
    Continue,
    /// Fail the loop record and halt the enclosing chain.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub action_input_timeout: Duration,
    pub condition_input_timeout: Duration,
    pub loop_input_timeout: Duration,
    pub iteration_failure: IterationFailurePolicy,
}

impl ExecutionOptions {
    /// Same timeout for every kind of dependency wait.
    pub fn with_uniform_timeout(timeout: Duration) -> Self {
        Self {
            action_input_timeout: timeout,
            condition_input_timeout: timeout,
            loop_input_timeout: timeout,
            ..Self::default()
        }
    }

    pub fn with_iteration_failure(mut self, policy: IterationFailurePolicy) -> Self {
        self.iteration_failure = policy;
        self
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            action_input_timeout: Duration::from_secs(1000),
            condition_input_timeout: Duration::from_secs(100),
            loop_input_timeout: Duration::from_secs(120),
            iteration_failure: IterationFailurePolicy::Continue,
        }
    }
}
