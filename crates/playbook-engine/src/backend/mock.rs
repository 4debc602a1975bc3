use super::{ActionBackend, ActionError, ActionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Input value that matches any argument, including a missing one.
pub const WILDCARD: &str = "*";

#[derive(Debug, thiserror::Error)]
pub enum MockStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of a mock scenario file: every canned response for a single action urn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMockScenario {
    #[serde(rename = "actionUrn")]
    pub action_urn: String,
    #[serde(rename = "executionDuration", default)]
    pub execution_duration_secs: u64,
    #[serde(default)]
    pub scenarios: Vec<MockScenarioCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockScenarioCase {
    #[serde(default)]
    pub input: BTreeMap<String, String>,
    #[serde(flatten)]
    pub result: ActionResult,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl MockScenarioCase {
    /// Every declared input must equal the call's argument or be [`WILDCARD`].
    /// Arguments the call does not supply compare as the empty string.
    pub fn matches(&self, inputs: &BTreeMap<String, String>) -> bool {
        self.input.iter().all(|(key, expected)| {
            expected.as_str() == WILDCARD
                || inputs.get(key).map(String::as_str).unwrap_or_default() == expected.as_str()
        })
    }
}

/// Action backend answering from canned scenarios keyed by urn.
#[derive(Debug, Clone, Default)]
pub struct MockActionStore {
    scenarios: BTreeMap<String, ActionMockScenario>,
    simulate_latency: bool,
}

impl MockActionStore {
    /// Later entries for the same urn replace earlier ones.
    pub fn new(entries: Vec<ActionMockScenario>) -> Self {
        let mut scenarios = BTreeMap::new();
        for entry in entries {
            scenarios.insert(entry.action_urn.clone(), entry);
        }
        Self {
            scenarios,
            simulate_latency: false,
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, MockStoreError> {
        let entries = serde_json::from_str::<Vec<ActionMockScenario>>(input)?;
        Ok(Self::new(entries))
    }

    /// Sleep for each entry's `executionDuration` before answering.
    pub fn with_simulated_latency(mut self, enabled: bool) -> Self {
        self.simulate_latency = enabled;
        self
    }

    pub fn scenario(&self, urn: &str) -> Option<&ActionMockScenario> {
        self.scenarios.get(urn)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl ActionBackend for MockActionStore {
    fn execute(
        &self,
        action: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<ActionResult, ActionError> {
        let no_scenario = || ActionError::NoScenario {
            urn: action.to_string(),
        };
        let entry = self.scenarios.get(action).ok_or_else(no_scenario)?;
        let case = entry
            .scenarios
            .iter()
            .find(|case| case.matches(inputs))
            .ok_or_else(no_scenario)?;

        debug!(urn = %action, "matched mock scenario");
        if self.simulate_latency && entry.execution_duration_secs > 0 {
            std::thread::sleep(Duration::from_secs(entry.execution_duration_secs));
        }

        if !case.error.is_empty() {
            return Err(ActionError::Failed {
                urn: action.to_string(),
                reason: case.error.clone(),
            });
        }
        Ok(case.result.clone())
    }
}

pub fn load_mock_store_from_path(path: impl AsRef<Path>) -> Result<MockActionStore, MockStoreError> {
    let content = std::fs::read_to_string(path)?;
    MockActionStore::from_json_str(&content)
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
