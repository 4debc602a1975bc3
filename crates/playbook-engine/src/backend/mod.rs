mod mock;
mod router;

pub use mock::{
    load_mock_store_from_path, ActionMockScenario, MockActionStore, MockScenarioCase,
    MockStoreError,
};
pub use router::{ActionBackendRegistration, ActionRouter};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Executes one action by urn. Implementations must be shareable across execution threads.
pub trait ActionBackend: Send + Sync {
    fn execute(
        &self,
        action: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<ActionResult, ActionError>;
}

/// Output of a successful action: the raw payload plus a flat field map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(rename = "outputJson", default)]
    pub raw: String,
    #[serde(rename = "outputFields", default)]
    pub fields: BTreeMap<String, String>,
}

impl ActionResult {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("no scenario found for action `{urn}`")]
    NoScenario { urn: String },
    #[error("{reason}")]
    Failed { urn: String, reason: String },
    #[error("no backend registered for action `{urn}`")]
    NoRoute { urn: String },
    #[error("ambiguous route for action `{urn}`: prefix `{prefix}` matched multiple backends [{backends}]")]
    AmbiguousRoute {
        urn: String,
        prefix: String,
        backends: String,
    },
}
