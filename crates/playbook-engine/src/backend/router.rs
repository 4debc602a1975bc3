use super::{ActionBackend, ActionError, ActionResult};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBackendRegistration {
    pub name: String,
    pub urn_prefix: String,
}

/// Dispatches each action to the backend registered under the longest matching urn prefix.
pub struct ActionRouter {
    registrations: Vec<ActionBackendRegistration>,
    backends: Vec<Box<dyn ActionBackend>>,
}

impl Debug for ActionRouter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRouter")
            .field("registrations", &self.registrations)
            .finish()
    }
}

impl ActionRouter {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            backends: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        urn_prefix: impl Into<String>,
        backend: Box<dyn ActionBackend>,
    ) {
        self.registrations.push(ActionBackendRegistration {
            name: name.into(),
            urn_prefix: urn_prefix.into(),
        });
        self.backends.push(backend);
    }

    pub fn registrations(&self) -> &[ActionBackendRegistration] {
        &self.registrations
    }

    /// Index of the registration that handles `urn`.
    pub fn route(&self, urn: &str) -> Result<usize, ActionError> {
        let longest = self
            .registrations
            .iter()
            .filter(|registration| urn.starts_with(registration.urn_prefix.as_str()))
            .map(|registration| registration.urn_prefix.len())
            .max()
            .ok_or_else(|| ActionError::NoRoute {
                urn: urn.to_string(),
            })?;

        let matched_indexes = self
            .registrations
            .iter()
            .enumerate()
            .filter(|(_, registration)| {
                registration.urn_prefix.len() == longest
                    && urn.starts_with(registration.urn_prefix.as_str())
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        if matched_indexes.len() > 1 {
            let backends = matched_indexes
                .iter()
                .map(|index| self.registrations[*index].name.clone())
                .collect::<Vec<_>>()
                .join(",");
            return Err(ActionError::AmbiguousRoute {
                urn: urn.to_string(),
                prefix: self.registrations[matched_indexes[0]].urn_prefix.clone(),
                backends,
            });
        }

        Ok(matched_indexes[0])
    }
}

impl ActionBackend for ActionRouter {
    fn execute(
        &self,
        action: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<ActionResult, ActionError> {
        let index = self.route(action)?;
        debug!(urn = %action, backend = %self.registrations[index].name, "routing action");
        self.backends[index].execute(action, inputs)
    }
}

impl Default for ActionRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
