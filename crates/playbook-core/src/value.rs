use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Separator used when a list value is coerced to a single string.
pub const LIST_SEPARATOR: &str = ",";

/// Data flowing between playbook steps: one string or an ordered list of them.
///
/// Serializes untagged, so `"a"` decodes to a scalar and `["a", "b"]` to a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn as_string(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(items) => items.join(LIST_SEPARATOR),
        }
    }

    /// Splits the value into one scalar per element. A scalar yields itself.
    pub fn expand(&self) -> Vec<Value> {
        match self {
            Self::Scalar(value) => vec![Self::Scalar(value.clone())],
            Self::List(items) => items.iter().cloned().map(Self::Scalar).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_string().as_str())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::scalar(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
