use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const NODE_TYPE_EXECUTE: &str = "execute";
pub const NODE_TYPE_IF: &str = "if";
pub const NODE_TYPE_FOR: &str = "for";

/// One authored node. Which fields matter depends on `type`:
/// `execute` uses `urn`/`params`/`exports`, `if` uses `condition`/`onTrue`/`onFalse`,
/// `for` uses `iterateOn`/`itemAs`/`body`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub params: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "scalar_text_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub exports: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "onTrue", default, skip_serializing_if = "Vec::is_empty")]
    pub on_true: Vec<NodeSpec>,
    #[serde(rename = "onFalse", default, skip_serializing_if = "Vec::is_empty")]
    pub on_false: Vec<NodeSpec>,
    #[serde(rename = "iterateOn", default, skip_serializing_if = "Option::is_none")]
    pub iterate_on: Option<String>,
    /// Name under which each element is exported into its iteration scope.
    #[serde(rename = "itemAs", default, skip_serializing_if = "Option::is_none")]
    pub item_as: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn action(urn: impl Into<String>) -> Self {
        Self {
            node_type: Some(NODE_TYPE_EXECUTE.to_string()),
            urn: Some(urn.into()),
            ..Self::default()
        }
    }

    pub fn if_node(condition: impl Into<String>) -> Self {
        Self {
            node_type: Some(NODE_TYPE_IF.to_string()),
            condition: Some(condition.into()),
            ..Self::default()
        }
    }

    pub fn for_each(iterate_on: impl Into<String>) -> Self {
        Self {
            node_type: Some(NODE_TYPE_FOR.to_string()),
            iterate_on: Some(iterate_on.into()),
            ..Self::default()
        }
    }

    pub fn item_as(mut self, name: impl Into<String>) -> Self {
        self.item_as = Some(name.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn export(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.exports.insert(name.into(), expression.into());
        self
    }

    pub fn on_true(mut self, nodes: Vec<NodeSpec>) -> Self {
        self.on_true = nodes;
        self
    }

    pub fn on_false(mut self, nodes: Vec<NodeSpec>) -> Self {
        self.on_false = nodes;
        self
    }

    pub fn body(mut self, nodes: Vec<NodeSpec>) -> Self {
        self.body = nodes;
        self
    }

    /// The declared type, defaulting to `execute` when absent.
    pub fn effective_type(&self) -> &str {
        self.node_type.as_deref().unwrap_or(NODE_TYPE_EXECUTE)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarText {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(number) => number.to_string(),
            Self::Float(number) => number.to_string(),
            Self::Bool(flag) => flag.to_string(),
        }
    }
}

/// Accepts unquoted YAML scalars (`limit: 50`) as their textual form.
fn scalar_text_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, ScalarText>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name, value.into_text()))
        .collect())
}
