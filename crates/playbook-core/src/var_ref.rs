use regex::Regex;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

pub const ALERT_PREFIX: &str = "@alert:";
pub const NODE_PREFIX: &str = "@node:";
pub const EXPORT_PREFIX: &str = "$";

/// Field name that selects an action's whole raw output.
pub const RAW_FIELD: &str = "raw";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeField {
    Raw,
    Named(String),
}

/// A parsed variable reference.
///
/// Grammar:
/// - `@alert:<key>` reads a seed value,
/// - `@node:<nodeId>$<field>` reads a completed action's output (`raw` for the whole payload),
/// - `$<name>` reads an exported variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarRef {
    Alert(String),
    Node { node_id: String, field: NodeField },
    Exported(String),
}

impl VarRef {
    /// Returns `None` when the token is not a well-formed reference.
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(key) = token.strip_prefix(ALERT_PREFIX) {
            return (!key.is_empty()).then(|| Self::Alert(key.to_string()));
        }
        if token.starts_with(NODE_PREFIX) {
            let captures = node_ref_regex().captures(token)?;
            let node_id = captures.get(1)?.as_str().to_string();
            let field = match captures.get(2)?.as_str() {
                RAW_FIELD => NodeField::Raw,
                other => NodeField::Named(other.to_string()),
            };
            return Some(Self::Node { node_id, field });
        }
        if let Some(name) = token.strip_prefix(EXPORT_PREFIX) {
            return (!name.is_empty()).then(|| Self::Exported(name.to_string()));
        }
        None
    }
}

impl Display for VarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert(key) => write!(f, "{ALERT_PREFIX}{key}"),
            Self::Node { node_id, field } => match field {
                NodeField::Raw => write!(f, "{NODE_PREFIX}{node_id}${RAW_FIELD}"),
                NodeField::Named(name) => write!(f, "{NODE_PREFIX}{node_id}${name}"),
            },
            Self::Exported(name) => write!(f, "{EXPORT_PREFIX}{name}"),
        }
    }
}

/// True when the token is a reference that must be looked up rather than used literally.
pub fn needs_resolution(token: &str) -> bool {
    token.starts_with('@') || token.starts_with('$')
}

fn node_ref_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^@node:([^$]+)\$(.+)$").expect("valid regex"))
}

#[cfg(test)]
#[path = "var_ref_test.rs"]
mod tests;
