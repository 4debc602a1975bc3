mod node;

pub use node::{NodeSpec, NODE_TYPE_EXECUTE, NODE_TYPE_FOR, NODE_TYPE_IF};

use serde::{Deserialize, Serialize};

/// A playbook as authored: an ordered top-level sequence of node descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybookDocument {
    pub nodes: Vec<NodeSpec>,
}

impl PlaybookDocument {
    pub fn new(nodes: Vec<NodeSpec>) -> Self {
        Self { nodes }
    }
}
