mod build;
mod id_gen;

pub use build::{build_playbook, validate_playbook};
pub use id_gen::{assign_missing_ids, IdGenerator};

use std::collections::BTreeMap;

/// Stable handle to a node inside a [`Playbook`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Action,
    If,
    For,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNode {
    pub urn: String,
    /// Parameter name to literal value or variable reference.
    pub params: BTreeMap<String, String>,
    /// Export name to `"result"` or a result field name.
    pub exports: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfNode {
    pub condition: String,
    pub yes: Option<NodeRef>,
    pub no: Option<NodeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForNode {
    pub iterate_on: String,
    /// Export name bound to the current element inside each iteration.
    pub item_as: Option<String>,
    pub body: Option<NodeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Action(ActionNode),
    If(IfNode),
    For(ForNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub next: Option<NodeRef>,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Action(_) => NodeType::Action,
            NodeKind::If(_) => NodeType::If,
            NodeKind::For(_) => NodeType::For,
        }
    }
}

/// Immutable node arena. Links between nodes are [`NodeRef`]s, never ownership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Playbook {
    nodes: Vec<Node>,
    root: Option<NodeRef>,
    by_id: BTreeMap<String, NodeRef>,
}

impl Playbook {
    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    pub fn node(&self, node: NodeRef) -> &Node {
        &self.nodes[node.0]
    }

    pub fn next(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node.0].next
    }

    pub fn node_type(&self, node: NodeRef) -> NodeType {
        self.nodes[node.0].node_type()
    }

    pub fn find(&self, id: &str) -> Option<NodeRef> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks a chain from `start` along `next` links.
    pub fn chain(&self, start: Option<NodeRef>) -> ChainIter<'_> {
        ChainIter {
            playbook: self,
            current: start,
        }
    }
}

pub struct ChainIter<'a> {
    playbook: &'a Playbook,
    current: Option<NodeRef>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (NodeRef, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let node = self.playbook.node(current);
        self.current = node.next;
        Some((current, node))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
