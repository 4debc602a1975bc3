use crate::documents::{NodeSpec, PlaybookDocument};

/// Allocates ids for nodes that were authored without one.
///
/// One generator is owned by whoever builds playbooks; ids keep increasing across every
/// build that shares it and are never reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes generated ids into every node that lacks one, in the pre-order [`crate::build_playbook`]
/// uses, so the document and the built graph agree on ids.
pub fn assign_missing_ids(document: &mut PlaybookDocument, ids: &mut IdGenerator) {
    assign_chain(&mut document.nodes, ids);
}

fn assign_chain(nodes: &mut [NodeSpec], ids: &mut IdGenerator) {
    for node in nodes {
        if node.id.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            node.id = Some(ids.next_id());
        }
        assign_chain(&mut node.on_true, ids);
        assign_chain(&mut node.on_false, ids);
        assign_chain(&mut node.body, ids);
    }
}

#[cfg(test)]
#[path = "id_gen_test.rs"]
mod tests;
