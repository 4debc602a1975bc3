use super::{ActionNode, ForNode, IdGenerator, IfNode, Node, NodeKind, NodeRef, Playbook};
use crate::documents::{NodeSpec, PlaybookDocument, NODE_TYPE_EXECUTE, NODE_TYPE_FOR, NODE_TYPE_IF};
use playbook_cond::parse_condition;
use playbook_core::{needs_resolution, FieldPath, IssueSeverity, StructuredIssue, VarRef};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the immutable node arena for `document`.
///
/// Ids are taken from the document where present and drawn from `ids` in pre-order otherwise.
/// Any error-severity issue rejects the whole document; warnings are dropped here and can be
/// inspected through [`validate_playbook`].
pub fn build_playbook(
    document: &PlaybookDocument,
    ids: &mut IdGenerator,
) -> Result<Playbook, Vec<StructuredIssue>> {
    let mut builder = Builder::new(ids);
    let root = builder.build_chain(&document.nodes, &FieldPath::root());
    let Builder {
        nodes,
        by_id,
        mut issues,
        ..
    } = builder;

    if StructuredIssue::has_errors(&issues) {
        issues.retain(|issue| issue.severity == IssueSeverity::Error);
        StructuredIssue::sort_stable(&mut issues);
        return Err(issues);
    }

    debug!(nodes = nodes.len(), "built playbook graph");
    Ok(Playbook { nodes, root, by_id })
}

/// Runs every structural check without keeping the graph. Warnings are included.
pub fn validate_playbook(document: &PlaybookDocument) -> Vec<StructuredIssue> {
    let mut ids = IdGenerator::new();
    let mut builder = Builder::new(&mut ids);
    builder.build_chain(&document.nodes, &FieldPath::root());
    let mut issues = builder.issues;
    StructuredIssue::sort_stable(&mut issues);
    issues
}

struct Builder<'a> {
    ids: &'a mut IdGenerator,
    nodes: Vec<Node>,
    by_id: BTreeMap<String, NodeRef>,
    issues: Vec<StructuredIssue>,
}

impl<'a> Builder<'a> {
    fn new(ids: &'a mut IdGenerator) -> Self {
        Self {
            ids,
            nodes: Vec::new(),
            by_id: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    fn build_chain(&mut self, specs: &[NodeSpec], path: &FieldPath) -> Option<NodeRef> {
        let mut head = None;
        let mut previous: Option<NodeRef> = None;
        for (index, spec) in specs.iter().enumerate() {
            let Some(current) = self.build_node(spec, &path.index(index)) else {
                continue;
            };
            match previous {
                Some(previous) => self.nodes[previous.0].next = Some(current),
                None => head = Some(current),
            }
            previous = Some(current);
        }
        head
    }

    fn build_node(&mut self, spec: &NodeSpec, path: &FieldPath) -> Option<NodeRef> {
        let id = match spec.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.ids.next_id(),
        };

        let node_ref = NodeRef(self.nodes.len());
        if self.by_id.contains_key(&id) {
            self.error(
                "duplicate_id",
                path.key("id"),
                &id,
                format!("node id `{id}` is used more than once"),
                "node.id.unique",
            );
        } else {
            self.by_id.insert(id.clone(), node_ref);
        }

        // Reserve the slot first so parents precede their children in the arena.
        self.nodes.push(Node {
            id: id.clone(),
            kind: NodeKind::Action(ActionNode {
                urn: String::new(),
                params: BTreeMap::new(),
                exports: BTreeMap::new(),
            }),
            next: None,
        });

        let kind = match spec.effective_type() {
            NODE_TYPE_EXECUTE => self.build_action(spec, &id, path),
            NODE_TYPE_IF => self.build_if(spec, &id, path),
            NODE_TYPE_FOR => self.build_for(spec, &id, path),
            other => {
                self.error(
                    "unknown_type",
                    path.key("type"),
                    &id,
                    format!("node type `{other}` is not one of execute, if, for"),
                    "node.type.known",
                );
                None
            }
        };

        if let Some(kind) = kind {
            self.nodes[node_ref.0].kind = kind;
        }
        Some(node_ref)
    }

    fn build_action(&mut self, spec: &NodeSpec, id: &str, path: &FieldPath) -> Option<NodeKind> {
        let urn = spec.urn.as_deref().map(str::trim).unwrap_or_default();
        if urn.is_empty() {
            self.error(
                "missing_field",
                path.key("urn"),
                id,
                "execute node requires a non-empty urn",
                "node.execute.urn",
            );
        }
        for (name, value) in &spec.params {
            self.check_reference(value, path.key("params").key(name.clone()), id);
        }
        Some(NodeKind::Action(ActionNode {
            urn: urn.to_string(),
            params: spec.params.clone(),
            exports: spec.exports.clone(),
        }))
    }

    fn build_if(&mut self, spec: &NodeSpec, id: &str, path: &FieldPath) -> Option<NodeKind> {
        let condition = spec.condition.clone().unwrap_or_default();
        let condition_path = path.key("condition");
        if condition.trim().is_empty() {
            self.error(
                "missing_field",
                condition_path,
                id,
                "if node requires a condition",
                "node.if.condition",
            );
        } else {
            match parse_condition(&condition) {
                Ok(parsed) => {
                    for token in parsed.references() {
                        self.check_reference(&token, condition_path.clone(), id);
                    }
                }
                Err(error) => self.error(
                    "condition_parse",
                    condition_path,
                    id,
                    error.to_string(),
                    "node.if.condition.parse",
                ),
            }
        }

        let yes = self.build_chain(&spec.on_true, &path.key("onTrue"));
        let no = self.build_chain(&spec.on_false, &path.key("onFalse"));
        Some(NodeKind::If(IfNode { condition, yes, no }))
    }

    fn build_for(&mut self, spec: &NodeSpec, id: &str, path: &FieldPath) -> Option<NodeKind> {
        let iterate_on = spec
            .iterate_on
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let iterate_path = path.key("iterateOn");
        if iterate_on.is_empty() {
            self.error(
                "missing_field",
                iterate_path,
                id,
                "for node requires iterateOn",
                "node.for.iterate_on",
            );
        } else if !needs_resolution(&iterate_on) {
            self.error(
                "invalid_reference",
                iterate_path,
                id,
                format!("iterateOn `{iterate_on}` must be a variable reference"),
                "node.for.iterate_on.reference",
            );
        } else {
            self.check_reference(&iterate_on, iterate_path, id);
        }

        let item_as = spec
            .item_as
            .as_deref()
            .map(|name| name.trim().trim_start_matches('$'))
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let body = self.build_chain(&spec.body, &path.key("body"));
        Some(NodeKind::For(ForNode {
            iterate_on,
            item_as,
            body,
        }))
    }

    /// Reference-looking tokens that do not parse resolve to "not found" at run time.
    fn check_reference(&mut self, token: &str, field_path: FieldPath, id: &str) {
        if needs_resolution(token) && VarRef::parse(token).is_none() {
            let mut issue = StructuredIssue::error(
                "unrecognized_reference",
                field_path,
                format!("`{token}` does not match @alert:, @node:<id>$<field> or $<name>"),
                "reference.grammar",
            )
            .with_node_id(id);
            issue.severity = IssueSeverity::Warning;
            self.issues.push(issue);
        }
    }

    fn error(
        &mut self,
        kind: &str,
        field_path: FieldPath,
        id: &str,
        message: impl Into<String>,
        reference: &str,
    ) {
        self.issues
            .push(StructuredIssue::error(kind, field_path, message, reference).with_node_id(id));
    }
}

#[cfg(test)]
#[path = "build_test.rs"]
mod tests;
