pub mod documents;
pub mod graph;
pub mod parse;

pub use documents::{NodeSpec, PlaybookDocument, NODE_TYPE_EXECUTE, NODE_TYPE_FOR, NODE_TYPE_IF};
pub use graph::{
    assign_missing_ids, build_playbook, validate_playbook, ActionNode, ForNode, IdGenerator,
    IfNode, Node, NodeKind, NodeRef, NodeType, Playbook,
};
pub use parse::{parse_playbook, parse_playbook_with_format, DocumentFormat};
