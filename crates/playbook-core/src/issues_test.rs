use super::{IssueSeverity, StructuredIssue};
use crate::FieldPath;

#[test]
fn issues_are_sorted_by_severity_then_path() {
    let mut issues = vec![
        StructuredIssue {
            kind: "playbook_invalid".to_string(),
            severity: IssueSeverity::Warning,
            node_id: None,
            field_path: FieldPath::root().index(1),
            message: "second".to_string(),
            reference: None,
        },
        StructuredIssue::error(
            "playbook_invalid",
            FieldPath::root().index(3),
            "third",
            "playbook.node.urn_required",
        ),
        StructuredIssue::error(
            "playbook_invalid",
            FieldPath::root().index(0),
            "first",
            "playbook.node.duplicate_id",
        )
        .with_node_id("n1"),
    ];

    StructuredIssue::sort_stable(&mut issues);

    assert_eq!(issues[0].message, "first");
    assert_eq!(issues[1].message, "third");
    assert_eq!(issues[2].severity, IssueSeverity::Warning);
    assert!(StructuredIssue::has_errors(&issues));
}

#[test]
fn display_includes_path_and_reference() {
    let issue = StructuredIssue::error(
        "playbook_invalid",
        FieldPath::root().index(0).key("urn"),
        "action node requires `urn`",
        "playbook.node.urn_required",
    );
    assert_eq!(
        issue.to_string(),
        "error playbook_invalid at $[0].urn: action node requires `urn` (playbook.node.urn_required)"
    );
}
