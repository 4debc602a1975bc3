use super::{needs_resolution, NodeField, VarRef};

#[test]
fn parses_alert_reference() {
    assert_eq!(
        VarRef::parse("@alert:srcIp"),
        Some(VarRef::Alert("srcIp".to_string()))
    );
}

#[test]
fn parses_node_field_reference() {
    assert_eq!(
        VarRef::parse("@node:ac1$reputationScore"),
        Some(VarRef::Node {
            node_id: "ac1".to_string(),
            field: NodeField::Named("reputationScore".to_string()),
        })
    );
}

#[test]
fn parses_node_raw_reference() {
    assert_eq!(
        VarRef::parse("@node:lookup-7$raw"),
        Some(VarRef::Node {
            node_id: "lookup-7".to_string(),
            field: NodeField::Raw,
        })
    );
}

#[test]
fn node_reference_splits_at_first_dollar() {
    let parsed = VarRef::parse("@node:a$b$c").expect("must parse");
    assert_eq!(
        parsed,
        VarRef::Node {
            node_id: "a".to_string(),
            field: NodeField::Named("b$c".to_string()),
        }
    );
}

#[test]
fn malformed_node_references_are_rejected() {
    assert_eq!(VarRef::parse("@node:ac1"), None);
    assert_eq!(VarRef::parse("@node:$field"), None);
    assert_eq!(VarRef::parse("@node:ac1$"), None);
}

#[test]
fn parses_exported_reference() {
    assert_eq!(
        VarRef::parse("$n1_reputationScore"),
        Some(VarRef::Exported("n1_reputationScore".to_string()))
    );
    assert_eq!(VarRef::parse("$"), None);
}

#[test]
fn unknown_prefixes_are_not_references() {
    assert_eq!(VarRef::parse("@enrichment:foo"), None);
    assert_eq!(VarRef::parse("plain"), None);
}

#[test]
fn display_matches_source_form() {
    for token in ["@alert:dstIp", "@node:ac2$raw", "@node:ac2$domainName", "$verdict"] {
        let parsed = VarRef::parse(token).expect("must parse");
        assert_eq!(parsed.to_string(), token);
    }
}

#[test]
fn resolution_needed_for_at_and_dollar_tokens() {
    assert!(needs_resolution("@alert:x"));
    assert!(needs_resolution("$x"));
    assert!(!needs_resolution("50"));
    assert!(!needs_resolution("192.168.0.4"));
}
