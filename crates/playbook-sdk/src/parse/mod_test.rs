use super::{parse_playbook, parse_playbook_with_format, DocumentFormat};

const YAML_PLAYBOOK: &str = r#"
- id: ac1
  urn: www.vt.com/soar-services/v1/checkIpReputation
  params:
    ipv4Addr: "@alert:srcIp"
  exports:
    n1_reputationScore: reputationScore
- id: if3
  type: if
  condition: "@node:ac1$reputationScore == 50"
  onTrue:
    - urn: www.rptsec.com/sms/v1/getDomainForIp
      params:
        ipv4Addr: "@alert:srcIp"
  onFalse:
    - urn: www.vt.com/soar-services/v1/checkIpReputation
      params:
        ipv4Addr: 192.168.0.4
- type: for
  iterateOn: $domains
  body:
    - urn: www.vt.com/soar-services/v1/checkDomainReputation
"#;

#[test]
fn parses_yaml_sequence_with_original_field_names() {
    let document = parse_playbook(YAML_PLAYBOOK).expect("yaml must parse");
    assert_eq!(document.nodes.len(), 3);

    let action = &document.nodes[0];
    assert_eq!(action.id.as_deref(), Some("ac1"));
    assert_eq!(action.effective_type(), "execute");
    assert_eq!(action.params["ipv4Addr"], "@alert:srcIp");
    assert_eq!(action.exports["n1_reputationScore"], "reputationScore");

    let branch = &document.nodes[1];
    assert_eq!(branch.effective_type(), "if");
    assert_eq!(branch.on_true.len(), 1);
    assert_eq!(branch.on_false[0].params["ipv4Addr"], "192.168.0.4");

    let looped = &document.nodes[2];
    assert_eq!(looped.iterate_on.as_deref(), Some("$domains"));
    assert_eq!(looped.body.len(), 1);
}

#[test]
fn auto_detects_json() {
    let document = parse_playbook(
        r#"[{"id":"a","urn":"urn:x","params":{"k":"v"}},{"type":"if","condition":"$a == 1"}]"#,
    )
    .expect("json must parse");
    assert_eq!(document.nodes.len(), 2);
    assert_eq!(document.nodes[1].condition.as_deref(), Some("$a == 1"));
}

#[test]
fn malformed_input_reports_parse_issue() {
    let issues = parse_playbook_with_format("{not json", DocumentFormat::Json)
        .expect_err("must reject");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "parse_error");
    assert_eq!(issues[0].reference.as_deref(), Some("json.parse_error"));
}

#[test]
fn yaml_mapping_at_top_level_is_rejected() {
    let issues = parse_playbook("id: lonely\nurn: x\n").expect_err("must reject");
    assert_eq!(issues[0].reference.as_deref(), Some("yaml.parse_error"));
}

#[test]
fn format_follows_extension() {
    assert_eq!(DocumentFormat::from_extension(Some("yml")), DocumentFormat::Yaml);
    assert_eq!(DocumentFormat::from_extension(Some("json")), DocumentFormat::Json);
    assert_eq!(DocumentFormat::from_extension(None), DocumentFormat::Auto);
}

#[test]
fn unquoted_scalar_params_become_text() {
    let document = parse_playbook(
        "- urn: www.example.com/v1/lookup\n  params:\n    limit: 50\n    strict: true\n",
    )
    .expect("yaml must parse");
    assert_eq!(document.nodes[0].params["limit"], "50");
    assert_eq!(document.nodes[0].params["strict"], "true");
}
