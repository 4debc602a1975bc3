use super::{execute_run, execute_validate, RunnerError};
use crate::cli::{OutputFormat, ReportFormat, RunCommand, ValidateCommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const PLAYBOOK: &str = r#"
- id: ac1
  urn: www.vt.com/ip
  params:
    ipv4Addr: "@alert:srcIp"
  exports:
    score: reputationScore
- id: if1
  type: if
  condition: "$score >= 50"
  onTrue:
    - id: ac2
      urn: www.fw.com/block
      params:
        ip: "@alert:srcIp"
  onFalse:
    - urn: www.fw.com/allow
"#;

const SCENARIOS: &str = r#"[
  {"actionUrn": "www.vt.com/ip", "scenarios": [
    {"input": {"ipv4Addr": "192.168.0.1"}, "outputFields": {"reputationScore": "90"}},
    {"input": {"ipv4Addr": "10.0.0.66"}, "error": "quota exceeded"}
  ]},
  {"actionUrn": "www.fw.com/block", "scenarios": [
    {"input": {"ip": "*"}, "outputJson": "{\"blocked\": true}"}
  ]}
]"#;

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("playbook-run-{prefix}-{nanos}"));
    fs::create_dir_all(&dir).expect("must create temp dir");
    dir
}

fn run_command(dir: &Path, src_ip: &str) -> RunCommand {
    fs::write(dir.join("playbook.yaml"), PLAYBOOK).expect("write playbook");
    fs::write(dir.join("scenarios.json"), SCENARIOS).expect("write scenarios");
    fs::write(
        dir.join("alert.json"),
        format!(r#"{{"srcIp": "{src_ip}"}}"#),
    )
    .expect("write alert");
    RunCommand {
        playbook: dir.join("playbook.yaml"),
        alert_data: dir.join("alert.json"),
        mock_scenarios: Some(dir.join("scenarios.json")),
        config: None,
        result_file: None,
        format: ReportFormat::Json,
        verbose: false,
    }
}

#[test]
fn run_reports_every_node_and_takes_the_true_branch() {
    let dir = temp_dir("ok");
    let mut command = run_command(&dir, "192.168.0.1");
    command.result_file = Some(dir.join("out/report.json"));

    let output = execute_run(&command).expect("run must succeed");
    assert!(output.success);

    let report: serde_json::Value = serde_json::from_str(&output.rendered).expect("json report");
    assert_eq!(report["status"], "completed");
    assert_eq!(report["totalActionExecutions"], 2);
    assert_eq!(report["exported"]["score"], "90");
    assert_eq!(report["nodes"][0]["state"], "Done");
    assert_eq!(report["nodes"][0]["concreteParams"]["ipv4Addr"], "192.168.0.1");
    assert_eq!(report["nodes"][1]["conditionEvaluatedTo"], true);
    assert_eq!(report["nodes"][1]["onTrue"][0]["resultRaw"], "{\"blocked\": true}");
    assert_eq!(report["nodes"][1]["onFalse"][0]["state"], "Not-Yet-Started");
    assert_eq!(report["nodes"][1]["onFalse"][0]["id"], "1");

    let written = fs::read_to_string(dir.join("out/report.json")).expect("result file");
    assert_eq!(written, output.rendered);
}

#[test]
fn backend_failure_halts_and_is_not_a_success() {
    let dir = temp_dir("halt");
    let mut command = run_command(&dir, "10.0.0.66");
    command.format = ReportFormat::Yaml;

    let output = execute_run(&command).expect("report is still produced");
    assert!(!output.success);
    assert!(output.rendered.contains("status: halted"));
    assert!(output.rendered.contains("quota exceeded"));
}

#[test]
fn run_without_any_backend_is_rejected() {
    let dir = temp_dir("no-backend");
    let mut command = run_command(&dir, "192.168.0.1");
    command.mock_scenarios = None;
    let error = execute_run(&command).expect_err("no backend");
    assert!(matches!(error, RunnerError::NoBackends));
}

#[test]
fn invalid_playbook_is_rejected_before_execution() {
    let dir = temp_dir("invalid");
    let command = run_command(&dir, "192.168.0.1");
    fs::write(&command.playbook, "- id: if1\n  type: if\n").expect("overwrite playbook");
    let error = execute_run(&command).expect_err("missing condition");
    match error {
        RunnerError::PlaybookInvalid(issues) => {
            assert!(issues.iter().any(|issue| issue.kind == "missing_field"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn validate_counts_nested_nodes_and_lists_warnings() {
    let dir = temp_dir("validate");
    let path = dir.join("playbook.yaml");
    fs::write(&path, PLAYBOOK).expect("write playbook");

    let text = execute_validate(&ValidateCommand {
        playbook: path.clone(),
        format: OutputFormat::Text,
    })
    .expect("validate");
    assert!(text.success);
    assert!(text.rendered.starts_with("playbook valid: 4 nodes"));

    fs::write(&path, "- id: a\n  type: loop\n").expect("overwrite playbook");
    let json = execute_validate(&ValidateCommand {
        playbook: path,
        format: OutputFormat::Json,
    })
    .expect("validate");
    assert!(!json.success);
    let body: serde_json::Value = serde_json::from_str(&json.rendered).expect("json output");
    assert_eq!(body["valid"], false);
    assert_eq!(body["issues"][0]["kind"], "unknown_type");
}
