use super::{Cli, Commands, OutputFormat, ReportFormat};
use clap::{CommandFactory, Parser};

#[test]
fn cli_help_includes_top_level_commands() {
    let mut command = Cli::command();
    let help = command.render_long_help().to_string();
    assert!(help.contains("run"));
    assert!(help.contains("validate"));
}

#[test]
fn cli_parses_run_with_all_flags() {
    let cli = Cli::try_parse_from([
        "playbook-runner",
        "run",
        "--playbook",
        "playbook.yaml",
        "--alert-data",
        "alert.json",
        "--mock-scenarios",
        "mock.json",
        "--config",
        "runner.yaml",
        "--result-file",
        "result.yaml",
        "--format",
        "json",
        "--verbose",
    ])
    .expect("run must parse");
    assert!(cli.verbose());
    match cli.command {
        Commands::Run(command) => {
            assert_eq!(command.format, ReportFormat::Json);
            assert_eq!(
                command.mock_scenarios.as_deref(),
                Some(std::path::Path::new("mock.json"))
            );
            assert_eq!(
                command.result_file.as_deref(),
                Some(std::path::Path::new("result.yaml"))
            );
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn cli_run_defaults_to_yaml_report() {
    let cli = Cli::try_parse_from([
        "playbook-runner",
        "run",
        "--playbook",
        "playbook.yaml",
        "--alert-data",
        "alert.json",
    ])
    .expect("run must parse");
    assert!(!cli.verbose());
    match cli.command {
        Commands::Run(command) => {
            assert_eq!(command.format, ReportFormat::Yaml);
            assert!(command.config.is_none());
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn cli_run_requires_alert_data() {
    let error = Cli::try_parse_from(["playbook-runner", "run", "--playbook", "playbook.yaml"])
        .expect_err("alert data is required");
    assert!(error.to_string().contains("--alert-data"));
}

#[test]
fn cli_parses_validate() {
    let cli = Cli::try_parse_from([
        "playbook-runner",
        "validate",
        "--playbook",
        "playbook.yaml",
        "--format",
        "json",
    ])
    .expect("validate must parse");
    match cli.command {
        Commands::Validate(command) => assert_eq!(command.format, OutputFormat::Json),
        _ => panic!("expected validate"),
    }
}
