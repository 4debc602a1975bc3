mod cli;
mod config;
mod io;
mod run;

pub use cli::{Cli, Commands, OutputFormat, ReportFormat, RunCommand, ValidateCommand};
pub use config::{
    build_action_router, load_runner_config, validate_runner_config, BackendConfig, RunnerConfig,
    RunnerConfigError, RunnerEngineConfig, CLI_MOCK_BACKEND, RUNNER_CONFIG_SCHEMA,
};
pub use io::{read_alert_data, read_playbook_document, write_result_file};
pub use run::{execute_run, execute_validate, CommandOutput, RunReport, RunnerError};
