use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "playbook-runner")]
#[command(about = "Security playbook runner CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Execute a playbook against alert data and print the annotated report.
    Run(RunCommand),
    /// Parse and build a playbook without executing it.
    Validate(ValidateCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunCommand {
    #[arg(long)]
    pub playbook: PathBuf,
    #[arg(long)]
    pub alert_data: PathBuf,
    #[arg(long)]
    pub mock_scenarios: Option<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub result_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ReportFormat::Yaml)]
    pub format: ReportFormat,
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ValidateCommand {
    #[arg(long)]
    pub playbook: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        matches!(&self.command, Commands::Run(command) if command.verbose)
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
