use clap::Parser;
use playbook_runner::{execute_run, execute_validate, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose());

    let result = match &cli.command {
        Commands::Run(command) => execute_run(command),
        Commands::Validate(command) => execute_validate(command),
    };

    match result {
        Ok(output) => {
            println!("{}", output.rendered);
            if !output.success {
                std::process::exit(2);
            }
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "playbook=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
