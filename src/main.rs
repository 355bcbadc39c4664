mod application;
mod domain;
mod infrastructure;
mod interfaces;

use std::process::ExitCode;

use anyhow::Result;
use console::style;

use crate::application::use_cases::run_migration::RunMigrationUseCase;
use crate::infrastructure::mssql_connector::MssqlConnector;
use crate::interfaces::{
    cli::collect_run_command, console_reporter::ConsoleReporter, fallback::FallbackInstructions,
};

const EXIT_COMPLETED_WITH_FAILURES: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let invocation = collect_run_command()?;
    init_logging(invocation.verbose);

    let command = invocation.command;
    let use_case = RunMigrationUseCase::new(MssqlConnector);
    let mut reporter = ConsoleReporter;

    if command.dry_run {
        return match use_case.preview(&command).await {
            Ok(batches) => {
                reporter.print_preview(&batches);
                Ok(ExitCode::SUCCESS)
            }
            Err(error) => {
                eprintln!("{} {error}", style("Error:").red().bold());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    reporter.print_banner("RUNNING DATABASE MIGRATION");
    match use_case.execute(&command, &mut reporter).await {
        Ok(summary) => {
            reporter.print_summary(&summary, &command.next_steps);
            if summary.has_failures() {
                Ok(ExitCode::from(EXIT_COMPLETED_WITH_FAILURES))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(error) => {
            tracing::error!(%error, "migration could not start");
            reporter.print_fallback(&FallbackInstructions::for_error(&error, &command));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Logs go to stderr so progress output on stdout stays readable.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = if verbose {
        EnvFilter::new("sql_batch_runner=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
