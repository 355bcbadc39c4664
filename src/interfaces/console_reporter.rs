use console::style;

use crate::{
    application::{commands::ConnectionSettings, reporter::RunReporter},
    domain::{
        run_summary::{BatchResult, RunSummary},
        script_batch::ScriptBatch,
    },
    interfaces::fallback::FallbackInstructions,
};

const PREVIEW_LINES: usize = 3;

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn print_banner(&self, title: &str) {
        println!();
        println!("{}", style(format!(" {title} ")).black().on_cyan().bold());
        println!();
    }

    pub fn print_summary(&self, summary: &RunSummary, next_steps: &[String]) {
        self.print_banner("MIGRATION COMPLETED");
        println!(
            "{} succeeded, {} failed ({} batches)",
            style(summary.succeeded_count()).green().bold(),
            style(summary.failed_count()).red().bold(),
            summary.len()
        );
        if summary.is_empty() {
            println!("{}", style("The script contained no executable batches.").dim());
        }
        for result in summary.results() {
            if let Some(message) = result.error_message() {
                println!("  {} batch {}: {message}", style("✗").red(), result.index);
            }
        }

        if !next_steps.is_empty() {
            println!();
            println!("{}", style("Next steps:").bold());
            for step in next_steps {
                println!("  {step}");
            }
        }
        println!();
    }

    pub fn print_fallback(&self, instructions: &FallbackInstructions) {
        println!();
        println!("{} {}", style("❌").red(), style(&instructions.headline).red().bold());
        for remedy in &instructions.remedies {
            println!();
            println!("{remedy}");
        }
        println!();
        println!("{}", style("Migration could not start. Run it manually:").yellow());
        for (position, step) in instructions.manual_steps.iter().enumerate() {
            println!("{}. {step}", position + 1);
        }
        println!();
    }

    pub fn print_preview(&self, batches: &[ScriptBatch]) {
        println!(
            "{} {} batches",
            style("Dry run:").cyan().bold(),
            batches.len()
        );
        for batch in batches {
            println!();
            println!("{}", style(format!("[{}/{}]", batch.index, batches.len())).bold());
            for line in batch.sql.lines().take(PREVIEW_LINES) {
                println!("  {}", style(line).dim());
            }
            let hidden_lines = batch.sql.lines().count().saturating_sub(PREVIEW_LINES);
            if hidden_lines > 0 {
                println!("  {}", style(format!("... {hidden_lines} more lines")).dim());
            }
        }
        println!();
    }
}

impl RunReporter for ConsoleReporter {
    fn connecting(&mut self, settings: &ConnectionSettings) {
        println!("Connecting to: {}...", style(settings.target()).bold());
    }

    fn run_started(&mut self, batch_count: usize) {
        println!();
        println!("Executing {batch_count} SQL batches...");
        println!();
    }

    fn batch_started(&mut self, batch: &ScriptBatch, batch_count: usize) {
        println!("[{}/{}] Executing batch...", batch.index, batch_count);
    }

    fn batch_finished(&mut self, result: &BatchResult, _batch_count: usize) {
        match result.error_message() {
            None => println!("{} Batch {} completed", style("✅").green(), result.index),
            Some(message) => println!(
                "{} Batch {} error: {}",
                style("⚠️").yellow(),
                result.index,
                style(message).yellow()
            ),
        }
    }
}
