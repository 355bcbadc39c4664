use tracing::{debug, info, warn};

use crate::{
    application::{
        commands::RunMigrationCommand,
        connection::{BatchConnection, Connector, DatabaseError},
        errors::MigrationError,
        reporter::RunReporter,
    },
    domain::{
        run_summary::{BatchResult, RunSummary},
        script_batch::{BatchSplitter, ScriptBatch},
    },
};

#[derive(Debug)]
pub struct RunMigrationUseCase<C> {
    connector: C,
}

impl<C: Connector> RunMigrationUseCase<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Reads and splits the script without touching the database.
    pub async fn preview(
        &self,
        command: &RunMigrationCommand,
    ) -> Result<Vec<ScriptBatch>, MigrationError> {
        let splitter = BatchSplitter::new(&command.delimiter)
            .map_err(|error| MigrationError::Configuration(error.to_string()))?;

        let script = tokio::fs::read_to_string(&command.script_path)
            .await
            .map_err(|source| MigrationError::ScriptRead {
                path: command.script_path.clone(),
                source,
            })?;

        let batches = splitter.split(&script);
        debug!(
            path = %command.script_path.display(),
            delimiter = splitter.delimiter(),
            batch_count = batches.len(),
            "script split into batches"
        );
        Ok(batches)
    }

    pub async fn execute(
        &self,
        command: &RunMigrationCommand,
        reporter: &mut dyn RunReporter,
    ) -> Result<RunSummary, MigrationError> {
        let batches = self.preview(command).await?;
        if batches.is_empty() {
            warn!(
                path = %command.script_path.display(),
                "script contains no executable batches, skipping connection"
            );
            return Ok(RunSummary::default());
        }

        reporter.connecting(&command.connection);
        let mut connection = self.connector.connect(&command.connection).await?;
        info!(target_db = %command.connection.target(), "connected");

        let summary = execute_batches(connection.as_mut(), batches, reporter).await;

        if let Err(error) = connection.close().await {
            warn!(%error, "failed to close connection cleanly");
        }
        Ok(summary)
    }
}

/// Runs every batch once, in order, committing or rolling back each on its own.
///
/// A failing batch is recorded and never stops the batches after it.
pub async fn execute_batches(
    connection: &mut dyn BatchConnection,
    batches: Vec<ScriptBatch>,
    reporter: &mut dyn RunReporter,
) -> RunSummary {
    let batch_count = batches.len();
    reporter.run_started(batch_count);

    let mut summary = RunSummary::default();
    for batch in batches {
        reporter.batch_started(&batch, batch_count);
        let result = execute_batch(connection, &batch).await;
        reporter.batch_finished(&result, batch_count);
        summary.record(result);
    }

    info!(
        succeeded = summary.succeeded_count(),
        failed = summary.failed_count(),
        "run completed"
    );
    summary
}

async fn execute_batch(connection: &mut dyn BatchConnection, batch: &ScriptBatch) -> BatchResult {
    let outcome = match submit(connection, &batch.sql).await {
        Ok(()) => connection.commit().await,
        Err(error) => Err(error),
    };

    match outcome {
        Ok(()) => {
            debug!(index = batch.index, "batch committed");
            BatchResult::succeeded(batch.index)
        }
        Err(error) => {
            warn!(index = batch.index, %error, "batch failed, rolling back");
            if let Err(rollback_error) = connection.rollback().await {
                warn!(index = batch.index, error = %rollback_error, "rollback failed");
            }
            BatchResult::failed(batch.index, error.message())
        }
    }
}

async fn submit(connection: &mut dyn BatchConnection, sql: &str) -> Result<(), DatabaseError> {
    connection.execute(sql).await?;
    let drained = connection.drain_pending_result_sets().await?;
    if drained > 0 {
        debug!(drained, "discarded pending result sets");
    }
    Ok(())
}
