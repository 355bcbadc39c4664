use crate::{
    application::commands::ConnectionSettings,
    domain::{run_summary::BatchResult, script_batch::ScriptBatch},
};

/// Receives progress while a run is in flight.
pub trait RunReporter {
    fn connecting(&mut self, _settings: &ConnectionSettings) {}

    fn run_started(&mut self, _batch_count: usize) {}

    fn batch_started(&mut self, _batch: &ScriptBatch, _batch_count: usize) {}

    fn batch_finished(&mut self, _result: &BatchResult, _batch_count: usize) {}
}

