pub mod run_summary;
pub mod script_batch;
