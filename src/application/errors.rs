use std::path::PathBuf;

/// Failures that stop a run before or outside batch execution.
///
/// Per-batch failures never surface here; they are recorded in the run summary.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("{driver} driver is not available in this build")]
    #[cfg_attr(feature = "mssql", allow(dead_code))]
    DependencyMissing { driver: &'static str },

    #[error("Unable to connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("Unable to read script file {}: {source}", .path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
