use async_trait::async_trait;

use crate::application::{commands::ConnectionSettings, errors::MigrationError};

/// Error text reported by the database for a single batch operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DatabaseError {
    message: String,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An open connection that batches are executed against, one at a time.
#[async_trait]
pub trait BatchConnection: Send {
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError>;

    /// Consumes any result sets still pending after `execute`.
    ///
    /// Returns how many were discarded. Engines that never leave secondary
    /// result sets behind keep this default.
    async fn drain_pending_result_sets(&mut self) -> Result<usize, DatabaseError> {
        Ok(0)
    }

    async fn commit(&mut self) -> Result<(), DatabaseError>;

    async fn rollback(&mut self) -> Result<(), DatabaseError>;

    async fn close(&mut self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Box<dyn BatchConnection>, MigrationError>;
}
