use async_trait::async_trait;

use crate::application::{
    commands::ConnectionSettings,
    connection::{BatchConnection, Connector},
    errors::MigrationError,
};

pub const MSSQL_DRIVER_NAME: &str = "SQL Server (tiberius)";

/// Opens SQL Server connections when the `mssql` feature is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlConnector;

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Box<dyn BatchConnection>, MigrationError> {
        open_connection(settings).await
    }
}

#[cfg(feature = "mssql")]
async fn open_connection(
    settings: &ConnectionSettings,
) -> Result<Box<dyn BatchConnection>, MigrationError> {
    let connection =
        crate::infrastructure::mssql_connection::MssqlConnection::connect(settings).await?;
    Ok(Box::new(connection))
}

#[cfg(not(feature = "mssql"))]
async fn open_connection(
    settings: &ConnectionSettings,
) -> Result<Box<dyn BatchConnection>, MigrationError> {
    tracing::error!(target_db = %settings.target(), "built without the mssql feature");
    Err(MigrationError::DependencyMissing {
        driver: MSSQL_DRIVER_NAME,
    })
}

#[cfg(all(test, not(feature = "mssql")))]
mod tests {
    use std::time::Duration;

    use super::MssqlConnector;
    use crate::application::{
        commands::ConnectionSettings, connection::Connector, errors::MigrationError,
    };

    #[tokio::test]
    async fn reports_missing_driver_without_feature() {
        let settings = ConnectionSettings {
            host: "localhost".to_string(),
            port: 1433,
            database: "app".to_string(),
            username: "sa".to_string(),
            password: String::new(),
            encrypt: true,
            trust_server_certificate: false,
            connect_timeout: Duration::from_secs(1),
        };

        let error = MssqlConnector
            .connect(&settings)
            .await
            .err()
            .expect("connect should fail without the driver");

        assert!(matches!(error, MigrationError::DependencyMissing { .. }));
    }
}
