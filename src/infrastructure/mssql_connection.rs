//! SQL Server connection backed by tiberius.

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::{
    application::{
        commands::ConnectionSettings,
        connection::{BatchConnection, DatabaseError},
        errors::MigrationError,
    },
    infrastructure::mssql_connector::MSSQL_DRIVER_NAME,
};

const APPLICATION_NAME: &str = "sql-batch-runner";
const ENABLE_IMPLICIT_TRANSACTIONS: &str = "SET IMPLICIT_TRANSACTIONS ON";
const COMMIT_OPEN_TRANSACTION: &str = "IF @@TRANCOUNT > 0 COMMIT TRANSACTION";
const ROLLBACK_OPEN_TRANSACTION: &str = "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION";

type TdsClient = Client<Compat<TcpStream>>;

pub struct MssqlConnection {
    client: Option<TdsClient>,
    pending_result_sets: usize,
}

impl MssqlConnection {
    /// Connects and switches the session to implicit transactions, so every
    /// batch opens a transaction that `commit`/`rollback` then close.
    #[tracing::instrument(skip(settings), fields(target_db = %settings.target(), port = settings.port))]
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, MigrationError> {
        tracing::debug!(driver = MSSQL_DRIVER_NAME, "connecting");
        let target = settings.target();
        let connection_failed = |reason: String| MigrationError::Connection {
            target: target.clone(),
            reason,
        };

        let mut client = tokio::time::timeout(
            settings.connect_timeout,
            open_client(build_config(settings)),
        )
        .await
        .map_err(|_| {
            connection_failed(format!(
                "timed out after {}s",
                settings.connect_timeout.as_secs()
            ))
        })?
        .map_err(|error| connection_failed(error.to_string()))?;

        client
            .simple_query(ENABLE_IMPLICIT_TRANSACTIONS)
            .await
            .map_err(|error| connection_failed(error.to_string()))?
            .into_results()
            .await
            .map_err(|error| connection_failed(error.to_string()))?;

        tracing::debug!("connected with implicit transactions enabled");
        Ok(Self {
            client: Some(client),
            pending_result_sets: 0,
        })
    }

    fn client(&mut self) -> Result<&mut TdsClient, DatabaseError> {
        self.client
            .as_mut()
            .ok_or_else(|| DatabaseError::new("Connection is closed"))
    }

    async fn run_to_completion(&mut self, sql: &str) -> Result<usize, DatabaseError> {
        let result_sets = self
            .client()?
            .simple_query(sql)
            .await
            .map_err(database_error)?
            .into_results()
            .await
            .map_err(database_error)?;
        Ok(result_sets.len())
    }
}

#[async_trait]
impl BatchConnection for MssqlConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError> {
        // Errors raised by later statements of the batch only show up while the
        // response stream is read, so the whole stream is consumed here.
        self.pending_result_sets = self.run_to_completion(sql).await?;
        Ok(())
    }

    async fn drain_pending_result_sets(&mut self) -> Result<usize, DatabaseError> {
        Ok(std::mem::take(&mut self.pending_result_sets))
    }

    async fn commit(&mut self) -> Result<(), DatabaseError> {
        self.run_to_completion(COMMIT_OPEN_TRANSACTION).await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DatabaseError> {
        self.pending_result_sets = 0;
        self.run_to_completion(ROLLBACK_OPEN_TRANSACTION).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DatabaseError> {
        if let Some(client) = self.client.take() {
            client.close().await.map_err(database_error)?;
            tracing::debug!("connection closed");
        }
        Ok(())
    }
}

fn build_config(settings: &ConnectionSettings) -> Config {
    let mut config = Config::new();
    config.host(&settings.host);
    config.port(settings.port);
    config.database(&settings.database);
    config.application_name(APPLICATION_NAME);
    config.authentication(AuthMethod::sql_server(
        &settings.username,
        &settings.password,
    ));

    if settings.encrypt {
        config.encryption(EncryptionLevel::Required);
    } else {
        config.encryption(EncryptionLevel::Off);
    }
    if settings.trust_server_certificate {
        config.trust_cert();
    }
    config
}

async fn open_client(config: Config) -> tiberius::Result<TdsClient> {
    match connect_tcp(config.clone()).await {
        // Azure SQL gateways answer the first login with a redirect.
        Err(tiberius::error::Error::Routing { host, port }) => {
            tracing::debug!(%host, port, "following server redirect");
            let mut redirected = config;
            redirected.host(&host);
            redirected.port(port);
            connect_tcp(redirected).await
        }
        result => result,
    }
}

async fn connect_tcp(config: Config) -> tiberius::Result<TdsClient> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    Client::connect(config, tcp.compat_write()).await
}

fn database_error(error: tiberius::error::Error) -> DatabaseError {
    DatabaseError::new(error.to_string())
}
