#[cfg(feature = "mssql")]
pub mod mssql_connection;
pub mod mssql_connector;
