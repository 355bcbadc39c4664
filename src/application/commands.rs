use std::{fmt, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    pub connect_timeout: Duration,
}

impl ConnectionSettings {
    /// `host/database`, as shown in progress output and error messages.
    pub fn target(&self) -> String {
        format!("{}/{}", self.host, self.database)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RunMigrationCommand {
    pub script_path: PathBuf,
    pub delimiter: String,
    pub connection: ConnectionSettings,
    pub dry_run: bool,
    pub next_steps: Vec<String>,
}
