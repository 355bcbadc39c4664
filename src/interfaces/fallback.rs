use crate::application::{commands::RunMigrationCommand, errors::MigrationError};

/// Manual steps printed when a run cannot start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackInstructions {
    pub headline: String,
    pub remedies: Vec<String>,
    pub manual_steps: Vec<String>,
}

impl FallbackInstructions {
    pub fn for_error(error: &MigrationError, command: &RunMigrationCommand) -> Self {
        let (headline, remedies) = match error {
            MigrationError::DependencyMissing { driver } => (
                format!("{driver} driver not available."),
                vec![
                    "Reinstall with the driver enabled: cargo install sql-batch-runner --features mssql"
                        .to_string(),
                ],
            ),
            other => (format!("Error: {other}"), Vec::new()),
        };

        Self {
            headline,
            remedies,
            manual_steps: manual_steps(command),
        }
    }
}

fn manual_steps(command: &RunMigrationCommand) -> Vec<String> {
    let connection = &command.connection;
    let script = command.script_path.display();
    let mut steps = Vec::new();

    if connection.host.is_empty() {
        steps.push("Open a SQL client connected to the target database".to_string());
    } else {
        steps.push(format!(
            "Open a SQL client (sqlcmd, Azure Data Studio or the Azure Portal query editor) connected to {}",
            connection.target()
        ));
    }
    if !connection.username.is_empty() {
        steps.push(format!("Sign in as: {}", connection.username));
    }
    steps.push(format!("Load the SQL from: {script}"));
    steps.push(format!(
        "Run it; batches are separated by lines containing only `{}`",
        command.delimiter
    ));
    if !connection.host.is_empty() {
        steps.push(format!(
            "Or from a shell: sqlcmd -S {},{} -d {} -U {} -i {script}",
            connection.host, connection.port, connection.database, connection.username
        ));
    }
    steps
}
