use std::{env, path::PathBuf, time::Duration};

use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser};
use console::{Term, style};
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use crate::{
    application::commands::{
        ConnectionSettings, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PORT, RunMigrationCommand,
    },
    domain::script_batch::DEFAULT_DELIMITER,
};

#[derive(Debug, Parser)]
#[command(
    name = "sql-batch-runner",
    version,
    about = "Run a GO-separated SQL script against SQL Server, one batch at a time"
)]
struct CliArgs {
    #[arg(long, short = 'i', env = "SQL_BATCH_SCRIPT", help = "Path to the SQL script")]
    script: Option<PathBuf>,
    #[arg(long, short = 'S', env = "SQL_BATCH_SERVER")]
    server: Option<String>,
    #[arg(long, env = "SQL_BATCH_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long, short = 'd', env = "SQL_BATCH_DATABASE")]
    database: Option<String>,
    #[arg(long, short = 'U', env = "SQL_BATCH_USER")]
    user: Option<String>,
    #[arg(
        long,
        short = 'P',
        env = "SQL_BATCH_PASSWORD",
        hide_env_values = true,
        help = "Prompted for when omitted on a terminal"
    )]
    password: Option<String>,
    #[arg(long, env = "SQL_BATCH_DELIMITER", default_value = DEFAULT_DELIMITER)]
    delimiter: String,
    #[arg(long, env = "SQL_BATCH_CONNECT_TIMEOUT", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,
    #[arg(
        long = "no-encrypt",
        env = "SQL_BATCH_NO_ENCRYPT",
        action = ArgAction::SetFalse,
        help = "Disable TLS encryption of the session"
    )]
    encrypt: bool,
    #[arg(long, env = "SQL_BATCH_TRUST_SERVER_CERTIFICATE")]
    trust_server_certificate: bool,
    #[arg(long, help = "List the batches without connecting")]
    dry_run: bool,
    #[arg(long = "next-step", help = "Hint printed after a completed run, repeatable")]
    next_steps: Vec<String>,
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug)]
pub struct CliInvocation {
    pub command: RunMigrationCommand,
    pub verbose: bool,
}

pub fn collect_run_command() -> Result<CliInvocation> {
    if env::args_os().len() == 1 {
        return collect_interactive_command();
    }
    collect_command_from_args(CliArgs::parse())
}

fn collect_command_from_args(args: CliArgs) -> Result<CliInvocation> {
    let script_path = args
        .script
        .ok_or_else(|| anyhow!("--script is required when using argument mode"))?;

    let (host, database, username, password) = if args.dry_run {
        (
            args.server.unwrap_or_default(),
            args.database.unwrap_or_default(),
            args.user.unwrap_or_default(),
            args.password.unwrap_or_default(),
        )
    } else {
        let host = required_value(args.server, "--server")?;
        let database = required_value(args.database, "--database")?;
        let username = required_value(args.user, "--user")?;
        let password = match args.password {
            Some(password) => password,
            None => prompt_password(&username)?,
        };
        (host, database, username, password)
    };

    let connection = ConnectionSettings {
        host,
        port: args.port,
        database,
        username,
        password,
        encrypt: args.encrypt,
        trust_server_certificate: args.trust_server_certificate,
        connect_timeout: Duration::from_secs(args.connect_timeout),
    };

    Ok(CliInvocation {
        command: RunMigrationCommand {
            script_path,
            delimiter: ensure_non_empty_value(args.delimiter, "Batch delimiter")?,
            connection,
            dry_run: args.dry_run,
            next_steps: args.next_steps,
        },
        verbose: args.verbose,
    })
}

fn collect_interactive_command() -> Result<CliInvocation> {
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{}",
        style(" SQL BATCH RUNNER ")
            .black()
            .on_cyan()
            .bold()
            .underlined()
    );
    println!("{}", style("Run a migration script one batch at a time").dim());
    println!();

    let script_path: String = Input::with_theme(&theme)
        .with_prompt("SQL script path")
        .validate_with(|value: &String| {
            if value.trim().is_empty() {
                Err("Script path must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let host: String = Input::with_theme(&theme)
        .with_prompt("Server host")
        .interact_text()?;

    let port: u16 = Input::with_theme(&theme)
        .with_prompt("Server port")
        .default(DEFAULT_PORT)
        .interact_text()?;

    let database: String = Input::with_theme(&theme)
        .with_prompt("Database")
        .interact_text()?;

    let username: String = Input::with_theme(&theme)
        .with_prompt("Username")
        .interact_text()?;

    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact()?;

    let delimiter: String = Input::with_theme(&theme)
        .with_prompt("Batch delimiter")
        .default(DEFAULT_DELIMITER.to_string())
        .interact_text()?;

    let trust_server_certificate = Confirm::with_theme(&theme)
        .with_prompt("Trust the server certificate without validation?")
        .default(false)
        .interact()?;

    Ok(CliInvocation {
        command: RunMigrationCommand {
            script_path: PathBuf::from(script_path.trim()),
            delimiter: ensure_non_empty_value(delimiter, "Batch delimiter")?,
            connection: ConnectionSettings {
                host: ensure_non_empty_value(host, "Server host")?.trim().to_string(),
                port,
                database: ensure_non_empty_value(database, "Database")?
                    .trim()
                    .to_string(),
                username: ensure_non_empty_value(username, "Username")?
                    .trim()
                    .to_string(),
                password,
                encrypt: true,
                trust_server_certificate,
                connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            dry_run: false,
            next_steps: Vec::new(),
        },
        verbose: false,
    })
}

fn prompt_password(username: &str) -> Result<String> {
    if !Term::stderr().is_term() {
        return Err(anyhow!(
            "--password (or SQL_BATCH_PASSWORD) is required when not attached to a terminal"
        ));
    }
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Password for {username}"))
        .interact()?)
}

fn required_value(value: Option<String>, flag: &str) -> Result<String> {
    let value = value.ok_or_else(|| anyhow!("{flag} is required when using argument mode"))?;
    ensure_non_empty_value(value, flag)
}

fn ensure_non_empty_value(value: String, field_name: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(anyhow!("{field_name} must not be empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::{ffi::OsString, path::PathBuf, time::Duration};

    use clap::{CommandFactory, FromArgMatches};

    use super::{CliArgs, collect_command_from_args};

    fn parse_args_without_env<I, T>(args: I) -> Result<CliArgs, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = CliArgs::command()
            .mut_args(|arg| arg.env(None::<&str>))
            .try_get_matches_from(args)?;
        CliArgs::from_arg_matches(&matches)
    }

    #[test]
    fn parses_args_mode_with_connection_values() {
        let args = parse_args_without_env([
            "sql-batch-runner",
            "--script",
            "migrations/fix-schema.sql",
            "--server",
            "sql.example.net",
            "--database",
            "inventory",
            "--user",
            "migrator",
            "--password",
            "secret",
            "--connect-timeout",
            "10",
            "--trust-server-certificate",
            "--next-step",
            "Restart the app service",
        ])
        .expect("cli args should parse");

        let invocation = collect_command_from_args(args).expect("command should be created");
        let command = invocation.command;

        assert_eq!(command.script_path, PathBuf::from("migrations/fix-schema.sql"));
        assert_eq!(command.delimiter, "GO");
        assert_eq!(command.connection.host, "sql.example.net");
        assert_eq!(command.connection.port, 1433);
        assert_eq!(command.connection.database, "inventory");
        assert_eq!(command.connection.username, "migrator");
        assert_eq!(command.connection.password, "secret");
        assert!(command.connection.encrypt);
        assert!(command.connection.trust_server_certificate);
        assert_eq!(command.connection.connect_timeout, Duration::from_secs(10));
        assert_eq!(command.next_steps, vec!["Restart the app service"]);
        assert!(!command.dry_run);
        assert!(!invocation.verbose);
    }

    #[test]
    fn no_encrypt_flag_disables_encryption() {
        let args = parse_args_without_env([
            "sql-batch-runner",
            "-i",
            "fix.sql",
            "-S",
            "localhost",
            "-d",
            "app",
            "-U",
            "sa",
            "-P",
            "pw",
            "--no-encrypt",
            "--delimiter",
            "$$",
        ])
        .expect("cli args should parse");

        let command = collect_command_from_args(args)
            .expect("command should be created")
            .command;

        assert!(!command.connection.encrypt);
        assert_eq!(command.delimiter, "$$");
    }

    #[test]
    fn dry_run_does_not_require_connection_values() {
        let args = parse_args_without_env(["sql-batch-runner", "--script", "fix.sql", "--dry-run"])
            .expect("cli args should parse");

        let command = collect_command_from_args(args)
            .expect("command should be created")
            .command;

        assert!(command.dry_run);
        assert!(command.connection.host.is_empty());
    }

    #[test]
    fn rejects_missing_server_in_args_mode() {
        let args = parse_args_without_env([
            "sql-batch-runner",
            "--script",
            "fix.sql",
            "--database",
            "app",
            "--user",
            "sa",
            "--password",
            "pw",
        ])
        .expect("cli args should parse");

        let error = collect_command_from_args(args).expect_err("missing server should be rejected");
        assert!(
            error
                .to_string()
                .contains("--server is required when using argument mode")
        );
    }

    #[test]
    fn rejects_blank_delimiter() {
        let args = parse_args_without_env([
            "sql-batch-runner",
            "--script",
            "fix.sql",
            "--dry-run",
            "--delimiter",
            " ",
        ])
        .expect("cli args should parse");

        let error = collect_command_from_args(args).expect_err("blank delimiter should be rejected");
        assert!(error.to_string().contains("Batch delimiter must not be empty"));
    }

    #[test]
    fn defaults_apply_when_only_script_is_given() {
        let args = parse_args_without_env(["sql-batch-runner", "--script", "fix.sql"])
            .expect("cli args should parse");

        assert!(args.server.is_none());
        assert!(args.password.is_none());
        assert!(args.encrypt);
    }

    #[test]
    fn connection_values_can_come_from_environment() {
        let command = CliArgs::command();
        let env_names = [
            ("script", "SQL_BATCH_SCRIPT"),
            ("server", "SQL_BATCH_SERVER"),
            ("port", "SQL_BATCH_PORT"),
            ("database", "SQL_BATCH_DATABASE"),
            ("user", "SQL_BATCH_USER"),
            ("password", "SQL_BATCH_PASSWORD"),
            ("delimiter", "SQL_BATCH_DELIMITER"),
            ("connect_timeout", "SQL_BATCH_CONNECT_TIMEOUT"),
            ("encrypt", "SQL_BATCH_NO_ENCRYPT"),
            ("trust_server_certificate", "SQL_BATCH_TRUST_SERVER_CERTIFICATE"),
        ];

        for (id, expected_env) in env_names {
            let arg = command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .unwrap_or_else(|| panic!("argument {id} should exist"));
            assert_eq!(
                arg.get_env().and_then(|name| name.to_str()),
                Some(expected_env),
                "argument {id} should read {expected_env}"
            );
        }
    }
}
