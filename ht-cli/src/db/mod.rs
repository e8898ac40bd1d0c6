use argh::FromArgs;
use ht_core::config::{
    env_or, env_parse_or, DEFAULT_DB_HOST, DEFAULT_DB_NAME, DEFAULT_DB_PASSWORD, DEFAULT_DB_PORT,
    DEFAULT_DB_USER, DEFAULT_MISSING_EMAIL, DEFAULT_TEST_EMAIL,
};
use sqlx::postgres::PgConnectOptions;

use crate::CliError;

pub mod checks;
pub mod queries;

pub use checks::DbProbe;

/// Connection parameters for the database probe, and the users it looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub test_email: String,
    pub missing_email: String,
}

impl DbConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            test_email: DEFAULT_TEST_EMAIL.to_string(),
            missing_email: DEFAULT_MISSING_EMAIL.to_string(),
        }
    }
}

/// Runs the PostgreSQL schema and data checks.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "db")]
pub struct DbCommand {
    /// database host (default: localhost, or HT_DB_HOST environment variable)
    #[argh(option, default = "env_or(\"HT_DB_HOST\", DEFAULT_DB_HOST)")]
    pub host: String,
    /// database port (default: 5432, or HT_DB_PORT environment variable)
    #[argh(option, default = "env_parse_or(\"HT_DB_PORT\", DEFAULT_DB_PORT)")]
    pub port: u16,
    /// database name (default: health_tracker, or HT_DB_NAME environment variable)
    #[argh(option, default = "env_or(\"HT_DB_NAME\", DEFAULT_DB_NAME)")]
    pub database: String,
    /// database user (default: health_user, or HT_DB_USER environment variable)
    #[argh(option, default = "env_or(\"HT_DB_USER\", DEFAULT_DB_USER)")]
    pub user: String,
    /// database password (default: HT_DB_PASSWORD environment variable, or the fixture password)
    #[argh(option, default = "env_or(\"HT_DB_PASSWORD\", DEFAULT_DB_PASSWORD)")]
    pub password: String,
    /// email of the user that must exist (default: test@healthtracker.com)
    #[argh(option, default = "DEFAULT_TEST_EMAIL.to_string()")]
    pub test_email: String,
    /// email of a user that must not exist (default: nonexistent@test.com)
    #[argh(option, default = "DEFAULT_MISSING_EMAIL.to_string()")]
    pub missing_email: String,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
}

impl DbCommand {
    pub fn config(&self) -> DbConfig {
        DbConfig {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            test_email: self.test_email.clone(),
            missing_email: self.missing_email.clone(),
        }
    }

    pub async fn run(&self) -> Result<(), CliError> {
        let probe = DbProbe::new(self.config());
        let summary = probe.run().await;

        if summary.all_passed() {
            Ok(())
        } else {
            Err(CliError::ChecksFailed {
                failed: summary.failed_count().max(1),
            })
        }
    }
}
