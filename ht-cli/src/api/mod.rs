use argh::FromArgs;
use ht_core::config::{
    env_or, DEFAULT_API_BASE_URL, DEFAULT_REGISTER_EMAIL, DEFAULT_REGISTER_NAME,
    DEFAULT_REGISTER_PASSWORD, DEFAULT_TEST_EMAIL, DEFAULT_TEST_PASSWORD,
};
use ht_core::model::{Credentials, Registration};

use crate::CliError;

pub mod checks;
pub mod client;

pub use checks::ApiProbe;

/// Where the API probe points and who it logs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub login: Credentials,
    pub registration: Registration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            login: Credentials {
                email: DEFAULT_TEST_EMAIL.to_string(),
                password: DEFAULT_TEST_PASSWORD.to_string(),
            },
            registration: Registration {
                email: DEFAULT_REGISTER_EMAIL.to_string(),
                password: DEFAULT_REGISTER_PASSWORD.to_string(),
                name: DEFAULT_REGISTER_NAME.to_string(),
            },
        }
    }
}

/// Runs the backend REST API checks.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "api")]
pub struct ApiCommand {
    /// backend API base URL (default: http://localhost:3000/api, or HT_API_BASE_URL environment variable)
    #[argh(option, default = "env_or(\"HT_API_BASE_URL\", DEFAULT_API_BASE_URL)")]
    pub base_url: String,
    /// email to log in with (default: test@healthtracker.com, or HT_API_EMAIL environment variable)
    #[argh(option, default = "env_or(\"HT_API_EMAIL\", DEFAULT_TEST_EMAIL)")]
    pub email: String,
    /// password to log in with (default: HT_API_PASSWORD environment variable, or the fixture password)
    #[argh(option, default = "env_or(\"HT_API_PASSWORD\", DEFAULT_TEST_PASSWORD)")]
    pub password: String,
    /// email to register when login fails (default: testapi@healthtracker.com)
    #[argh(option, default = "DEFAULT_REGISTER_EMAIL.to_string()")]
    pub register_email: String,
    /// password to register with when login fails
    #[argh(option, default = "DEFAULT_REGISTER_PASSWORD.to_string()")]
    pub register_password: String,
    /// display name to register with when login fails (default: API Test User)
    #[argh(option, default = "DEFAULT_REGISTER_NAME.to_string()")]
    pub register_name: String,
    /// use JSON for log messages
    #[argh(switch)]
    pub json: bool,
}

impl ApiCommand {
    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            login: Credentials {
                email: self.email.clone(),
                password: self.password.clone(),
            },
            registration: Registration {
                email: self.register_email.clone(),
                password: self.register_password.clone(),
                name: self.register_name.clone(),
            },
        }
    }

    pub async fn run(&self) -> Result<(), CliError> {
        let mut probe = ApiProbe::new(self.config())?;
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
