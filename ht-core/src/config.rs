//! Default settings shared by the harness binaries, and the environment lookups
//! used to override them.

use std::fmt::Display;
use std::str::FromStr;

use crate::Error;

pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_SITE_ROOT: &str = ".";

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "health_tracker";
pub const DEFAULT_DB_USER: &str = "health_user";
pub const DEFAULT_DB_PASSWORD: &str = "health_password_2024";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

pub const DEFAULT_TEST_EMAIL: &str = "test@healthtracker.com";
pub const DEFAULT_TEST_PASSWORD: &str = "password123";
pub const DEFAULT_MISSING_EMAIL: &str = "nonexistent@test.com";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@healthtracker.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const DEFAULT_REGISTER_EMAIL: &str = "testapi@healthtracker.com";
pub const DEFAULT_REGISTER_PASSWORD: &str = "testpassword123";
pub const DEFAULT_REGISTER_NAME: &str = "API Test User";

/// Returns the value of environment variable `name`, or `default` if it is unset
/// or not valid Unicode.
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parses environment variable `name`, falling back to `default` when it is
/// unset. An unparseable value is logged and ignored.
pub fn env_parse_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(value) => match parse_setting(name, &value) {
            Ok(parsed) => {
                tracing::debug!("using {} from environment", name);
                parsed
            }
            Err(e) => {
                tracing::warn!("ignoring {}", e);
                default
            }
        },
        Err(_) => default,
    }
}

pub fn parse_setting<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| Error::InvalidSetting {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
