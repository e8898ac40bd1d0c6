use std::time::Duration;

use chrono::Local;
use ht_core::mask;
use ht_core::model::{
    or_unknown, AuthResponse, CreatedRecordResponse, HealthStatus, NewHealthRecord,
    ProfileResponse, RecordId, RecordsResponse,
};
use ht_core::report::Summary;
use reqwest::StatusCode;

use crate::api::{client::BackendClient, ApiConfig};
use crate::console;
use crate::probe::{settle, ProbeError};
use crate::CliError;

pub const SERVER_HEALTH: &str = "Server Health";
pub const AUTHENTICATION: &str = "Authentication";
pub const HEALTH_RECORDS: &str = "Health Records";
pub const USER_PROFILE: &str = "User Profile";
pub const CREATE_RECORD: &str = "Create Record";

pub const HEALTH_PATH: &str = "/health";
pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const RECORDS_PATH: &str = "/health-records";
pub const PROFILE_PATH: &str = "/users/profile";

/// Endpoints hit without credentials at the end of a run, to show their status.
pub const SWEEP_PATHS: [&str; 4] = [REGISTER_PATH, LOGIN_PATH, RECORDS_PATH, PROFILE_PATH];

const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

const SETUP_GUIDE: [&str; 5] = [
    "1. Install Node.js from https://nodejs.org/",
    "2. Navigate to backend directory: cd backend",
    "3. Install dependencies: npm install",
    "4. Create .env file: copy env.example .env",
    "5. Start server: npm run dev",
];

/// Runs the backend API checks in order: health, token, then the
/// authenticated calls.
pub struct ApiProbe {
    config: ApiConfig,
    client: BackendClient,
}

impl ApiProbe {
    pub fn new(config: ApiConfig) -> Result<Self, CliError> {
        let client = BackendClient::new(&config.base_url)?;
        Ok(Self { config, client })
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub async fn run(&mut self) -> Summary {
        console::banner("Health Tracker Backend API Test Suite");

        let mut summary = Summary::new("Backend API Test Summary");

        let server_ok = settle("Server health check failed", self.check_health().await).is_some();
        if !server_ok {
            summary.record(SERVER_HEALTH, false);
            print_setup_guide();
            return summary;
        }

        let authenticated = self.authenticate().await;

        let records_ok = settle("Health records error", self.list_records().await).is_some();
        let profile_ok = settle("User profile error", self.user_profile().await).is_some();
        let create_ok = settle("Create record error", self.create_record().await).is_some();

        self.sweep_endpoints().await;

        summary.record(SERVER_HEALTH, server_ok);
        summary.record(AUTHENTICATION, authenticated);
        summary.record(HEALTH_RECORDS, records_ok);
        summary.record(USER_PROFILE, profile_ok);
        summary.record(CREATE_RECORD, create_ok);

        console::blank();
        print!("{}", summary);

        if summary.all_passed() {
            println!("\n🎉 All backend API tests passed!");
            println!("The backend is fully functional and ready to use.");
        } else {
            println!("\n⚠️  Some tests failed. Please check the backend setup.");
        }

        summary
    }

    pub async fn check_health(&self) -> Result<HealthStatus, ProbeError> {
        console::heading("🔍", "Testing Backend Server Health");

        let status: HealthStatus = match self
            .client
            .get(HEALTH_PATH, StatusCode::OK, Some(SHORT_TIMEOUT))
            .await
        {
            Ok(status) => status,
            Err(e) => {
                if e.is_connect() {
                    console::fail("Cannot connect to backend server!");
                    console::note(format!(
                        "Make sure the server is running on {}",
                        self.client.base_url()
                    ));
                }
                return Err(e);
            }
        };

        console::pass("Server is running!");
        console::detail(format!("Status: {}", or_unknown(status.status.as_ref())));
        console::detail(format!("Database: {}", or_unknown(status.database.as_ref())));
        console::detail(format!("Timestamp: {}", or_unknown(status.timestamp.as_ref())));

        Ok(status)
    }

    /// Obtains a token and keeps it for the authenticated checks.
    pub async fn authenticate(&mut self) -> bool {
        match self.obtain_token().await {
            Some(token) => {
                self.client.set_token(token);
                true
            }
            None => false,
        }
    }

    /// Logs in with the configured credentials, registering the configured
    /// user if that fails.
    pub async fn obtain_token(&self) -> Option<String> {
        if let Some(token) = settle("Login failed", self.login().await) {
            return Some(token);
        }
        settle("Registration failed", self.register().await)
    }

    pub async fn login(&self) -> Result<String, ProbeError> {
        console::heading("🔑", "Testing Login");
        tracing::debug!(
            email = mask::email(&self.config.login.email).as_str(),
            "logging in"
        );

        let response: AuthResponse = self
            .client
            .post(LOGIN_PATH, &self.config.login, StatusCode::OK)
            .await?;
        let token = non_empty_token(response.token.clone())?;

        let user = response.user.unwrap_or_default();
        console::pass("Login successful!");
        console::detail(format!("User: {}", or_unknown(user.name.as_ref())));
        console::detail(format!("Email: {}", or_unknown(user.email.as_ref())));

        Ok(token)
    }

    pub async fn register(&self) -> Result<String, ProbeError> {
        console::heading("🔐", "Testing Registration");
        tracing::debug!(
            email = mask::email(&self.config.registration.email).as_str(),
            "registering"
        );

        let response: AuthResponse = self
            .client
            .post(REGISTER_PATH, &self.config.registration, StatusCode::CREATED)
            .await?;
        let token = non_empty_token(response.token.clone())?;

        let user = response.user.unwrap_or_default();
        console::pass("Registration successful!");
        console::detail(format!("User ID: {}", or_unknown(user.id.as_ref())));
        console::detail(format!("Email: {}", or_unknown(user.email.as_ref())));

        Ok(token)
    }

    pub async fn list_records(&self) -> Result<RecordsResponse, ProbeError> {
        console::heading("📊", "Testing Health Records API");
        self.require_token()?;

        let response: RecordsResponse = self
            .client
            .get(RECORDS_PATH, StatusCode::OK, None)
            .await?;

        console::pass(format!("Retrieved {} health records", response.records.len()));
        if let Some(latest) = response.records.first() {
            console::detail(format!("Latest record: {}", or_unknown(latest.date.as_ref())));
            console::detail(format!("Weight: {}kg", or_unknown(latest.weight.as_ref())));
            console::detail(format!("BMI: {}", or_unknown(latest.bmi.as_ref())));
        }

        Ok(response)
    }

    pub async fn user_profile(&self) -> Result<ProfileResponse, ProbeError> {
        console::heading("👤", "Testing User Profile API");
        self.require_token()?;

        let response: ProfileResponse = self
            .client
            .get(PROFILE_PATH, StatusCode::OK, None)
            .await?;

        let user = response.user.clone().unwrap_or_default();
        console::pass("User profile retrieved!");
        console::detail(format!("Name: {}", or_unknown(user.name.as_ref())));
        console::detail(format!("Email: {}", or_unknown(user.email.as_ref())));
        console::detail(format!("Created: {}", or_unknown(user.created_at.as_ref())));

        Ok(response)
    }

    /// Creates the sample record dated today and returns its id.
    pub async fn create_record(&self) -> Result<RecordId, ProbeError> {
        console::heading("➕", "Testing Create Health Record");
        self.require_token()?;

        let record = NewHealthRecord::sample(Local::now().naive_local().date());
        let response: CreatedRecordResponse = self
            .client
            .post(RECORDS_PATH, &record, StatusCode::CREATED)
            .await?;

        let created = response.record.unwrap_or_default();
        let id = created.id.ok_or(ProbeError::MissingRecordId)?;
        console::pass("Health record created successfully!");
        console::detail(format!("Record ID: {}", id));
        console::detail(format!("Date: {}", or_unknown(created.date.as_ref())));

        Ok(id)
    }

    /// Prints the unauthenticated status of each endpoint, without judging it.
    pub async fn sweep_endpoints(&self) {
        console::heading("🌐", "Testing API Endpoints");

        for path in SWEEP_PATHS {
            match self.client.status_of(path, SHORT_TIMEOUT).await {
                Ok(status) => console::note(format!("{}: {}", path, status.as_u16())),
                Err(e) => {
                    tracing::debug!(path = path, "endpoint sweep failed: {}", e);
                    console::note(format!("{}: ❌ Connection failed", path));
                }
            }
        }
    }

    fn require_token(&self) -> Result<(), ProbeError> {
        self.client
            .token()
            .map(|_| ())
            .ok_or(ProbeError::MissingToken)
    }
}

fn non_empty_token(token: Option<String>) -> Result<String, ProbeError> {
    token
        .filter(|t| !t.is_empty())
        .ok_or(ProbeError::MissingToken)
}

fn print_setup_guide() {
    println!("\n❌ Backend server is not running!");
    println!("Please start the backend server first:");
    for step in SETUP_GUIDE {
        println!("{}", step);
    }
}
