use std::time::Duration;

use chrono::Local;
use ht_core::config::{
    DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, DEFAULT_TEST_EMAIL, DEFAULT_TEST_PASSWORD,
};
use ht_core::mask;
use ht_core::model::{or_unknown, AuthResponse, NewHealthRecord, RecordsResponse};
use ht_core::report::Summary;
use sqlx::{ConnectOptions, Connection, PgConnection};

use crate::console;
use crate::db::queries::{self, AccountRow, Table};
use crate::db::DbConfig;
use crate::probe::{settle, ProbeError};

pub const DATABASE_CONNECTION: &str = "Database Connection";
pub const AUTHENTICATION: &str = "Authentication";
pub const HEALTH_RECORDS_API: &str = "Health Records API";
pub const GOALS_API: &str = "Goals API";
pub const RESPONSE_CONTRACT: &str = "Response Contract";

const RECENT_RECORD_LIMIT: i64 = 5;
const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_millis(100);

/// Login response shape the frontend expects from `POST /auth/login`.
pub const CANNED_LOGIN_RESPONSE: &str = r#"{
    "success": true,
    "message": "Login successful",
    "user": {
        "id": "test-user-id",
        "email": "test@healthtracker.com",
        "name": "Test User"
    },
    "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."
}"#;

/// Records response shape the frontend expects from `GET /health-records`.
pub const CANNED_RECORDS_RESPONSE: &str = r#"{
    "success": true,
    "records": [
        {
            "id": "record-1",
            "date": "2025-07-24",
            "weight": 87.9,
            "height": 175,
            "bmi": 28.7,
            "body_fat_percentage": 21.6,
            "muscle_mass": 65.7
        }
    ],
    "count": 1
}"#;

/// Runs the database checks. Every check opens and closes its own connection.
pub struct DbProbe {
    config: DbConfig,
}

impl DbProbe {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Summary {
        console::banner("Health Tracker API Test Suite");

        let mut summary = Summary::new("Test Summary");

        let connection_ok =
            settle("Database connection failed", self.check_connection().await).is_some();
        let auth_ok =
            settle("Authentication test failed", self.check_authentication().await).is_some();
        let records_ok = settle(
            "Health records API test failed",
            self.check_health_records().await,
        )
        .is_some();
        let goals_ok = settle("Goals API test failed", self.check_goals().await).is_some();
        let contract_ok =
            settle("Response contract check failed", check_response_contract()).is_some();

        summary.record(DATABASE_CONNECTION, connection_ok);
        summary.record(AUTHENTICATION, auth_ok);
        summary.record(HEALTH_RECORDS_API, records_ok);
        summary.record(GOALS_API, goals_ok);
        summary.record(RESPONSE_CONTRACT, contract_ok);

        console::blank();
        print!("{}", summary);

        if summary.all_passed() {
            println!("\n🎉 All tests passed! The database and API are working correctly.");
            println!("\n📝 Available test users:");
            console::detail(format!(
                "Email: {}, Password: {}",
                DEFAULT_TEST_EMAIL, DEFAULT_TEST_PASSWORD
            ));
            console::detail(format!(
                "Email: {}, Password: {}",
                DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD
            ));
        } else {
            println!("\n⚠️  Some tests failed. Please check the database connection and setup.");
        }

        summary
    }

    async fn connect(&self) -> Result<PgConnection, ProbeError> {
        let mut options = self.config.connect_options();
        options.log_statements(log::LevelFilter::Trace);
        options.log_slow_statements(log::LevelFilter::Info, SLOW_STATEMENT_THRESHOLD);
        tracing::debug!(
            host = self.config.host.as_str(),
            port = self.config.port,
            database = self.config.database.as_str(),
            "connecting to database"
        );
        Ok(options.connect().await?)
    }

    /// Lists tables and users, and counts rows in the data tables.
    pub async fn check_connection(&self) -> Result<(), ProbeError> {
        console::heading("🔍", "Testing Database Connection");
        let mut conn = self.connect().await?;

        let tables = queries::table_names(&mut conn).await?;
        console::pass(format!("Tables found: {:?}", tables));

        let users = queries::users(&mut conn).await?;
        console::pass(format!("Users found: {}", users.len()));
        for user in &users {
            console::detail(format!(
                "{} ({})",
                or_unknown(user.name.as_ref()),
                user.email
            ));
        }

        for table in Table::counted() {
            let count = queries::count_rows(&mut conn, *table).await?;
            console::pass(format!("{}: {}", table.label(), count));
        }

        conn.close().await?;
        Ok(())
    }

    /// Finds the test user and confirms the missing email has no row.
    pub async fn check_authentication(&self) -> Result<(), ProbeError> {
        console::heading("🔐", "Testing User Authentication");
        let mut conn = self.connect().await?;

        let user = self.test_user(&mut conn).await?;
        console::pass(format!(
            "User found: {} ({})",
            or_unknown(user.name.as_ref()),
            user.email
        ));
        if user.password_hash.is_some() {
            console::pass(format!("Authentication would work for: {}", user.email));
        }

        let missing = &self.config.missing_email;
        if queries::find_account(&mut conn, missing).await?.is_some() {
            return Err(ProbeError::UnexpectedRow {
                email: missing.to_string(),
            });
        }
        console::pass("Invalid user correctly rejected");

        conn.close().await?;
        Ok(())
    }

    /// Reads the test user's latest records, then inserts and deletes the
    /// sample record in one transaction. Fails if the row count moves.
    pub async fn check_health_records(&self) -> Result<(), ProbeError> {
        console::heading("📊", "Testing Health Records API");
        let mut conn = self.connect().await?;

        let user = self.test_user(&mut conn).await?;
        let records = queries::recent_records(&mut conn, &user.id, RECENT_RECORD_LIMIT).await?;
        console::pass(format!("Found {} health records for user", records.len()));
        for record in &records {
            console::detail(format!(
                "{}: Weight={}kg, BMI={}, Body Fat={}%",
                record.date,
                or_unknown(record.weight.as_ref()),
                or_unknown(record.bmi.as_ref()),
                or_unknown(record.body_fat_percentage.as_ref())
            ));
        }

        let before = queries::count_rows(&mut conn, Table::HealthRecords).await?;

        let sample = NewHealthRecord::sample(Local::now().naive_local().date());
        let mut tx = conn.begin().await?;
        let id = queries::insert_record(&mut tx, &user.id, &sample).await?;
        console::pass(format!("Created new health record with ID: {}", id));
        queries::delete_record(&mut tx, &id).await?;
        tx.commit().await?;
        console::pass("Cleaned up test record");

        let after = queries::count_rows(&mut conn, Table::HealthRecords).await?;
        ensure_count_unchanged(before, after)?;

        conn.close().await?;
        Ok(())
    }

    pub async fn check_goals(&self) -> Result<(), ProbeError> {
        console::heading("🎯", "Testing Goals API");
        let mut conn = self.connect().await?;

        let user = self.test_user(&mut conn).await?;
        let goals = queries::goals(&mut conn, &user.id).await?;
        console::pass(format!("Found {} goals for user", goals.len()));
        for goal in &goals {
            let status = if goal.is_active.unwrap_or(false) {
                "Active"
            } else {
                "Inactive"
            };
            console::detail(format!(
                "{}: Target={}, Current={}, {}",
                or_unknown(goal.goal_type.as_ref()),
                or_unknown(goal.target_value.as_ref()),
                or_unknown(goal.current_value.as_ref()),
                status
            ));
        }

        conn.close().await?;
        Ok(())
    }

    async fn test_user(&self, conn: &mut PgConnection) -> Result<AccountRow, ProbeError> {
        let email = &self.config.test_email;
        tracing::debug!(email = mask::email(email).as_str(), "looking up test user");
        queries::find_account(conn, email)
            .await?
            .ok_or_else(|| ProbeError::UserNotFound {
                email: email.to_string(),
            })
    }
}

/// Parses the canned login and records responses through the same models the
/// API probe decodes live responses with.
pub fn check_response_contract() -> Result<(), ProbeError> {
    console::heading("🌐", "Simulating API Endpoints");

    let login: AuthResponse = decode(CANNED_LOGIN_RESPONSE)?;
    let records: RecordsResponse = decode(CANNED_RECORDS_RESPONSE)?;

    if login.token.is_none() {
        return Err(ProbeError::MissingToken);
    }

    let user = login.user.unwrap_or_default();
    console::pass("Login endpoint simulation:");
    console::detail(format!("Status: {}", or_unknown(login.success.as_ref())));
    console::detail(format!("User: {}", or_unknown(user.name.as_ref())));

    console::pass("Health records endpoint simulation:");
    console::detail(format!(
        "Records count: {}",
        records.count.unwrap_or(records.records.len() as u64)
    ));
    if let Some(sample) = records.records.first() {
        console::detail(format!("Sample record: {}", or_unknown(sample.date.as_ref())));
    }

    Ok(())
}

/// The insert/delete cycle must leave `health_records` as it found it.
pub fn ensure_count_unchanged(before: i64, after: i64) -> Result<(), ProbeError> {
    if before == after {
        Ok(())
    } else {
        Err(ProbeError::RowCountChanged { before, after })
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ProbeError> {
    serde_json::from_str(body).map_err(|source| ProbeError::Decode {
        source,
        body: body.to_string(),
    })
}
