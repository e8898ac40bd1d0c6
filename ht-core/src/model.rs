//! Request and response bodies exchanged with the health tracker backend.
//!
//! Response types are lenient: every field is optional, since the probes only
//! report on what the backend sends and must not fail on a missing field.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Body of `POST /health-records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHealthRecord {
    pub date: NaiveDate,
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub body_fat_percentage: f64,
    pub muscle_mass: f64,
    pub bmi: f64,
}

impl NewHealthRecord {
    /// The record every probe creates, dated `date`.
    pub fn sample(date: NaiveDate) -> Self {
        Self {
            date,
            weight: 88.5,
            height: 175.0,
            age: 30,
            body_fat_percentage: 20.5,
            muscle_mass: 66.2,
            bmi: 28.9,
        }
    }
}

/// Identifier assigned by the backend, either a serial number or a UUID string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Numeric value as the backend serializes it. PostgreSQL `NUMERIC` columns
/// arrive as decimal strings, everything else as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
}

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measurement::Number(n) => Some(*n),
            Measurement::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Number(n) => write!(f, "{}", n),
            Measurement::Text(s) => f.write_str(s),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: Option<String>,
    pub database: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSummary {
    pub id: Option<RecordId>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Body of a successful `POST /auth/login` or `POST /auth/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub user: Option<UserSummary>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: Option<RecordId>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<String>,
}

/// Body of `GET /users/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileResponse {
    pub user: Option<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRecord {
    pub id: Option<RecordId>,
    pub user_id: Option<RecordId>,
    pub date: Option<String>,
    pub weight: Option<Measurement>,
    pub height: Option<Measurement>,
    pub age: Option<Measurement>,
    pub body_fat_percentage: Option<Measurement>,
    pub muscle_mass: Option<Measurement>,
    pub bmi: Option<Measurement>,
}

/// Body of `GET /health-records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsResponse {
    pub success: Option<bool>,
    pub records: Vec<HealthRecord>,
    pub count: Option<u64>,
}

/// Body of `POST /health-records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedRecordResponse {
    pub message: Option<String>,
    pub record: Option<HealthRecord>,
}

/// Formats an optional field the way the probes print it.
pub fn or_unknown<T: fmt::Display>(value: Option<&T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
