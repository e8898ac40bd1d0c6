//! SQL run by the database probe. Ids and numeric columns are cast in SQL so the
//! probe works whether the schema uses serial or UUID keys and `NUMERIC` or
//! floating point measurements.

use chrono::NaiveDate;
use ht_core::model::NewHealthRecord;
use sqlx::{FromRow, PgConnection};

type Result<T> = std::result::Result<T, sqlx::Error>;

/// Tables whose row counts the probe reports.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Table {
    HealthRecords,
    UserGoals,
    ExerciseRecords,
}

impl Table {
    pub fn counted() -> &'static [Table] {
        &[Table::HealthRecords, Table::UserGoals, Table::ExerciseRecords]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::HealthRecords => "Health records",
            Self::UserGoals => "User goals",
            Self::ExerciseRecords => "Exercise records",
        }
    }
}

impl AsRef<str> for Table {
    fn as_ref(&self) -> &str {
        match self {
            Self::HealthRecords => "health_records",
            Self::UserGoals => "user_goals",
            Self::ExerciseRecords => "exercise_records",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecordRow {
    pub id: String,
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bmi: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub goal_type: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

const SELECT_TABLE_NAMES: &str = "SELECT table_name::text \
     FROM information_schema.tables \
     WHERE table_schema = 'public' \
     ORDER BY table_name";

const SELECT_USERS: &str = "SELECT id::text AS id, email::text AS email, name::text AS name \
     FROM users";

const SELECT_ACCOUNT_BY_EMAIL: &str = "SELECT id::text AS id, email::text AS email, \
     name::text AS name, password_hash::text AS password_hash \
     FROM users WHERE email = $1";

const SELECT_RECENT_RECORDS: &str = "SELECT id::text AS id, date::date AS date, \
     weight::float8 AS weight, height::float8 AS height, bmi::float8 AS bmi, \
     body_fat_percentage::float8 AS body_fat_percentage, muscle_mass::float8 AS muscle_mass \
     FROM health_records \
     WHERE user_id::text = $1 \
     ORDER BY date DESC \
     LIMIT $2";

const INSERT_RECORD: &str = "INSERT INTO health_records \
     (user_id, date, weight, height, age, body_fat_percentage, muscle_mass, bmi) \
     SELECT id, $2, $3, $4, $5, $6, $7, $8 FROM users WHERE id::text = $1 \
     RETURNING id::text";

const DELETE_RECORD: &str = "DELETE FROM health_records WHERE id::text = $1";

const SELECT_GOALS: &str = "SELECT goal_type::text AS goal_type, \
     target_value::float8 AS target_value, current_value::float8 AS current_value, \
     start_date::date AS start_date, target_date::date AS target_date, is_active \
     FROM user_goals WHERE user_id::text = $1";

pub async fn table_names(conn: &mut PgConnection) -> Result<Vec<String>> {
    sqlx::query_scalar(SELECT_TABLE_NAMES).fetch_all(conn).await
}

pub async fn users(conn: &mut PgConnection) -> Result<Vec<UserRow>> {
    sqlx::query_as(SELECT_USERS).fetch_all(conn).await
}

pub async fn count_rows(conn: &mut PgConnection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.as_ref());
    sqlx::query_scalar(&sql).fetch_one(conn).await
}

pub async fn find_account(conn: &mut PgConnection, email: &str) -> Result<Option<AccountRow>> {
    sqlx::query_as(SELECT_ACCOUNT_BY_EMAIL)
        .bind(email)
        .fetch_optional(conn)
        .await
}

pub async fn recent_records(
    conn: &mut PgConnection,
    user_id: &str,
    limit: i64,
) -> Result<Vec<RecordRow>> {
    sqlx::query_as(SELECT_RECENT_RECORDS)
        .bind(user_id)
        .bind(limit)
        .fetch_all(conn)
        .await
}

/// Inserts `record` for the user and returns the generated id.
pub async fn insert_record(
    conn: &mut PgConnection,
    user_id: &str,
    record: &NewHealthRecord,
) -> Result<String> {
    sqlx::query_scalar(INSERT_RECORD)
        .bind(user_id)
        .bind(record.date)
        .bind(record.weight)
        .bind(record.height)
        .bind(record.age)
        .bind(record.body_fat_percentage)
        .bind(record.muscle_mass)
        .bind(record.bmi)
        .fetch_one(conn)
        .await
}

pub async fn delete_record(conn: &mut PgConnection, id: &str) -> Result<bool> {
    let result = sqlx::query(DELETE_RECORD).bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn goals(conn: &mut PgConnection, user_id: &str) -> Result<Vec<GoalRow>> {
    sqlx::query_as(SELECT_GOALS)
        .bind(user_id)
        .fetch_all(conn)
        .await
}
