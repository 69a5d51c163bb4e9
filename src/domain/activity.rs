use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Draft,
    Published,
    Ongoing,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub title: String,
    pub activity_type: String,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: i32,
    pub fee: Decimal,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Registration is only possible between publish and completion.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self.status, ActivityStatus::Published | ActivityStatus::Ongoing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Attended,
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRegistration {
    pub id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub contact_phone: Option<String>,
    pub status: RegistrationStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "checkin_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    Manual,
    BulkManual,
    QrCode,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityCheckIn {
    pub id: i64,
    pub activity_id: i64,
    pub student_id: i64,
    pub check_in_time: DateTime<Utc>,
    pub method: CheckInMethod,
    pub operator_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "evaluator_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorType {
    Parent,
    Teacher,
}

impl EvaluatorType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "parent" => Some(EvaluatorType::Parent),
            "teacher" => Some(EvaluatorType::Teacher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityEvaluation {
    pub id: i64,
    pub activity_id: i64,
    pub evaluator_type: EvaluatorType,
    pub evaluator_name: String,
    pub overall_rating: i32,
    pub content_rating: Option<i32>,
    pub organization_rating: Option<i32>,
    pub environment_rating: Option<i32>,
    pub service_rating: Option<i32>,
    pub comments: Option<String>,
    pub reply: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn is_valid_rating(rating: i32) -> bool {
    (1..=5).contains(&rating)
}
