use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::student::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentApplication {
    pub id: i64,
    pub student_name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub parent_name: String,
    pub parent_phone: String,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub preferred_class_id: Option<i64>,
    pub status: ApplicationStatus,
    pub review_comment: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Set once a student record has been created from an approved application.
    pub student_id: Option<i64>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EnrollmentApplication {
    pub fn is_reviewed(&self) -> bool {
        !matches!(self.status, ApplicationStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_review_outcomes() {
        assert_eq!(
            ApplicationStatus::parse("approved"),
            Some(ApplicationStatus::Approved)
        );
        assert_eq!(
            ApplicationStatus::parse("rejected"),
            Some(ApplicationStatus::Rejected)
        );
        assert_eq!(ApplicationStatus::parse("waitlisted"), None);
    }

    #[test]
    fn pending_applications_are_not_reviewed() {
        let application = EnrollmentApplication {
            id: 1,
            student_name: "李小红".to_string(),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
            parent_name: "李强".to_string(),
            parent_phone: "13912345678".to_string(),
            parent_email: None,
            address: None,
            preferred_class_id: None,
            status: ApplicationStatus::Pending,
            review_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            student_id: None,
            reminder_sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(!application.is_reviewed());
    }
}
