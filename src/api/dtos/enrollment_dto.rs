use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{default_page, default_page_size, enum_str, PaginationParams};
use crate::domain::EnrollmentApplication;
use crate::infrastructure::repositories::MonthlyCount;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub student_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub preferred_class_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApplicationRequest {
    pub status: Option<String>,
    pub review_comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ApplicationListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: i64,
    pub student_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub parent_name: String,
    pub parent_phone: String,
    pub parent_email: Option<String>,
    pub address: Option<String>,
    pub preferred_class_id: Option<i64>,
    pub status: String,
    pub review_comment: Option<String>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub student_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&EnrollmentApplication> for ApplicationResponse {
    fn from(application: &EnrollmentApplication) -> Self {
        Self {
            id: application.id,
            student_name: application.student_name.clone(),
            gender: enum_str(&application.gender),
            birth_date: application.birth_date,
            parent_name: application.parent_name.clone(),
            parent_phone: application.parent_phone.clone(),
            parent_email: application.parent_email.clone(),
            address: application.address.clone(),
            preferred_class_id: application.preferred_class_id,
            status: enum_str(&application.status),
            review_comment: application.review_comment.clone(),
            reviewed_by: application.reviewed_by,
            reviewed_at: application.reviewed_at,
            student_id: application.student_id,
            created_at: application.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatsResponse {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub by_month: Vec<MonthBucket>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month: String,
    pub count: i64,
}

impl From<&MonthlyCount> for MonthBucket {
    fn from(row: &MonthlyCount) -> Self {
        Self {
            month: row.month.clone(),
            count: row.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub sent_count: i64,
}
